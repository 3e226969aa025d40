pub mod executor;
pub mod split;
pub mod target;

pub use executor::{locate_dataset, TrainError, TrainExecutor, TrainSettings};
