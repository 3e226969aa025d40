pub mod executor;

pub use executor::{predict, validate_columns, PredictError, PredictExecutor, PredictionOutcome};
