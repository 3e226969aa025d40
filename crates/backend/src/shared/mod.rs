pub mod app_state;
pub mod config;
pub mod data;
pub mod features;
pub mod frame;
pub mod gbdt;
pub mod logger;
