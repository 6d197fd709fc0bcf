pub mod config;
pub mod error;
pub mod inference;
pub mod prediction;
pub mod telemetry;
