pub mod config;
pub mod error;
pub mod inspection;
pub mod telemetry;
