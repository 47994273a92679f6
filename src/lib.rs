pub mod analysis;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod render;
pub mod report;
pub mod types;

// Use cases wiring the stages together for the CLI
pub mod app;

pub use error::{ReportError, Result};
pub use types::GameRecord;
