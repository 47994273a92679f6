use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed CSV: {0}")]
    Parse(String),

    #[error("Missing required column: {0}")]
    Schema(String),

    #[error("Type error in column '{column}' at row {row}: {message}")]
    Type {
        column: String,
        row: usize,
        message: String,
    },

    #[error("Dataframe operation failed: {0}")]
    Frame(#[from] PolarsError),

    #[error("Quality check failed: {0}")]
    Quality(String),

    #[error("Chart rendering failed: {0}")]
    Render(String),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("stage '{stage}' failed: {source}")]
    Stage {
        stage: String,
        #[source]
        source: Box<ReportError>,
    },
}

impl ReportError {
    /// Tags an error with the pipeline stage that produced it.
    pub fn in_stage(self, stage: &str) -> Self {
        ReportError::Stage {
            stage: stage.to_string(),
            source: Box::new(self),
        }
    }

    /// The underlying error with any stage wrappers peeled off.
    pub fn root(&self) -> &ReportError {
        match self {
            ReportError::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    /// Name of the stage that failed, if known.
    pub fn stage(&self) -> Option<&str> {
        match self {
            ReportError::Stage { stage, .. } => Some(stage),
            _ => None,
        }
    }
}

impl From<csv::Error> for ReportError {
    fn from(err: csv::Error) -> Self {
        if !err.is_io_error() {
            return ReportError::Parse(err.to_string());
        }
        match err.into_kind() {
            csv::ErrorKind::Io(io) => ReportError::Io(io),
            kind => ReportError::Parse(format!("{kind:?}")),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
