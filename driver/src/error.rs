use abbot_core::AbbotError;
use std::path::PathBuf;
use thiserror::Error;

pub type DriverResult<T> = Result<T, DriverError>;

/// Errors raised while loading a workload or writing its report.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Report type 'file' requires an output path")]
    MissingOutputPath,

    #[error(transparent)]
    Core(#[from] AbbotError),
}

impl DriverError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DriverError::Io {
            path: path.into(),
            source,
        }
    }

    /// Get a short error kind name
    pub fn kind(&self) -> &'static str {
        match self {
            DriverError::Io { .. } => "io",
            DriverError::Json(_) => "json",
            DriverError::Config(_) => "config",
            DriverError::MissingOutputPath => "missing_output_path",
            DriverError::Core(e) => e.kind(),
        }
    }
}

impl From<toml::de::Error> for DriverError {
    fn from(err: toml::de::Error) -> Self {
        DriverError::Config(err.to_string())
    }
}
