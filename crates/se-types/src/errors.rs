use std::path::PathBuf;

use thiserror::Error;

/// Main error type for slurm-emission
#[derive(Error, Debug)]
pub enum SeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Script error at {path}: {message}")]
    Script { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for slurm-emission operations
pub type SeResult<T> = Result<T, SeError>;

/// Macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::SeError::Config(format!($($arg)*))
    };
}
