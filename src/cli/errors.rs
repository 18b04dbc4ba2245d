use std::path::PathBuf;

use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing required argument: {arg} (or use --config / --create-example for batch mode)")]
    MissingArgument { arg: String },

    #[error("Configuration file not found: {path:?}")]
    ConfigNotFound { path: PathBuf },

    #[error("Video generation failed: {0}")]
    GenerationFailed(veogen::Error),

    #[error("{failed} of {total} videos failed to generate")]
    BatchIncomplete { failed: usize, total: usize },

    #[error(transparent)]
    Veogen(#[from] veogen::Error),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}
