//! Crate-level error type and `Result` alias for structured error handling.
//! Groups configuration, input validation, transport, service-side and timeout
//! failures so callers can decide which ones abort a run and which ones are
//! recorded against a single video.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unsupported image format. Use PNG or JPEG. Got: {image}")]
    UnsupportedImageFormat { image: String },

    #[error("Remote image references are not supported, use a local PNG or JPEG file. Got: {uri}")]
    RemoteImageUnsupported { uri: String },

    #[error("Invalid GCS URI: {uri}. Must start with 'gs://'")]
    InvalidStorageUri { uri: String },

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("Credential error: {0}")]
    Credentials(String),

    #[error("Request failed with status {status}: {body}")]
    Transport { status: u16, body: String },

    #[error("Service reported an error: {0}")]
    Service(String),

    #[error("No operation name returned")]
    NoOperationName,

    #[error("No video URI in response{}", filter_note(.reasons))]
    NoVideoUri { reasons: Option<String> },

    #[error("Operation did not finish after {attempts} status checks")]
    Timeout { attempts: u32 },
}

fn filter_note(reasons: &Option<String>) -> String {
    match reasons {
        Some(r) => format!(" (filtered: {r})"),
        None => String::new(),
    }
}

impl Error {
    pub fn configuration<E: std::fmt::Display>(e: E) -> Self {
        Error::Configuration(e.to_string())
    }

    /// True for input problems detected before anything is sent to the service.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedImageFormat { .. }
                | Error::RemoteImageUnsupported { .. }
                | Error::InvalidStorageUri { .. }
                | Error::InvalidArgument { .. }
        )
    }
}
