//! Request construction: image reference resolution, MIME detection and the
//! `predictLongRunning` payload.
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{AspectRatio, MimeType};

pub const DEFAULT_DURATION_SECONDS: u32 = 5;
pub const MAX_DURATION_SECONDS: u32 = 8;

/// Detect the image MIME type from the reference's extension (case-insensitive).
pub fn detect_mime_type(image: &str) -> Result<MimeType> {
    let lower = image.to_ascii_lowercase();
    if lower.ends_with(".png") {
        Ok(MimeType::Png)
    } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        Ok(MimeType::Jpeg)
    } else {
        Err(Error::UnsupportedImageFormat {
            image: image.to_string(),
        })
    }
}

/// True when the reference carries a URI scheme (`gs://`, `https://`, ...).
pub fn is_remote_reference(image: &str) -> bool {
    match image.split_once("://") {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Check that an output location is a Cloud Storage URI.
pub fn validate_gcs_uri(uri: &str) -> Result<()> {
    if uri.starts_with("gs://") && uri.len() > "gs://".len() {
        Ok(())
    } else {
        Err(Error::InvalidStorageUri {
            uri: uri.to_string(),
        })
    }
}

/// Image bytes ready for transmission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub source: PathBuf,
    pub mime_type: MimeType,
    pub base64: String,
}

/// A validated generation request. Built once through [`RequestBuilder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    prompt: String,
    image: Option<EncodedImage>,
    output_uri: Option<String>,
    aspect_ratio: AspectRatio,
    duration_seconds: u32,
    seed: Option<u32>,
}

impl GenerationRequest {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn image(&self) -> Option<&EncodedImage> {
        self.image.as_ref()
    }

    pub fn output_uri(&self) -> Option<&str> {
        self.output_uri.as_deref()
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    pub fn seed(&self) -> Option<u32> {
        self.seed
    }

    /// Wire body for `predictLongRunning`.
    pub fn payload(&self) -> PredictRequest<'_> {
        PredictRequest {
            instances: vec![Instance {
                prompt: &self.prompt,
                image: self.image.as_ref().map(|img| ImagePayload {
                    bytes_base64_encoded: &img.base64,
                    mime_type: img.mime_type.as_str(),
                }),
            }],
            parameters: Parameters {
                aspect_ratio: self.aspect_ratio.as_str(),
                storage_uri: self.output_uri.as_deref(),
                duration_seconds: self.duration_seconds,
                seed: self.seed,
                sample_count: 1,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PredictRequest<'a> {
    pub instances: Vec<Instance<'a>>,
    pub parameters: Parameters<'a>,
}

#[derive(Debug, Serialize)]
pub struct Instance<'a> {
    pub prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImagePayload<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload<'a> {
    pub bytes_base64_encoded: &'a str,
    pub mime_type: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameters<'a> {
    pub aspect_ratio: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_uri: Option<&'a str>,
    pub duration_seconds: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
    pub sample_count: u32,
}

/// Collects request inputs and validates them in [`RequestBuilder::build`].
///
/// ```no_run
/// use veogen::{AspectRatio, RequestBuilder};
///
/// let request = RequestBuilder::new("Ocean waves")
///     .image("ocean.jpg", None)
///     .output_uri("gs://my-bucket/videos/")
///     .aspect_ratio(AspectRatio::Portrait)
///     .build()?;
/// assert_eq!(request.duration_seconds(), 5);
/// # Ok::<(), veogen::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestBuilder {
    prompt: String,
    image: Option<(String, Option<MimeType>)>,
    output_uri: Option<String>,
    aspect_ratio: AspectRatio,
    duration_seconds: Option<u32>,
    seed: Option<u32>,
}

impl RequestBuilder {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    /// Image reference and optional explicit MIME type (detected when `None`).
    pub fn image(mut self, reference: impl Into<String>, mime_type: Option<MimeType>) -> Self {
        self.image = Some((reference.into(), mime_type));
        self
    }

    pub fn output_uri(mut self, uri: impl Into<String>) -> Self {
        self.output_uri = Some(uri.into());
        self
    }

    pub fn aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn duration(mut self, seconds: Option<u32>) -> Self {
        self.duration_seconds = seconds;
        self
    }

    pub fn seed(mut self, seed: Option<u32>) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> Result<GenerationRequest> {
        if self.prompt.trim().is_empty() {
            return Err(Error::InvalidArgument {
                arg: "prompt",
                value: self.prompt,
            });
        }

        let duration_seconds = self.duration_seconds.unwrap_or(DEFAULT_DURATION_SECONDS);
        if duration_seconds == 0 || duration_seconds > MAX_DURATION_SECONDS {
            return Err(Error::InvalidArgument {
                arg: "duration",
                value: duration_seconds.to_string(),
            });
        }

        if let Some(uri) = &self.output_uri {
            validate_gcs_uri(uri)?;
        }

        let image = match self.image {
            Some((reference, mime_type)) => Some(load_image(&reference, mime_type)?),
            None => None,
        };

        Ok(GenerationRequest {
            prompt: self.prompt,
            image,
            output_uri: self.output_uri,
            aspect_ratio: self.aspect_ratio,
            duration_seconds,
            seed: self.seed,
        })
    }
}

fn load_image(reference: &str, mime_type: Option<MimeType>) -> Result<EncodedImage> {
    if is_remote_reference(reference) {
        return Err(Error::RemoteImageUnsupported {
            uri: reference.to_string(),
        });
    }

    let mime_type = match mime_type {
        Some(m) => m,
        None => detect_mime_type(reference)?,
    };

    let path = Path::new(reference);
    let bytes = std::fs::read(path)?;
    debug!(
        "Read {} bytes from {:?} ({})",
        bytes.len(),
        path,
        mime_type
    );

    Ok(EncodedImage {
        source: path.to_path_buf(),
        mime_type,
        base64: STANDARD.encode(&bytes),
    })
}
