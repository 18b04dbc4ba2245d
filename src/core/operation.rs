//! Long-running operation wire types and the client seam used by the poller.
use serde::Deserialize;
use serde_json::Value;

use crate::core::request::PredictRequest;
use crate::error::Result;

/// Remote calls needed to drive one generation job.
///
/// Implementations return `Err` for transport failures and non-success HTTP
/// statuses; the poller turns those into a failed outcome.
pub trait OperationClient {
    /// Submit a generation job; the response should carry the operation handle.
    fn submit(&self, payload: &PredictRequest<'_>) -> Result<SubmitResponse>;

    /// Fetch the current status of a previously submitted operation.
    fn fetch(&self, operation: &str) -> Result<OperationStatus>;
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SubmitResponse {
    /// Operation handle, e.g. `projects/.../operations/<id>`
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OperationStatus {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub response: Option<GenerationResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    #[serde(default, alias = "predictions", alias = "generatedSamples")]
    pub videos: Vec<GeneratedVideo>,
    #[serde(default)]
    pub rai_media_filtered_count: Option<u32>,
    #[serde(default)]
    pub rai_media_filtered_reasons: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedVideo {
    #[serde(default, alias = "uri", alias = "videoUri")]
    pub gcs_uri: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Nested form: `{"video": {"uri": ...}}`
    #[serde(default)]
    pub video: Option<Box<GeneratedVideo>>,
}

impl GeneratedVideo {
    pub fn uri(&self) -> Option<&str> {
        self.gcs_uri
            .as_deref()
            .or_else(|| self.video.as_deref().and_then(GeneratedVideo::uri))
            .filter(|u| !u.is_empty())
    }
}

/// Interpretation of one status response
#[derive(Debug, Clone, PartialEq)]
pub enum OperationState {
    Pending,
    /// Done with an error payload
    Errored { detail: String },
    /// Done; `video_uri` is the first prediction's location, if any
    Succeeded {
        video_uri: Option<String>,
        filter_reasons: Option<String>,
    },
}

impl OperationStatus {
    pub fn state(&self) -> OperationState {
        if !self.done {
            return OperationState::Pending;
        }
        if let Some(err) = &self.error {
            let detail = err
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| err.to_string());
            return OperationState::Errored { detail };
        }

        let response = self.response.as_ref();
        let video_uri = response
            .and_then(|r| r.videos.first())
            .and_then(GeneratedVideo::uri)
            .map(str::to_string);
        let filter_reasons = response
            .filter(|r| !r.rai_media_filtered_reasons.is_empty())
            .map(|r| r.rai_media_filtered_reasons.join("; "));

        OperationState::Succeeded {
            video_uri,
            filter_reasons,
        }
    }
}
