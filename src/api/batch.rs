//! Config-driven batch generation.
//!
//! A batch config is a JSON object with a `default_settings` object and a
//! `videos` array. Each video's effective settings are the defaults with the
//! video's own keys written over them (shallow, item wins). Items run one at a
//! time in input order; a failing item is recorded and the batch moves on.
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{error, info, warn};

use crate::api::generate_video;
use crate::core::operation::OperationClient;
use crate::core::params::PollPolicy;
use crate::core::poller::PollOutcome;
use crate::core::request::{RequestBuilder, detect_mime_type, is_remote_reference};
use crate::error::{Error, Result};
use crate::types::{AspectRatio, MimeType};

pub const DEFAULT_RESULTS_FILE: &str = "batch_results.json";
pub const DEFAULT_EXAMPLE_FILE: &str = "example_batch_config.json";

const REQUIRED_TOP_LEVEL: [&str; 2] = ["videos", "default_settings"];
const REQUIRED_PER_VIDEO: [&str; 2] = ["prompt", "image_uri"];

/// Flat JSON object of video settings
pub type Settings = Map<String, Value>;

/// Validated batch configuration
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    pub defaults: Settings,
    pub videos: Vec<Settings>,
}

impl BatchConfig {
    /// Validate a parsed config document. Nothing is sent anywhere on failure.
    pub fn from_value(config: &Value) -> Result<Self> {
        let root = config
            .as_object()
            .ok_or_else(|| Error::configuration("config must be a JSON object"))?;

        for key in REQUIRED_TOP_LEVEL {
            if !root.contains_key(key) {
                return Err(Error::Configuration(format!(
                    "Missing required key in config: {key}"
                )));
            }
        }

        let defaults = root["default_settings"]
            .as_object()
            .cloned()
            .ok_or_else(|| Error::configuration("'default_settings' must be an object"))?;

        let entries = root["videos"]
            .as_array()
            .ok_or_else(|| Error::configuration("'videos' must be a list"))?;

        let mut videos = Vec::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            let video = entry
                .as_object()
                .ok_or_else(|| Error::Configuration(format!("Video {i}: must be an object")))?;
            for key in REQUIRED_PER_VIDEO {
                if !video.contains_key(key) {
                    return Err(Error::Configuration(format!(
                        "Video {i}: Missing required key '{key}'"
                    )));
                }
            }
            videos.push(video.clone());
        }

        Ok(Self { defaults, videos })
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(s)
            .map_err(|e| Error::Configuration(format!("invalid JSON: {e}")))?;
        Self::from_value(&value)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("cannot read config file {:?}: {}", path, e))
        })?;
        Self::from_json_str(&text)
    }

    /// Effective settings for every video, in input order.
    pub fn effective_settings(&self) -> Vec<Settings> {
        self.videos
            .iter()
            .map(|video| merge_settings(&self.defaults, video))
            .collect()
    }
}

/// Shallow key-wise override: every key in `overrides` replaces the same key
/// in `defaults`. Nested objects are replaced whole, never merged.
pub fn merge_settings(defaults: &Settings, overrides: &Settings) -> Settings {
    let mut merged = defaults.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Typed view of one video's effective settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VideoSettings {
    pub prompt: String,
    pub image_uri: String,
    #[serde(default)]
    pub mime_type: Option<MimeType>,
    #[serde(default)]
    pub output_gcs_uri: Option<String>,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub seed: Option<u32>,
}

impl VideoSettings {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let mut typed: VideoSettings = serde_json::from_value(Value::Object(settings.clone()))?;
        // Remote references are rejected by the request builder
        if typed.mime_type.is_none() && !is_remote_reference(&typed.image_uri) {
            typed.mime_type = Some(detect_mime_type(&typed.image_uri)?);
        }
        Ok(typed)
    }

    pub fn into_builder(self) -> RequestBuilder {
        let mut builder = RequestBuilder::new(self.prompt)
            .image(self.image_uri, self.mime_type)
            .aspect_ratio(self.aspect_ratio)
            .duration(self.duration)
            .seed(self.seed);
        if let Some(output) = self.output_gcs_uri {
            builder = builder.output_uri(output);
        }
        builder
    }
}

/// Per-item result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// A video was produced
    Success { video_uri: String },
    /// The run finished without a video (service failure, rejected call, timeout)
    Failed { reason: String },
    /// The item could not be prepared or run
    Error { message: String },
}

impl ItemOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            ItemOutcome::Success { .. } => "success",
            ItemOutcome::Failed { .. } => "failed",
            ItemOutcome::Error { .. } => "error",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ItemOutcome::Success { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    /// 1-based position in the config's `videos` array
    pub index: usize,
    pub prompt: String,
    pub image_uri: String,
    pub outcome: ItemOutcome,
}

/// One entry of the results file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub index: usize,
    pub prompt: String,
    pub image_uri: String,
    pub video_uri: Option<String>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&BatchItem> for ResultRecord {
    fn from(item: &BatchItem) -> Self {
        let (video_uri, error) = match &item.outcome {
            ItemOutcome::Success { video_uri } => (Some(video_uri.clone()), None),
            ItemOutcome::Failed { reason } => (None, Some(reason.clone())),
            ItemOutcome::Error { message } => (None, Some(message.clone())),
        };
        Self {
            index: item.index,
            prompt: item.prompt.clone(),
            image_uri: item.image_uri.clone(),
            video_uri,
            status: item.outcome.status().to_string(),
            error,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_items(items: &[BatchItem]) -> Self {
        let total = items.len();
        let successful = items.iter().filter(|i| i.outcome.is_success()).count();
        Self {
            total,
            successful,
            failed: total - successful,
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub items: Vec<BatchItem>,
    pub summary: BatchSummary,
}

impl BatchReport {
    pub fn records(&self) -> Vec<ResultRecord> {
        self.items.iter().map(ResultRecord::from).collect()
    }

    /// Write the ordered results array as pretty JSON.
    pub fn write_results(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.records())?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn log_summary(&self) {
        info!("Batch Generation Summary");
        info!("  Total videos: {}", self.summary.total);
        info!("  Successful: {}", self.summary.successful);
        info!("  Failed: {}", self.summary.failed);
    }
}

fn display_value(settings: &Settings, key: &str) -> String {
    match settings.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn run_item<C>(client: &C, settings: &Settings, policy: &PollPolicy) -> Result<PollOutcome>
where
    C: OperationClient + ?Sized,
{
    let request = VideoSettings::from_settings(settings)?.into_builder().build()?;
    Ok(generate_video(client, &request, policy))
}

/// Run every video of a validated config, sequentially.
pub fn run_batch<C>(config: &BatchConfig, client: &C, policy: &PollPolicy) -> BatchReport
where
    C: OperationClient + ?Sized,
{
    info!("Starting batch video generation...");
    let all_settings = config.effective_settings();
    let total = all_settings.len();
    let mut items = Vec::with_capacity(total);

    for (i, settings) in all_settings.iter().enumerate() {
        let index = i + 1;
        let prompt = display_value(settings, "prompt");
        let image_uri = display_value(settings, "image_uri");
        info!("Processing video {}/{}", index, total);
        info!("  Prompt: {}", prompt);

        let outcome = match run_item(client, settings, policy) {
            Ok(poll) => match poll.into_result() {
                Ok(video_uri) => {
                    info!("Video {} completed: {}", index, video_uri);
                    ItemOutcome::Success { video_uri }
                }
                Err(e) => {
                    warn!("Video {} failed: {}", index, e);
                    ItemOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            },
            Err(e) => {
                if e.is_validation() {
                    warn!("Video {} has invalid input: {}", index, e);
                } else {
                    error!("Error processing video {}: {}", index, e);
                }
                ItemOutcome::Error {
                    message: e.to_string(),
                }
            }
        };

        items.push(BatchItem {
            index,
            prompt,
            image_uri,
            outcome,
        });
    }

    let summary = BatchSummary::from_items(&items);
    BatchReport { items, summary }
}

/// Validate `config` and run it. Validation failures return before any call.
pub fn process_batch<C>(config: &Value, client: &C, policy: &PollPolicy) -> Result<BatchReport>
where
    C: OperationClient + ?Sized,
{
    let config = BatchConfig::from_value(config)?;
    Ok(run_batch(&config, client, policy))
}

/// Load, run and persist a batch config file.
pub fn process_batch_file<C>(
    config_path: &Path,
    results_path: &Path,
    client: &C,
    policy: &PollPolicy,
) -> Result<BatchReport>
where
    C: OperationClient + ?Sized,
{
    let config = BatchConfig::load(config_path)?;
    let report = run_batch(&config, client, policy);
    report.write_results(results_path)?;
    info!("Results saved to: {:?}", results_path);
    Ok(report)
}

/// Example configuration with shared defaults and per-video overrides.
pub fn example_config() -> Value {
    json!({
        "default_settings": {
            "output_gcs_uri": "gs://your-bucket/batch-videos/",
            "aspect_ratio": "16:9"
        },
        "videos": [
            {
                "prompt": "A sunrise over a mountain range with golden light",
                "image_uri": "images/mountain-sunrise.png"
            },
            {
                "prompt": "Ocean waves gently lapping on a sandy beach",
                "image_uri": "images/beach-scene.jpg",
                "aspect_ratio": "9:16"
            },
            {
                "prompt": "City traffic moving through busy streets at dusk",
                "image_uri": "images/city-traffic.png",
                "duration": 8
            },
            {
                "prompt": "Leaves rustling in the wind on a sunny day",
                "image_uri": "images/forest-leaves.jpg",
                "seed": 42
            }
        ]
    })
}

pub fn write_example_config(path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&example_config())?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(v: Value) -> Settings {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn item_keys_override_defaults() {
        let merged = merge_settings(
            &obj(json!({ "aspect_ratio": "16:9", "duration": 5 })),
            &obj(json!({ "aspect_ratio": "9:16", "prompt": "p" })),
        );
        assert_eq!(
            Value::Object(merged),
            json!({ "aspect_ratio": "9:16", "duration": 5, "prompt": "p" })
        );
    }

    #[test]
    fn remote_image_skips_mime_detection() {
        let settings = obj(json!({ "prompt": "p", "image_uri": "gs://bucket/clip.gif" }));
        let typed = VideoSettings::from_settings(&settings).unwrap();
        assert_eq!(typed.mime_type, None);
    }

    #[test]
    fn nested_objects_are_replaced_not_merged() {
        let merged = merge_settings(
            &obj(json!({ "extra": { "a": 1, "b": 2 } })),
            &obj(json!({ "extra": { "b": 3 } })),
        );
        assert_eq!(merged["extra"], json!({ "b": 3 }));
    }

    #[test]
    fn validation_names_missing_keys() {
        let err = BatchConfig::from_value(&json!({ "videos": [] })).unwrap_err();
        assert!(err.to_string().contains("default_settings"));

        let err = BatchConfig::from_value(&json!({ "default_settings": {}, "videos": {} }))
            .unwrap_err();
        assert!(err.to_string().contains("'videos' must be a list"));

        let err = BatchConfig::from_value(&json!({
            "default_settings": {},
            "videos": [ { "prompt": "a", "image_uri": "a.png" }, { "prompt": "b" } ]
        }))
        .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("Video 1: Missing required key 'image_uri'"));
    }

    #[test]
    fn video_settings_detect_mime_and_default_ratio() {
        let typed = VideoSettings::from_settings(&obj(json!({
            "prompt": "p",
            "image_uri": "shot.JPG",
            "note": "ignored"
        })))
        .unwrap();
        assert_eq!(typed.mime_type, Some(MimeType::Jpeg));
        assert_eq!(typed.aspect_ratio, AspectRatio::Landscape);

        let explicit = VideoSettings::from_settings(&obj(json!({
            "prompt": "p",
            "image_uri": "shot.bin",
            "mime_type": "image/png"
        })))
        .unwrap();
        assert_eq!(explicit.mime_type, Some(MimeType::Png));
    }

    #[test]
    fn summary_counts_add_up() {
        let items = vec![
            BatchItem {
                index: 1,
                prompt: "a".into(),
                image_uri: "a.png".into(),
                outcome: ItemOutcome::Success {
                    video_uri: "gs://b/a.mp4".into(),
                },
            },
            BatchItem {
                index: 2,
                prompt: "b".into(),
                image_uri: "b.png".into(),
                outcome: ItemOutcome::Error {
                    message: "boom".into(),
                },
            },
        ];
        let s = BatchSummary::from_items(&items);
        assert_eq!((s.total, s.successful, s.failed), (2, 1, 1));
        assert!(!s.all_succeeded());

        let empty = BatchSummary::from_items(&[]);
        assert_eq!(empty, BatchSummary::default());
        assert!(empty.all_succeeded());
    }

    #[test]
    fn result_record_shape() {
        let item = BatchItem {
            index: 3,
            prompt: "p".into(),
            image_uri: "x.png".into(),
            outcome: ItemOutcome::Success {
                video_uri: "gs://b/x.mp4".into(),
            },
        };
        assert_eq!(
            serde_json::to_value(ResultRecord::from(&item)).unwrap(),
            json!({
                "index": 3,
                "prompt": "p",
                "image_uri": "x.png",
                "video_uri": "gs://b/x.mp4",
                "status": "success"
            })
        );
    }

    #[test]
    fn example_config_is_valid_and_local() {
        let config = BatchConfig::from_value(&example_config()).unwrap();
        assert_eq!(config.videos.len(), 4);
        let effective = config.effective_settings();
        assert_eq!(effective[1]["aspect_ratio"], json!("9:16"));
        assert_eq!(effective[0]["aspect_ratio"], json!("16:9"));
        for settings in &effective {
            assert!(VideoSettings::from_settings(settings).is_ok());
        }
    }
}
