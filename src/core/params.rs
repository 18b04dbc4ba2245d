use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_LOCATION: &str = "us-central1";
pub const DEFAULT_MODEL: &str = "veo-3.0-generate-preview";

/// Where requests are sent; suitable for config files and CLI defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Vertex AI region, e.g. `us-central1`
    pub location: String,
    /// Publisher model id
    pub model: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            location: DEFAULT_LOCATION.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Base URL of the publisher model for the given project.
    pub fn model_url(&self, project_id: &str) -> String {
        format!(
            "https://{loc}-aiplatform.googleapis.com/v1/projects/{project_id}\
             /locations/{loc}/publishers/google/models/{model}",
            loc = self.location,
            model = self.model,
        )
    }
}

/// Fixed-interval, bounded polling schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Wait before each status query
    pub interval: Duration,
    /// Status queries allowed before giving up
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(15),
            max_attempts: 60,
        }
    }
}

impl PollPolicy {
    /// Upper bound on time spent waiting, ignoring request latency.
    pub fn budget(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts)
    }
}
