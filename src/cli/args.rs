use clap::Parser;
use std::path::PathBuf;

use veogen::api::batch::{DEFAULT_EXAMPLE_FILE, DEFAULT_RESULTS_FILE};
use veogen::core::params::{DEFAULT_LOCATION, DEFAULT_MODEL};
use veogen::{AspectRatio, MimeType};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "veogen",
    version,
    about = "Generate videos from images with Veo on Vertex AI",
    after_help = "Examples:\n  \
        veogen --prompt \"A sunrise over mountains\" --image-uri sunrise.png \
        --output-uri gs://my-bucket/videos/\n  \
        veogen --create-example\n  \
        veogen --config example_batch_config.json"
)]
pub struct CliArgs {
    /// Text description for video generation (single mode)
    #[arg(long)]
    pub prompt: Option<String>,

    /// Local PNG or JPEG input image (single mode)
    #[arg(long)]
    pub image_uri: Option<String>,

    /// GCS URI where the generated video is written, e.g. gs://bucket/videos/ (single mode)
    #[arg(long)]
    pub output_uri: Option<String>,

    /// Video aspect ratio
    #[arg(long, value_enum, default_value_t = AspectRatio::Landscape)]
    pub aspect_ratio: AspectRatio,

    /// MIME type of the input image (auto-detected if not specified)
    #[arg(long, value_enum)]
    pub mime_type: Option<MimeType>,

    /// Video duration in seconds (default 5)
    #[arg(long)]
    pub duration: Option<u32>,

    /// Random seed for reproducible results
    #[arg(long)]
    pub seed: Option<u32>,

    /// JSON batch configuration file (batch mode)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write an example batch configuration file and exit
    #[arg(long, default_value_t = false)]
    pub create_example: bool,

    /// Where --create-example writes the example configuration
    #[arg(long, default_value = DEFAULT_EXAMPLE_FILE)]
    pub example_path: PathBuf,

    /// Where batch results are written
    #[arg(long, default_value = DEFAULT_RESULTS_FILE)]
    pub results: PathBuf,

    /// Vertex AI region
    #[arg(long, default_value = DEFAULT_LOCATION)]
    pub location: String,

    /// Veo model id
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    pub log: bool,
}

impl CliArgs {
    pub fn is_batch(&self) -> bool {
        self.config.is_some() || self.create_example
    }
}
