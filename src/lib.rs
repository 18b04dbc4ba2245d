#![doc = r#"
veogen — image-to-video generation on Vertex AI Veo from the command line or
from your own Rust code.

The crate turns a prompt and a local PNG/JPEG into a `predictLongRunning`
request, submits it, polls the returned operation at a fixed interval and
reports the Cloud Storage URI of the generated video. A batch mode runs many
such jobs from one JSON config and records every outcome.

Everything is synchronous: one job at a time, blocking HTTP, blocking sleeps
between status checks.

Quick start: one video
----------------------
```rust,no_run
use veogen::{
    AspectRatio, Credentials, GcloudCredentials, PollPolicy, RequestBuilder, ServiceConfig,
    VertexClient, generate_video,
};

fn main() -> veogen::Result<()> {
    let credentials = Credentials::resolve(&GcloudCredentials::from_env())?;
    let client = VertexClient::new(&ServiceConfig::default(), &credentials)?;

    let request = RequestBuilder::new("Ocean waves crashing at sunset")
        .image("ocean.jpg", None)
        .output_uri("gs://my-bucket/videos/")
        .aspect_ratio(AspectRatio::Landscape)
        .build()?;

    let video_uri = generate_video(&client, &request, &PollPolicy::default()).into_result()?;
    println!("{video_uri}");
    Ok(())
}
```

Batch helpers
-------------
```rust,no_run
use std::path::Path;
use veogen::{Credentials, GcloudCredentials, PollPolicy, ServiceConfig, VertexClient};
use veogen::api::batch::process_batch_file;

fn main() -> veogen::Result<()> {
    let credentials = Credentials::resolve(&GcloudCredentials::from_env())?;
    let client = VertexClient::new(&ServiceConfig::default(), &credentials)?;

    let report = process_batch_file(
        Path::new("batch_config.json"),
        Path::new("batch_results.json"),
        &client,
        &PollPolicy::default(),
    )?;
    println!(
        "total={} successful={} failed={}",
        report.summary.total, report.summary.successful, report.summary.failed
    );
    Ok(())
}
```

Error handling
--------------
All fallible functions return `veogen::Result<T>`. Configuration errors abort a
batch before anything is submitted; per-video problems end up in the batch
report instead.

Useful modules
--------------
- [`api`] — single-video and batch entry points.
- [`core`] — request builder, operation wire types, poll loop.
- [`io`] — credentials and the Vertex AI HTTP client.
- [`types`] — `AspectRatio`, `MimeType`.
- [`error`] — crate-level `Error` and `Result`.
"#]

pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Types
pub use core::operation::{OperationClient, OperationState, OperationStatus, SubmitResponse};
pub use core::params::{PollPolicy, ServiceConfig};
pub use core::poller::PollOutcome;
pub use core::request::{GenerationRequest, RequestBuilder, detect_mime_type};
pub use error::{Error, Result};
pub use types::{AspectRatio, MimeType};

// I/O
pub use io::{CredentialProvider, Credentials, GcloudCredentials, VertexClient};

// High-level API
pub use api::batch::{
    BatchConfig, BatchItem, BatchReport, BatchSummary, ItemOutcome, merge_settings,
    process_batch, process_batch_file, run_batch,
};
pub use api::generate_video;
