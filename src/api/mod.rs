//! High-level library API: run one generation request end to end, or a whole
//! batch configuration with per-item result tracking. Prefer these entrypoints
//! over the low-level `core` modules when embedding veogen.
use tracing::info;

use crate::core::operation::OperationClient;
use crate::core::params::PollPolicy;
use crate::core::poller::{PollOutcome, run_operation};
use crate::core::request::GenerationRequest;

pub mod batch;

/// Submit `request` and block until it completes, fails or times out.
pub fn generate_video<C>(
    client: &C,
    request: &GenerationRequest,
    policy: &PollPolicy,
) -> PollOutcome
where
    C: OperationClient + ?Sized,
{
    info!("Starting video generation...");
    info!("  Prompt: {}", request.prompt());
    if let Some(image) = request.image() {
        info!("  Input image: {:?} ({})", image.source, image.mime_type);
    }
    if let Some(output) = request.output_uri() {
        info!("  Output location: {}", output);
    }
    info!("  Aspect ratio: {}", request.aspect_ratio());
    info!("  Duration: {}s", request.duration_seconds());
    if let Some(seed) = request.seed() {
        info!("  Seed: {}", seed);
    }

    run_operation(client, &request.payload(), policy)
}
