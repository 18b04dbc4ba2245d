use std::path::Path;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use veogen::api::batch::{BatchConfig, BatchReport, run_batch, write_example_config};
use veogen::{
    Credentials, GcloudCredentials, GenerationRequest, OperationClient, PollPolicy,
    RequestBuilder, ServiceConfig, VertexClient, generate_video,
};

use super::args::CliArgs;
use super::errors::AppError;

fn init_logging(debug: bool) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))
}

fn connect(args: &CliArgs) -> Result<VertexClient, AppError> {
    let credentials = Credentials::resolve(&GcloudCredentials::from_env())?;
    let service = ServiceConfig {
        location: args.location.clone(),
        model: args.model.clone(),
    };
    let client = VertexClient::new(&service, &credentials)?;
    info!("Initialized Veo client for model {}", service.model);
    Ok(client)
}

fn build_single_request(args: &CliArgs) -> Result<GenerationRequest, AppError> {
    let prompt = args.prompt.clone().ok_or(AppError::MissingArgument {
        arg: "--prompt".to_string(),
    })?;
    let image = args.image_uri.clone().ok_or(AppError::MissingArgument {
        arg: "--image-uri".to_string(),
    })?;
    let output = args.output_uri.clone().ok_or(AppError::MissingArgument {
        arg: "--output-uri".to_string(),
    })?;

    if args.mime_type.is_none() {
        if let Ok(detected) = veogen::detect_mime_type(&image) {
            info!("Auto-detected MIME type: {}", detected);
        }
    }

    let request = RequestBuilder::new(prompt)
        .image(image, args.mime_type)
        .output_uri(output)
        .aspect_ratio(args.aspect_ratio)
        .duration(args.duration)
        .seed(args.seed)
        .build()?;
    Ok(request)
}

fn generate_single<C>(
    client: &C,
    request: &GenerationRequest,
    policy: &PollPolicy,
) -> Result<String, AppError>
where
    C: OperationClient + ?Sized,
{
    generate_video(client, request, policy)
        .into_result()
        .map_err(AppError::GenerationFailed)
}

fn finish_batch<C>(
    config: &BatchConfig,
    client: &C,
    policy: &PollPolicy,
    results_path: &Path,
) -> Result<BatchReport, AppError>
where
    C: OperationClient + ?Sized,
{
    let report = run_batch(config, client, policy);
    report.log_summary();
    report.write_results(results_path)?;
    info!("Results saved to: {:?}", results_path);

    if !report.summary.all_succeeded() {
        warn!("{} videos failed to generate", report.summary.failed);
        return Err(AppError::BatchIncomplete {
            failed: report.summary.failed,
            total: report.summary.total,
        });
    }
    info!("All videos generated successfully!");
    Ok(report)
}

pub fn run(args: CliArgs) -> Result<(), AppError> {
    init_logging(args.log)?;
    let policy = PollPolicy::default();

    if args.is_batch() {
        if args.create_example {
            write_example_config(&args.example_path)?;
            info!("Example configuration created: {:?}", args.example_path);
            info!(
                "Edit it with your prompts and image paths, then run: veogen --config {}",
                args.example_path.display()
            );
            return Ok(());
        }
        if let Some(config_path) = &args.config {
            if !config_path.exists() {
                return Err(AppError::ConfigNotFound {
                    path: config_path.clone(),
                });
            }
            // Validate before touching credentials or the network
            let config = BatchConfig::load(config_path)?;
            info!(
                "Loaded {} videos from {:?}",
                config.videos.len(),
                config_path
            );
            let client = connect(&args)?;
            finish_batch(&config, &client, &policy, &args.results)?;
        }
    } else {
        let request = build_single_request(&args)?;
        let client = connect(&args)?;
        let video_uri = generate_single(&client, &request, &policy)?;
        info!("Success! Your video is ready at: {}", video_uri);
        println!("{video_uri}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serde_json::json;
    use std::cell::Cell;
    use std::time::Duration;
    use veogen::core::request::PredictRequest;
    use veogen::{OperationStatus, SubmitResponse};

    /// Completes prompts containing "ok"; reports a service error otherwise.
    struct PromptClient {
        last_prompt: std::cell::RefCell<String>,
        submits: Cell<usize>,
    }

    impl PromptClient {
        fn new() -> Self {
            Self {
                last_prompt: Default::default(),
                submits: Cell::new(0),
            }
        }
    }

    impl OperationClient for PromptClient {
        fn submit(&self, payload: &PredictRequest<'_>) -> veogen::Result<SubmitResponse> {
            self.submits.set(self.submits.get() + 1);
            *self.last_prompt.borrow_mut() = payload.instances[0].prompt.to_string();
            Ok(SubmitResponse {
                name: Some(format!("operations/{}", self.submits.get())),
            })
        }

        fn fetch(&self, _operation: &str) -> veogen::Result<OperationStatus> {
            let body = if self.last_prompt.borrow().contains("ok") {
                json!({
                    "done": true,
                    "response": { "videos": [ { "gcsUri": "gs://bucket/out.mp4" } ] }
                })
            } else {
                json!({ "done": true, "error": { "code": 13, "message": "internal" } })
            };
            Ok(serde_json::from_value(body).unwrap())
        }
    }

    fn fast() -> PollPolicy {
        PollPolicy {
            interval: Duration::ZERO,
            max_attempts: 3,
        }
    }

    #[test]
    fn single_mode_requires_prompt_image_and_output() {
        let args = CliArgs::try_parse_from(["veogen", "--prompt", "x", "--image-uri", "a.png"])
            .unwrap();
        let err = build_single_request(&args).unwrap_err();
        assert!(matches!(err, AppError::MissingArgument { ref arg } if arg == "--output-uri"));
    }

    #[test]
    fn single_mode_returns_video_uri() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("ocean.jpg");
        std::fs::write(&image, b"\xFF\xD8\xFFjpeg").unwrap();

        let args = CliArgs::try_parse_from([
            "veogen",
            "--prompt",
            "ok: Ocean waves",
            "--image-uri",
            image.to_str().unwrap(),
            "--output-uri",
            "gs://bucket/videos/",
        ])
        .unwrap();
        let request = build_single_request(&args).unwrap();
        assert_eq!(request.duration_seconds(), 5);

        let client = PromptClient::new();
        let uri = generate_single(&client, &request, &fast()).unwrap();
        assert_eq!(uri, "gs://bucket/out.mp4");
    }

    #[test]
    fn batch_with_a_failure_is_incomplete_but_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("a.png");
        std::fs::write(&image, b"\x89PNG").unwrap();
        let image = image.to_str().unwrap();
        let config = BatchConfig::from_value(&json!({
            "default_settings": { "aspect_ratio": "16:9" },
            "videos": [
                { "prompt": "ok one", "image_uri": image },
                { "prompt": "two", "image_uri": image }
            ]
        }))
        .unwrap();
        let results = dir.path().join("results.json");

        let err = finish_batch(&config, &PromptClient::new(), &fast(), &results).unwrap_err();
        assert!(matches!(err, AppError::BatchIncomplete { failed: 1, total: 2 }));
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&results).unwrap()).unwrap();
        assert_eq!(written.as_array().unwrap().len(), 2);
    }
}
