//! Blocking submit-and-poll loop for a single long-running generation job.
//!
//! ```text
//! submitted -> polling -> { completed | failed | timed_out }
//! ```
//!
//! Every failure path ends the loop immediately; only a "not done" status
//! schedules another query. The loop never exceeds `PollPolicy::max_attempts`
//! status queries.
use std::thread;

use tracing::{debug, info, warn};

use crate::core::operation::{OperationClient, OperationState};
use crate::core::params::PollPolicy;
use crate::core::request::PredictRequest;
use crate::error::{Error, Result};

/// Terminal outcome of one operation
#[derive(Debug)]
pub enum PollOutcome {
    Completed { video_uri: String },
    Failed(Error),
    TimedOut { attempts: u32 },
}

impl PollOutcome {
    pub fn video_uri(&self) -> Option<&str> {
        match self {
            PollOutcome::Completed { video_uri } => Some(video_uri),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, PollOutcome::Completed { .. })
    }

    /// Collapse into a `Result`, turning a timeout into [`Error::Timeout`].
    pub fn into_result(self) -> Result<String> {
        match self {
            PollOutcome::Completed { video_uri } => Ok(video_uri),
            PollOutcome::Failed(e) => Err(e),
            PollOutcome::TimedOut { attempts } => Err(Error::Timeout { attempts }),
        }
    }
}

/// Submit `payload` and poll until the operation reaches a terminal state.
pub fn run_operation<C>(
    client: &C,
    payload: &PredictRequest<'_>,
    policy: &PollPolicy,
) -> PollOutcome
where
    C: OperationClient + ?Sized,
{
    let submitted = match client.submit(payload) {
        Ok(resp) => resp,
        Err(e) => {
            warn!("Submission failed: {}", e);
            return PollOutcome::Failed(e);
        }
    };

    let Some(operation) = submitted.name.filter(|n| !n.is_empty()) else {
        warn!("Submission response carried no operation name");
        return PollOutcome::Failed(Error::NoOperationName);
    };

    info!("Video generation started. Waiting for completion...");
    debug!("Operation: {}", operation);

    poll_operation(client, &operation, policy)
}

/// Poll an already submitted operation.
pub fn poll_operation<C>(client: &C, operation: &str, policy: &PollPolicy) -> PollOutcome
where
    C: OperationClient + ?Sized,
{
    for attempt in 1..=policy.max_attempts {
        if !policy.interval.is_zero() {
            thread::sleep(policy.interval);
        }

        let status = match client.fetch(operation) {
            Ok(status) => status,
            Err(e) => {
                warn!("Status check {} failed: {}", attempt, e);
                return PollOutcome::Failed(e);
            }
        };

        match status.state() {
            OperationState::Pending => {
                info!(
                    "Still processing... (check {}/{}, next in {:?})",
                    attempt, policy.max_attempts, policy.interval
                );
            }
            OperationState::Errored { detail } => {
                warn!("Video generation failed: {}", detail);
                return PollOutcome::Failed(Error::Service(detail));
            }
            OperationState::Succeeded {
                video_uri: Some(video_uri),
                ..
            } => {
                info!("Video generation completed: {}", video_uri);
                return PollOutcome::Completed { video_uri };
            }
            OperationState::Succeeded {
                video_uri: None,
                filter_reasons,
            } => {
                warn!("Operation finished without a video");
                return PollOutcome::Failed(Error::NoVideoUri {
                    reasons: filter_reasons,
                });
            }
        }
    }

    warn!(
        "Giving up on {} after {} status checks",
        operation, policy.max_attempts
    );
    PollOutcome::TimedOut {
        attempts: policy.max_attempts,
    }
}
