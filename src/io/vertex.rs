use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::core::operation::{OperationClient, OperationStatus, SubmitResponse};
use crate::core::params::ServiceConfig;
use crate::core::request::PredictRequest;
use crate::error::{Error, Result};
use crate::io::credentials::Credentials;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Blocking client for the Vertex AI `predictLongRunning` /
/// `fetchPredictOperation` pair on one publisher model.
pub struct VertexClient {
    model_url: String,
    client: Client,
    bearer_token: String,
}

impl VertexClient {
    pub fn new(config: &ServiceConfig, credentials: &Credentials) -> Result<Self> {
        Self::with_base_url(
            config.model_url(&credentials.project_id),
            credentials.access_token.clone(),
        )
    }

    /// Point at an explicit model URL (e.g. a local test double).
    pub fn with_base_url(model_url: impl Into<String>, bearer_token: String) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            model_url: model_url.into().trim_end_matches('/').to_string(),
            client,
            bearer_token,
        })
    }

    pub fn model_url(&self) -> &str {
        &self.model_url
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}:{}", self.model_url, method)
    }

    fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let response = req.bearer_auth(&self.bearer_token).send()?;
        let status = response.status();
        if status.is_success() {
            Ok(response.json()?)
        } else {
            let body = response
                .text()
                .unwrap_or_else(|_| "Failed to get error text".to_string());
            Err(Error::Transport {
                status: status.as_u16(),
                body,
            })
        }
    }
}

impl OperationClient for VertexClient {
    fn submit(&self, payload: &PredictRequest<'_>) -> Result<SubmitResponse> {
        let url = self.method_url("predictLongRunning");
        debug!("POST {}", url);
        self.send(self.client.post(url).json(payload))
    }

    fn fetch(&self, operation: &str) -> Result<OperationStatus> {
        let url = self.method_url("fetchPredictOperation");
        debug!("POST {} ({})", url, operation);
        self.send(
            self.client
                .post(url)
                .json(&json!({ "operationName": operation })),
        )
    }
}
