//! AnthropicClient -- concrete [`UpstreamClient`] for the Anthropic
//! Messages API.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

use popmodel_core::gateway::UpstreamClient;
use popmodel_types::chat::UpstreamRequest;
use popmodel_types::error::UpstreamError;

use super::types::{ApiRequest, ApiResponse};

/// Anthropic Messages API client.
///
/// The API key is stored as a [`SecretString`] and only exposed when
/// constructing request headers.
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl AnthropicClient {
    /// The Anthropic API version header value.
    const API_VERSION: &'static str = "2023-06-01";

    pub fn new(api_key: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_key,
            base_url: "https://api.anthropic.com".to_string(),
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

// AnthropicClient intentionally does NOT derive Debug so the key can
// never be printed through the struct.

impl UpstreamClient for AnthropicClient {
    async fn send(&self, model: &str, request: &UpstreamRequest) -> Result<String, UpstreamError> {
        let body = ApiRequest::from_parts(model, request);
        let url = self.url("/v1/messages");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", Self::API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        if (200..300).contains(&status) {
            let parsed: ApiResponse = response
                .json()
                .await
                .map_err(|e| UpstreamError::Transport(format!("invalid response body: {e}")))?;
            return Ok(parsed.text_or_placeholder());
        }

        let detail: serde_json::Value = response
            .json()
            .await
            .unwrap_or(serde_json::Value::Null);
        if status >= 500 {
            warn!(status, %detail, "upstream server error");
        }
        Err(classify_error(status, detail, model))
    }
}

/// Map a non-2xx upstream response to an [`UpstreamError`].
///
/// A 404 whose error type is `not_found_error` and whose message mentions
/// a model is the signal that drives gateway fallback; every other 4xx is
/// forwarded with its detail, and 5xx is opaque to callers.
fn classify_error(status: u16, detail: serde_json::Value, model: &str) -> UpstreamError {
    if status == 404 && is_model_not_found(&detail) {
        return UpstreamError::ModelNotFound {
            model: model.to_string(),
            attempted: Vec::new(),
        };
    }
    if (400..500).contains(&status) {
        return UpstreamError::Client { status, detail };
    }
    UpstreamError::Server { status }
}

fn is_model_not_found(detail: &serde_json::Value) -> bool {
    let error = &detail["error"];
    error["type"].as_str() == Some("not_found_error")
        && error["message"]
            .as_str()
            .is_some_and(|m| m.to_lowercase().contains("model"))
}
