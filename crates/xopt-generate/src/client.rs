//! HTTP client for the Anthropic Messages API.
//!
//! Sends a single user message per call and returns the text of the first
//! content block. Transient failures go through [`retry_with_backoff`].

use std::time::Duration;

use reqwest::{Client, Url};
use xopt_core::AppConfig;

use crate::error::GenerateError;
use crate::retry::retry_with_backoff;
use crate::types::{ApiErrorBody, Message, MessageRequest, MessageResponse};

const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Connection settings for [`GeneratorClient`].
#[derive(Clone)]
pub struct GeneratorConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
}

impl std::fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("api_key", &"[redacted]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .finish()
    }
}

impl GeneratorConfig {
    /// Builds the generator settings, or `None` when no API key is configured.
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Option<Self> {
        let api_key = config.anthropic_api_key.clone()?;
        Some(Self {
            api_key,
            model: config.generator_model.clone(),
            base_url: config.generator_base_url.clone(),
            timeout_secs: config.generator_timeout_secs,
            max_retries: config.generator_max_retries,
            retry_backoff_base_ms: config.generator_retry_backoff_base_ms,
        })
    }
}

/// Client for the generative text backend.
///
/// Use [`GeneratorClient::new`] with a [`GeneratorConfig`] in production or
/// [`GeneratorClient::with_base_url`] to point at a mock server in tests.
pub struct GeneratorClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl GeneratorClient {
    /// # Errors
    ///
    /// Returns [`GenerateError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`GenerateError::InvalidBaseUrl`] for a malformed base URL.
    pub fn new(config: &GeneratorConfig) -> Result<Self, GenerateError> {
        let mut client = Self::with_base_url(&config.api_key, config.timeout_secs, &config.base_url)?;
        client.model.clone_from(&config.model);
        client.max_retries = config.max_retries;
        client.backoff_base_ms = config.retry_backoff_base_ms;
        Ok(client)
    }

    /// Creates a client with a custom base URL, the default model and no retries.
    ///
    /// # Errors
    ///
    /// Same as [`GeneratorClient::new`].
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, GenerateError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("xopt/0.1")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .and_then(|base| base.join("v1/messages"))
            .map_err(|e| GenerateError::InvalidBaseUrl(format!("{base_url}: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: DEFAULT_MODEL.to_string(),
            endpoint,
            max_retries: 0,
            backoff_base_ms: 0,
        })
    }

    /// Overrides the retry policy.
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Sends `prompt` as a single user message and returns the reply text.
    ///
    /// # Errors
    ///
    /// - [`GenerateError::Http`] on network failure.
    /// - [`GenerateError::Api`] for a non-2xx status (after retries for 429/5xx).
    /// - [`GenerateError::Deserialize`] if the body is not a Messages response.
    /// - [`GenerateError::EmptyResponse`] if the first block carries no text.
    pub async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, GenerateError> {
        let request = MessageRequest {
            model: &self.model,
            max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.send_once(&request)
        })
        .await
    }

    async fn send_once(&self, request: &MessageRequest<'_>) -> Result<String, GenerateError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(status = %status, bytes = body.len(), "generator response received");

        if !status.is_success() {
            return Err(GenerateError::Api {
                status: status.as_u16(),
                message: api_error_message(&body, status),
            });
        }

        let parsed: MessageResponse =
            serde_json::from_str(&body).map_err(|source| GenerateError::Deserialize {
                context: "messages response".to_string(),
                source,
            })?;

        parsed
            .first_text()
            .filter(|text| !text.trim().is_empty())
            .map(str::to_owned)
            .ok_or(GenerateError::EmptyResponse)
    }
}

/// Human-readable message for an error body, preferring the structured form.
fn api_error_message(body: &str, status: reqwest::StatusCode) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        return format!("{}: {}", parsed.error.kind, parsed.error.message);
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string();
    }
    trimmed.chars().take(200).collect()
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
