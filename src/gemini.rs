//! Gemini `generateContent` client.
//!
//! Each call is a single-turn prompt. Transport failures and `503 Service
//! Unavailable` are retried with exponential backoff; every other non-200
//! status ends the call immediately.

use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::gemini::{GenerateContentRequest, GenerateContentResponse};
use crate::prompts;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("API did not respond after {attempts} retries")]
    NoResponse { attempts: u32 },

    #[error("error reading response body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("error parsing successful Gemini response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no content found in Gemini response")]
    NoContent,
}

/// Something that can turn a prompt into generated text.
///
/// The regex and SQL helpers build their prompts and delegate to
/// [`ContentGenerator::generate_content`].
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate_content(&self, prompt: &str) -> Result<String, GeminiError>;

    /// Raw `<regex>|||<explanation>` answer for a plain-language description.
    async fn generate_regex(&self, description: &str) -> Result<String, GeminiError> {
        self.generate_content(&prompts::regex_prompt(description))
            .await
    }

    async fn generate_sql(&self, schema: &str, description: &str) -> Result<String, GeminiError> {
        self.generate_content(&prompts::sql_prompt(schema, description))
            .await
    }
}

/// Delay provider for backoff, swappable in tests.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Retry behaviour for provider calls.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay after the first retryable failure.
    pub initial_backoff: Duration,
    /// Factor applied to the delay after each retryable failure.
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// Delay slept after failed attempt `attempt` (zero based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(self.multiplier.saturating_pow(attempt))
    }
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            retry: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// `generateContent` endpoint, without the key query parameter.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Send `payload` until a non-retryable outcome or the attempts run out.
    ///
    /// Returns the last reply received, if any. A 503 body is read as soon as it
    /// arrives so the connection is released before the backoff.
    async fn send_with_retry(
        &self,
        payload: &GenerateContentRequest,
    ) -> Result<Option<Reply>, GeminiError> {
        let url = self.endpoint();
        let mut last: Option<Reply> = None;

        for attempt in 0..self.retry.max_attempts {
            let result = self
                .http
                .post(&url)
                .query(&[("key", self.api_key.as_str())])
                .header(http::header::CONTENT_TYPE, "application/json")
                .json(payload)
                .send()
                .await;

            let backoff = self.retry.backoff(attempt);
            match result {
                Ok(resp) if resp.status() != StatusCode::SERVICE_UNAVAILABLE => {
                    let status = resp.status();
                    let body = resp.bytes().await.map_err(GeminiError::Body)?;
                    return Ok(Some(Reply { status, body }));
                }
                Ok(resp) => {
                    let status = resp.status();
                    warn!(
                        attempt = attempt + 1,
                        status = %status,
                        backoff_ms = backoff.as_millis() as u64,
                        "Gemini unavailable, retrying"
                    );
                    let body = resp.bytes().await.unwrap_or_else(|e| {
                        debug!(error = %e, "could not read 503 body");
                        Bytes::new()
                    });
                    last = Some(Reply { status, body });
                }
                Err(e) => {
                    warn!(
                        attempt = attempt + 1,
                        error = %e,
                        backoff_ms = backoff.as_millis() as u64,
                        "Gemini request failed, retrying"
                    );
                }
            }
            self.sleeper.sleep(backoff).await;
        }

        Ok(last)
    }
}

/// Fully read provider reply.
struct Reply {
    status: StatusCode,
    body: Bytes,
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate_content(&self, prompt: &str) -> Result<String, GeminiError> {
        let payload = GenerateContentRequest::for_prompt(prompt);

        let reply = self.send_with_retry(&payload).await?;
        let Reply { status, body } = reply.ok_or(GeminiError::NoResponse {
            attempts: self.retry.max_attempts,
        })?;

        if status != StatusCode::OK {
            return Err(GeminiError::Api {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_slice(&body)?;
        let text = parsed.first_text().ok_or(GeminiError::NoContent)?;
        debug!(
            model = %self.model,
            chars = text.len(),
            "Gemini generation succeeded"
        );
        Ok(text.to_string())
    }
}
