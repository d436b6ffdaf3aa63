//! LLM providers and the fallback gateway.
//!
//! Each provider exposes a single prompt-to-text call. The [`LlmGateway`] tries the primary
//! provider, then the fallback, tracking per-provider quota cooldowns in memory.

mod gateway;
mod gemini;
#[cfg(test)]
pub(crate) mod mock;
mod openai;
mod together;

pub use gateway::{
    Clock, LlmGateway, ProviderSlot, ProviderState, ProviderStatus, RetryPolicy, SystemClock,
};
pub use gemini::GeminiProvider;
pub use openai::OpenAIProvider;
pub use together::TogetherProvider;

use crate::config::{ProviderKind, ProviderSettings};
use crate::error::Result;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Typed failure of a single provider call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LlmError {
    /// Usage limit reached. The provider is disabled until its cooldown ends.
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Rate limited: {message}")]
    RateLimited {
        retry_after: Option<Duration>,
        message: String,
    },

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("API request failed: {0}")]
    Request(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl LlmError {
    pub fn is_quota(&self) -> bool {
        matches!(self, LlmError::QuotaExceeded(_))
    }

    pub fn is_rate_limit(&self) -> bool {
        matches!(self, LlmError::RateLimited { .. })
    }

    /// Classify a non-success HTTP response.
    ///
    /// A 429 is a quota error only when the body mentions a quota; providers use the same
    /// status for short-term throttling.
    pub fn from_status(status: StatusCode, body: &str, retry_after: Option<Duration>) -> Self {
        let message = format!("HTTP {}: {}", status.as_u16(), truncate(body, 300));
        match status {
            StatusCode::TOO_MANY_REQUESTS if mentions_quota(body) => {
                LlmError::QuotaExceeded(message)
            }
            StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited {
                retry_after,
                message,
            },
            StatusCode::UNAUTHORIZED => LlmError::NotConfigured(message),
            _ => LlmError::Request(message),
        }
    }

    /// Last-resort classification from free-form error text.
    ///
    /// Substring matching is fragile: it only runs for errors that carry no status or type.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        if lower.contains("quota") && (lower.contains("429") || lower.contains("exceeded")) {
            LlmError::QuotaExceeded(message)
        } else if lower.contains("rate limit") || lower.contains("429") {
            LlmError::RateLimited {
                retry_after: None,
                message,
            }
        } else {
            LlmError::Request(message)
        }
    }

    /// Map a transport error from reqwest. The request URL is dropped from the message.
    pub fn from_reqwest(error: reqwest::Error, timeout_secs: u64) -> Self {
        if error.is_timeout() {
            LlmError::Timeout(timeout_secs)
        } else {
            LlmError::Request(error.without_url().to_string())
        }
    }
}

fn mentions_quota(body: &str) -> bool {
    body.to_lowercase().contains("quota")
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Parse a `Retry-After` header given in seconds.
pub(crate) fn retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Build the shared HTTP client for a provider.
pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

/// A text generation backend.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short display name, e.g. "gemini".
    fn name(&self) -> &str;

    /// Model identifier used for requests.
    fn model(&self) -> &str;

    /// Whether credentials are present.
    fn is_configured(&self) -> bool {
        true
    }

    /// Generate text for a single prompt.
    async fn generate(&self, prompt: &str) -> std::result::Result<String, LlmError>;
}

/// Create a provider from its settings. A missing API key yields an unconfigured provider.
pub fn build_provider(settings: &ProviderSettings) -> Result<Arc<dyn LlmProvider>> {
    let provider: Arc<dyn LlmProvider> = match settings.kind {
        ProviderKind::Gemini => Arc::new(GeminiProvider::new(settings)?),
        ProviderKind::Together => Arc::new(TogetherProvider::new(settings)?),
        ProviderKind::OpenAI => Arc::new(OpenAIProvider::new(settings)?),
    };
    Ok(provider)
}
