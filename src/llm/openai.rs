//! OpenAI-compatible chat completions provider.

use super::{LlmError, LlmProvider};
use crate::config::ProviderSettings;
use crate::error::Result;
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

pub struct OpenAIProvider {
    client: Client<OpenAIConfig>,
    configured: bool,
    api_key_env: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    timeout_secs: u64,
}

/// Create an async-openai client with a request timeout and optional base URL.
fn create_client(
    api_key: Option<&str>,
    api_base: Option<&str>,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder().timeout(timeout).build()?;

    let mut config = OpenAIConfig::default();
    if let Some(key) = api_key {
        config = config.with_api_key(key);
    }
    if let Some(base) = api_base {
        config = config.with_api_base(base);
    }

    Ok(Client::with_config(config).with_http_client(http_client))
}

/// Map client errors onto gateway categories, preferring the API error type over text.
fn classify(error: OpenAIError, timeout_secs: u64) -> LlmError {
    match error {
        OpenAIError::ApiError(api) => {
            let kind = api.r#type.as_deref().unwrap_or_default();
            if kind == "insufficient_quota" {
                LlmError::QuotaExceeded(api.message)
            } else if kind == "rate_limit_exceeded" || kind == "requests" || kind == "tokens" {
                LlmError::RateLimited {
                    retry_after: None,
                    message: api.message,
                }
            } else if kind == "invalid_api_key" || kind == "authentication_error" {
                LlmError::NotConfigured(api.message)
            } else {
                LlmError::from_message(api.message)
            }
        }
        OpenAIError::Reqwest(e) => LlmError::from_reqwest(e, timeout_secs),
        OpenAIError::JSONDeserialize(e) => LlmError::InvalidResponse(e.to_string()),
        other => LlmError::from_message(other.to_string()),
    }
}

impl OpenAIProvider {
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        let api_key = settings.api_key();
        Ok(Self {
            client: create_client(
                api_key.as_deref(),
                settings.api_base.as_deref(),
                Duration::from_secs(settings.timeout_secs),
            )?,
            configured: api_key.is_some(),
            api_key_env: settings.api_key_env.clone(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout_secs: settings.timeout_secs,
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn generate(&self, prompt: &str) -> std::result::Result<String, LlmError> {
        if !self.configured {
            return Err(LlmError::NotConfigured(format!(
                "{} is not set",
                self.api_key_env
            )));
        }

        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| LlmError::Request(e.to_string()))?;
        let messages: Vec<ChatCompletionRequestMessage> = vec![message.into()];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| LlmError::Request(e.to_string()))?;

        debug!("OpenAI request to {} ({} chars)", self.model, prompt.len());

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| classify(e, self.timeout_secs))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| LlmError::InvalidResponse("Empty response from LLM".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_openai::error::ApiError;

    fn api_error(kind: &str, message: &str) -> OpenAIError {
        OpenAIError::ApiError(ApiError {
            message: message.to_string(),
            r#type: Some(kind.to_string()),
            param: None,
            code: None,
        })
    }

    #[test]
    fn test_insufficient_quota_is_quota() {
        let error = classify(api_error("insufficient_quota", "You exceeded your quota"), 30);
        assert!(error.is_quota());
    }

    #[test]
    fn test_rate_limit_type() {
        let error = classify(api_error("requests", "Rate limit reached for requests"), 30);
        assert!(error.is_rate_limit());
    }

    #[test]
    fn test_unknown_type_is_generic() {
        let error = classify(api_error("server_error", "The server had an error"), 30);
        assert!(matches!(error, LlmError::Request(_)));
    }

    #[test]
    fn test_invalid_argument() {
        let error = classify(OpenAIError::InvalidArgument("bad".to_string()), 30);
        assert!(matches!(error, LlmError::Request(_)));
    }
}
