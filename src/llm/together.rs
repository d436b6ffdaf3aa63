//! Together.ai completions provider, used for instruction-tuned open models.

use super::{http_client, retry_after, LlmError, LlmProvider};
use crate::config::ProviderSettings;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

const DEFAULT_API_BASE: &str = "https://api.together.xyz/v1";

const TOP_P: f32 = 0.9;
const TOP_K: u32 = 50;
const REPETITION_PENALTY: f32 = 1.1;

pub struct TogetherProvider {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    api_key_env: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    timeout_secs: u64,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: String,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    top_k: u32,
    repetition_penalty: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    text: String,
}

/// Wrap a prompt in the Mistral instruction format.
fn instruction_prompt(prompt: &str) -> String {
    format!("<s>[INST] {} [/INST]", prompt)
}

impl TogetherProvider {
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        Ok(Self {
            client: http_client(settings.timeout_secs)?,
            api_base: settings
                .api_base
                .clone()
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            api_key: settings.api_key(),
            api_key_env: settings.api_key_env.clone(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout_secs: settings.timeout_secs,
        })
    }
}

#[async_trait]
impl LlmProvider for TogetherProvider {
    fn name(&self) -> &str {
        "together"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, prompt: &str) -> std::result::Result<String, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| LlmError::NotConfigured(format!("{} is not set", self.api_key_env)))?;

        let request = CompletionRequest {
            model: &self.model,
            prompt: instruction_prompt(prompt),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: TOP_P,
            top_k: TOP_K,
            repetition_penalty: REPETITION_PENALTY,
        };

        debug!("Together request to {} ({} chars)", self.model, prompt.len());

        let response = self
            .client
            .post(format!("{}/completions", self.api_base.trim_end_matches('/')))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::from_reqwest(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let wait = retry_after(response.headers());
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::from_status(status, &body, wait));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| LlmError::InvalidResponse("Empty response from Together".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_prompt() {
        assert_eq!(
            instruction_prompt("Title this"),
            "<s>[INST] Title this [/INST]"
        );
    }

    #[test]
    fn test_request_carries_sampling_params() {
        let request = CompletionRequest {
            model: "m",
            prompt: instruction_prompt("x"),
            max_tokens: 2048,
            temperature: 0.7,
            top_p: TOP_P,
            top_k: TOP_K,
            repetition_penalty: REPETITION_PENALTY,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["top_k"], 50);
        assert_eq!(value["max_tokens"], 2048);
        assert_eq!(value["prompt"], "<s>[INST] x [/INST]");
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{"id":"x","choices":[{"text":"  Ownership Basics \n","index":0}]}"#;
        let parsed: CompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.choices[0].text.trim(), "Ownership Basics");
    }
}
