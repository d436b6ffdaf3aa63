//! Google Gemini provider (generateContent REST API).

use super::{http_client, retry_after, LlmError, LlmProvider};
use crate::config::ProviderSettings;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiProvider {
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
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiProvider {
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

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }
}

/// Concatenated text parts of the first candidate.
fn extract_text(response: GenerateResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    Some(text)
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
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

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_tokens,
            },
        };

        debug!("Gemini request to {} ({} chars)", self.model, prompt.len());

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key)
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

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        extract_text(parsed)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| LlmError::InvalidResponse("Empty response from Gemini".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_joins_parts() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"Hello "},{"text":"world"}],"role":"model"}}]}"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(extract_text(response).as_deref(), Some("Hello world"));
    }

    #[test]
    fn test_extract_text_blocked_prompt() {
        let json = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(extract_text(response), None);
    }

    #[test]
    fn test_request_shape() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: "hi" }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.5,
                max_output_tokens: 64,
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 64);
    }

    #[tokio::test]
    async fn test_transport_error_does_not_leak_key() {
        let settings = ProviderSettings {
            api_base: Some("http://127.0.0.1:1/v1beta".to_string()),
            timeout_secs: 5,
            ..ProviderSettings::gemini()
        };
        let mut provider = GeminiProvider::new(&settings).unwrap();
        provider.api_key = Some("SECRET-KEY-123".to_string());

        let err = tokio_test::assert_err!(provider.generate("hi").await);
        assert!(!err.to_string().contains("SECRET-KEY-123"), "{}", err);
        assert!(!err.to_string().contains("127.0.0.1"), "{}", err);
    }

    #[test]
    fn test_endpoint_uses_model() {
        let settings = ProviderSettings {
            api_base: Some("http://localhost:9999/v1beta/".to_string()),
            ..ProviderSettings::gemini()
        };
        let provider = GeminiProvider::new(&settings).unwrap();
        assert_eq!(
            provider.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }
}
