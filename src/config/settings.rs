//! Configuration settings for Kapittel.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Upper bound for `llm.quota_reset_hours` (one year).
pub const MAX_QUOTA_RESET_HOURS: u64 = 24 * 365;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub youtube: YoutubeSettings,
    pub llm: LlmSettings,
    pub segmentation: SegmentationSettings,
    pub summary: SummarySettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Directory exported documents are written to when no explicit path is given.
    pub output_dir: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            output_dir: "~/kapittel".to_string(),
        }
    }
}

/// YouTube caption fetching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeSettings {
    /// Caption languages in order of preference. The first available track is used
    /// when none of these match.
    pub languages: Vec<String>,
    /// Timeout for each request to YouTube.
    pub request_timeout_secs: u64,
}

impl Default for YoutubeSettings {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string(), "en-US".to_string(), "en-GB".to_string()],
            request_timeout_secs: 10,
        }
    }
}

/// LLM provider backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Google Gemini (generateContent API).
    Gemini,
    /// Together.ai completions API.
    Together,
    /// Any OpenAI-compatible chat completions API.
    OpenAI,
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "together" | "mistral" => Ok(ProviderKind::Together),
            "openai" => Ok(ProviderKind::OpenAI),
            _ => Err(format!("Unknown LLM provider: {}", s)),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Gemini => write!(f, "gemini"),
            ProviderKind::Together => write!(f, "together"),
            ProviderKind::OpenAI => write!(f, "openai"),
        }
    }
}

/// Settings for a single LLM provider slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Provider backend.
    pub kind: ProviderKind,
    /// Model identifier.
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Attempts per call before giving up on this provider.
    pub max_retries: u32,
    /// Request timeout in seconds. A timed-out call counts as a transient error.
    pub timeout_secs: u64,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Override for the API base URL (OpenAI-compatible providers, proxies).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

impl ProviderSettings {
    /// Default primary provider: Gemini 1.5 Flash.
    pub fn gemini() -> Self {
        Self {
            kind: ProviderKind::Gemini,
            model: "gemini-1.5-flash".to_string(),
            api_key_env: "GOOGLE_API_KEY".to_string(),
            max_retries: 2,
            timeout_secs: 120,
            max_tokens: 2048,
            temperature: 0.7,
            api_base: None,
        }
    }

    /// Default fallback provider: Mistral 7B Instruct on Together.ai.
    pub fn together() -> Self {
        Self {
            kind: ProviderKind::Together,
            model: "mistralai/Mistral-7B-Instruct-v0.2".to_string(),
            api_key_env: "TOGETHER_API_KEY".to_string(),
            max_retries: 3,
            timeout_secs: 120,
            max_tokens: 2048,
            temperature: 0.7,
            api_base: None,
        }
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

/// LLM gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Hours a provider stays disabled after a quota error.
    pub quota_reset_hours: u64,
    /// Base delay between retries in milliseconds. Rate-limit retries double it per attempt.
    pub retry_delay_ms: u64,
    /// Provider tried first.
    pub primary: ProviderSettings,
    /// Provider tried when the primary yields no result.
    pub fallback: ProviderSettings,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            quota_reset_hours: 24,
            retry_delay_ms: 1000,
            primary: ProviderSettings::gemini(),
            fallback: ProviderSettings::together(),
        }
    }
}

/// Topic boundary detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationSettings {
    /// Adjacent sentences below this Jaccard similarity are boundary candidates.
    pub similarity_threshold: f64,
    /// Minimum pause in seconds before a candidate sentence.
    pub min_pause_seconds: f64,
    /// Below this many candidates, evenly spaced boundaries are added.
    pub min_candidates: usize,
    /// Number of sections the backfill aims for.
    pub target_sections: usize,
    /// Minimum distance in seconds between kept boundaries.
    pub min_spacing_seconds: f64,
    /// Maximum number of boundaries kept.
    pub max_boundaries: usize,
}

impl Default for SegmentationSettings {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.3,
            min_pause_seconds: 2.0,
            min_candidates: 8,
            target_sections: 10,
            min_spacing_seconds: 30.0,
            max_boundaries: 12,
        }
    }
}

/// Title and summary generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarySettings {
    /// Maximum characters of context sent when titling a section.
    pub title_context_chars: usize,
    /// Transcript entries before a section start included in its title context.
    pub title_context_before: usize,
    /// Transcript entries from a section start included in its title context.
    pub title_context_after: usize,
    /// Maximum transcript characters sent for the whole-video summary.
    pub transcript_chars: usize,
    /// Lines of the full summary that form the executive summary.
    pub executive_lines: usize,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            title_context_chars: 500,
            title_context_before: 2,
            title_context_after: 3,
            transcript_chars: 8000,
            executive_lines: 3,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            settings.validate()?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::KapittelError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::KapittelError;

        for (slot, provider) in [("primary", &self.llm.primary), ("fallback", &self.llm.fallback)] {
            if provider.max_retries == 0 {
                return Err(KapittelError::Config(format!(
                    "llm.{}.max_retries must be at least 1",
                    slot
                )));
            }
        }
        if self.llm.quota_reset_hours > MAX_QUOTA_RESET_HOURS {
            return Err(KapittelError::Config(format!(
                "llm.quota_reset_hours must be at most {}",
                MAX_QUOTA_RESET_HOURS
            )));
        }
        if self.segmentation.target_sections < 2 {
            return Err(KapittelError::Config(
                "segmentation.target_sections must be at least 2".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.segmentation.similarity_threshold) {
            return Err(KapittelError::Config(
                "segmentation.similarity_threshold must be between 0 and 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kapittel")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded output directory path.
    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.output_dir)
    }
}
