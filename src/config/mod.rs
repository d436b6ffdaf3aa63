//! Configuration module for Kapittel.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, SummaryPrompts, TitlePrompts};
pub use settings::{
    GeneralSettings, LlmSettings, PromptSettings, ProviderKind, ProviderSettings,
    SegmentationSettings, Settings, SummarySettings, YoutubeSettings,
};
