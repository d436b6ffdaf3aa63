//! Pre-flight checks before expensive operations.
//!
//! Validates that required configuration is available before starting operations that
//! would otherwise run to the end and only produce placeholders.

use crate::config::Settings;
use crate::error::{KapittelError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Titles and summaries need at least one provider key.
    Summarize,
    /// Caption fetching needs nothing.
    FetchCaptions,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Summarize => check_any_api_key(settings),
        Operation::FetchCaptions => Ok(()),
    }
}

fn check_any_api_key(settings: &Settings) -> Result<()> {
    let providers = [&settings.llm.primary, &settings.llm.fallback];
    if providers.iter().any(|p| p.api_key().is_some()) {
        return Ok(());
    }

    let names: Vec<&str> = providers.iter().map(|p| p.api_key_env.as_str()).collect();
    Err(KapittelError::Config(format!(
        "No LLM API key found. Set one of: {}",
        names.join(", ")
    )))
}
