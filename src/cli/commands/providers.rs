//! Providers command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::llm::LlmGateway;
use anyhow::Result;
use console::style;

const PROBE_PROMPT: &str = "Reply with the single word: ready";

/// Show provider configuration and quota state, optionally probing each provider.
pub async fn run_providers(probe: bool, settings: Settings) -> Result<()> {
    let gateway = LlmGateway::from_settings(&settings.llm)?;

    Output::header("LLM Providers");
    for (slot, status) in ["primary", "fallback"].iter().zip(gateway.status()) {
        let state = if !status.configured {
            style("no API key").red()
        } else if status.quota_exceeded {
            style("cooling down").yellow()
        } else {
            style("available").green()
        };
        println!(
            "  {} {} ({}) - {}",
            style(slot).dim(),
            style(&status.name).bold(),
            status.model,
            state
        );
        if let Some(at) = status.last_error_time {
            Output::kv("last quota error", &at.to_rfc3339());
        }
    }

    if !probe {
        return Ok(());
    }

    Output::header("Probe");
    for (name, result) in gateway.probe(PROBE_PROMPT).await {
        match result {
            Ok(reply) => Output::success(&format!("{}: {}", name, reply.trim())),
            Err(e) => Output::error(&format!("{}: {}", name, e)),
        }
    }

    match gateway.generate(PROBE_PROMPT).await {
        Ok(_) => Output::success("Fallback chain produced a response."),
        Err(e) => Output::error(&format!("Fallback chain: {}", e)),
    }

    Ok(())
}
