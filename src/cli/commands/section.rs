//! Section command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Print a detailed summary of one section.
pub async fn run_section(url: &str, section_id: usize, settings: Settings) -> Result<()> {
    preflight::check(Operation::Summarize, &settings)?;
    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner(&format!("Summarizing section {}...", section_id));
    let result = orchestrator.summarize_section(url, section_id).await;
    spinner.finish_and_clear();

    let (section, summary) = result?;

    match section {
        Some(ts) => {
            Output::header(&format!("{} {}", ts.time, ts.title));
            println!("\n{}", summary);
        }
        None => {
            Output::error(&summary);
            Output::info("Use 'kapittel timestamps <url>' to list section numbers.");
        }
    }

    Ok(())
}
