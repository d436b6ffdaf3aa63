//! Timestamps command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Print the titled chapter list of a video.
pub async fn run_timestamps(url: &str, settings: Settings) -> Result<()> {
    preflight::check(Operation::Summarize, &settings)?;
    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Detecting sections...");
    let result = orchestrator.timestamps(url).await;
    spinner.finish_and_clear();

    let (fetched, timestamps) = result?;

    Output::header(&fetched.video.title);
    Output::kv("Channel", &fetched.video.channel);
    Output::kv("Duration", &fetched.video.duration);
    println!();
    for ts in &timestamps {
        Output::timestamp(ts);
    }

    Ok(())
}
