//! Summarize command implementation.

use super::write_output;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::export::{self, ExportFormat};
use crate::orchestrator::{Orchestrator, ProcessOutcome};
use anyhow::Result;

/// Run the full pipeline and export the result.
pub async fn run_summarize(
    url: &str,
    output: Option<String>,
    format: &str,
    save: bool,
    settings: Settings,
) -> Result<()> {
    let export_format: ExportFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    preflight::check(Operation::Summarize, &settings)?;

    let output_dir = settings.output_dir();
    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Fetching captions and generating summary...");
    let outcome = orchestrator.process_video(url).await;
    spinner.finish_and_clear();

    let summary = match outcome {
        ProcessOutcome::Success(summary) => summary,
        ProcessOutcome::Failure(failure) => {
            Output::error(&format!("{} ({})", failure.error_message, failure.error_code));
            for suggestion in &failure.suggestions {
                Output::list_item(suggestion);
            }
            anyhow::bail!("Processing failed: {}", failure.error_code);
        }
    };

    let rendered = export::render(&summary, export_format)?;
    let target = if save {
        std::fs::create_dir_all(&output_dir)?;
        let file = output_dir.join(format!("{}.{}", summary.video_id, export_format.extension()));
        Some(file.to_string_lossy().into_owned())
    } else {
        output
    };
    let written = write_output(target.as_deref(), &rendered)?;

    if let Some(path) = written {
        Output::success(&format!(
            "Summarized '{}' ({} sections, {:.2}s) to {}",
            summary.title,
            summary.timestamps.len(),
            summary.processing_time,
            path.display()
        ));
    }

    Ok(())
}
