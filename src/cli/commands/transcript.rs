//! Transcript command implementation.

use super::write_output;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::FailureReport;
use crate::transcript::{extract_video_id, CaptionSource, FetchError, YoutubeCaptions};
use anyhow::Result;

/// Fetch captions and write them as JSON.
pub async fn run_transcript(url: &str, output: Option<String>, settings: Settings) -> Result<()> {
    preflight::check(Operation::FetchCaptions, &settings)?;

    let captions = YoutubeCaptions::with_settings(&settings.youtube)?;

    let spinner = Output::spinner("Fetching captions...");
    let result = match extract_video_id(url) {
        Some(video_id) => captions.fetch(&video_id).await,
        None => Err(FetchError::InvalidUrl(url.to_string())),
    };
    spinner.finish_and_clear();

    let fetched = match result {
        Ok(fetched) => fetched,
        Err(e) => {
            let failure = FailureReport::from_fetch_error(&e);
            Output::error(&format!("{} ({})", failure.error_message, failure.error_code));
            for suggestion in &failure.suggestions {
                Output::list_item(suggestion);
            }
            anyhow::bail!("Caption fetch failed: {}", failure.error_code);
        }
    };

    let json = serde_json::to_string_pretty(&fetched)?;
    if let Some(path) = write_output(output.as_deref(), &json)? {
        Output::success(&format!(
            "Exported {} caption entries for '{}' to {}",
            fetched.transcript.len(),
            fetched.video.title,
            path.display()
        ));
    }

    Ok(())
}
