//! Pipeline orchestrator for Kapittel.
//!
//! Coordinates the whole run: caption fetch, boundary detection, section titles and the
//! video summary. Every failure is turned into a structured result.

use crate::config::{Prompts, Settings};
use crate::error::{KapittelError, Result};
use crate::llm::LlmGateway;
use crate::summarizer::{Summarizer, Timestamp};
use crate::transcript::{
    extract_video_id, CaptionSource, ErrorCode, FetchError, FetchedTranscript, YoutubeCaptions,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Result of processing one video.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProcessOutcome {
    Success(VideoSummary),
    Failure(FailureReport),
}

impl ProcessOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessOutcome::Success(_))
    }
}

/// Everything the presentation layer needs. All fields are always filled, with
/// placeholder text where generation failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSummary {
    pub success: bool,
    pub video_id: String,
    pub url: String,
    pub title: String,
    pub channel: String,
    pub duration: String,
    pub upload_date: String,
    pub timestamps: Vec<Timestamp>,
    pub executive_summary: String,
    pub full_summary: String,
    /// Wall-clock seconds for the whole run.
    pub processing_time: f64,
    /// Wall-clock seconds spent fetching captions.
    pub subtitle_extraction_time: f64,
    pub transcript_entries: usize,
}

/// Structured failure with hints for the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureReport {
    pub success: bool,
    pub error_code: ErrorCode,
    pub error_message: String,
    pub suggestions: Vec<String>,
}

impl FailureReport {
    pub fn from_fetch_error(error: &FetchError) -> Self {
        Self {
            success: false,
            error_code: error.code(),
            error_message: error.to_string(),
            suggestions: error.suggestions(),
        }
    }

    /// Catch-all for errors that are not about transcript availability.
    pub fn processing_error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_code: ErrorCode::ProcessingError,
            error_message: message.into(),
            suggestions: vec!["Check video URL and try again".to_string()],
        }
    }
}

impl From<&KapittelError> for FailureReport {
    fn from(error: &KapittelError) -> Self {
        match error {
            KapittelError::Fetch(e) => Self::from_fetch_error(e),
            other => Self::processing_error(other.to_string()),
        }
    }
}

fn round_secs(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}

/// The main orchestrator for the Kapittel pipeline.
pub struct Orchestrator {
    settings: Settings,
    captions: Arc<dyn CaptionSource>,
    summarizer: Summarizer,
}

impl Orchestrator {
    /// Create an orchestrator with the YouTube caption source and configured providers.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        let captions = Arc::new(YoutubeCaptions::with_settings(&settings.youtube)?);
        let gateway = Arc::new(LlmGateway::from_settings(&settings.llm)?);

        if !gateway.has_configured_provider() {
            warn!("No LLM provider has an API key; titles and summaries will be placeholders");
        }

        Ok(Self::with_components(settings, prompts, captions, gateway))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        captions: Arc<dyn CaptionSource>,
        gateway: Arc<LlmGateway>,
    ) -> Self {
        let summarizer = Summarizer::new(
            gateway,
            prompts,
            settings.summary.clone(),
            settings.segmentation.clone(),
        );
        Self {
            settings,
            captions,
            summarizer,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn gateway(&self) -> &Arc<LlmGateway> {
        self.summarizer.gateway()
    }

    pub fn summarizer(&self) -> &Summarizer {
        &self.summarizer
    }

    /// Resolve a URL or id and fetch its captions.
    #[instrument(skip(self))]
    pub async fn fetch(&self, input: &str) -> std::result::Result<FetchedTranscript, FetchError> {
        let video_id =
            extract_video_id(input).ok_or_else(|| FetchError::InvalidUrl(input.to_string()))?;
        info!("Fetching captions for {}", video_id);

        let fetched = self.captions.fetch(&video_id).await?;
        if fetched.transcript.is_empty() {
            return Err(FetchError::NoTranscripts);
        }

        info!(
            "Fetched {} caption entries for \"{}\"",
            fetched.transcript.len(),
            fetched.video.title
        );
        Ok(fetched)
    }

    /// Fetch captions and produce titled sections.
    pub async fn timestamps(&self, input: &str) -> Result<(FetchedTranscript, Vec<Timestamp>)> {
        let fetched = self.fetch(input).await?;
        let timestamps = self.summarizer.generate_timestamps(&fetched.transcript).await;
        Ok((fetched, timestamps))
    }

    /// Summary of one section, addressed by its 1-based id.
    pub async fn summarize_section(
        &self,
        input: &str,
        section_id: usize,
    ) -> Result<(Option<Timestamp>, String)> {
        let (fetched, timestamps) = self.timestamps(input).await?;
        let summary = self
            .summarizer
            .summarize_section(&fetched.transcript, &timestamps, section_id)
            .await;
        let section = timestamps.into_iter().find(|t| t.section_id == section_id);
        Ok((section, summary))
    }

    /// Run the full pipeline. Never returns an error; failures become [`FailureReport`]s.
    #[instrument(skip(self))]
    pub async fn process_video(&self, input: &str) -> ProcessOutcome {
        match self.run(input).await {
            Ok(summary) => {
                info!(
                    "Processed {} in {:.2}s ({} sections)",
                    summary.video_id,
                    summary.processing_time,
                    summary.timestamps.len()
                );
                ProcessOutcome::Success(summary)
            }
            Err(e) => {
                warn!("Processing failed: {}", e);
                ProcessOutcome::Failure(FailureReport::from(&e))
            }
        }
    }

    async fn run(&self, input: &str) -> Result<VideoSummary> {
        let started = Instant::now();

        let fetched = self.fetch(input).await?;
        let subtitle_extraction_time = started.elapsed().as_secs_f64();

        let timestamps = self.summarizer.generate_timestamps(&fetched.transcript).await;
        let full_summary = self
            .summarizer
            .full_summary(&fetched.video, &fetched.transcript, &timestamps)
            .await;
        let executive_summary = self.summarizer.executive_summary(&full_summary);

        let FetchedTranscript { video, transcript } = fetched;
        Ok(VideoSummary {
            success: true,
            url: video.watch_url(),
            video_id: video.video_id,
            title: video.title,
            channel: video.channel,
            duration: video.duration,
            upload_date: video.upload_date,
            timestamps,
            executive_summary,
            full_summary,
            processing_time: round_secs(started.elapsed().as_secs_f64()),
            subtitle_extraction_time: round_secs(subtitle_extraction_time),
            transcript_entries: transcript.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::{failing_gateway, gateway_with};
    use crate::summarizer::SUMMARY_FAILED;
    use crate::transcript::{Transcript, TranscriptEntry, VideoInfo};
    use async_trait::async_trait;

    struct StubCaptions {
        result: std::result::Result<Vec<TranscriptEntry>, FetchError>,
    }

    #[async_trait]
    impl CaptionSource for StubCaptions {
        async fn fetch(
            &self,
            video_id: &str,
        ) -> std::result::Result<FetchedTranscript, FetchError> {
            let entries = self.result.clone()?;
            let mut video = VideoInfo::unknown(video_id);
            video.title = "Rust in Ten Minutes".to_string();
            let transcript = Transcript::new(video_id.to_string(), entries);
            Ok(FetchedTranscript { video, transcript })
        }
    }

    fn orchestrator(
        result: std::result::Result<Vec<TranscriptEntry>, FetchError>,
        gateway: Arc<LlmGateway>,
    ) -> Orchestrator {
        Orchestrator::with_components(
            Settings::default(),
            Prompts::default(),
            Arc::new(StubCaptions { result }),
            gateway,
        )
    }

    fn entries() -> Vec<TranscriptEntry> {
        (0..30)
            .map(|i| {
                let text = format!("Talking about closures part {}.", i);
                TranscriptEntry::new(text, i as f64 * 20.0, 20.0)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_process_video_success() {
        let gateway = gateway_with(|prompt| {
            if prompt.contains("section title") {
                Ok("Closures Explained".to_string())
            } else {
                Ok("# Overview\nClosures capture their environment.\n- Point one".to_string())
            }
        });
        let outcome = orchestrator(Ok(entries()), gateway)
            .process_video("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
            .await;

        let ProcessOutcome::Success(summary) = outcome else {
            panic!("expected success");
        };
        assert!(summary.success);
        assert_eq!(summary.video_id, "dQw4w9WgXcQ");
        assert_eq!(summary.title, "Rust in Ten Minutes");
        assert_eq!(summary.transcript_entries, 30);
        assert!(!summary.timestamps.is_empty());
        assert!(summary.timestamps.iter().all(|t| t.title == "Closures Explained"));
        assert_eq!(
            summary.executive_summary,
            "Closures capture their environment. - Point one"
        );
        assert!(summary.processing_time >= summary.subtitle_extraction_time);
    }

    #[tokio::test]
    async fn test_invalid_url_is_reported() {
        let outcome = orchestrator(Ok(entries()), failing_gateway())
            .process_video("https://example.com/not-youtube")
            .await;

        let ProcessOutcome::Failure(failure) = outcome else {
            panic!("expected failure");
        };
        assert!(!failure.success);
        assert_eq!(failure.error_code, ErrorCode::InvalidUrl);
        assert!(!failure.suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_errors_keep_their_code() {
        let outcome = orchestrator(Err(FetchError::TranscriptsDisabled), failing_gateway())
            .process_video("dQw4w9WgXcQ")
            .await;

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error_code"], "TRANSCRIPTS_DISABLED");
    }

    #[tokio::test]
    async fn test_empty_transcript_is_no_transcripts() {
        let outcome = orchestrator(Ok(Vec::new()), failing_gateway())
            .process_video("dQw4w9WgXcQ")
            .await;
        let ProcessOutcome::Failure(failure) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(failure.error_code, ErrorCode::NoTranscripts);
    }

    #[tokio::test]
    async fn test_llm_outage_still_succeeds_with_placeholders() {
        let outcome = orchestrator(Ok(entries()), failing_gateway())
            .process_video("https://youtu.be/dQw4w9WgXcQ")
            .await;

        let ProcessOutcome::Success(summary) = outcome else {
            panic!("expected success");
        };
        assert_eq!(summary.full_summary, SUMMARY_FAILED);
        assert_eq!(summary.timestamps[0].title, "Section 1");
        assert!(!summary.executive_summary.is_empty());
    }

    #[tokio::test]
    async fn test_summarize_section() {
        let gateway = gateway_with(|_| Ok("Focused".to_string()));
        let orchestrator = orchestrator(Ok(entries()), gateway);

        let (section, summary) = orchestrator.summarize_section("dQw4w9WgXcQ", 1).await.unwrap();
        assert_eq!(section.map(|s| s.start_index), Some(0));
        assert_eq!(summary, "Focused");

        let (section, summary) = orchestrator.summarize_section("dQw4w9WgXcQ", 99).await.unwrap();
        assert!(section.is_none());
        assert_eq!(summary, "Section not found");
    }

    #[test]
    fn test_processing_error_shape() {
        let failure = FailureReport::from(&KapittelError::Config("boom".to_string()));
        assert_eq!(failure.error_code, ErrorCode::ProcessingError);
        assert_eq!(failure.suggestions, vec!["Check video URL and try again"]);
    }
}
