//! Section titles and video summaries.
//!
//! Uses the boundary detector to split a transcript into sections, then asks the LLM gateway
//! for one title per section and a single structured summary of the whole video. Gateway
//! failures degrade to placeholder text instead of errors.

mod postprocess;

pub use postprocess::{
    executive_summary, fallback_title, sanitize_title, truncate_chars, NO_SUMMARY,
};

use crate::config::{Prompts, SegmentationSettings, SummarySettings};
use crate::llm::LlmGateway;
use crate::segmentation::{segment, seconds_to_timestamp, BoundaryDetector, SectionRange};
use crate::transcript::{Transcript, VideoInfo};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Returned in place of the full summary when every provider failed.
pub const SUMMARY_FAILED: &str = "Summary generation failed: All LLM providers unavailable";

/// Returned by [`Summarizer::summarize_section`] for an unknown section id.
pub const SECTION_NOT_FOUND: &str = "Section not found";

/// A titled section of the video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timestamp {
    /// Start time formatted as `M:SS`.
    pub time: String,
    pub title: String,
    /// 1-based.
    pub section_id: usize,
    pub start_index: usize,
    /// Exclusive.
    pub end_index: usize,
    pub start_seconds: f64,
}

pub struct Summarizer {
    gateway: Arc<LlmGateway>,
    prompts: Prompts,
    settings: SummarySettings,
    detector: BoundaryDetector,
}

impl Summarizer {
    pub fn new(
        gateway: Arc<LlmGateway>,
        prompts: Prompts,
        settings: SummarySettings,
        segmentation: SegmentationSettings,
    ) -> Self {
        Self {
            gateway,
            prompts,
            settings,
            detector: BoundaryDetector::new(segmentation),
        }
    }

    pub fn gateway(&self) -> &Arc<LlmGateway> {
        &self.gateway
    }

    /// Segment the transcript and title every section, one gateway call at a time.
    #[instrument(skip_all, fields(video_id = %transcript.video_id))]
    pub async fn generate_timestamps(&self, transcript: &Transcript) -> Vec<Timestamp> {
        let sections = segment(&self.detector, &transcript.entries);
        info!("Titling {} sections", sections.len());

        let mut timestamps = Vec::with_capacity(sections.len());
        for section in &sections {
            let title = self.section_title(transcript, section).await;
            debug!("Section {}: {}", section.section_id, title);
            timestamps.push(Timestamp {
                time: seconds_to_timestamp(section.start_time),
                title,
                section_id: section.section_id,
                start_index: section.start_index,
                end_index: section.end_index,
                start_seconds: section.start_time,
            });
        }
        timestamps
    }

    /// Title for one section, from a short window of entries around its start.
    pub async fn section_title(&self, transcript: &Transcript, section: &SectionRange) -> String {
        let context = self.title_context(transcript, section.start_index);
        let mut vars = HashMap::new();
        vars.insert("content".to_string(), context);
        let prompt = self.prompts.render_with_custom(&self.prompts.titles.section, &vars);

        match self.gateway.generate(&prompt).await {
            Ok(reply) => sanitize_title(&reply, section.section_id),
            Err(e) => {
                warn!("Title generation failed for section {}: {}", section.section_id, e);
                fallback_title(section.section_id)
            }
        }
    }

    fn title_context(&self, transcript: &Transcript, start_index: usize) -> String {
        let from = start_index.saturating_sub(self.settings.title_context_before);
        let to = start_index.saturating_add(self.settings.title_context_after);
        let text = transcript.text_in_range(from, to);
        truncate_chars(&text, self.settings.title_context_chars).to_string()
    }

    /// Structured summary of the whole video. Never fails; returns [`SUMMARY_FAILED`]
    /// when no provider produced text.
    #[instrument(skip_all, fields(video_id = %video.video_id))]
    pub async fn full_summary(
        &self,
        video: &VideoInfo,
        transcript: &Transcript,
        timestamps: &[Timestamp],
    ) -> String {
        let sections = timestamps
            .iter()
            .map(|t| format!("{} - {}", t.time, t.title))
            .collect::<Vec<_>>()
            .join("\n");
        let text = transcript.formatted_text();

        let mut vars = HashMap::new();
        vars.insert("title".to_string(), video.title.clone());
        vars.insert("channel".to_string(), video.channel.clone());
        vars.insert("duration".to_string(), video.duration.clone());
        vars.insert("sections".to_string(), sections);
        vars.insert(
            "transcript".to_string(),
            truncate_chars(&text, self.settings.transcript_chars).to_string(),
        );
        let prompt = self.prompts.render_with_custom(&self.prompts.summary.video, &vars);

        match self.gateway.generate(&prompt).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Full summary failed: {}", e);
                SUMMARY_FAILED.to_string()
            }
        }
    }

    /// Executive summary derived from a full summary.
    pub fn executive_summary(&self, full_summary: &str) -> String {
        executive_summary(full_summary, self.settings.executive_lines)
    }

    /// Detailed summary of a single section.
    pub async fn summarize_section(
        &self,
        transcript: &Transcript,
        timestamps: &[Timestamp],
        section_id: usize,
    ) -> String {
        let Some(section) = timestamps.iter().find(|t| t.section_id == section_id) else {
            return SECTION_NOT_FOUND.to_string();
        };

        let mut vars = HashMap::new();
        vars.insert("section_title".to_string(), section.title.clone());
        vars.insert(
            "section_text".to_string(),
            transcript.text_in_range(section.start_index, section.end_index),
        );
        let prompt = self.prompts.render_with_custom(&self.prompts.summary.section, &vars);

        match self.gateway.generate(&prompt).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Section {} summary failed: {}", section_id, e);
                format!("Summary failed for section {}", section_id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::{failing_gateway, gateway_with};
    use crate::transcript::TranscriptEntry;
    use std::sync::Mutex;

    fn summarizer(gateway: Arc<LlmGateway>) -> Summarizer {
        Summarizer::new(
            gateway,
            Prompts::default(),
            SummarySettings::default(),
            SegmentationSettings::default(),
        )
    }

    fn long_transcript() -> Transcript {
        let entries = (0..40)
            .map(|i| {
                TranscriptEntry::new(
                    format!("Lesson part {} covers ownership rules.", i),
                    i as f64 * 15.0,
                    15.0,
                )
            })
            .collect();
        Transcript::new("abc123def45".to_string(), entries)
    }

    #[tokio::test]
    async fn test_timestamps_partition_and_titles() {
        let gateway = gateway_with(|_| Ok("\"Ownership Rules!\"".to_string()));
        let transcript = long_transcript();
        let timestamps = summarizer(gateway).generate_timestamps(&transcript).await;

        assert!(!timestamps.is_empty());
        assert_eq!(timestamps[0].time, "0:00");
        assert_eq!(timestamps[0].start_index, 0);
        assert_eq!(timestamps.last().map(|t| t.end_index), Some(transcript.len()));
        for pair in timestamps.windows(2) {
            assert_eq!(pair[0].end_index, pair[1].start_index);
        }
        assert!(timestamps.iter().all(|t| t.title == "Ownership Rules"));
    }

    #[tokio::test]
    async fn test_titles_fall_back_when_gateway_fails() {
        let transcript = long_transcript();
        let timestamps = summarizer(failing_gateway()).generate_timestamps(&transcript).await;

        for t in &timestamps {
            assert_eq!(t.title, format!("Section {}", t.section_id));
        }
    }

    #[tokio::test]
    async fn test_title_context_is_bounded() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let captured = seen.clone();
        let gateway = gateway_with(move |prompt| {
            captured.lock().unwrap().push(prompt.to_string());
            Ok("Title".to_string())
        });

        let entries = (0..10)
            .map(|i| TranscriptEntry::new(format!("entry{} {}", i, "x".repeat(200)), i as f64, 1.0))
            .collect();
        let transcript = Transcript::new("id".to_string(), entries);
        let section = SectionRange {
            section_id: 2,
            start_index: 5,
            end_index: 10,
            start_time: 5.0,
        };

        summarizer(gateway).section_title(&transcript, &section).await;

        let prompts = seen.lock().unwrap();
        let prompt = &prompts[0];
        assert!(prompt.contains("entry3"));
        assert!(!prompt.contains("entry2"));
        let content = prompt.split("\"\"\"").nth(1).unwrap();
        assert_eq!(content.chars().count(), 500);
    }

    #[tokio::test]
    async fn test_full_summary_failure_string() {
        let transcript = long_transcript();
        let video = VideoInfo::unknown("abc123def45");
        let summary = summarizer(failing_gateway())
            .full_summary(&video, &transcript, &[])
            .await;
        assert_eq!(summary, SUMMARY_FAILED);
    }

    #[tokio::test]
    async fn test_full_summary_prompt_includes_sections_and_truncated_transcript() {
        let seen = Arc::new(Mutex::new(String::new()));
        let captured = seen.clone();
        let gateway = gateway_with(move |prompt| {
            *captured.lock().unwrap() = prompt.to_string();
            Ok("# Summary\nGreat video.".to_string())
        });

        let transcript = Transcript::new(
            "id".to_string(),
            vec![TranscriptEntry::new("y".repeat(9000), 0.0, 5.0)],
        );
        let timestamps = vec![Timestamp {
            time: "0:00".to_string(),
            title: "Intro".to_string(),
            section_id: 1,
            start_index: 0,
            end_index: 1,
            start_seconds: 0.0,
        }];
        let s = summarizer(gateway);
        let summary = s
            .full_summary(&VideoInfo::unknown("id"), &transcript, &timestamps)
            .await;

        assert_eq!(s.executive_summary(&summary), "Great video.");
        let prompt = seen.lock().unwrap();
        assert!(prompt.contains("0:00 - Intro"));
        assert!(prompt.contains(&"y".repeat(8000)));
        assert!(!prompt.contains(&"y".repeat(8001)));
    }

    #[tokio::test]
    async fn test_summarize_section_outcomes() {
        let transcript = long_transcript();
        let timestamps = vec![Timestamp {
            time: "0:00".to_string(),
            title: "Basics".to_string(),
            section_id: 1,
            start_index: 0,
            end_index: 3,
            start_seconds: 0.0,
        }];

        let ok = summarizer(gateway_with(|_| Ok("- point".to_string())));
        assert_eq!(ok.summarize_section(&transcript, &timestamps, 1).await, "- point");
        assert_eq!(
            ok.summarize_section(&transcript, &timestamps, 9).await,
            SECTION_NOT_FOUND
        );

        let failing = summarizer(failing_gateway());
        assert_eq!(
            failing.summarize_section(&transcript, &timestamps, 1).await,
            "Summary failed for section 1"
        );
    }
}
