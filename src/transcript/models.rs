//! Data models for fetched transcripts.

use serde::{Deserialize, Serialize};

/// A single caption entry as delivered by the captions source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Caption text.
    pub text: String,
    /// Start time in seconds.
    pub start_time: f64,
    /// Duration in seconds.
    pub duration: f64,
}

impl TranscriptEntry {
    /// Create a new transcript entry.
    pub fn new(text: impl Into<String>, start_time: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start_time,
            duration,
        }
    }

    /// End time in seconds.
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }
}

/// An ordered caption track for one video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Video ID this transcript belongs to.
    pub video_id: String,
    /// Entries ordered by start time.
    pub entries: Vec<TranscriptEntry>,
}

impl Transcript {
    /// Create a transcript, ordering entries by start time.
    pub fn new(video_id: String, mut entries: Vec<TranscriptEntry>) -> Self {
        entries.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        Self { video_id, entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total duration: the latest end time of any entry.
    pub fn duration_seconds(&self) -> f64 {
        self.entries
            .iter()
            .map(TranscriptEntry::end_time)
            .fold(0.0f64, f64::max)
    }

    /// Transcript text with one entry per line.
    pub fn formatted_text(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Text of the entries in the half-open index range `[start, end)`, space separated.
    /// Out-of-range indices are clamped.
    pub fn text_in_range(&self, start: usize, end: usize) -> String {
        let end = end.min(self.entries.len());
        let start = start.min(end);
        self.entries[start..end]
            .iter()
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Basic information about a video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    pub video_id: String,
    pub title: String,
    pub channel: String,
    /// Duration as `M:SS`, or "Unknown".
    pub duration: String,
    pub upload_date: String,
}

impl VideoInfo {
    /// Placeholder information used when the watch page yields nothing.
    pub fn unknown(video_id: &str) -> Self {
        Self {
            video_id: video_id.to_string(),
            title: "Unknown Title".to_string(),
            channel: "Unknown Channel".to_string(),
            duration: "Unknown".to_string(),
            upload_date: "Unknown Date".to_string(),
        }
    }

    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }
}

/// Format seconds as `M:SS`. Minutes are not wrapped into hours.
pub fn seconds_to_timestamp(seconds: f64) -> String {
    let total_seconds = seconds.max(0.0) as u64;
    let minutes = total_seconds / 60;
    let secs = total_seconds % 60;
    format!("{}:{:02}", minutes, secs)
}
