//! Transcript fetching for Kapittel.
//!
//! Provides a trait-based interface over caption sources and the YouTube implementation.

mod errors;
mod models;
mod youtube;

pub use errors::{ErrorCode, FetchError};
pub use models::{seconds_to_timestamp, Transcript, TranscriptEntry, VideoInfo};
pub use youtube::{extract_video_id, YoutubeCaptions};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A transcript together with the metadata of its video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedTranscript {
    pub video: VideoInfo,
    pub transcript: Transcript,
}

/// Trait for caption providers.
#[async_trait]
pub trait CaptionSource: Send + Sync {
    /// Fetch the caption track and metadata for a video id.
    async fn fetch(&self, video_id: &str) -> std::result::Result<FetchedTranscript, FetchError>;
}
