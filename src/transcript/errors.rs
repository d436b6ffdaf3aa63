//! Transcript availability errors and the codes reported to callers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable failure code of a processing result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    TranscriptsDisabled,
    NoTranscripts,
    VideoUnavailable,
    InvalidUrl,
    RestrictedVideo,
    Private,
    AgeRestricted,
    NetworkError,
    ExtractionError,
    ProcessingError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::TranscriptsDisabled => "TRANSCRIPTS_DISABLED",
            ErrorCode::NoTranscripts => "NO_TRANSCRIPTS",
            ErrorCode::VideoUnavailable => "VIDEO_UNAVAILABLE",
            ErrorCode::InvalidUrl => "INVALID_URL",
            ErrorCode::RestrictedVideo => "RESTRICTED_VIDEO",
            ErrorCode::Private => "PRIVATE",
            ErrorCode::AgeRestricted => "AGE_RESTRICTED",
            ErrorCode::NetworkError => "NETWORK_ERROR",
            ErrorCode::ExtractionError => "EXTRACTION_ERROR",
            ErrorCode::ProcessingError => "PROCESSING_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a transcript could not be obtained. Terminal for the request; never retried.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    #[error("Invalid YouTube URL format: {0}")]
    InvalidUrl(String),

    #[error("This video has transcripts disabled")]
    TranscriptsDisabled,

    #[error("No transcripts found for this video")]
    NoTranscripts,

    #[error("Video is unavailable or has been removed: {0}")]
    VideoUnavailable(String),

    #[error("Video is restricted by network/administrator policies: {0}")]
    Restricted(String),

    #[error("Video is private")]
    Private,

    #[error("Video is age-restricted")]
    AgeRestricted,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to extract subtitles: {0}")]
    Extraction(String),
}

impl FetchError {
    /// Code reported in the failure result.
    pub fn code(&self) -> ErrorCode {
        match self {
            FetchError::InvalidUrl(_) => ErrorCode::InvalidUrl,
            FetchError::TranscriptsDisabled => ErrorCode::TranscriptsDisabled,
            FetchError::NoTranscripts => ErrorCode::NoTranscripts,
            FetchError::VideoUnavailable(_) => ErrorCode::VideoUnavailable,
            FetchError::Restricted(_) => ErrorCode::RestrictedVideo,
            FetchError::Private => ErrorCode::Private,
            FetchError::AgeRestricted => ErrorCode::AgeRestricted,
            FetchError::Network(_) => ErrorCode::NetworkError,
            FetchError::Extraction(_) => ErrorCode::ExtractionError,
        }
    }

    /// Human-readable hints for the user.
    pub fn suggestions(&self) -> Vec<String> {
        let hints: &[&str] = match self {
            FetchError::InvalidUrl(_) => &["Check the YouTube URL format"],
            FetchError::TranscriptsDisabled => {
                &["Try finding similar content with enabled subtitles"]
            }
            FetchError::NoTranscripts => &["Try videos with English subtitles"],
            FetchError::VideoUnavailable(_) => &[
                "Check if the video URL is correct",
                "The video might have been removed or made private",
                "Try searching for the video again on YouTube",
            ],
            FetchError::Restricted(_) => &[
                "Try accessing from a different network (mobile data, home WiFi)",
                "Use a VPN to bypass geographic restrictions",
                "Check with your IT administrator about network restrictions",
                "Try a different Google account or incognito mode",
            ],
            FetchError::Private => &[
                "Contact the video owner for access",
                "Check if you have the correct sharing link",
                "The video might have been made private recently",
            ],
            FetchError::AgeRestricted => &[
                "Sign in to YouTube with an adult account",
                "The video requires age verification",
            ],
            FetchError::Network(_) => &[
                "Check your internet connection",
                "Try again in a few minutes",
                "Use a different DNS server",
            ],
            FetchError::Extraction(_) => &["Check if the video is available and public"],
        };
        hints.iter().map(|s| s.to_string()).collect()
    }
}
