//! YouTube caption source.
//!
//! Reads the player response embedded in the watch page, checks playability, picks a
//! caption track by language preference and downloads its timed text.

use super::{
    seconds_to_timestamp, CaptionSource, FetchError, FetchedTranscript, Transcript,
    TranscriptEntry, VideoInfo,
};
use crate::config::YoutubeSettings;
use crate::error::Result;
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

// Matches the common YouTube URL shapes and bare video IDs.
static VIDEO_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        (?:
            (?:https?://)?
            (?:www\.|m\.)?
            (?:youtube\.com/watch\?(?:[^\#]*&)?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/|youtube\.com/shorts/)
            ([a-zA-Z0-9_-]{11})
        )
        |
        ^([a-zA-Z0-9_-]{11})$
    ",
    )
    .expect("Invalid regex")
});

static TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<(text|p)\b([^>]*)>(.*?)</(?:text|p)>").expect("Invalid regex"));

static ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\w+)="([^"]*)""#).expect("Invalid regex"));

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("Invalid regex"));

static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("Invalid regex"));

/// Extract the 11-character video ID from a YouTube URL or a bare ID.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();

    if let Ok(url) = Url::parse(input) {
        if let Some(id) = video_id_from_url(&url) {
            return Some(id);
        }
    }

    let caps = VIDEO_ID_RE.captures(input)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

fn video_id_from_url(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    let host = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("m."))
        .unwrap_or(host);

    let candidate = match host {
        "youtu.be" => url.path_segments()?.next().map(str::to_string),
        "youtube.com" | "music.youtube.com" => {
            let mut segments = url.path_segments()?;
            match segments.next()? {
                "watch" => url
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned()),
                "embed" | "v" | "shorts" | "live" => segments.next().map(str::to_string),
                _ => None,
            }
        }
        _ => None,
    }?;

    let valid = candidate.len() == 11
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    valid.then_some(candidate)
}

/// A caption track listed in the player response.
#[derive(Debug, Clone, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
    /// "asr" for auto-generated tracks.
    #[serde(default)]
    kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

/// Captions fetched from youtube.com.
pub struct YoutubeCaptions {
    client: reqwest::Client,
    languages: Vec<String>,
}

impl YoutubeCaptions {
    pub fn new() -> Result<Self> {
        Self::with_settings(&YoutubeSettings::default())
    }

    pub fn with_settings(settings: &YoutubeSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            languages: settings.languages.clone(),
        })
    }

    async fn get_text(&self, url: &str) -> std::result::Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::VideoUnavailable("HTTP 404".to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Network(format!("YouTube returned HTTP {}", status)));
        }

        response.text().await.map_err(network_error)
    }
}

fn network_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Network("request to YouTube timed out".to_string())
    } else {
        FetchError::Network(e.to_string())
    }
}

#[async_trait]
impl CaptionSource for YoutubeCaptions {
    #[instrument(skip(self))]
    async fn fetch(&self, video_id: &str) -> std::result::Result<FetchedTranscript, FetchError> {
        let watch_url = format!("https://www.youtube.com/watch?v={}", video_id);
        let html = self.get_text(&watch_url).await?;

        // Network-level filters replace the page rather than setting a playability status.
        if html.to_lowercase().contains("video is restricted") {
            return Err(FetchError::Restricted(
                "blocked by network or administrator policy".to_string(),
            ));
        }

        let player = extract_player_response(&html).ok_or_else(|| {
            FetchError::Extraction("player data not found on the watch page".to_string())
        })?;

        check_playability(&player)?;

        let tracks = caption_tracks(&player)?;
        let track = choose_track(&tracks, &self.languages).ok_or(FetchError::NoTranscripts)?;
        info!(
            "Using caption track '{}'{}",
            track.language_code,
            if track.is_generated() { " (auto-generated)" } else { "" }
        );

        let xml = self.get_text(&track.base_url).await?;
        let entries = parse_timedtext(&xml);
        if entries.is_empty() {
            warn!("Caption track for {} is empty", video_id);
            return Err(FetchError::NoTranscripts);
        }
        debug!("Fetched {} caption entries", entries.len());

        let transcript = Transcript::new(video_id.to_string(), entries);
        let video = video_info(video_id, &player, &transcript);

        Ok(FetchedTranscript { video, transcript })
    }
}

/// Locate and parse the `ytInitialPlayerResponse` object embedded in the watch page.
fn extract_player_response(html: &str) -> Option<Value> {
    let marker = html.find("ytInitialPlayerResponse")?;
    let open = marker + html[marker..].find('{')?;
    let object = balanced_json_object(&html[open..])?;
    serde_json::from_str(object).ok()
}

/// Return the prefix of `text` (which must start with `{`) holding one balanced JSON object.
fn balanced_json_object(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Map the player's playability status onto the fetch error taxonomy.
fn check_playability(player: &Value) -> std::result::Result<(), FetchError> {
    let playability = &player["playabilityStatus"];
    let status = playability["status"].as_str().unwrap_or("OK");
    let reason = playability["reason"]
        .as_str()
        .or_else(|| playability["messages"][0].as_str())
        .unwrap_or("")
        .to_string();
    let lower = reason.to_lowercase();

    match status {
        "OK" | "LIVE_STREAM_OFFLINE" => Ok(()),
        "AGE_CHECK_REQUIRED" | "CONTENT_CHECK_REQUIRED" => Err(FetchError::AgeRestricted),
        "LOGIN_REQUIRED" if lower.contains("private") => Err(FetchError::Private),
        "LOGIN_REQUIRED" if lower.contains("age") || lower.contains("inappropriate") => {
            Err(FetchError::AgeRestricted)
        }
        "LOGIN_REQUIRED" => Err(FetchError::Restricted(reason)),
        _ if lower.contains("private") => Err(FetchError::Private),
        _ if lower.contains("restrict") || lower.contains("in your country") => {
            Err(FetchError::Restricted(reason))
        }
        _ => Err(FetchError::VideoUnavailable(if reason.is_empty() {
            status.to_string()
        } else {
            reason
        })),
    }
}

fn caption_tracks(player: &Value) -> std::result::Result<Vec<CaptionTrack>, FetchError> {
    let tracks = player["captions"]["playerCaptionsTracklistRenderer"]["captionTracks"].clone();
    if tracks.is_null() {
        return Err(FetchError::TranscriptsDisabled);
    }
    serde_json::from_value(tracks)
        .map_err(|e| FetchError::Extraction(format!("unexpected caption track list: {}", e)))
}

/// Preferred languages first (manual before auto-generated), then the first listed track.
fn choose_track<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Option<&'a CaptionTrack> {
    for language in languages {
        let mut matching = tracks
            .iter()
            .filter(|t| t.language_code.eq_ignore_ascii_case(language));
        let manual = matching.clone().find(|t| !t.is_generated());
        if let Some(track) = manual.or_else(|| matching.next()) {
            return Some(track);
        }
    }

    tracks
        .iter()
        .find(|t| !t.is_generated())
        .or_else(|| tracks.first())
}

/// Parse a timedtext document (`<text start dur>` in seconds or `<p t d>` in milliseconds).
fn parse_timedtext(xml: &str) -> Vec<TranscriptEntry> {
    let mut entries = Vec::new();

    for caps in TEXT_RE.captures_iter(xml) {
        let millis = &caps[1] == "p";
        let mut start = None;
        let mut duration = 0.0;
        for attr in ATTR_RE.captures_iter(&caps[2]) {
            let value: Option<f64> = attr[2].parse().ok();
            match (&attr[1], millis) {
                ("start", false) | ("t", true) => start = value,
                ("dur", false) | ("d", true) => duration = value.unwrap_or(0.0),
                _ => {}
            }
        }
        let Some(mut start) = start else { continue };
        if millis {
            start /= 1000.0;
            duration /= 1000.0;
        }

        // Caption text arrives entity-encoded twice.
        let text = unescape_html(&unescape_html(&caps[3]));
        let text = TAG_RE.replace_all(&text, "");
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if text.is_empty() {
            continue;
        }

        entries.push(TranscriptEntry::new(text, start, duration));
    }

    entries
}

fn unescape_html(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &regex::Captures| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse().ok().and_then(char::from_u32)
            } else {
                match entity {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some(' '),
                    _ => None,
                }
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn video_info(video_id: &str, player: &Value, transcript: &Transcript) -> VideoInfo {
    let mut info = VideoInfo::unknown(video_id);
    let details = &player["videoDetails"];
    let microformat = &player["microformat"]["playerMicroformatRenderer"];

    if let Some(title) = details["title"].as_str().filter(|t| !t.is_empty()) {
        info.title = title.to_string();
    }
    if let Some(author) = details["author"].as_str().filter(|a| !a.is_empty()) {
        info.channel = author.to_string();
    }
    if let Some(date) = microformat["publishDate"]
        .as_str()
        .or_else(|| microformat["uploadDate"].as_str())
    {
        info.upload_date = date.chars().take(10).collect();
    }
    if !transcript.is_empty() {
        info.duration = seconds_to_timestamp(transcript.duration_seconds());
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_video_id() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/v/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=42"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("youtube.com/watch?list=PL1&v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(extract_video_id("dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));

        assert_eq!(extract_video_id("not-a-video-id"), None);
        assert_eq!(extract_video_id("https://vimeo.com/123456789"), None);
        assert_eq!(extract_video_id(""), None);
    }

    #[test]
    fn test_extract_player_response() {
        let html = r#"<script>var ytInitialPlayerResponse = {"videoDetails":{"title":"A {tricky} \"title\"","author":"Chan"}};var meta = {};</script>"#;
        let player = extract_player_response(html).unwrap();
        assert_eq!(player["videoDetails"]["title"], "A {tricky} \"title\"");
        assert_eq!(player["videoDetails"]["author"], "Chan");
    }

    #[test]
    fn test_playability_classification() {
        let ok = json!({"playabilityStatus": {"status": "OK"}});
        assert!(check_playability(&ok).is_ok());

        let private = json!({"playabilityStatus": {"status": "LOGIN_REQUIRED", "reason": "This video is private"}});
        assert_eq!(check_playability(&private), Err(FetchError::Private));

        let age = json!({"playabilityStatus": {"status": "LOGIN_REQUIRED", "reason": "Sign in to confirm your age"}});
        assert_eq!(check_playability(&age), Err(FetchError::AgeRestricted));

        let gone = json!({"playabilityStatus": {"status": "ERROR", "reason": "Video unavailable"}});
        assert_eq!(
            check_playability(&gone),
            Err(FetchError::VideoUnavailable("Video unavailable".to_string()))
        );

        let geo = json!({"playabilityStatus": {"status": "UNPLAYABLE", "reason": "The uploader has not made this video available in your country"}});
        assert!(matches!(check_playability(&geo), Err(FetchError::Restricted(_))));
    }

    #[test]
    fn test_missing_captions_means_disabled() {
        let player = json!({"playabilityStatus": {"status": "OK"}});
        assert!(matches!(caption_tracks(&player), Err(FetchError::TranscriptsDisabled)));
    }

    #[test]
    fn test_choose_track_prefers_manual_english() {
        let player = json!({"captions": {"playerCaptionsTracklistRenderer": {"captionTracks": [
            {"baseUrl": "https://x/de", "languageCode": "de"},
            {"baseUrl": "https://x/en-asr", "languageCode": "en", "kind": "asr"},
            {"baseUrl": "https://x/en", "languageCode": "en"}
        ]}}});
        let tracks = caption_tracks(&player).unwrap();
        let languages = vec!["en".to_string(), "en-US".to_string()];

        assert_eq!(choose_track(&tracks, &languages).unwrap().base_url, "https://x/en");
        assert_eq!(choose_track(&tracks[..1], &languages).unwrap().language_code, "de");
        assert!(choose_track(&[], &languages).is_none());
    }

    #[test]
    fn test_parse_timedtext_seconds() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript>
<text start="0.5" dur="2.25">Hello &amp;amp; welcome</text>
<text start="2.75" dur="3.1">it&amp;#39;s a
test</text>
<text start="6" dur="1"></text>
</transcript>"#;
        let entries = parse_timedtext(xml);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], TranscriptEntry::new("Hello & welcome", 0.5, 2.25));
        assert_eq!(entries[1].text, "it's a test");
        assert_eq!(entries[1].start_time, 2.75);
    }

    #[test]
    fn test_parse_timedtext_milliseconds() {
        let xml = r#"<timedtext format="3"><body><p t="1500" d="2000">Ownership <s>rules</s></p></body></timedtext>"#;
        let entries = parse_timedtext(xml);
        assert_eq!(entries, vec![TranscriptEntry::new("Ownership rules", 1.5, 2.0)]);
    }

    #[test]
    fn test_video_info_from_player() {
        let player = json!({
            "videoDetails": {"title": "Borrow Checker", "author": "Rustaceans"},
            "microformat": {"playerMicroformatRenderer": {"publishDate": "2024-03-01T00:00:00-08:00"}}
        });
        let transcript = Transcript::new(
            "abc".to_string(),
            vec![TranscriptEntry::new("hi", 120.0, 5.5)],
        );
        let info = video_info("abc", &player, &transcript);
        assert_eq!(info.title, "Borrow Checker");
        assert_eq!(info.channel, "Rustaceans");
        assert_eq!(info.upload_date, "2024-03-01");
        assert_eq!(info.duration, "2:05");

        let empty = video_info("abc", &json!({}), &Transcript::new("abc".to_string(), vec![]));
        assert_eq!(empty.title, "Unknown Title");
        assert_eq!(empty.duration, "Unknown");
    }
}
