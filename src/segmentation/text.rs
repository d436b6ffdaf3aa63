//! Plain-text helpers: sentence splitting, word tokens, stop words and Jaccard similarity.

use crate::transcript::TranscriptEntry;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::LazyLock;

static SENTENCE_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("Invalid regex"));

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("Invalid regex"));

/// Common English words ignored when comparing sentences.
pub const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it",
    "its", "of", "on", "that", "the", "to", "was", "will", "with", "i", "you", "your", "we",
    "they", "them", "this", "these", "those", "but", "or", "if", "then", "else", "when", "where",
    "why", "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such",
    "no", "nor", "not", "only", "own", "same", "so", "than", "too", "very", "can", "just",
    "should", "now",
];

/// A sentence carved out of a transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sentence {
    pub text: String,
    /// Start time of the source entry.
    pub start_time: f64,
    /// End time of the source entry.
    pub end_time: f64,
    pub word_count: usize,
    /// Index of the source entry in the transcript.
    pub entry_index: usize,
}

/// Split text on runs of `.`, `!` and `?`, dropping empty pieces.
pub fn split_sentences(text: &str) -> Vec<String> {
    SENTENCE_END_RE
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lowercase word tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    WORD_RE
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Flatten transcript entries into sentences that inherit their entry's timing.
pub fn sentences_from_entries(entries: &[TranscriptEntry]) -> Vec<Sentence> {
    entries
        .iter()
        .enumerate()
        .flat_map(|(entry_index, entry)| {
            split_sentences(&entry.text)
                .into_iter()
                .map(move |text| Sentence {
                    word_count: tokenize(&text).len(),
                    text,
                    start_time: entry.start_time,
                    end_time: entry.end_time(),
                    entry_index,
                })
        })
        .collect()
}

/// Stop-word filter used by the boundary detector.
#[derive(Debug, Clone)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Distinct lowercase words of `text` that are not stop words.
    pub fn content_words(&self, text: &str) -> HashSet<String> {
        tokenize(text)
            .into_iter()
            .filter(|w| !self.contains(w))
            .collect()
    }
}

impl Default for StopWords {
    fn default() -> Self {
        Self::new(STOP_WORDS.iter().copied())
    }
}

/// Intersection over union. Two empty sets have similarity 0.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}
