//! Heuristic topic segmentation of transcripts.
//!
//! Sentences are compared pairwise with stop-word-filtered Jaccard similarity; low overlap
//! plus a pause marks a boundary, and boundaries become contiguous section ranges.

mod boundary;
mod sections;
mod text;

pub use boundary::{Boundary, BoundaryDetector, BoundarySource};
pub use sections::{partition, SectionRange};
pub use text::{
    jaccard, sentences_from_entries, split_sentences, tokenize, Sentence, StopWords, STOP_WORDS,
};

pub use crate::transcript::seconds_to_timestamp;

use crate::transcript::TranscriptEntry;

/// Detect boundaries and partition the entries into sections in one step.
pub fn segment(detector: &BoundaryDetector, entries: &[TranscriptEntry]) -> Vec<SectionRange> {
    let boundaries = detector.detect(entries);
    let starts: Vec<f64> = entries.iter().map(|e| e.start_time).collect();
    partition(&boundaries, &starts)
}
