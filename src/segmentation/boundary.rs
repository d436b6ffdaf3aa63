//! Topic boundary detection.
//!
//! A boundary candidate is an adjacent sentence pair whose content words barely overlap and
//! which is separated by a pause. Candidates are thinned to a minimum spacing. When too few
//! survive, the gaps are backfilled near evenly spaced target times, and the result is capped.

use super::text::{jaccard, sentences_from_entries, Sentence, StopWords};
use crate::config::SegmentationSettings;
use crate::transcript::TranscriptEntry;
use serde::Serialize;
use tracing::{debug, instrument};

/// How a boundary was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundarySource {
    /// Lexical divergence plus a pause.
    Lexical,
    /// Evenly spaced filler for homogeneous transcripts.
    Backfill,
}

/// A detected point of topical discontinuity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Boundary {
    pub sentence_index: usize,
    /// Transcript entry the sentence came from.
    pub entry_index: usize,
    pub start_time: f64,
    /// In `[0, 1]`.
    pub confidence: f64,
    pub source: BoundarySource,
}

/// Lexical-similarity boundary detector.
#[derive(Debug, Clone)]
pub struct BoundaryDetector {
    settings: SegmentationSettings,
    stop_words: StopWords,
}

impl BoundaryDetector {
    pub fn new(settings: SegmentationSettings) -> Self {
        Self {
            settings,
            stop_words: StopWords::default(),
        }
    }

    pub fn with_stop_words(mut self, stop_words: StopWords) -> Self {
        self.stop_words = stop_words;
        self
    }

    pub fn settings(&self) -> &SegmentationSettings {
        &self.settings
    }

    /// Detect boundaries in an ordered sequence of transcript entries.
    #[instrument(skip_all, fields(entries = entries.len()))]
    pub fn detect(&self, entries: &[TranscriptEntry]) -> Vec<Boundary> {
        let sentences = sentences_from_entries(entries);
        self.detect_in_sentences(&sentences)
    }

    /// Detect boundaries in already split sentences.
    pub fn detect_in_sentences(&self, sentences: &[Sentence]) -> Vec<Boundary> {
        if sentences.is_empty() {
            return Vec::new();
        }

        let candidates = self.lexical_candidates(sentences);
        debug!("{} lexical boundary candidates", candidates.len());

        let mut boundaries = self.thin(candidates);
        if boundaries.len() < self.settings.min_candidates {
            self.backfill(sentences, &mut boundaries);
            debug!("{} boundaries after backfill", boundaries.len());
        }

        boundaries.truncate(self.settings.max_boundaries);
        boundaries
    }

    fn lexical_candidates(&self, sentences: &[Sentence]) -> Vec<Boundary> {
        let words: Vec<_> = sentences
            .iter()
            .map(|s| self.stop_words.content_words(&s.text))
            .collect();

        (1..sentences.len())
            .filter_map(|i| {
                let previous = &sentences[i - 1];
                let current = &sentences[i];
                let similarity = jaccard(&words[i - 1], &words[i]);
                let pause = current.start_time - previous.end_time;

                (similarity < self.settings.similarity_threshold
                    && pause > self.settings.min_pause_seconds)
                    .then(|| Boundary {
                        sentence_index: i,
                        entry_index: current.entry_index,
                        start_time: current.start_time,
                        confidence: 1.0 - similarity,
                        source: BoundarySource::Lexical,
                    })
            })
            .collect()
    }

    /// For each evenly spaced target time, add the nearest sentence within half an interval
    /// that is at least `min_spacing_seconds` away from every kept boundary.
    fn backfill(&self, sentences: &[Sentence], kept: &mut Vec<Boundary>) {
        let total_duration = sentences.last().map(|s| s.end_time).unwrap_or(0.0);
        let target_sections = self.settings.target_sections.max(1);
        let interval = total_duration / target_sections as f64;
        let half = interval / 2.0;

        for i in 1..target_sections {
            let target_time = i as f64 * interval;
            let nearest = sentences
                .iter()
                .enumerate()
                .skip(1)
                .filter(|(_, s)| {
                    s.start_time >= target_time - half && s.start_time < target_time + half
                })
                .filter(|(_, s)| {
                    kept.iter().all(|k| {
                        (s.start_time - k.start_time).abs() >= self.settings.min_spacing_seconds
                    })
                })
                .min_by(|(_, a), (_, b)| {
                    (a.start_time - target_time)
                        .abs()
                        .total_cmp(&(b.start_time - target_time).abs())
                });

            if let Some((index, sentence)) = nearest {
                kept.push(Boundary {
                    sentence_index: index,
                    entry_index: sentence.entry_index,
                    start_time: sentence.start_time,
                    confidence: 0.5,
                    source: BoundarySource::Backfill,
                });
            }
        }

        kept.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
    }

    /// Sort by time and keep candidates at least `min_spacing_seconds` after the last kept one.
    fn thin(&self, mut candidates: Vec<Boundary>) -> Vec<Boundary> {
        candidates.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

        let mut kept: Vec<Boundary> = Vec::with_capacity(self.settings.max_boundaries);
        for candidate in candidates {
            let far_enough = kept.last().is_none_or(|last| {
                candidate.start_time - last.start_time >= self.settings.min_spacing_seconds
            });
            if far_enough {
                kept.push(candidate);
            }
        }

        kept
    }
}

impl Default for BoundaryDetector {
    fn default() -> Self {
        Self::new(SegmentationSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOPICS: &[&str] = &[
        "Photosynthesis converts sunlight into chemical energy",
        "Medieval castles featured moats and drawbridges",
        "Quantum computers manipulate qubits through superposition",
        "Volcanic eruptions release magma ash and gases",
        "Jazz musicians improvise over chord progressions",
        "Glaciers carve valleys during ice ages",
        "Compilers translate source code into machine instructions",
        "Coral reefs shelter thousands of marine species",
        "Renaissance painters mastered linear perspective",
        "Blockchains record transactions in distributed ledgers",
        "Honeybees communicate using waggle dances",
        "Supernovae scatter heavy elements across galaxies",
        "Tectonic plates drift over the molten mantle",
        "Origami artists fold paper into cranes",
        "Antibiotics target bacterial cell walls",
    ];

    fn entries_every(spacing: f64, duration: f64, texts: &[&str]) -> Vec<TranscriptEntry> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| TranscriptEntry::new(format!("{}.", text), i as f64 * spacing, duration))
            .collect()
    }

    fn assert_well_formed(boundaries: &[Boundary], settings: &SegmentationSettings) {
        assert!(boundaries.len() <= settings.max_boundaries);
        for pair in boundaries.windows(2) {
            assert!(pair[1].start_time > pair[0].start_time);
            assert!(pair[1].start_time - pair[0].start_time >= settings.min_spacing_seconds);
        }
        for b in boundaries {
            assert!((0.0..=1.0).contains(&b.confidence));
        }
    }

    #[test]
    fn test_empty_transcript_has_no_boundaries() {
        assert!(BoundaryDetector::default().detect(&[]).is_empty());
    }

    #[test]
    fn test_dissimilar_sentences_sixty_seconds_apart() {
        let entries = entries_every(60.0, 5.0, &TOPICS[..10]);
        let detector = BoundaryDetector::default();
        let boundaries = detector.detect(&entries);

        assert_eq!(boundaries.len(), 9);
        assert!(boundaries.iter().all(|b| b.source == BoundarySource::Lexical));
        assert!(boundaries.iter().all(|b| b.confidence == 1.0));
        let starts: Vec<f64> = boundaries.iter().map(|b| b.start_time).collect();
        assert_eq!(starts, (1..10).map(|i| i as f64 * 60.0).collect::<Vec<_>>());
        assert_well_formed(&boundaries, detector.settings());
    }

    #[test]
    fn test_homogeneous_transcript_is_backfilled() {
        // Same words every sentence, no pauses: no lexical candidates at all.
        let texts = vec!["Rust ownership rules keep memory safe"; 40];
        let entries = entries_every(10.0, 10.0, &texts);
        let detector = BoundaryDetector::default();
        let boundaries = detector.detect(&entries);

        assert_eq!(boundaries.len(), 9);
        assert!(boundaries.iter().all(|b| b.source == BoundarySource::Backfill));
        assert!(boundaries.iter().all(|b| b.confidence == 0.5));
        assert_eq!(boundaries[0].start_time, 40.0);
        assert_well_formed(&boundaries, detector.settings());
    }

    #[test]
    fn test_count_between_eight_and_twelve_for_long_transcripts() {
        let settings = SegmentationSettings::default();
        let detector = BoundaryDetector::new(settings.clone());

        // Dense topic changes every 20s over 10 minutes.
        let texts: Vec<&str> = (0..30).map(|i| TOPICS[i % TOPICS.len()]).collect();
        let dense = detector.detect(&entries_every(20.0, 5.0, &texts));
        assert!((8..=12).contains(&dense.len()), "got {}", dense.len());
        assert_well_formed(&dense, &settings);

        // Twenty sentences over five minutes, no pauses.
        let texts: Vec<&str> = (0..20).map(|i| TOPICS[i % TOPICS.len()]).collect();
        let sparse = detector.detect(&entries_every(15.0, 15.0, &texts));
        assert!((8..=12).contains(&sparse.len()), "got {}", sparse.len());
        assert_well_formed(&sparse, &settings);
    }

    #[test]
    fn test_clustered_topic_changes_still_get_backfilled() {
        // Ten quick topic changes in the first 50s, then the same sentence every 10s to 310s.
        let mut entries = entries_every(5.0, 2.0, &TOPICS[..10]);
        entries.extend((0..26).map(|k| {
            TranscriptEntry::new(
                "We keep talking about the same subject here.",
                50.0 + k as f64 * 10.0,
                10.0,
            )
        }));
        let detector = BoundaryDetector::default();
        let boundaries = detector.detect(&entries);

        let starts: Vec<f64> = boundaries.iter().map(|b| b.start_time).collect();
        assert_eq!(
            starts,
            vec![5.0, 35.0, 70.0, 100.0, 130.0, 160.0, 190.0, 220.0, 250.0, 280.0]
        );
        assert_eq!(boundaries[0].source, BoundarySource::Lexical);
        assert_eq!(boundaries[2].source, BoundarySource::Backfill);
        assert_well_formed(&boundaries, detector.settings());
    }

    #[test]
    fn test_cap_applies() {
        let settings = SegmentationSettings {
            max_boundaries: 4,
            ..SegmentationSettings::default()
        };
        let detector = BoundaryDetector::new(settings);
        let boundaries = detector.detect(&entries_every(60.0, 5.0, &TOPICS[..10]));
        assert_eq!(boundaries.len(), 4);
        assert_eq!(boundaries[3].start_time, 240.0);
    }

    #[test]
    fn test_short_pause_is_not_a_boundary() {
        let settings = SegmentationSettings {
            min_candidates: 0,
            ..SegmentationSettings::default()
        };
        let detector = BoundaryDetector::new(settings);
        // Gap between consecutive entries is exactly 2s, which does not exceed the minimum.
        let boundaries = detector.detect(&entries_every(60.0, 58.0, &TOPICS[..5]));
        assert!(boundaries.is_empty());
    }

    #[test]
    fn test_sentences_share_entry_index() {
        let entries = vec![
            TranscriptEntry::new("Intro words here.", 0.0, 5.0),
            TranscriptEntry::new("Volcanoes erupt. Lava flows downhill.", 40.0, 5.0),
        ];
        let settings = SegmentationSettings {
            min_candidates: 0,
            ..SegmentationSettings::default()
        };
        let boundaries = BoundaryDetector::new(settings).detect(&entries);
        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].sentence_index, 1);
        assert_eq!(boundaries[0].entry_index, 1);
    }
}
