//! Turning boundaries into contiguous section ranges over the transcript.

use super::boundary::Boundary;
use serde::{Deserialize, Serialize};

/// Half-open range `[start_index, end_index)` of transcript entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRange {
    /// 1-based.
    pub section_id: usize,
    pub start_index: usize,
    pub end_index: usize,
    pub start_time: f64,
}

impl SectionRange {
    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }
}

/// Partition `entry_count` entries using boundary entry indices.
///
/// One section per boundary. The first section is pulled back to entry 0 so the ranges are
/// exhaustive, and boundaries that land on an entry already claimed by an earlier section are
/// skipped. With no boundaries and a non-empty transcript a single section covers everything.
pub fn partition(boundaries: &[Boundary], entry_starts: &[f64]) -> Vec<SectionRange> {
    let entry_count = entry_starts.len();
    if entry_count == 0 {
        return Vec::new();
    }

    let mut starts: Vec<usize> = Vec::with_capacity(boundaries.len().max(1));
    for boundary in boundaries {
        let index = if starts.is_empty() {
            0
        } else {
            boundary.entry_index.min(entry_count - 1)
        };
        if starts.last().is_none_or(|&last| index > last) {
            starts.push(index);
        }
    }
    if starts.is_empty() {
        starts.push(0);
    }

    starts
        .iter()
        .enumerate()
        .map(|(i, &start_index)| SectionRange {
            section_id: i + 1,
            start_index,
            end_index: starts.get(i + 1).copied().unwrap_or(entry_count),
            start_time: entry_starts[start_index],
        })
        .collect()
}
