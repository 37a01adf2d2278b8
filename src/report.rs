//! Analysis output types.
//!
//! [`DuplicateRecord`] accumulates duplicate indices while a run is in
//! progress; [`AnalysisResult`] is the immutable summary produced once the
//! schedule is exhausted.

use crate::metadata::VideoMetadata;
use crate::schedule::SamplingPlan;

/// Append-only list of 1-based sample indices classified as duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateRecord {
    indices: Vec<u64>,
}

impl DuplicateRecord {
    /// An empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `index`.
    ///
    /// Indices arrive in sampling order, so each must be greater than the
    /// last. The first sample has no predecessor and can never be recorded.
    pub fn push(&mut self, index: u64) {
        debug_assert!(index > 1, "the first sample cannot be a duplicate");
        debug_assert!(
            self.indices.last().is_none_or(|&last| index > last),
            "duplicate indices must be strictly increasing"
        );
        self.indices.push(index);
    }

    /// Number of recorded duplicates.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Recorded indices, in increasing order.
    pub fn as_slice(&self) -> &[u64] {
        &self.indices
    }

    /// Consume the record, returning the indices.
    pub fn into_vec(self) -> Vec<u64> {
        self.indices
    }
}

/// Final statistics for one completed analysis run.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct AnalysisResult {
    /// Video duration in seconds.
    pub duration_seconds: f64,
    /// Sampling rate that was used.
    pub fps: f64,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Estimated average bitrate in bits per second.
    pub bitrate_bps: f64,
    /// Number of samples actually taken.
    pub total_frames: u64,
    /// Number of samples classified as duplicates.
    pub duplicate_count: u64,
    /// `duplicate_count / total_frames` (0 when nothing was sampled).
    pub duplicate_ratio: f64,
    /// `duplicate_count / duration_seconds`.
    pub duplicates_per_second: f64,
    /// 1-based indices of duplicate samples, strictly increasing.
    pub duplicate_indices: Vec<u64>,
}

impl AnalysisResult {
    pub(crate) fn new(
        metadata: &VideoMetadata,
        plan: &SamplingPlan,
        total_frames: u64,
        record: DuplicateRecord,
    ) -> Self {
        let duplicate_count = record.len() as u64;
        let duplicate_ratio = if total_frames > 0 {
            duplicate_count as f64 / total_frames as f64
        } else {
            0.0
        };
        let duplicates_per_second = if metadata.duration_seconds > 0.0 {
            duplicate_count as f64 / metadata.duration_seconds
        } else {
            0.0
        };

        Self {
            duration_seconds: metadata.duration_seconds,
            fps: plan.target_fps(),
            width: metadata.width,
            height: metadata.height,
            bitrate_bps: metadata.estimated_bitrate_bps(),
            total_frames,
            duplicate_count,
            duplicate_ratio,
            duplicates_per_second,
            duplicate_indices: record.into_vec(),
        }
    }

    /// Resolution rendered as `"WIDTHxHEIGHT"`.
    pub fn resolution(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    /// Returns `true` if no duplicate was found.
    pub fn is_clean(&self) -> bool {
        self.duplicate_count == 0
    }

    /// Timestamp in seconds of each duplicate sample.
    pub fn duplicate_timestamps(&self) -> impl Iterator<Item = f64> + '_ {
        self.duplicate_indices
            .iter()
            .map(|&index| (index as f64 - 0.5) / self.fps)
    }
}
