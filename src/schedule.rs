//! Sampling schedule.
//!
//! [`SamplingPlan`] decides which timestamps an analysis run samples. Each
//! sample is taken at the *center* of its nominal frame interval,
//! `t(n) = (n + 0.5) / fps`, so that small seek rounding never lands on an
//! interval edge. Because container durations are estimates, the schedule
//! runs until `t(n)` reaches the duration, bounded by
//! [`EDGE_TOLERANCE_SAMPLES`] extra samples beyond the estimated count.
//!
//! # Example
//!
//! ```
//! use freezeframe::SamplingPlan;
//!
//! let plan = SamplingPlan::new(2.0, 10.0)?;
//! assert_eq!(plan.total_estimated_samples(), 20);
//!
//! let timestamps: Vec<f64> = plan.schedule().map(|point| point.timestamp_seconds).collect();
//! assert_eq!(timestamps.len(), 20);
//! assert_eq!(timestamps[0], 0.05);
//! # Ok::<(), freezeframe::FreezeFrameError>(())
//! ```

use crate::error::FreezeFrameError;

/// Extra samples allowed past the estimated count to absorb duration
/// estimate error.
pub const EDGE_TOLERANCE_SAMPLES: u64 = 5;

/// Immutable sampling parameters for one analysis run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingPlan {
    duration_seconds: f64,
    target_fps: f64,
    total_estimated_samples: u64,
}

impl SamplingPlan {
    /// Build a plan for a video of `duration_seconds` sampled at `target_fps`.
    ///
    /// # Errors
    ///
    /// Returns [`FreezeFrameError::InvalidParameter`] if either value is not
    /// a finite positive number, or if their product does not fit a sample
    /// count.
    pub fn new(duration_seconds: f64, target_fps: f64) -> Result<Self, FreezeFrameError> {
        validate_target_fps(target_fps)?;
        if !(duration_seconds.is_finite() && duration_seconds > 0.0) {
            return Err(FreezeFrameError::InvalidParameter(format!(
                "duration must be a positive number of seconds, got {duration_seconds}"
            )));
        }

        let estimate = (duration_seconds * target_fps).floor();
        // `u64::MAX as f64` rounds up to 2^64, which is itself out of range.
        if !estimate.is_finite() || estimate >= u64::MAX as f64 {
            return Err(FreezeFrameError::InvalidParameter(format!(
                "{duration_seconds}s at {target_fps} fps is too many samples to schedule"
            )));
        }
        let total_estimated_samples = estimate as u64;

        Ok(Self {
            duration_seconds,
            target_fps,
            total_estimated_samples,
        })
    }

    /// Duration the plan was built for, in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    /// Sampling rate in samples per second.
    pub fn target_fps(&self) -> f64 {
        self.target_fps
    }

    /// `floor(duration * fps)`.
    pub fn total_estimated_samples(&self) -> u64 {
        self.total_estimated_samples
    }

    /// Hard upper bound on the number of samples the schedule yields.
    pub fn max_samples(&self) -> u64 {
        self.total_estimated_samples.saturating_add(EDGE_TOLERANCE_SAMPLES)
    }

    /// Timestamp of the 0-based sample `position`.
    pub fn timestamp_of(&self, position: u64) -> f64 {
        (position as f64 + 0.5) / self.target_fps
    }

    /// A fresh iterator over the planned sample points.
    ///
    /// Every call starts again from the first sample.
    pub fn schedule(&self) -> SampleSchedule {
        SampleSchedule {
            plan: *self,
            next_position: 0,
            exhausted: false,
        }
    }
}

/// Check that a target frame rate is usable.
pub(crate) fn validate_target_fps(target_fps: f64) -> Result<(), FreezeFrameError> {
    if target_fps.is_finite() && target_fps > 0.0 {
        Ok(())
    } else {
        Err(FreezeFrameError::InvalidParameter(format!(
            "target fps must be a positive number, got {target_fps}"
        )))
    }
}

/// One scheduled sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    /// 0-based position in the schedule.
    pub position: u64,
    /// Timestamp to seek to, in seconds.
    pub timestamp_seconds: f64,
}

impl SamplePoint {
    /// 1-based index used in reports.
    pub fn index(&self) -> u64 {
        self.position + 1
    }
}

/// Lazy, finite iterator over the sample points of a [`SamplingPlan`].
#[derive(Debug, Clone)]
pub struct SampleSchedule {
    plan: SamplingPlan,
    next_position: u64,
    exhausted: bool,
}

impl Iterator for SampleSchedule {
    type Item = SamplePoint;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let position = self.next_position;
        let timestamp_seconds = self.plan.timestamp_of(position);

        if timestamp_seconds >= self.plan.duration_seconds || position >= self.plan.max_samples() {
            self.exhausted = true;
            return None;
        }

        self.next_position += 1;
        Some(SamplePoint {
            position,
            timestamp_seconds,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.exhausted {
            return (0, Some(0));
        }
        let remaining = self.plan.max_samples().saturating_sub(self.next_position);
        (0, usize::try_from(remaining).ok())
    }
}

impl std::iter::FusedIterator for SampleSchedule {}
