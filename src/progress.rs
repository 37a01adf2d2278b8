//! Progress reporting and cancellation support.
//!
//! This module provides [`ProgressCallback`] for monitoring an analysis run,
//! [`CancellationToken`] for cooperative cancellation, and [`ProgressInfo`]
//! for progress snapshots.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use freezeframe::{
//!     AnalysisOptions, AnalysisSession, FreezeFrameError, MediaFile,
//!     ProgressCallback, ProgressInfo,
//! };
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("{:.0}% ({} duplicates so far)", info.percentage, info.duplicates_found);
//!     }
//! }
//!
//! let options = AnalysisOptions::new()
//!     .with_target_fps(30.0)
//!     .with_progress(Arc::new(PrintProgress));
//!
//! let mut session = AnalysisSession::new(MediaFile::open("input.mp4")?, options);
//! let result = session.run()?;
//! # Ok::<(), FreezeFrameError>(())
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

/// Highest percentage reported while a run is still sampling.
///
/// The estimated sample count can be exceeded within the edge tolerance, so
/// 100% is only implied by the terminal result.
pub const MAX_RUNNING_PERCENTAGE: f64 = 99.0;

/// A snapshot of analysis progress.
///
/// Delivered to [`ProgressCallback::on_progress`] at a cadence controlled
/// by [`AnalysisOptions::with_batch_size`](crate::AnalysisOptions::with_batch_size).
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// How many samples have been taken so far.
    pub current: u64,
    /// Estimated total number of samples.
    pub total_estimated: u64,
    /// `min(99, 100 * current / total_estimated)`.
    pub percentage: f64,
    /// Wall-clock time elapsed since sampling started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on current throughput.
    pub estimated_remaining: Option<Duration>,
    /// Timestamp of the most recent sample.
    pub current_timestamp: Duration,
    /// Duplicates found so far.
    pub duplicates_found: u64,
}

/// Trait for receiving progress updates during analysis.
///
/// Implementations must be [`Send`] and [`Sync`] because callbacks may be
/// invoked from a worker thread when the session runs in the background.
///
/// Progress callbacks are **infallible**: they observe but cannot halt
/// the run. Use [`CancellationToken`] for cooperative cancellation.
pub trait ProgressCallback: Send + Sync {
    /// Called after every batch of samples.
    fn on_progress(&self, info: &ProgressInfo);
}

/// A no-op implementation that discards all progress notifications.
///
/// This is the default when no callback is configured.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clone this token and share it between threads; call
/// [`cancel`](CancellationToken::cancel) from any thread to abandon the
/// associated run. The session checks the token around every seek.
///
/// # Example
///
/// ```
/// use freezeframe::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation.
    ///
    /// All clones of this token will observe the cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Percentage reported after `samples_taken` samples.
pub(crate) fn running_percentage(samples_taken: u64, total_estimated: u64) -> f64 {
    let total = total_estimated.max(1) as f64;
    (100.0 * samples_taken as f64 / total).min(MAX_RUNNING_PERCENTAGE)
}

/// Internal helper that tracks progress timing and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    total_estimated: u64,
    current: u64,
    batch_size: u64,
    start_time: Instant,
    items_since_last_report: u64,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        total_estimated: u64,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            total_estimated,
            current: 0,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
            items_since_last_report: 0,
        }
    }

    /// Record one completed sample and fire the callback if the batch
    /// threshold is reached.
    pub(crate) fn advance(&mut self, timestamp_seconds: f64, duplicates_found: u64) {
        self.current += 1;
        self.items_since_last_report += 1;

        if self.items_since_last_report >= self.batch_size {
            self.report(timestamp_seconds, duplicates_found);
            self.items_since_last_report = 0;
        }
    }

    fn report(&self, timestamp_seconds: f64, duplicates_found: u64) {
        let elapsed = self.start_time.elapsed();

        let estimated_remaining = if self.current > 0 {
            let remaining = self.total_estimated.saturating_sub(self.current);
            Some(elapsed.div_f64(self.current as f64).mul_f64(remaining as f64))
        } else {
            None
        };

        let info = ProgressInfo {
            current: self.current,
            total_estimated: self.total_estimated,
            percentage: running_percentage(self.current, self.total_estimated),
            elapsed,
            estimated_remaining,
            current_timestamp: Duration::from_secs_f64(timestamp_seconds.max(0.0)),
            duplicates_found,
        };

        self.callback.on_progress(&info);
    }
}
