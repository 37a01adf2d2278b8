//! Analysis configuration.
//!
//! [`AnalysisOptions`] is a builder that threads the target frame rate,
//! thresholds, progress callbacks, and cancellation tokens into an
//! [`AnalysisSession`](crate::AnalysisSession) without polluting its
//! constructor.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use freezeframe::{AnalysisOptions, CancellationToken, ProgressCallback, ProgressInfo};
//!
//! struct LogProgress;
//! impl ProgressCallback for LogProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("{} samples done", info.current);
//!     }
//! }
//!
//! let token = CancellationToken::new();
//! let options = AnalysisOptions::new()
//!     .with_target_fps(24.0)
//!     .with_pixel_threshold(30)
//!     .with_duplicate_threshold(0.9999)
//!     .with_progress(Arc::new(LogProgress))
//!     .with_cancellation(token.clone())
//!     .with_batch_size(10);
//! assert_eq!(options.target_fps(), 24.0);
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::classify::{DEFAULT_DUPLICATE_THRESHOLD, DuplicateClassifier};
use crate::difference::{DEFAULT_PIXEL_THRESHOLD, FrameDifferencer};
use crate::error::FreezeFrameError;
use crate::progress::{CancellationToken, NoOpProgress, ProgressCallback};
use crate::schedule::validate_target_fps;

/// Sampling rate used when none is configured.
pub const DEFAULT_TARGET_FPS: f64 = 30.0;

/// Configuration for an analysis run.
///
/// All fields have defaults: 30 fps, pixel threshold 30, duplicate threshold
/// 0.9999, no progress callback, no cancellation, batch size 1.
#[derive(Clone)]
pub struct AnalysisOptions {
    /// Caller-declared sampling rate. Never auto-detected.
    pub(crate) target_fps: f64,
    /// Grayscale difference a pixel must exceed to count as changed.
    pub(crate) pixel_threshold: u8,
    /// Similarity a sample must exceed to count as a duplicate.
    pub(crate) duplicate_threshold: f64,
    /// Progress callback. Defaults to a no-op.
    pub(crate) progress: Arc<dyn ProgressCallback>,
    /// Cancellation token. `None` means never cancelled.
    pub(crate) cancellation: Option<CancellationToken>,
    /// How often to fire the progress callback (every N samples).
    pub(crate) batch_size: u64,
}

impl Debug for AnalysisOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AnalysisOptions")
            .field("target_fps", &self.target_fps)
            .field("pixel_threshold", &self.pixel_threshold)
            .field("duplicate_threshold", &self.duplicate_threshold)
            .field("has_cancellation", &self.cancellation.is_some())
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisOptions {
    /// Create a new configuration with default settings.
    pub fn new() -> Self {
        Self {
            target_fps: DEFAULT_TARGET_FPS,
            pixel_threshold: DEFAULT_PIXEL_THRESHOLD,
            duplicate_threshold: DEFAULT_DUPLICATE_THRESHOLD,
            progress: Arc::new(NoOpProgress),
            cancellation: None,
            batch_size: 1,
        }
    }

    /// Set the sampling rate in samples per second.
    ///
    /// This should be the video's real frame rate; it is not read from the
    /// container. Validated when the run starts.
    #[must_use]
    pub fn with_target_fps(mut self, fps: f64) -> Self {
        self.target_fps = fps;
        self
    }

    /// Set the per-pixel grayscale difference threshold.
    #[must_use]
    pub fn with_pixel_threshold(mut self, threshold: u8) -> Self {
        self.pixel_threshold = threshold;
        self
    }

    /// Set the similarity above which a sample is a duplicate.
    ///
    /// Must lie within `[0, 1]`; validated when the run starts.
    #[must_use]
    pub fn with_duplicate_threshold(mut self, threshold: f64) -> Self {
        self.duplicate_threshold = threshold;
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token.
    ///
    /// When the token is cancelled, the run stops at the next seek and
    /// returns [`FreezeFrameError::Cancelled`].
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Set how often the progress callback fires.
    ///
    /// A value of 1 means every sample; 10 means every 10th sample.
    /// Clamped to a minimum of 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// The configured sampling rate.
    pub fn target_fps(&self) -> f64 {
        self.target_fps
    }

    /// The configured per-pixel threshold.
    pub fn pixel_threshold(&self) -> u8 {
        self.pixel_threshold
    }

    /// The configured duplicate threshold.
    pub fn duplicate_threshold(&self) -> f64 {
        self.duplicate_threshold
    }

    /// Returns `true` if cancellation has been requested.
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }

    /// Validate the numeric settings and build the comparison stages.
    pub(crate) fn build_stages(
        &self,
    ) -> Result<(FrameDifferencer, DuplicateClassifier), FreezeFrameError> {
        validate_target_fps(self.target_fps)?;
        let classifier = DuplicateClassifier::new(self.duplicate_threshold)?;
        Ok((FrameDifferencer::new(self.pixel_threshold), classifier))
    }
}
