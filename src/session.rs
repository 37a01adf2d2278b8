//! The analysis session controller.
//!
//! [`AnalysisSession`] owns one [`FrameSource`] and drives a run from start
//! to finish: it reads metadata, walks the [`SamplingPlan`], decodes each
//! scheduled frame, compares it with the previous sample, and accumulates
//! duplicates. Only the previous and the current raster are alive at any
//! time.
//!
//! # Example
//!
//! ```no_run
//! use freezeframe::{AnalysisOptions, AnalysisSession, FreezeFrameError, MediaFile};
//!
//! let source = MediaFile::open("input.mp4")?;
//! let mut session = AnalysisSession::new(source, AnalysisOptions::new().with_target_fps(25.0));
//!
//! let result = session.run()?;
//! println!(
//!     "{} of {} frames duplicated ({:.4}%)",
//!     result.duplicate_count,
//!     result.total_frames,
//!     result.duplicate_ratio * 100.0,
//! );
//! # Ok::<(), FreezeFrameError>(())
//! ```

use crate::classify::DuplicateClassifier;
use crate::configuration::AnalysisOptions;
use crate::difference::FrameDifferencer;
use crate::error::FreezeFrameError;
use crate::frame::FrameSample;
use crate::metadata::VideoMetadata;
use crate::progress::ProgressTracker;
use crate::report::{AnalysisResult, DuplicateRecord};
use crate::schedule::SamplingPlan;
use crate::source::FrameSource;

/// Lifecycle state of an [`AnalysisSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No run in progress (initial state, and the state after cancellation).
    #[default]
    Idle,
    /// Reading metadata from the source.
    Loading,
    /// Sampling frames.
    Running,
    /// The last run finished and produced a result.
    Completed,
    /// The last run failed.
    Failed,
}

/// Drives duplicate-frame analysis over a single [`FrameSource`].
pub struct AnalysisSession<S: FrameSource> {
    source: S,
    options: AnalysisOptions,
    state: SessionState,
    result: Option<AnalysisResult>,
}

impl<S: FrameSource> std::fmt::Debug for AnalysisSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisSession")
            .field("options", &self.options)
            .field("state", &self.state)
            .field("has_result", &self.result.is_some())
            .finish_non_exhaustive()
    }
}

impl<S: FrameSource> AnalysisSession<S> {
    /// Create an idle session.
    pub fn new(source: S, options: AnalysisOptions) -> Self {
        Self {
            source,
            options,
            state: SessionState::Idle,
            result: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Result of the last successful run, if the session is `Completed`.
    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    /// The options this session runs with.
    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Replace the options used by subsequent runs.
    ///
    /// # Errors
    ///
    /// Returns [`FreezeFrameError::SessionBusy`] while a run is in progress.
    pub fn set_options(&mut self, options: AnalysisOptions) -> Result<(), FreezeFrameError> {
        self.ensure_not_running()?;
        self.options = options;
        Ok(())
    }

    /// Borrow the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Give the source back, dropping the session.
    pub fn into_source(self) -> S {
        self.source
    }

    /// Run a complete analysis.
    ///
    /// Any previous result is discarded first. On success the session is
    /// `Completed` and the result is also available via
    /// [`result`](AnalysisSession::result).
    ///
    /// # Errors
    ///
    /// - [`FreezeFrameError::SessionBusy`] if a run is already in progress.
    /// - [`FreezeFrameError::InvalidParameter`] for a bad target fps or
    ///   threshold, before anything is read from the source.
    /// - [`FreezeFrameError::MetadataError`] if metadata cannot be read or
    ///   reports a non-positive duration or an empty frame size.
    /// - [`FreezeFrameError::DecodeError`] (or another source error) if any
    ///   scheduled frame fails to decode. The run aborts; no partial result.
    /// - [`FreezeFrameError::Cancelled`] if the cancellation token fired. The
    ///   session returns to `Idle`.
    ///
    /// If the source panics, the session is left `Failed` and can be run
    /// again.
    pub fn run(&mut self) -> Result<AnalysisResult, FreezeFrameError> {
        self.ensure_not_running()?;
        self.result = None;

        let (differencer, classifier) = match self.options.build_stages() {
            Ok(stages) => stages,
            Err(error) => {
                self.state = SessionState::Failed;
                return Err(error);
            }
        };

        self.state = SessionState::Loading;
        let outcome = RunGuard(self).execute(&differencer, &classifier);

        match outcome {
            Ok(result) => {
                log::info!(
                    "Analysis complete: {} samples, {} duplicates",
                    result.total_frames,
                    result.duplicate_count
                );
                self.state = SessionState::Completed;
                self.result = Some(result.clone());
                Ok(result)
            }
            Err(FreezeFrameError::Cancelled) => {
                log::debug!("Analysis cancelled");
                self.state = SessionState::Idle;
                Err(FreezeFrameError::Cancelled)
            }
            Err(error) => {
                log::warn!("Analysis failed: {error}");
                self.state = SessionState::Failed;
                Err(error)
            }
        }
    }

    fn ensure_not_running(&self) -> Result<(), FreezeFrameError> {
        match self.state {
            SessionState::Loading | SessionState::Running => Err(FreezeFrameError::SessionBusy),
            _ => Ok(()),
        }
    }

    /// Fetch metadata and derive the sampling plan.
    fn load(&mut self) -> Result<(VideoMetadata, SamplingPlan), FreezeFrameError> {
        if self.options.is_cancelled() {
            return Err(FreezeFrameError::Cancelled);
        }

        let metadata = self.source.metadata()?;
        if !(metadata.duration_seconds.is_finite() && metadata.duration_seconds > 0.0) {
            return Err(FreezeFrameError::MetadataError {
                path: "<frame source>".into(),
                reason: format!(
                    "non-positive duration reported: {}",
                    metadata.duration_seconds
                ),
            });
        }
        if metadata.width == 0 || metadata.height == 0 {
            return Err(FreezeFrameError::MetadataError {
                path: "<frame source>".into(),
                reason: format!("empty frame size reported: {}", metadata.resolution()),
            });
        }

        let plan = SamplingPlan::new(metadata.duration_seconds, self.options.target_fps)?;

        log::debug!(
            "Loaded {} video, {:.3}s; sampling at {} fps (~{} samples)",
            metadata.resolution(),
            metadata.duration_seconds,
            plan.target_fps(),
            plan.total_estimated_samples()
        );

        Ok((metadata, plan))
    }

    fn execute(
        &mut self,
        differencer: &FrameDifferencer,
        classifier: &DuplicateClassifier,
    ) -> Result<AnalysisResult, FreezeFrameError> {
        let (metadata, plan) = self.load()?;

        self.state = SessionState::Running;
        let (total_frames, record) = self.sample(&plan, differencer, classifier)?;

        Ok(AnalysisResult::new(&metadata, &plan, total_frames, record))
    }

    /// The sampling loop. Returns the number of samples taken and the
    /// duplicate record.
    fn sample(
        &mut self,
        plan: &SamplingPlan,
        differencer: &FrameDifferencer,
        classifier: &DuplicateClassifier,
    ) -> Result<(u64, DuplicateRecord), FreezeFrameError> {
        let mut tracker = ProgressTracker::new(
            self.options.progress.clone(),
            plan.total_estimated_samples(),
            self.options.batch_size,
        );
        let mut record = DuplicateRecord::new();
        let mut previous: Option<FrameSample> = None;
        let mut samples_taken = 0_u64;

        for point in plan.schedule() {
            if self.options.is_cancelled() {
                return Err(FreezeFrameError::Cancelled);
            }

            let pixels = self.source.seek_and_decode(point.timestamp_seconds)?;

            if self.options.is_cancelled() {
                return Err(FreezeFrameError::Cancelled);
            }

            let current = FrameSample {
                index: point.index(),
                timestamp_seconds: point.timestamp_seconds,
                pixels,
            };

            if let Some(previous) = &previous {
                let similarity = differencer.similarity(&previous.pixels, &current.pixels)?;
                if classifier.is_duplicate(similarity) {
                    log::trace!(
                        "Sample {} at {:.3}s duplicates sample {} (similarity {similarity})",
                        current.index,
                        current.timestamp_seconds,
                        previous.index
                    );
                    record.push(current.index);
                }
            }

            previous = Some(current);
            samples_taken += 1;
            tracker.advance(point.timestamp_seconds, record.len() as u64);
        }

        Ok((samples_taken, record))
    }
}

/// Marks the session `Failed` if a run unwinds out of the source.
struct RunGuard<'a, S: FrameSource>(&'a mut AnalysisSession<S>);

impl<S: FrameSource> std::ops::Deref for RunGuard<'_, S> {
    type Target = AnalysisSession<S>;

    fn deref(&self) -> &Self::Target {
        self.0
    }
}

impl<S: FrameSource> std::ops::DerefMut for RunGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0
    }
}

impl<S: FrameSource> Drop for RunGuard<'_, S> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            log::warn!("Analysis aborted by a panic");
            self.0.state = SessionState::Failed;
        }
    }
}
