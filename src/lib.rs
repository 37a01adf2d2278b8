//! # freezeframe
//!
//! Find duplicated (frozen) frames in video files.
//!
//! `freezeframe` samples a video at a caller-declared frame rate, compares
//! each sample with the one before it using a thresholded grayscale
//! difference, and reports which samples are near-identical to their
//! predecessor. Decoding is powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate; any other
//! decoder can be plugged in through the [`FrameSource`] trait.
//!
//! ## Quick Start
//!
//! ### Analyze a File
//!
//! ```no_run
//! use freezeframe::{AnalysisOptions, AnalysisSession, MediaFile};
//!
//! let source = MediaFile::open("input.mp4").unwrap();
//! let mut session = AnalysisSession::new(source, AnalysisOptions::new().with_target_fps(30.0));
//!
//! let result = session.run().unwrap();
//! println!("{} duplicates: {:?}", result.duplicate_count, result.duplicate_indices);
//! ```
//!
//! ### Compare Two Rasters
//!
//! ```
//! use freezeframe::{FrameDifferencer, PixelBuffer, PixelLayout};
//!
//! let black = PixelBuffer::filled(8, 8, PixelLayout::Rgb8, [0, 0, 0]);
//! let white = PixelBuffer::filled(8, 8, PixelLayout::Rgb8, [255, 255, 255]);
//!
//! let differencer = FrameDifferencer::default();
//! assert_eq!(differencer.similarity(&black, &black).unwrap(), 1.0);
//! assert_eq!(differencer.similarity(&black, &white).unwrap(), 0.0);
//! ```
//!
//! ## How It Works
//!
//! - **Sampling**: sample `n` (0-based) is taken at `(n + 0.5) / fps`
//!   seconds, for about `floor(duration * fps)` samples.
//! - **Differencing**: per pixel, the absolute RGB difference is reduced to
//!   grayscale with BT.601 weights and thresholded at 30.
//! - **Classification**: a sample whose similarity to its predecessor
//!   exceeds 0.9999 is a duplicate.
//! - **Progress & cancellation**: cooperative callbacks and a
//!   [`CancellationToken`] checked around every seek.
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `async` | [`AnalysisStream`] runs a session in the background via Tokio |
//! | `rayon` | Frame differencing is split across rayon threads by row |
//! | `full` | Enables all of the above |
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod classify;
pub mod configuration;
pub mod difference;
pub mod error;
pub mod ffmpeg;
pub mod frame;
pub mod media_file;
pub mod metadata;
pub mod progress;
pub mod report;
pub mod schedule;
pub mod session;
pub mod source;
#[cfg(feature = "async")]
pub mod stream;
mod utilities;

pub use classify::{DEFAULT_DUPLICATE_THRESHOLD, DuplicateClassifier};
pub use configuration::{AnalysisOptions, DEFAULT_TARGET_FPS};
pub use difference::{DEFAULT_PIXEL_THRESHOLD, FrameDifferencer, gray_difference};
pub use error::FreezeFrameError;
pub use ffmpeg::{FfmpegLogLevel, get_ffmpeg_log_level, set_ffmpeg_log_level};
pub use frame::{FrameSample, PixelBuffer, PixelLayout};
pub use media_file::MediaFile;
pub use metadata::VideoMetadata;
pub use progress::{CancellationToken, MAX_RUNNING_PERCENTAGE, ProgressCallback, ProgressInfo};
pub use report::{AnalysisResult, DuplicateRecord};
pub use schedule::{EDGE_TOLERANCE_SAMPLES, SamplePoint, SampleSchedule, SamplingPlan};
pub use session::{AnalysisSession, SessionState};
pub use source::FrameSource;
#[cfg(feature = "async")]
pub use stream::{AnalysisEvent, AnalysisStream};
