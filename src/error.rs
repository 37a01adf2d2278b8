//! Error types for the `freezeframe` crate.
//!
//! This module defines [`FreezeFrameError`], the unified error type returned by
//! all fallible operations in the crate. Every error is terminal for the
//! analysis run that produced it: nothing is retried and no partial result is
//! reported alongside it.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `freezeframe` operations.
///
/// Every public method that can fail returns `Result<T, FreezeFrameError>`.
/// Variants carry enough context to diagnose the problem without needing
/// additional logging at the call site.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FreezeFrameError {
    /// A caller-supplied parameter is out of range (for example a
    /// non-positive target frame rate or duration).
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Video metadata could not be read, or the video reports a non-positive
    /// duration.
    #[error("Failed to read video metadata from {path}: {reason}")]
    MetadataError {
        /// Path (or description) of the resource that was being opened.
        path: PathBuf,
        /// Underlying reason the metadata could not be read.
        reason: String,
    },

    /// The container does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// Seeking to or decoding the frame at `timestamp` seconds failed.
    #[error("Failed to decode frame at {timestamp:.3}s: {reason}")]
    DecodeError {
        /// Requested timestamp in seconds.
        timestamp: f64,
        /// Underlying reason decoding failed.
        reason: String,
    },

    /// Two consecutive rasters do not share the same dimensions.
    #[error(
        "Frame size mismatch: {previous_width}x{previous_height} followed by {current_width}x{current_height}"
    )]
    FrameSizeMismatch {
        /// Width of the earlier frame.
        previous_width: u32,
        /// Height of the earlier frame.
        previous_height: u32,
        /// Width of the later frame.
        current_width: u32,
        /// Height of the later frame.
        current_height: u32,
    },

    /// A pixel buffer's byte length does not match its declared dimensions.
    #[error("Invalid pixel buffer: expected {expected} bytes, got {actual}")]
    InvalidPixelBuffer {
        /// Byte length implied by width, height, and layout.
        expected: usize,
        /// Byte length actually supplied.
        actual: usize,
    },

    /// The run was abandoned via a [`CancellationToken`](crate::CancellationToken).
    #[error("Analysis cancelled")]
    Cancelled,

    /// A new run was requested while the session was still running.
    #[error("Analysis session is already running")]
    SessionBusy,

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate during raster conversion.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for FreezeFrameError {
    fn from(error: FfmpegError) -> Self {
        FreezeFrameError::FfmpegError(error.to_string())
    }
}

impl FreezeFrameError {
    /// Build a [`DecodeError`](FreezeFrameError::DecodeError) for `timestamp`.
    pub(crate) fn decode(timestamp: f64, reason: impl Into<String>) -> Self {
        FreezeFrameError::DecodeError {
            timestamp,
            reason: reason.into(),
        }
    }
}
