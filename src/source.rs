//! The frame source abstraction.
//!
//! An [`AnalysisSession`](crate::AnalysisSession) pulls everything it needs
//! from a [`FrameSource`]: metadata once, then one decoded raster per
//! scheduled timestamp. [`MediaFile`](crate::MediaFile) is the FFmpeg-backed
//! implementation; tests and embedders can supply their own.

use crate::error::FreezeFrameError;
use crate::frame::PixelBuffer;
use crate::metadata::VideoMetadata;

/// A seekable producer of decoded video frames.
///
/// Both methods may block. Implementations do not need to be frame-accurate:
/// `seek_and_decode` returns its best-effort frame at or near the requested
/// instant, and the analysis accepts whatever raster comes back.
///
/// # Example
///
/// ```
/// use freezeframe::{FrameSource, FreezeFrameError, PixelBuffer, PixelLayout, VideoMetadata};
///
/// /// One second of solid gray.
/// struct Gray;
///
/// impl FrameSource for Gray {
///     fn metadata(&mut self) -> Result<VideoMetadata, FreezeFrameError> {
///         Ok(VideoMetadata::new(1.0, 16, 16, 0))
///     }
///
///     fn seek_and_decode(&mut self, _timestamp: f64) -> Result<PixelBuffer, FreezeFrameError> {
///         Ok(PixelBuffer::filled(16, 16, PixelLayout::Rgb8, [128, 128, 128]))
///     }
/// }
/// ```
pub trait FrameSource {
    /// Read duration and intrinsic resolution.
    ///
    /// # Errors
    ///
    /// Implementations return [`FreezeFrameError::MetadataError`] when the
    /// resource is unreadable or reports a non-positive duration.
    fn metadata(&mut self) -> Result<VideoMetadata, FreezeFrameError>;

    /// Seek to `timestamp_seconds` and decode the frame shown there.
    ///
    /// # Errors
    ///
    /// Implementations return [`FreezeFrameError::DecodeError`] when the
    /// frame cannot be produced.
    fn seek_and_decode(&mut self, timestamp_seconds: f64) -> Result<PixelBuffer, FreezeFrameError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn metadata(&mut self) -> Result<VideoMetadata, FreezeFrameError> {
        (**self).metadata()
    }

    fn seek_and_decode(&mut self, timestamp_seconds: f64) -> Result<PixelBuffer, FreezeFrameError> {
        (**self).seek_and_decode(timestamp_seconds)
    }
}

impl<S: FrameSource + ?Sized> FrameSource for &mut S {
    fn metadata(&mut self) -> Result<VideoMetadata, FreezeFrameError> {
        (**self).metadata()
    }

    fn seek_and_decode(&mut self, timestamp_seconds: f64) -> Result<PixelBuffer, FreezeFrameError> {
        (**self).seek_and_decode(timestamp_seconds)
    }
}
