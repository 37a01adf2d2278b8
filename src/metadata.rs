//! Video metadata types.
//!
//! [`VideoMetadata`] is read once per analysis run from the
//! [`FrameSource`](crate::FrameSource) and is immutable afterwards.

/// Metadata for the video being analyzed.
///
/// # Example
///
/// ```
/// use freezeframe::VideoMetadata;
///
/// let metadata = VideoMetadata::new(10.0, 1920, 1080, 2_500_000);
/// assert_eq!(metadata.estimated_bitrate_bps(), 2_000_000.0);
/// assert_eq!(metadata.resolution(), "1920x1080");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoMetadata {
    /// Duration in seconds.
    pub duration_seconds: f64,
    /// Intrinsic frame width in pixels.
    pub width: u32,
    /// Intrinsic frame height in pixels.
    pub height: u32,
    /// Size of the underlying file in bytes (0 when unknown).
    pub file_size_bytes: u64,
    /// Codec name (e.g. `"h264"`), if the source knows it.
    pub codec: Option<String>,
}

impl VideoMetadata {
    /// Create metadata without a codec name.
    pub fn new(duration_seconds: f64, width: u32, height: u32, file_size_bytes: u64) -> Self {
        Self {
            duration_seconds,
            width,
            height,
            file_size_bytes,
            codec: None,
        }
    }

    /// Attach a codec name.
    pub fn with_codec(mut self, codec: impl Into<String>) -> Self {
        self.codec = Some(codec.into());
        self
    }

    /// Average bitrate implied by file size and duration, in bits per second.
    ///
    /// Returns `0.0` when the duration is not positive.
    pub fn estimated_bitrate_bps(&self) -> f64 {
        if self.duration_seconds > 0.0 {
            self.file_size_bytes as f64 * 8.0 / self.duration_seconds
        } else {
            0.0
        }
    }

    /// Resolution rendered as `"WIDTHxHEIGHT"`.
    pub fn resolution(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}
