//! Frame differencing.
//!
//! [`FrameDifferencer`] scores how similar two rasters are using the classic
//! `absdiff` → BGR-to-gray → binary `threshold` pipeline:
//!
//! 1. per-channel absolute difference of R, G and B;
//! 2. `gray = floor(0.299 * dR + 0.587 * dG + 0.114 * dB)`;
//! 3. `mask = 255` where `gray > pixel_threshold`, else `0`;
//! 4. `similarity = 1 - sum(mask) / (width * height * 255)`.
//!
//! The grayscale step truncates. Rounding it instead changes which pixels
//! cross the threshold, so results would no longer match reference output.
//!
//! With the `rayon` feature the mask sum is split across threads by rows.
//! The sum is integral, so both paths return identical values.

use crate::error::FreezeFrameError;
use crate::frame::PixelBuffer;

/// Default per-pixel grayscale difference threshold.
pub const DEFAULT_PIXEL_THRESHOLD: u8 = 30;

/// Grayscale magnitude of a per-channel difference, truncated toward zero.
///
/// # Example
///
/// ```
/// use freezeframe::difference::gray_difference;
///
/// assert_eq!(gray_difference(0, 0, 0), 0);
/// assert_eq!(gray_difference(255, 255, 255), 255);
/// // 0.299 * 100 = 29.9, truncated.
/// assert_eq!(gray_difference(100, 0, 0), 29);
/// ```
#[inline]
pub fn gray_difference(diff_r: u8, diff_g: u8, diff_b: u8) -> u8 {
    let gray = 0.299 * f64::from(diff_r) + 0.587 * f64::from(diff_g) + 0.114 * f64::from(diff_b);
    gray.floor() as u8
}

/// Computes similarity scores between consecutive rasters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDifferencer {
    pixel_threshold: u8,
}

impl Default for FrameDifferencer {
    fn default() -> Self {
        Self::new(DEFAULT_PIXEL_THRESHOLD)
    }
}

impl FrameDifferencer {
    /// Create a differencer that flags pixels whose grayscale difference is
    /// strictly greater than `pixel_threshold`.
    pub fn new(pixel_threshold: u8) -> Self {
        Self { pixel_threshold }
    }

    /// The per-pixel threshold in use.
    pub fn pixel_threshold(&self) -> u8 {
        self.pixel_threshold
    }

    /// Similarity of `previous` and `current`, in `[0, 1]`.
    ///
    /// Identical rasters score exactly `1.0`; rasters where every pixel
    /// crosses the threshold score exactly `0.0`. Buffers may use different
    /// [`PixelLayout`](crate::PixelLayout)s; only R, G and B are compared.
    ///
    /// # Errors
    ///
    /// - [`FreezeFrameError::FrameSizeMismatch`] if the dimensions differ.
    /// - [`FreezeFrameError::InvalidParameter`] if the rasters have no pixels.
    ///
    /// # Example
    ///
    /// ```
    /// use freezeframe::{FrameDifferencer, PixelBuffer, PixelLayout};
    ///
    /// let black = PixelBuffer::filled(8, 8, PixelLayout::Rgb8, [0, 0, 0]);
    /// let white = PixelBuffer::filled(8, 8, PixelLayout::Rgba8, [255, 255, 255]);
    ///
    /// let differencer = FrameDifferencer::default();
    /// assert_eq!(differencer.similarity(&black, &black)?, 1.0);
    /// assert_eq!(differencer.similarity(&black, &white)?, 0.0);
    /// # Ok::<(), freezeframe::FreezeFrameError>(())
    /// ```
    pub fn similarity(
        &self,
        previous: &PixelBuffer,
        current: &PixelBuffer,
    ) -> Result<f64, FreezeFrameError> {
        if previous.width() != current.width() || previous.height() != current.height() {
            return Err(FreezeFrameError::FrameSizeMismatch {
                previous_width: previous.width(),
                previous_height: previous.height(),
                current_width: current.width(),
                current_height: current.height(),
            });
        }

        let pixel_count = previous.pixel_count();
        if pixel_count == 0 {
            return Err(FreezeFrameError::InvalidParameter(
                "cannot compare rasters with no pixels".to_string(),
            ));
        }

        let mask_sum = self.mask_sum(previous, current);
        Ok(1.0 - mask_sum as f64 / (pixel_count as f64 * 255.0))
    }

    /// Sum of the binary mask over every pixel.
    #[cfg(not(feature = "rayon"))]
    fn mask_sum(&self, previous: &PixelBuffer, current: &PixelBuffer) -> u64 {
        mask_sum_rows(
            previous.as_bytes(),
            previous.layout().channels(),
            current.as_bytes(),
            current.layout().channels(),
            self.pixel_threshold,
        )
    }

    #[cfg(feature = "rayon")]
    fn mask_sum(&self, previous: &PixelBuffer, current: &PixelBuffer) -> u64 {
        use rayon::iter::{IndexedParallelIterator, ParallelIterator};
        use rayon::slice::ParallelSlice;

        let previous_channels = previous.layout().channels();
        let current_channels = current.layout().channels();
        let width = previous.width() as usize;
        let threshold = self.pixel_threshold;

        previous
            .as_bytes()
            .par_chunks(width * previous_channels)
            .zip(current.as_bytes().par_chunks(width * current_channels))
            .map(|(previous_row, current_row)| {
                mask_sum_rows(
                    previous_row,
                    previous_channels,
                    current_row,
                    current_channels,
                    threshold,
                )
            })
            .sum()
    }
}

fn mask_sum_rows(
    previous: &[u8],
    previous_channels: usize,
    current: &[u8],
    current_channels: usize,
    threshold: u8,
) -> u64 {
    previous
        .chunks_exact(previous_channels)
        .zip(current.chunks_exact(current_channels))
        .map(|(a, b)| {
            let gray = gray_difference(a[0].abs_diff(b[0]), a[1].abs_diff(b[1]), a[2].abs_diff(b[2]));
            if gray > threshold { 255_u64 } else { 0 }
        })
        .sum()
}
