//! Decoded rasters and sampled frames.
//!
//! A [`PixelBuffer`] is a tightly packed 8-bit RGB or RGBA raster, the unit
//! exchanged between a [`FrameSource`](crate::FrameSource) and the
//! differencer. A [`FrameSample`] ties a buffer to its position in the
//! sampling schedule.

use ffmpeg_next::format::Pixel;
use image::{DynamicImage, RgbImage, RgbaImage};

use crate::error::FreezeFrameError;

/// Byte layout of one pixel in a [`PixelBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelLayout {
    /// 8-bit RGB (24 bpp). This is the default.
    #[default]
    Rgb8,
    /// 8-bit RGBA (32 bpp). The alpha channel is ignored by the differencer.
    Rgba8,
}

impl PixelLayout {
    /// Number of bytes per pixel.
    pub fn channels(self) -> usize {
        match self {
            PixelLayout::Rgb8 => 3,
            PixelLayout::Rgba8 => 4,
        }
    }

    /// Map to the corresponding FFmpeg pixel format constant.
    pub(crate) fn to_ffmpeg_pixel(self) -> Pixel {
        match self {
            PixelLayout::Rgb8 => Pixel::RGB24,
            PixelLayout::Rgba8 => Pixel::RGBA,
        }
    }
}

/// An owned, tightly packed raster of `width * height` pixels.
///
/// # Example
///
/// ```
/// use freezeframe::{PixelBuffer, PixelLayout};
///
/// let black = PixelBuffer::filled(4, 2, PixelLayout::Rgb8, [0, 0, 0]);
/// assert_eq!(black.as_bytes().len(), 4 * 2 * 3);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    layout: PixelLayout,
    data: Vec<u8>,
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("layout", &self.layout)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl PixelBuffer {
    /// Wrap raw bytes as a raster.
    ///
    /// # Errors
    ///
    /// - [`FreezeFrameError::InvalidParameter`] if either dimension is zero.
    /// - [`FreezeFrameError::InvalidPixelBuffer`] if `data` is not exactly
    ///   `width * height * layout.channels()` bytes.
    pub fn new(
        width: u32,
        height: u32,
        layout: PixelLayout,
        data: Vec<u8>,
    ) -> Result<Self, FreezeFrameError> {
        if width == 0 || height == 0 {
            return Err(FreezeFrameError::InvalidParameter(format!(
                "pixel buffer dimensions must be positive, got {width}x{height}"
            )));
        }
        let expected = width as usize * height as usize * layout.channels();
        if data.len() != expected {
            return Err(FreezeFrameError::InvalidPixelBuffer {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    /// A raster with every pixel set to `rgb` (alpha 255 for RGBA).
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn filled(width: u32, height: u32, layout: PixelLayout, rgb: [u8; 3]) -> Self {
        assert!(width > 0 && height > 0, "pixel buffer dimensions must be positive");
        let pixel: &[u8] = match layout {
            PixelLayout::Rgb8 => &rgb,
            PixelLayout::Rgba8 => &[rgb[0], rgb[1], rgb[2], 255],
        };
        let data = pixel.repeat(width as usize * height as usize);
        Self {
            width,
            height,
            layout,
            data,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels.
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Pixel layout.
    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    /// Raw packed bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Set the RGB value of the pixel at (`x`, `y`).
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    pub fn put_rgb(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let channels = self.layout.channels();
        let offset = (y as usize * self.width as usize + x as usize) * channels;
        self.data[offset..offset + 3].copy_from_slice(&rgb);
    }

    /// Convert to an [`image::DynamicImage`] (e.g. to save a frame to disk).
    pub fn to_image(&self) -> DynamicImage {
        match self.layout {
            PixelLayout::Rgb8 => RgbImage::from_raw(self.width, self.height, self.data.clone())
                .map(DynamicImage::ImageRgb8),
            PixelLayout::Rgba8 => RgbaImage::from_raw(self.width, self.height, self.data.clone())
                .map(DynamicImage::ImageRgba8),
        }
        // Length is validated at construction.
        .unwrap_or_else(|| DynamicImage::new_rgb8(self.width, self.height))
    }
}

impl From<RgbImage> for PixelBuffer {
    fn from(image: RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            layout: PixelLayout::Rgb8,
            data: image.into_raw(),
        }
    }
}

impl From<RgbaImage> for PixelBuffer {
    fn from(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            layout: PixelLayout::Rgba8,
            data: image.into_raw(),
        }
    }
}

impl TryFrom<DynamicImage> for PixelBuffer {
    type Error = FreezeFrameError;

    /// RGBA images keep their layout; every other color model is converted
    /// to 8-bit RGB.
    fn try_from(image: DynamicImage) -> Result<Self, Self::Error> {
        if image.width() == 0 || image.height() == 0 {
            return Err(FreezeFrameError::InvalidParameter(
                "image has no pixels".to_string(),
            ));
        }
        Ok(match image {
            DynamicImage::ImageRgba8(rgba) => rgba.into(),
            other => other.into_rgb8().into(),
        })
    }
}

/// One decoded frame taken at a scheduled timestamp.
#[derive(Debug, Clone)]
pub struct FrameSample {
    /// 1-based position in the sampled sequence.
    pub index: u64,
    /// Requested timestamp in seconds.
    pub timestamp_seconds: f64,
    /// The decoded raster.
    pub pixels: PixelBuffer,
}
