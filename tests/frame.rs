//! Raster and metadata type tests.

use freezeframe::{FreezeFrameError, PixelBuffer, PixelLayout, VideoMetadata};
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

// ── PixelBuffer ────────────────────────────────────────────────────

#[test]
fn new_validates_length() {
    let ok = PixelBuffer::new(2, 2, PixelLayout::Rgb8, vec![0; 12]).unwrap();
    assert_eq!(ok.pixel_count(), 4);

    let error = PixelBuffer::new(2, 2, PixelLayout::Rgba8, vec![0; 12]).unwrap_err();
    assert!(matches!(
        error,
        FreezeFrameError::InvalidPixelBuffer {
            expected: 16,
            actual: 12
        }
    ));
}

#[test]
fn new_rejects_empty_dimensions() {
    let error = PixelBuffer::new(0, 10, PixelLayout::Rgb8, Vec::new()).unwrap_err();
    assert!(matches!(error, FreezeFrameError::InvalidParameter(_)));
}

#[test]
fn filled_sets_every_pixel() {
    let rgba = PixelBuffer::filled(3, 2, PixelLayout::Rgba8, [9, 8, 7]);

    assert_eq!(rgba.width(), 3);
    assert_eq!(rgba.height(), 2);
    assert_eq!(rgba.layout(), PixelLayout::Rgba8);
    assert_eq!(rgba.as_bytes().len(), 24);
    assert!(rgba.as_bytes().chunks_exact(4).all(|pixel| pixel == [9, 8, 7, 255]));
}

#[test]
fn put_rgb_writes_one_pixel() {
    let mut buffer = PixelBuffer::filled(3, 3, PixelLayout::Rgb8, [0, 0, 0]);
    buffer.put_rgb(2, 1, [1, 2, 3]);

    let offset = (3 + 2) * 3;
    assert_eq!(&buffer.as_bytes()[offset..offset + 3], &[1, 2, 3]);
    assert_eq!(buffer.as_bytes().iter().filter(|&&byte| byte != 0).count(), 3);
}

#[test]
#[should_panic(expected = "out of bounds")]
fn put_rgb_panics_outside_the_raster() {
    let mut buffer = PixelBuffer::filled(3, 3, PixelLayout::Rgb8, [0, 0, 0]);
    buffer.put_rgb(3, 0, [1, 2, 3]);
}

#[test]
fn layout_channels() {
    assert_eq!(PixelLayout::Rgb8.channels(), 3);
    assert_eq!(PixelLayout::Rgba8.channels(), 4);
    assert_eq!(PixelLayout::default(), PixelLayout::Rgb8);
}

#[test]
fn image_conversions_preserve_pixels() {
    let rgb = RgbImage::from_pixel(4, 3, Rgb([10, 20, 30]));
    let buffer = PixelBuffer::from(rgb.clone());
    assert_eq!(buffer.layout(), PixelLayout::Rgb8);
    assert_eq!(buffer.to_image().to_rgb8(), rgb);

    let rgba = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 4]));
    let buffer = PixelBuffer::from(rgba.clone());
    assert_eq!(buffer.layout(), PixelLayout::Rgba8);
    assert_eq!(buffer.to_image().to_rgba8(), rgba);
}

#[test]
fn dynamic_images_are_converted_to_rgb() {
    let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 2, Luma([77])));

    let buffer = PixelBuffer::try_from(gray).unwrap();

    assert_eq!(buffer.layout(), PixelLayout::Rgb8);
    assert!(buffer.as_bytes().iter().all(|&byte| byte == 77));
}

#[test]
fn empty_dynamic_image_is_rejected() {
    let empty = DynamicImage::new_rgb8(0, 0);
    assert!(PixelBuffer::try_from(empty).is_err());
}

#[test]
fn buffers_survive_a_png_round_trip() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("frame.png");

    let mut buffer = PixelBuffer::filled(5, 4, PixelLayout::Rgb8, [200, 100, 50]);
    buffer.put_rgb(0, 0, [0, 0, 0]);
    buffer.to_image().save(&path).unwrap();

    let reloaded = PixelBuffer::try_from(image::open(&path).unwrap()).unwrap();
    assert_eq!(reloaded, buffer);
}

#[test]
fn debug_output_omits_pixel_data() {
    let buffer = PixelBuffer::filled(64, 64, PixelLayout::Rgb8, [1, 1, 1]);
    let rendered = format!("{buffer:?}");

    assert!(rendered.contains("bytes: 12288"));
    assert!(rendered.len() < 200);
}

// ── VideoMetadata ──────────────────────────────────────────────────

#[test]
fn bitrate_is_derived_from_size_and_duration() {
    let metadata = VideoMetadata::new(10.0, 1920, 1080, 2_500_000);

    assert_eq!(metadata.estimated_bitrate_bps(), 2_000_000.0);
    assert_eq!(metadata.resolution(), "1920x1080");
    assert_eq!(metadata.codec, None);
}

#[test]
fn bitrate_is_zero_without_duration() {
    assert_eq!(VideoMetadata::new(0.0, 10, 10, 1_000).estimated_bitrate_bps(), 0.0);
}

#[test]
fn codec_can_be_attached() {
    let metadata = VideoMetadata::new(1.0, 640, 480, 0).with_codec("h264");
    assert_eq!(metadata.codec.as_deref(), Some("h264"));
}
