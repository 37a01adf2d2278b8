//! Internal FFmpeg helpers.
//!
//! Pixel-data copying and timestamp conversion shared by the FFmpeg-backed
//! frame source.

use ffmpeg_next::{Rational, frame::Video as VideoFrame};

/// FFmpeg's internal time base, in ticks per second.
const AV_TIME_BASE: f64 = 1_000_000.0;

/// FFmpeg's `AV_NOPTS_VALUE`.
const NO_TIMESTAMP: i64 = i64::MIN;

/// Copy pixel data from an FFmpeg video frame into a tightly packed buffer.
///
/// FFmpeg frames frequently carry per-row padding (stride > width × bpp).
/// This strips the padding so the result can back a
/// [`PixelBuffer`](crate::PixelBuffer) directly.
pub(crate) fn frame_to_buffer(
    video_frame: &VideoFrame,
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let row_bytes = (width as usize) * bytes_per_pixel;
    let data = video_frame.data(0);

    if stride == row_bytes {
        data[..row_bytes * (height as usize)].to_vec()
    } else {
        data.chunks(stride)
            .take(height as usize)
            .flat_map(|row| &row[..row_bytes])
            .copied()
            .collect()
    }
}

/// Convert seconds from the start of the video to a container seek target
/// in AV_TIME_BASE units.
///
/// `input_context.seek()` with no stream index expects absolute microseconds,
/// so the video's own start time (`start_seconds`) is added back on.
pub(crate) fn seconds_to_seek_timestamp(seconds: f64, start_seconds: f64) -> i64 {
    ((seconds.max(0.0) + start_seconds) * AV_TIME_BASE) as i64
}

/// `None` for FFmpeg's "no timestamp" sentinel.
pub(crate) fn known_timestamp(timestamp: i64) -> Option<i64> {
    (timestamp != NO_TIMESTAMP).then_some(timestamp)
}

/// Rescale a PTS value from a stream time base to seconds.
pub(crate) fn pts_to_seconds(pts: i64, time_base: Rational) -> f64 {
    pts as f64 * f64::from(time_base.numerator()) / f64::from(time_base.denominator().max(1))
}
