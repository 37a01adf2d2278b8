//! Shared helpers: an in-memory frame source with scripted content.

#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use freezeframe::{FrameSource, FreezeFrameError, PixelBuffer, PixelLayout, VideoMetadata};

pub const WIDTH: u32 = 100;
pub const HEIGHT: u32 = 100;
pub const BLOCK: u32 = 50;

type Renderer = Box<dyn Fn(u64) -> PixelBuffer + Send>;

/// Renders frame `n` (1-based) for any timestamp inside its interval
/// `[(n - 1) / fps, n / fps)`.
pub struct SyntheticSource {
    metadata: VideoMetadata,
    native_fps: f64,
    render: Renderer,
    fail_on_call: Option<usize>,
    pub decode_calls: Arc<AtomicUsize>,
    pub metadata_calls: usize,
    pub requested: Vec<f64>,
}

impl SyntheticSource {
    pub fn new(
        duration_seconds: f64,
        native_fps: f64,
        render: impl Fn(u64) -> PixelBuffer + Send + 'static,
    ) -> Self {
        Self {
            metadata: VideoMetadata::new(duration_seconds, WIDTH, HEIGHT, 250_000),
            native_fps,
            render: Box::new(render),
            fail_on_call: None,
            decode_calls: Arc::new(AtomicUsize::new(0)),
            metadata_calls: 0,
            requested: Vec::new(),
        }
    }

    /// Make the `call`-th decode (1-based) fail.
    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    pub fn with_metadata(mut self, metadata: VideoMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn calls(&self) -> usize {
        self.decode_calls.load(Ordering::SeqCst)
    }
}

impl FrameSource for SyntheticSource {
    fn metadata(&mut self) -> Result<VideoMetadata, FreezeFrameError> {
        self.metadata_calls += 1;
        Ok(self.metadata.clone())
    }

    fn seek_and_decode(&mut self, timestamp_seconds: f64) -> Result<PixelBuffer, FreezeFrameError> {
        let call = self.decode_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.requested.push(timestamp_seconds);

        if self.fail_on_call == Some(call) {
            return Err(FreezeFrameError::DecodeError {
                timestamp: timestamp_seconds,
                reason: "synthetic decode failure".to_string(),
            });
        }

        let frame_number = (timestamp_seconds * self.native_fps).floor() as u64 + 1;
        Ok((self.render)(frame_number))
    }
}

/// Black 100x100 raster with the top-left 50x50 block set to `value` gray.
pub fn block_frame(value: u8) -> PixelBuffer {
    let mut buffer = PixelBuffer::filled(WIDTH, HEIGHT, PixelLayout::Rgb8, [0, 0, 0]);
    for y in 0..BLOCK {
        for x in 0..BLOCK {
            buffer.put_rgb(x, y, [value, value, value]);
        }
    }
    buffer
}

/// Frames 5 through 8 repeat frame 4; every other frame toggles the block
/// between black and white.
pub fn frozen_middle(frame_number: u64) -> PixelBuffer {
    let effective = if (5..=8).contains(&frame_number) {
        4
    } else {
        frame_number
    };
    if effective % 2 == 0 {
        block_frame(255)
    } else {
        block_frame(0)
    }
}

/// The block changes by at least 40 gray levels on every frame.
pub fn always_changing(frame_number: u64) -> PixelBuffer {
    block_frame(((frame_number * 40) % 256) as u8)
}

/// A video where nothing ever moves.
pub fn static_frame(_frame_number: u64) -> PixelBuffer {
    block_frame(128)
}
