//! FFmpeg-backed [`FrameSource`].
//!
//! [`MediaFile`] opens a container with FFmpeg, caches the metadata of its
//! best video stream, and keeps one decoder alive across seeks. Each
//! [`seek_and_decode`](FrameSource::seek_and_decode) call seeks to the
//! nearest keyframe at or before the target, decodes forward, and returns
//! the frame that would be on screen at that instant. Timestamps count from
//! the first video frame, whatever the container's own start time.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::context::Input,
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};

use crate::error::FreezeFrameError;
use crate::frame::{PixelBuffer, PixelLayout};
use crate::metadata::VideoMetadata;
use crate::source::FrameSource;
use crate::utilities::{frame_to_buffer, known_timestamp, pts_to_seconds, seconds_to_seek_timestamp};

/// A video file opened for frame sampling.
///
/// # Example
///
/// ```no_run
/// use freezeframe::{FrameSource, FreezeFrameError, MediaFile, PixelLayout};
///
/// let mut media = MediaFile::open("input.mp4")?.with_pixel_layout(PixelLayout::Rgba8);
/// println!("{} ({:.2}s)", media.video_metadata().resolution(), media.video_metadata().duration_seconds);
///
/// let frame = media.seek_and_decode(1.5)?;
/// frame.to_image().save("frame_at_1.5s.png")?;
/// # Ok::<(), FreezeFrameError>(())
/// ```
pub struct MediaFile {
    input_context: Input,
    decoder: VideoDecoder,
    /// Created on the first conversion, rebuilt if the decoded format changes.
    scaler: Option<ScalingContext>,
    video_stream_index: usize,
    time_base: Rational,
    /// PTS of the first video frame; sample timestamps count from here.
    start_pts: i64,
    metadata: VideoMetadata,
    layout: PixelLayout,
    file_path: PathBuf,
    decoded_frame: VideoFrame,
    /// Latest decoded frame at or before the seek target.
    held_frame: VideoFrame,
    scaled_frame: VideoFrame,
}

// SAFETY: every FFmpeg context here is owned exclusively by this value and
// never shared, so moving it to another thread (e.g. a blocking worker) is
// sound. It is not `Sync`.
unsafe impl Send for MediaFile {}

impl Debug for MediaFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("MediaFile")
            .field("metadata", &self.metadata)
            .field("video_stream_index", &self.video_stream_index)
            .field("layout", &self.layout)
            .field("file_path", &self.file_path)
            .finish_non_exhaustive()
    }
}

impl MediaFile {
    /// Open a media file for sampling.
    ///
    /// Initializes FFmpeg (idempotent), opens the file, locates the best
    /// video stream, and caches its metadata.
    ///
    /// # Errors
    ///
    /// - [`FreezeFrameError::FfmpegError`] if the FFmpeg libraries fail to
    ///   initialise.
    /// - [`FreezeFrameError::MetadataError`] if the file cannot be opened or
    ///   its video decoder cannot be created.
    /// - [`FreezeFrameError::NoVideoStream`] if the file has no video.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FreezeFrameError> {
        let path = path.as_ref();
        let file_path = path.to_path_buf();
        let metadata_error = |reason: String| FreezeFrameError::MetadataError {
            path: file_path.clone(),
            reason,
        };

        log::debug!("Opening media file: {}", file_path.display());

        ffmpeg_next::init()?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| metadata_error(error.to_string()))?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or(FreezeFrameError::NoVideoStream)?;
        let video_stream_index = stream.index();
        let time_base = stream.time_base();
        let start_pts = known_timestamp(stream.start_time()).unwrap_or(0);

        let decoder = CodecContext::from_parameters(stream.parameters())
            .and_then(|context| context.decoder().video())
            .map_err(|error| {
                metadata_error(format!(
                    "Failed to create video decoder for stream {video_stream_index}: {error}"
                ))
            })?;

        // Container duration first; fall back to the stream's own duration.
        let container_microseconds = input_context.duration();
        let duration_seconds = if container_microseconds > 0 {
            container_microseconds as f64 / 1_000_000.0
        } else if stream.duration() > 0 {
            pts_to_seconds(stream.duration(), time_base)
        } else {
            0.0
        };

        let file_size_bytes = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

        let mut metadata =
            VideoMetadata::new(duration_seconds, decoder.width(), decoder.height(), file_size_bytes);
        if let Some(codec) = decoder.codec() {
            metadata = metadata.with_codec(codec.name());
        }

        log::info!(
            "Opened media file: {} ({}, {:.2}s, codec={}, starts at {:.3}s)",
            file_path.display(),
            metadata.resolution(),
            metadata.duration_seconds,
            metadata.codec.as_deref().unwrap_or("unknown"),
            pts_to_seconds(start_pts, time_base),
        );

        Ok(Self {
            input_context,
            decoder,
            scaler: None,
            video_stream_index,
            time_base,
            start_pts,
            metadata,
            layout: PixelLayout::default(),
            file_path,
            decoded_frame: VideoFrame::empty(),
            held_frame: VideoFrame::empty(),
            scaled_frame: VideoFrame::empty(),
        })
    }

    /// Choose the layout of decoded rasters. Defaults to [`PixelLayout::Rgb8`].
    #[must_use]
    pub fn with_pixel_layout(mut self, layout: PixelLayout) -> Self {
        if layout != self.layout {
            self.layout = layout;
            self.scaler = None;
        }
        self
    }

    /// Cached metadata read at open time.
    pub fn video_metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// Path this file was opened from.
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Scale the held frame to the output layout and copy it out.
    fn convert_held_frame(&mut self, timestamp: f64) -> Result<PixelBuffer, FreezeFrameError> {
        let width = self.metadata.width;
        let height = self.metadata.height;
        if width == 0 || height == 0 || self.held_frame.width() == 0 || self.held_frame.height() == 0 {
            return Err(FreezeFrameError::decode(
                timestamp,
                format!(
                    "decoder produced an empty frame ({}x{} for a {width}x{height} stream)",
                    self.held_frame.width(),
                    self.held_frame.height()
                ),
            ));
        }

        let source_format = self.held_frame.format();
        let source_width = self.held_frame.width();
        let source_height = self.held_frame.height();

        let stale = self.scaler.as_ref().is_some_and(|scaler| {
            let input = scaler.input();
            input.format != source_format
                || input.width != source_width
                || input.height != source_height
        });
        if stale {
            log::debug!("Decoded frame format changed; rebuilding scaler");
            self.scaler = None;
        }

        let mut scaler = match self.scaler.take() {
            Some(scaler) => scaler,
            None => ScalingContext::get(
                source_format,
                source_width,
                source_height,
                self.layout.to_ffmpeg_pixel(),
                width,
                height,
                ScalingFlags::BILINEAR,
            )
            .map_err(|error| {
                FreezeFrameError::decode(timestamp, format!("scaler setup failed: {error}"))
            })?,
        };
        let scaled = scaler.run(&self.held_frame, &mut self.scaled_frame);
        self.scaler = Some(scaler);
        scaled.map_err(|error| FreezeFrameError::decode(timestamp, error.to_string()))?;

        let data = frame_to_buffer(&self.scaled_frame, width, height, self.layout.channels());
        PixelBuffer::new(width, height, self.layout, data)
            .map_err(|error| FreezeFrameError::decode(timestamp, error.to_string()))
    }
}

/// Presentation time of a decoded frame in seconds after `start_pts`, if it
/// carries one.
fn presentation_seconds(frame: &VideoFrame, start_pts: i64, time_base: Rational) -> Option<f64> {
    frame
        .timestamp()
        .or_else(|| frame.pts())
        .map(|pts| pts_to_seconds(pts.saturating_sub(start_pts), time_base))
}

impl FrameSource for MediaFile {
    fn metadata(&mut self) -> Result<VideoMetadata, FreezeFrameError> {
        if self.metadata.duration_seconds.is_nan() || self.metadata.duration_seconds <= 0.0 {
            return Err(FreezeFrameError::MetadataError {
                path: self.file_path.clone(),
                reason: "container reports no positive duration".to_string(),
            });
        }
        if self.metadata.width == 0 || self.metadata.height == 0 {
            return Err(FreezeFrameError::MetadataError {
                path: self.file_path.clone(),
                reason: format!("video stream reports {} dimensions", self.metadata.resolution()),
            });
        }
        Ok(self.metadata.clone())
    }

    fn seek_and_decode(&mut self, timestamp_seconds: f64) -> Result<PixelBuffer, FreezeFrameError> {
        let target = seconds_to_seek_timestamp(
            timestamp_seconds,
            pts_to_seconds(self.start_pts, self.time_base),
        );
        self.input_context
            .seek(target, ..target)
            .map_err(|error| FreezeFrameError::decode(timestamp_seconds, error.to_string()))?;
        self.decoder.flush();

        let mut holding = false;
        let mut eof_sent = false;

        loop {
            while self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                let after_target = presentation_seconds(&self.decoded_frame, self.start_pts, self.time_base)
                    .is_some_and(|seconds| seconds > timestamp_seconds);

                if after_target {
                    // The seek landed past the target: use this frame.
                    if !holding {
                        std::mem::swap(&mut self.decoded_frame, &mut self.held_frame);
                    }
                    return self.convert_held_frame(timestamp_seconds);
                }

                std::mem::swap(&mut self.decoded_frame, &mut self.held_frame);
                holding = true;
            }

            if eof_sent {
                break;
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input_context) {
                Ok(()) => {
                    if packet.stream() == self.video_stream_index {
                        self.decoder.send_packet(&packet).map_err(|error| {
                            FreezeFrameError::decode(timestamp_seconds, error.to_string())
                        })?;
                    }
                }
                Err(FfmpegError::Eof) => {
                    self.decoder.send_eof().map_err(|error| {
                        FreezeFrameError::decode(timestamp_seconds, error.to_string())
                    })?;
                    eof_sent = true;
                }
                Err(error) => {
                    // Non-fatal read error; try the next packet.
                    log::trace!("Skipping unreadable packet: {error}");
                }
            }
        }

        if holding {
            self.convert_held_frame(timestamp_seconds)
        } else {
            Err(FreezeFrameError::decode(
                timestamp_seconds,
                "end of stream reached before any frame was decoded",
            ))
        }
    }
}
