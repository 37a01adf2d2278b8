//! Benchmarks for frame differencing and whole-session throughput.
//!
//! Run with: cargo bench
//! Run with the parallel differencer: cargo bench --features rayon
//!
//! The session benchmark on a real file requires
//! `tests/fixtures/sample_video.mp4` and is skipped otherwise.

use std::{hint::black_box, path::Path, time::Duration};

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use freezeframe::{
    AnalysisOptions, AnalysisSession, FfmpegLogLevel, FrameDifferencer, FrameSource,
    FreezeFrameError, MediaFile, PixelBuffer, PixelLayout, VideoMetadata,
};

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

const RESOLUTIONS: [(u32, u32); 3] = [(640, 360), (1280, 720), (1920, 1080)];

/// A raster with a deterministic gradient so that roughly half of the
/// pixels differ from a shifted copy.
fn gradient(width: u32, height: u32, offset: u8) -> PixelBuffer {
    let mut buffer = PixelBuffer::filled(width, height, PixelLayout::Rgb8, [0, 0, 0]);
    for y in 0..height {
        for x in 0..width {
            let value = ((x + y) % 256) as u8;
            buffer.put_rgb(x, y, [value.wrapping_add(offset), value, value / 2]);
        }
    }
    buffer
}

fn benchmark_similarity(criterion: &mut Criterion) {
    let differencer = FrameDifferencer::default();
    let mut group = criterion.benchmark_group("similarity");

    for (width, height) in RESOLUTIONS {
        let previous = gradient(width, height, 0);
        let current = gradient(width, height, 64);
        group.throughput(Throughput::Elements(u64::from(width) * u64::from(height)));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{width}x{height}")),
            &(previous, current),
            |bencher, (previous, current)| {
                bencher.iter(|| differencer.similarity(black_box(previous), black_box(current)));
            },
        );
    }

    group.finish();
}

/// A source that alternates between two precomputed rasters.
struct AlternatingSource {
    frames: [PixelBuffer; 2],
    calls: usize,
}

impl FrameSource for AlternatingSource {
    fn metadata(&mut self) -> Result<VideoMetadata, FreezeFrameError> {
        Ok(VideoMetadata::new(
            2.0,
            self.frames[0].width(),
            self.frames[0].height(),
            1_000_000,
        ))
    }

    fn seek_and_decode(&mut self, _timestamp_seconds: f64) -> Result<PixelBuffer, FreezeFrameError> {
        self.calls += 1;
        Ok(self.frames[(self.calls / 3) % 2].clone())
    }
}

fn benchmark_synthetic_session(criterion: &mut Criterion) {
    let frames = [gradient(640, 360, 0), gradient(640, 360, 64)];

    criterion.bench_function("session 2s @ 30fps (640x360, synthetic)", |bencher| {
        bencher.iter(|| {
            let source = AlternatingSource {
                frames: frames.clone(),
                calls: 0,
            };
            let mut session =
                AnalysisSession::new(source, AnalysisOptions::new().with_target_fps(30.0));
            session.run()
        });
    });
}

fn benchmark_file_session(criterion: &mut Criterion) {
    if !Path::new(SAMPLE_VIDEO).exists() {
        eprintln!("Skipping benchmark: fixture not found");
        return;
    }
    freezeframe::set_ffmpeg_log_level(FfmpegLogLevel::Error);

    criterion.bench_function("session on sample_video.mp4 @ 30fps", |bencher| {
        bencher.iter(|| {
            let source = MediaFile::open(SAMPLE_VIDEO).unwrap();
            let mut session =
                AnalysisSession::new(source, AnalysisOptions::new().with_target_fps(30.0));
            session.run().unwrap()
        });
    });
}

fn configure() -> Criterion {
    Criterion::default()
        .sample_size(20)
        .measurement_time(Duration::from_secs(5))
}

criterion_group! {
    name = benches;
    config = configure();
    targets = benchmark_similarity, benchmark_synthetic_session, benchmark_file_session
}
criterion_main!(benches);
