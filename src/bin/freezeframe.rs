use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use freezeframe::{
    AnalysisOptions, AnalysisResult, AnalysisSession, DEFAULT_DUPLICATE_THRESHOLD,
    DEFAULT_PIXEL_THRESHOLD, DEFAULT_TARGET_FPS, FfmpegLogLevel, MediaFile, ProgressCallback,
    ProgressInfo,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Value, json};

const CLI_AFTER_HELP: &str = "Examples:\n  freezeframe analyze input.mp4 --fps 30\n  freezeframe analyze a.mp4 b.mkv --fps 25 --progress --json\n  freezeframe metadata input.mp4 --json\n  freezeframe completions zsh > _freezeframe";

#[derive(Debug, Parser)]
#[command(
    name = "freezeframe",
    version,
    about = "Detect duplicated (frozen) frames in video files",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze one or more videos for duplicate frames.
    #[command(
        about = "Detect duplicate frames",
        after_help = "Examples:\n  freezeframe analyze input.mp4 --fps 23.976\n  freezeframe analyze input.mp4 --fps 30 --similarity-threshold 0.999 --max-indices 50"
    )]
    Analyze {
        /// Input video paths. Each is analyzed independently.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// The videos' real frame rate; it is not auto-detected.
        #[arg(long, default_value_t = DEFAULT_TARGET_FPS, value_parser = parse_fps)]
        fps: f64,
        /// Grayscale difference a pixel must exceed to count as changed.
        #[arg(long, default_value_t = DEFAULT_PIXEL_THRESHOLD)]
        pixel_threshold: u8,
        /// Similarity a frame must exceed to count as a duplicate.
        #[arg(long, default_value_t = DEFAULT_DUPLICATE_THRESHOLD, value_parser = parse_similarity_threshold)]
        similarity_threshold: f64,
        /// Output one JSON document per input.
        #[arg(long)]
        json: bool,
        /// Show a progress bar.
        #[arg(long)]
        progress: bool,
        /// List every duplicate timestamp.
        #[arg(long)]
        verbose: bool,
        /// How many duplicate indices to print in the text report.
        #[arg(long, default_value_t = 20)]
        max_indices: usize,
    },

    /// Print metadata for a video file (alias: probe).
    #[command(
        about = "Print video metadata",
        visible_alias = "probe",
        after_help = "Examples:\n  freezeframe metadata input.mp4\n  freezeframe metadata input.mp4 --json"
    )]
    Metadata {
        /// Input video path.
        input: PathBuf,

        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "Examples:\n  freezeframe completions bash > freezeframe.bash\n  freezeframe completions zsh > _freezeframe"
    )]
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

fn parse_fps(value: &str) -> Result<f64, String> {
    let fps: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("not a number: {value}"))?;
    if fps.is_finite() && fps > 0.0 {
        Ok(fps)
    } else {
        Err(format!("fps must be greater than 0, got {value}"))
    }
}

fn parse_similarity_threshold(value: &str) -> Result<f64, String> {
    let threshold: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("not a number: {value}"))?;
    if (0.0..=1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(format!("threshold must lie within [0, 1], got {value}"))
    }
}

fn parse_log_level(value: &str) -> Option<FfmpegLogLevel> {
    value.parse().ok()
}

/// Render at most `limit` indices, noting how many were left out.
fn format_indices(indices: &[u64], limit: usize) -> String {
    if indices.is_empty() {
        return "none".to_string();
    }

    let shown = indices
        .iter()
        .take(limit)
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    match indices.len().saturating_sub(limit) {
        0 => shown,
        hidden if limit == 0 => format!("{hidden} hidden"),
        hidden => format!("{shown} (+{hidden} more)"),
    }
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}

fn result_json(input: &Path, result: &AnalysisResult) -> Value {
    json!({
        "input": input.display().to_string(),
        "duration_seconds": result.duration_seconds,
        "fps": result.fps,
        "resolution": result.resolution(),
        "bitrate_bps": result.bitrate_bps,
        "total_frames": result.total_frames,
        "duplicate_count": result.duplicate_count,
        "duplicate_ratio": result.duplicate_ratio,
        "duplicates_per_second": result.duplicates_per_second,
        "duplicate_indices": result.duplicate_indices,
    })
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(level) = &global.log_level {
        let parsed = parse_log_level(level).ok_or(format!("unsupported --log-level: {level}"))?;
        freezeframe::set_ffmpeg_log_level(parsed);
    }
    Ok(())
}

/// Drives an `indicatif` bar from progress snapshots.
struct BarProgress {
    bar: ProgressBar,
}

impl ProgressCallback for BarProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.bar.set_position(info.percentage as u64);
        self.bar
            .set_message(format!("{} duplicate(s)", info.duplicates_found));
    }
}

fn progress_bar(input: &Path) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let bar = ProgressBar::new(100);
    let style = ProgressStyle::with_template(
        "{spinner:.green} {prefix} {bar:40.cyan/blue} {pos:>3}% {msg}",
    )?;
    bar.set_style(style.progress_chars("##-"));
    bar.set_prefix(
        input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.display().to_string()),
    );
    Ok(bar)
}

struct AnalyzeSettings {
    fps: f64,
    pixel_threshold: u8,
    similarity_threshold: f64,
    json: bool,
    progress: bool,
    verbose: bool,
    max_indices: usize,
}

fn analyze_one(
    input: &Path,
    settings: &AnalyzeSettings,
) -> Result<AnalysisResult, Box<dyn std::error::Error>> {
    let source = MediaFile::open(input)?;
    let mut options = AnalysisOptions::new()
        .with_target_fps(settings.fps)
        .with_pixel_threshold(settings.pixel_threshold)
        .with_duplicate_threshold(settings.similarity_threshold);

    let bar = if settings.progress {
        let bar = progress_bar(input)?;
        options = options.with_progress(Arc::new(BarProgress { bar: bar.clone() }));
        Some(bar)
    } else {
        None
    };

    let outcome = AnalysisSession::new(source, options).run();

    if let Some(bar) = bar {
        match &outcome {
            Ok(_) => {
                bar.set_position(100);
                bar.finish_with_message("done");
            }
            Err(_) => bar.abandon_with_message("failed"),
        }
    }

    Ok(outcome?)
}

fn print_report(input: &Path, result: &AnalysisResult, settings: &AnalyzeSettings) {
    println!("{}", input.display().to_string().bold());
    println!(
        "  Video: {} @ {:.3} fps, {:.2}s, ~{:.0} kb/s",
        result.resolution(),
        result.fps,
        result.duration_seconds,
        result.bitrate_bps / 1000.0
    );
    println!("  Sampled frames: {}", result.total_frames);

    let summary = format!(
        "{} duplicate(s), {:.4}% of frames, {:.3} per second",
        result.duplicate_count,
        result.duplicate_ratio * 100.0,
        result.duplicates_per_second
    );
    if result.is_clean() {
        println!("  Duplicates: {}", summary.green());
    } else {
        println!("  Duplicates: {}", summary.yellow());
        println!(
            "  Indices: {}",
            format_indices(&result.duplicate_indices, settings.max_indices)
        );
    }

    if settings.verbose && !result.is_clean() {
        for (index, timestamp) in result
            .duplicate_indices
            .iter()
            .zip(result.duplicate_timestamps())
        {
            println!("    #{index} at {timestamp:.3}s");
        }
    }
}

fn run_analyze(
    inputs: &[PathBuf],
    settings: &AnalyzeSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut failed = 0_usize;

    for input in inputs {
        if settings.verbose {
            eprintln!(
                "analyzing {} at {} fps",
                input.display(),
                settings.fps
            );
        }

        match analyze_one(input, settings) {
            Ok(result) => {
                if settings.json {
                    println!("{}", serde_json::to_string_pretty(&result_json(input, &result))?);
                } else {
                    print_report(input, &result, settings);
                }
            }
            Err(error) => {
                failed += 1;
                eprintln!(
                    "{} {}",
                    "error:".red().bold(),
                    format!("{}: {error}", input.display()).red()
                );
            }
        }
    }

    if failed > 0 {
        return Err(format!("{failed} of {} input(s) failed", inputs.len()).into());
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;

    match cli.command {
        Commands::Analyze {
            inputs,
            fps,
            pixel_threshold,
            similarity_threshold,
            json,
            progress,
            verbose,
            max_indices,
        } => {
            if json && verbose {
                eprintln!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    "--verbose has no effect on JSON output".yellow()
                );
            }

            let settings = AnalyzeSettings {
                fps,
                pixel_threshold,
                similarity_threshold,
                json,
                progress,
                verbose,
                max_indices,
            };
            run_analyze(&inputs, &settings)?;
        }
        Commands::Metadata { input, json } => {
            let media = MediaFile::open(&input)?;
            let metadata = media.video_metadata();
            if json {
                let payload = json!({
                    "input": input.display().to_string(),
                    "duration_seconds": metadata.duration_seconds,
                    "width": metadata.width,
                    "height": metadata.height,
                    "file_size_bytes": metadata.file_size_bytes,
                    "bitrate_bps": metadata.estimated_bitrate_bps(),
                    "codec": metadata.codec,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Duration: {:.3}s", metadata.duration_seconds);
                println!("Resolution: {}", metadata.resolution());
                println!("File size: {}", format_bytes(metadata.file_size_bytes));
                println!(
                    "Bitrate: ~{:.0} kb/s",
                    metadata.estimated_bitrate_bps() / 1000.0
                );
                println!("Codec: {}", metadata.codec.as_deref().unwrap_or("unknown"));
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "freezeframe", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::Parser;
    use freezeframe::FfmpegLogLevel;

    use super::{
        Cli, Commands, format_bytes, format_indices, parse_fps, parse_log_level,
        parse_similarity_threshold,
    };

    #[test]
    fn parse_fps_rejects_non_positive() {
        assert_eq!(parse_fps("29.97").unwrap(), 29.97);
        assert!(parse_fps("0").is_err());
        assert!(parse_fps("-24").is_err());
        assert!(parse_fps("inf").is_err());
        assert!(parse_fps("fast").is_err());
    }

    #[test]
    fn parse_similarity_threshold_bounds() {
        assert_eq!(parse_similarity_threshold("0").unwrap(), 0.0);
        assert_eq!(parse_similarity_threshold("1").unwrap(), 1.0);
        assert_eq!(parse_similarity_threshold("0.9999").unwrap(), 0.9999);
        assert!(parse_similarity_threshold("1.01").is_err());
        assert!(parse_similarity_threshold("NaN").is_err());
    }

    #[test]
    fn parse_log_level_aliases() {
        assert_eq!(parse_log_level("quiet"), Some(FfmpegLogLevel::Quiet));
        assert_eq!(parse_log_level("WARN"), Some(FfmpegLogLevel::Warning));
        assert_eq!(parse_log_level("loud"), None);
    }

    #[test]
    fn format_indices_truncates() {
        assert_eq!(format_indices(&[], 5), "none");
        assert_eq!(format_indices(&[5, 6, 7, 8], 10), "5, 6, 7, 8");
        assert_eq!(format_indices(&[5, 6, 7, 8], 2), "5, 6 (+2 more)");
        assert_eq!(format_indices(&[5, 6], 0), "2 hidden");
    }

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.00 KiB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MiB");
    }

    #[test]
    fn analyze_accepts_multiple_inputs() {
        let cli = Cli::try_parse_from([
            "freezeframe",
            "analyze",
            "a.mp4",
            "b.mkv",
            "--fps",
            "25",
            "--log-level",
            "error",
        ])
        .unwrap();

        assert_eq!(cli.global.log_level.as_deref(), Some("error"));
        match cli.command {
            Commands::Analyze {
                inputs,
                fps,
                pixel_threshold,
                ..
            } => {
                assert_eq!(inputs.len(), 2);
                assert_eq!(inputs[1], Path::new("b.mkv"));
                assert_eq!(fps, 25.0);
                assert_eq!(pixel_threshold, 30);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn analyze_requires_an_input() {
        assert!(Cli::try_parse_from(["freezeframe", "analyze", "--fps", "30"]).is_err());
    }
}
