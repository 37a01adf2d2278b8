use std::env;
use std::path::{Path, PathBuf};

const WATCHED_VARIABLES: [&str; 4] = ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_DYNAMIC", "VCPKGRS_TRIPLET"];

fn main() {
    for variable in WATCHED_VARIABLES {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    // ffmpeg-next finds FFmpeg through pkg-config everywhere except Windows.
    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows") {
        return;
    }
    if env::var_os("FFMPEG_DIR").is_some() {
        return;
    }

    match vcpkg_ffmpeg_dir() {
        None => warn(
            "FFMPEG_DIR is not set. Install FFmpeg with vcpkg and set FFMPEG_DIR (or VCPKG_ROOT) before building freezeframe on Windows.",
        ),
        Some(directory) if directory.exists() => {
            warn(&format!(
                "Found vcpkg FFmpeg at {0}. Set FFMPEG_DIR={0} to pin it.",
                directory.display()
            ));
            if env::var_os("VCPKGRS_DYNAMIC").is_none() {
                warn("Set VCPKGRS_DYNAMIC=1 when linking a dynamic vcpkg FFmpeg build.");
            }
        }
        Some(directory) => warn(&format!(
            "VCPKG_ROOT is set but {} does not exist; is the FFmpeg port installed?",
            directory.display()
        )),
    }
}

/// Where vcpkg installs FFmpeg for the configured triplet.
fn vcpkg_ffmpeg_dir() -> Option<PathBuf> {
    let root = env::var_os("VCPKG_ROOT")?;
    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    Some(Path::new(&root).join("installed").join(triplet))
}

fn warn(message: &str) {
    println!("cargo:warning={message}");
}
