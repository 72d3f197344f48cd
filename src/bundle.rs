//! Distribution bundling
//!
//! Copies the application binary together with the engine executables into
//! a single distributable directory. All inputs arrive through an explicit
//! `BundleConfig`; this step never consults ambient state and never runs at
//! conversion time.

use crate::engine::{ffmpeg_binary_name, ffprobe_binary_name};
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct BundleConfig {
    /// Directory holding the engine binaries to ship.
    pub ffmpeg_dir: PathBuf,
}

#[derive(Debug)]
pub struct BundleReport {
    pub dist_dir: PathBuf,
    pub files_copied: usize,
}

pub fn bundle(config: &BundleConfig, dist_dir: &Path) -> Result<BundleReport> {
    let ffmpeg_src = config.ffmpeg_dir.join(ffmpeg_binary_name());
    if !ffmpeg_src.is_file() {
        bail!(
            "{} not found in {}",
            ffmpeg_binary_name(),
            config.ffmpeg_dir.display()
        );
    }

    std::fs::create_dir_all(dist_dir)
        .with_context(|| format!("Failed to create dist directory: {}", dist_dir.display()))?;

    let mut copied = 0usize;

    let exe = std::env::current_exe().context("Cannot resolve own executable")?;
    let exe_name = exe.file_name().context("Executable has no file name")?;
    std::fs::copy(&exe, dist_dir.join(exe_name))
        .with_context(|| format!("Failed to copy {}", exe.display()))?;
    copied += 1;

    for name in [ffmpeg_binary_name(), ffprobe_binary_name()] {
        let src = config.ffmpeg_dir.join(name);
        if src.is_file() {
            std::fs::copy(&src, dist_dir.join(name))
                .with_context(|| format!("Failed to copy {}", src.display()))?;
            info!(binary = name, "Bundled engine binary");
            copied += 1;
        }
    }

    // Windows builds ship their runtime DLLs next to the binaries.
    if cfg!(windows) {
        for entry in std::fs::read_dir(&config.ffmpeg_dir)? {
            let path = entry?.path();
            let is_dll = path
                .extension()
                .map(|e| e.eq_ignore_ascii_case("dll"))
                .unwrap_or(false);
            if is_dll {
                if let Some(name) = path.file_name() {
                    std::fs::copy(&path, dist_dir.join(name))?;
                    copied += 1;
                }
            }
        }
    }

    info!(dist = %dist_dir.display(), files = copied, "Bundle complete");
    Ok(BundleReport {
        dist_dir: dist_dir.to_path_buf(),
        files_copied: copied,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_requires_ffmpeg_present() {
        let tmp = tempfile::tempdir().unwrap();
        let config = BundleConfig {
            ffmpeg_dir: tmp.path().join("empty"),
        };
        assert!(bundle(&config, &tmp.path().join("dist")).is_err());
    }

    #[test]
    fn test_bundle_copies_engine_binaries() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("ffmpeg_bin");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join(ffmpeg_binary_name()), b"fake").unwrap();
        std::fs::write(src.join(ffprobe_binary_name()), b"fake").unwrap();

        let dist = tmp.path().join("dist");
        let report = bundle(&BundleConfig { ffmpeg_dir: src }, &dist).unwrap();

        assert!(dist.join(ffmpeg_binary_name()).is_file());
        assert!(dist.join(ffprobe_binary_name()).is_file());
        // App binary + two engine binaries at minimum.
        assert!(report.files_copied >= 3);
    }
}
