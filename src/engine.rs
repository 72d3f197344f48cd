//! Engine discovery
//!
//! Resolves the ffmpeg/ffprobe executables from a fixed set of directories
//! next to the program, falling back to the system path. Each candidate is
//! verified with a bounded `-version` call before it is trusted.

use crate::errors::{ConvertError, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Bound on the `-version` verification call. Conversions themselves run
/// without a timeout.
pub const VERIFY_TIMEOUT: Duration = Duration::from_secs(5);

pub fn ffmpeg_binary_name() -> &'static str {
    if cfg!(windows) {
        "ffmpeg.exe"
    } else {
        "ffmpeg"
    }
}

pub fn ffprobe_binary_name() -> &'static str {
    if cfg!(windows) {
        "ffprobe.exe"
    } else {
        "ffprobe"
    }
}

/// Keep the engine from popping a console window on Windows. The process
/// stays fully attached with captured pipes on every platform.
pub fn configure_command(cmd: &mut Command) {
    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NO_WINDOW: u32 = 0x0800_0000;
        cmd.creation_flags(CREATE_NO_WINDOW);
    }
    #[cfg(not(windows))]
    {
        let _ = cmd;
    }
}

#[derive(Debug, Clone)]
pub struct Engine {
    pub ffmpeg: PathBuf,
    pub ffprobe: Option<PathBuf>,
}

impl Engine {
    /// Locate and verify ffmpeg, then resolve ffprobe as its sibling with
    /// a system-path fallback. Missing ffmpeg is fatal for the program.
    pub fn locate() -> Result<Self> {
        let ffmpeg = find_ffmpeg().ok_or_else(|| {
            ConvertError::EngineNotFound(format!(
                "place {} and {} next to the program, or install them on the system path",
                ffmpeg_binary_name(),
                ffprobe_binary_name()
            ))
        })?;

        let ffprobe = find_ffprobe(&ffmpeg);
        if ffprobe.is_none() {
            warn!("ffprobe not found; duration probing and size-targeted compression unavailable");
        }

        info!(ffmpeg = %ffmpeg.display(), ffprobe = ?ffprobe, "Engine located");
        Ok(Self { ffmpeg, ffprobe })
    }

    /// Version token from `ffmpeg -version`, e.g. "7.1".
    pub fn version(&self) -> Option<String> {
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.arg("-version");
        configure_command(&mut cmd);
        let output = cmd.output().ok()?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        // First line reads "ffmpeg version <token> ...".
        stdout
            .lines()
            .next()?
            .split_whitespace()
            .nth(2)
            .map(|s| s.to_string())
    }
}

pub fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(exe) = std::env::current_exe() {
        if let Some(exe_dir) = exe.parent() {
            dirs.push(exe_dir.to_path_buf());
            dirs.push(exe_dir.join("ffmpeg"));
        }
    }
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.clone());
        dirs.push(cwd.join("ffmpeg"));
    }
    dirs
}

fn find_ffmpeg() -> Option<PathBuf> {
    for dir in candidate_dirs() {
        let candidate = dir.join(ffmpeg_binary_name());
        if candidate.is_file() && verify_binary(&candidate) {
            return Some(candidate);
        }
    }

    match which::which(ffmpeg_binary_name()) {
        Ok(path) if verify_binary(&path) => Some(path),
        _ => None,
    }
}

fn find_ffprobe(ffmpeg: &Path) -> Option<PathBuf> {
    let sibling = ffmpeg.parent()?.join(ffprobe_binary_name());
    if sibling.is_file() {
        return Some(sibling);
    }
    which::which(ffprobe_binary_name()).ok()
}

/// Run `<binary> -version` and accept the candidate only when it exits
/// cleanly within the timeout and prints a recognizable version string.
pub fn verify_binary(path: &Path) -> bool {
    let mut cmd = Command::new(path);
    cmd.arg("-version")
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .stdin(Stdio::null());
    configure_command(&mut cmd);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Candidate failed to spawn");
            return false;
        }
    };

    let deadline = Instant::now() + VERIFY_TIMEOUT;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                if !status.success() {
                    return false;
                }
                let mut stdout = String::new();
                if let Some(mut pipe) = child.stdout.take() {
                    let _ = pipe.read_to_string(&mut stdout);
                }
                return stdout.contains("version");
            }
            Ok(None) => {
                if Instant::now() >= deadline {
                    warn!(path = %path.display(), "Version check timed out, killing candidate");
                    let _ = child.kill();
                    let _ = child.wait();
                    return false;
                }
                std::thread::sleep(Duration::from_millis(50));
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Version check wait failed");
                let _ = child.kill();
                return false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_names_match_platform() {
        if cfg!(windows) {
            assert_eq!(ffmpeg_binary_name(), "ffmpeg.exe");
            assert_eq!(ffprobe_binary_name(), "ffprobe.exe");
        } else {
            assert_eq!(ffmpeg_binary_name(), "ffmpeg");
            assert_eq!(ffprobe_binary_name(), "ffprobe");
        }
    }

    #[test]
    fn test_candidate_dirs_include_exe_and_cwd() {
        let dirs = candidate_dirs();
        assert!(!dirs.is_empty());
        // Each plain dir is followed by its ffmpeg/ subdirectory.
        assert!(dirs
            .iter()
            .any(|d| d.file_name().map(|n| n == "ffmpeg").unwrap_or(false)));
    }

    #[test]
    fn test_verify_rejects_missing_binary() {
        assert!(!verify_binary(Path::new("/nonexistent/ffmpeg-xyz")));
    }

    #[test]
    fn test_verify_rejects_binary_without_version_output() {
        // `true` exits 0 but prints nothing, so the marker check fails.
        if cfg!(unix) {
            if let Ok(path) = which::which("true") {
                assert!(!verify_binary(&path));
            }
        }
    }
}
