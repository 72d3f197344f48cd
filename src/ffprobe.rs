//! FFprobe wrapper
//!
//! Asks the companion probe for a fixed set of stream/format fields in
//! `key=value` line format and parses them into a flat mapping. Probing is
//! best effort everywhere except size-targeted compression, where a missing
//! duration aborts the operation.

use crate::engine::configure_command;
use crate::errors::{ConvertError, Result};
use std::collections::HashMap;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

/// Flat `key=value` view of a media file, as reported by the probe.
#[derive(Debug, Clone, Default)]
pub struct MediaInfo {
    entries: HashMap<String, String>,
}

impl MediaInfo {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn duration_secs(&self) -> Option<f64> {
        self.get("duration")
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|d| *d > 0.0)
    }

    pub fn width(&self) -> Option<u32> {
        self.get("width").and_then(|v| v.parse().ok())
    }

    pub fn height(&self) -> Option<u32> {
        self.get("height").and_then(|v| v.parse().ok())
    }

    pub fn size_bytes(&self) -> Option<u64> {
        self.get("size").and_then(|v| v.parse().ok())
    }

    pub fn bit_rate(&self) -> Option<u64> {
        self.get("bit_rate").and_then(|v| v.parse().ok())
    }

    pub fn codec_name(&self) -> Option<&str> {
        self.get("codec_name")
    }

    pub fn frame_rate(&self) -> Option<f64> {
        parse_frame_rate(self.get("r_frame_rate")?)
    }
}

/// Parse probe output: one `key=value` per line, later occurrences win
/// (the format-section duration overrides the stream one).
pub fn parse_probe_output(output: &str) -> MediaInfo {
    let mut entries = HashMap::new();
    for line in output.lines() {
        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim();
            if !value.is_empty() && value != "N/A" {
                entries.insert(key.trim().to_string(), value.to_string());
            }
        }
    }
    MediaInfo { entries }
}

/// Rational or decimal frame rate string, e.g. "30000/1001" or "29.97".
pub fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num = num.parse::<f64>().ok()?;
        let den = den.parse::<f64>().ok()?;
        if den > 0.0 && num / den > 0.0 {
            return Some(num / den);
        }
        return None;
    }
    s.parse::<f64>().ok().filter(|v| *v > 0.0)
}

/// Run the probe against a media file.
pub fn probe(ffprobe: &Path, media: &Path) -> Result<MediaInfo> {
    let media_str = media.to_string_lossy();
    let args = [
        "-v",
        "error",
        "-select_streams",
        "v:0",
        "-show_entries",
        "stream=width,height,duration,r_frame_rate,codec_name",
        "-show_entries",
        "format=duration,size,bit_rate",
        "-of",
        "default=noprint_wrappers=1",
        media_str.as_ref(),
    ];

    let mut cmd = Command::new(ffprobe);
    cmd.args(args);
    configure_command(&mut cmd);

    info!(probe = %ffprobe.display(), media = %media.display(), "Probing media");
    let output = cmd.output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ConvertError::ProbeFailed(format!(
            "{}: {}",
            media.display(),
            stderr.trim()
        )));
    }

    let info = parse_probe_output(&String::from_utf8_lossy(&output.stdout));
    debug!(media = %media.display(), fields = info.entries.len(), "Probe complete");
    Ok(info)
}

/// Duration of a media file, `None` when the probe cannot report one.
pub fn probe_duration(ffprobe: &Path, media: &Path) -> Option<f64> {
    probe(ffprobe, media).ok()?.duration_secs()
}
