//! Process runner
//!
//! Spawns the engine and supervises it until exit. The engine writes its
//! progress to stderr; that pipe is exposed as a lazy iterator of filtered
//! progress events so the supervision loop is testable without a real
//! engine. Stdout is drained on a separate thread: an undrained pipe fills
//! its 64KB buffer and deadlocks both processes.

use crate::engine::configure_command;
use crate::errors::Result;
use crate::options::ConversionResult;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use tracing::{debug, error, info};

/// Substrings marking a progress line in the engine's output.
pub const PROGRESS_MARKERS: &[&str] = &["frame=", "size=", "time=", "out_time_ms"];

/// How many non-progress lines are retained for failure reporting.
const RESIDUAL_CAP: usize = 200;

pub fn is_progress_line(line: &str) -> bool {
    PROGRESS_MARKERS.iter().any(|m| line.contains(m))
}

/// One progress-indicating line from the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub line: String,
}

impl ProgressEvent {
    /// Short form for single-line terminal display.
    pub fn summary(&self) -> String {
        self.line.chars().take(60).collect()
    }
}

/// Lazy, finite sequence of progress events over a line-oriented stream.
/// Non-progress lines are retained (bounded) for error extraction.
pub struct ProgressEvents<R: BufRead> {
    reader: R,
    residual: Vec<String>,
}

impl<R: BufRead> ProgressEvents<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            residual: Vec::new(),
        }
    }

    /// Retained non-progress output, available after the stream ends.
    pub fn into_residual(self) -> Vec<String> {
        self.residual
    }
}

impl<R: BufRead> Iterator for ProgressEvents<R> {
    type Item = ProgressEvent;

    fn next(&mut self) -> Option<ProgressEvent> {
        let mut buf = String::new();
        loop {
            buf.clear();
            match self.reader.read_line(&mut buf) {
                Ok(0) | Err(_) => return None,
                Ok(_) => {
                    let line = buf.trim_end_matches(['\r', '\n']).trim().to_string();
                    if line.is_empty() {
                        continue;
                    }
                    if is_progress_line(&line) {
                        return Some(ProgressEvent { line });
                    }
                    if self.residual.len() < RESIDUAL_CAP {
                        self.residual.push(line);
                    }
                }
            }
        }
    }
}

/// Most meaningful line of the engine's failure output: prefer an explicit
/// error line, else the last non-progress content.
pub fn extract_engine_error(lines: &[String]) -> String {
    if let Some(error_line) = lines
        .iter()
        .rev()
        .find(|l| l.contains("Error") || l.contains("error"))
    {
        return error_line.trim().to_string();
    }

    lines
        .iter()
        .rev()
        .find(|l| !l.trim().is_empty() && !is_progress_line(l))
        .map(|l| l.trim().to_string())
        .unwrap_or_else(|| "Unknown FFmpeg error".to_string())
}

/// The only success condition: clean exit AND an existing, non-empty
/// output artifact. A zero exit with a missing artifact is a failure.
pub fn classify_outcome(exit_ok: bool, output: &Path) -> bool {
    exit_ok && output.is_file() && std::fs::metadata(output).map(|m| m.len() > 0).unwrap_or(false)
}

/// Run the engine as `ffmpeg [pre_input...] -i input [args...] output`,
/// feeding filtered progress lines to `on_progress` as they arrive.
///
/// There is no timeout here: conversions may legitimately run for hours and
/// the interactive user owns interruption.
pub fn run_ffmpeg<F>(
    ffmpeg: &Path,
    pre_input: &[String],
    input: &Path,
    args: &[String],
    output: &Path,
    mut on_progress: F,
) -> Result<ConversionResult>
where
    F: FnMut(&ProgressEvent),
{
    let mut cmd = Command::new(ffmpeg);
    cmd.args(pre_input)
        .arg("-i")
        .arg(input)
        .args(args)
        .arg(output)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    configure_command(&mut cmd);

    info!(command = ?cmd, "Executing FFmpeg command");

    let mut child = cmd.spawn()?;

    // Progress arrives on stderr; stdout still has to be consumed.
    let stdout_thread = child.stdout.take().map(|mut pipe| {
        thread::spawn(move || {
            let mut sink = String::new();
            let _ = pipe.read_to_string(&mut sink);
            sink
        })
    });

    let residual = match child.stderr.take() {
        Some(stderr) => {
            let mut events = ProgressEvents::new(BufReader::new(stderr));
            for event in events.by_ref() {
                on_progress(&event);
            }
            events.into_residual()
        }
        None => Vec::new(),
    };

    let status = child.wait()?;
    if let Some(handle) = stdout_thread {
        let _ = handle.join();
    }

    let success = classify_outcome(status.success(), output);
    let output_size = std::fs::metadata(output).map(|m| m.len()).unwrap_or(0);

    if success {
        info!(
            output = %output.display(),
            size = output_size,
            "FFmpeg completed successfully"
        );
        Ok(ConversionResult {
            success: true,
            output_path: output.display().to_string(),
            output_size,
            exit_code: status.code(),
            message: "Conversion successful".to_string(),
        })
    } else {
        let detail = if status.success() {
            "output file missing or empty after conversion".to_string()
        } else {
            extract_engine_error(&residual)
        };
        error!(
            exit_code = ?status.code(),
            detail = %detail,
            "FFmpeg failed"
        );
        debug!(residual = ?residual, "Retained engine output");
        Ok(ConversionResult {
            success: false,
            output_path: output.display().to_string(),
            output_size: 0,
            exit_code: status.code(),
            message: detail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Write;

    const CANNED_STDERR: &str = "\
ffmpeg version 7.1 Copyright (c) 2000-2024 the FFmpeg developers
Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'in.mp4':
  Duration: 00:00:12.48, start: 0.000000, bitrate: 6720 kb/s
Stream mapping:
frame=   30 fps=0.0 q=28.0 size=     256kB time=00:00:01.00 bitrate=2097.2kbits/s
frame=  120 fps=119 q=28.0 size=    1024kB time=00:00:04.00 bitrate=2097.2kbits/s
frame=  300 fps=150 q=-1.0 Lsize=    2560kB time=00:00:12.40 bitrate=1691.0kbits/s
";

    #[test]
    fn test_progress_markers() {
        let cases: &[(&str, bool)] = &[
            ("frame=  30 fps=0.0", true),
            ("size=     256kB", true),
            ("time=00:00:01.00", true),
            ("out_time_ms=4000000", true),
            ("Stream mapping:", false),
            ("Press [q] to stop", false),
            ("", false),
        ];
        for (line, expected) in cases {
            assert_eq!(is_progress_line(line), *expected, "{:?}", line);
        }
    }

    #[test]
    fn test_progress_events_filter_canned_stream() {
        let mut events = ProgressEvents::new(Cursor::new(CANNED_STDERR));
        let collected: Vec<ProgressEvent> = events.by_ref().collect();
        assert_eq!(collected.len(), 3);
        assert!(collected[0].line.starts_with("frame=   30"));
        assert!(collected[2].line.contains("Lsize"));

        let residual = events.into_residual();
        assert!(residual.iter().any(|l| l.contains("Stream mapping")));
        assert!(!residual.iter().any(|l| l.contains("frame=")));
    }

    #[test]
    fn test_progress_event_summary_is_bounded() {
        let event = ProgressEvent {
            line: "x".repeat(500),
        };
        assert_eq!(event.summary().len(), 60);
    }

    #[test]
    fn test_extract_engine_error_prefers_error_line() {
        let lines = vec![
            "Stream mapping:".to_string(),
            "[libx264 @ 0x55] Error: invalid preset".to_string(),
            "Conversion failed!".to_string(),
        ];
        assert_eq!(
            extract_engine_error(&lines),
            "[libx264 @ 0x55] Error: invalid preset"
        );
    }

    #[test]
    fn test_extract_engine_error_falls_back_to_last_content() {
        let lines = vec![
            "Stream mapping:".to_string(),
            "Conversion failed!".to_string(),
        ];
        assert_eq!(extract_engine_error(&lines), "Conversion failed!");
        assert_eq!(extract_engine_error(&[]), "Unknown FFmpeg error");
    }

    #[test]
    fn test_zero_exit_with_missing_output_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("never_written.mp4");
        assert!(!classify_outcome(true, &missing));
    }

    #[test]
    fn test_zero_exit_with_empty_output_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.mp4");
        std::fs::File::create(&empty).unwrap();
        assert!(!classify_outcome(true, &empty));
    }

    #[test]
    fn test_success_requires_clean_exit_and_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("out.mp4");
        let mut f = std::fs::File::create(&artifact).unwrap();
        f.write_all(b"not empty").unwrap();

        assert!(classify_outcome(true, &artifact));
        assert!(!classify_outcome(false, &artifact));
    }
}
