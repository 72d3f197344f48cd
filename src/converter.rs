//! Conversion API
//!
//! `MediaConverter` binds a located engine to the option translator and the
//! process runner. Every operation builds one command line, runs it to
//! completion, and reports a `ConversionResult`; nothing is retried.

use crate::engine::Engine;
use crate::errors::{ConvertError, Result};
use crate::ffprobe;
use crate::options::{ConversionRequest, ConversionResult, ConvertOptions};
use crate::runner::{run_ffmpeg, ProgressEvent};
use crate::translator;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub struct MediaConverter {
    engine: Engine,
}

impl MediaConverter {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// `<stem>_<suffix>.<ext>` in the input's directory, or in the chosen
    /// output directory (created on demand).
    pub fn output_path(
        &self,
        input: &Path,
        suffix: &str,
        ext: &str,
        output_dir: Option<&Path>,
    ) -> Result<PathBuf> {
        let dir = match output_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                dir.to_path_buf()
            }
            None => input.parent().unwrap_or(Path::new(".")).to_path_buf(),
        };
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        Ok(dir.join(format!("{}_{}.{}", stem, suffix, ext)))
    }

    /// General conversion entry: routing follows the resolved media kinds.
    pub fn convert(
        &self,
        input: &Path,
        output: &Path,
        opts: &ConvertOptions,
    ) -> Result<ConversionResult> {
        let request = ConversionRequest::new(input, output);

        let (pre_input, args) = if request.output_is_video {
            if request.input_kind == crate::media_kind::MediaKind::Image {
                info!("🎞️  Image → video synthesis mode");
                translator::image_to_video_args(opts, translator::DEFAULT_STILL_DURATION_SECS)
            } else {
                (Vec::new(), translator::video_args(&request.output_ext, opts))
            }
        } else if request.input_is_video
            && request.output_kind == crate::media_kind::MediaKind::Image
        {
            info!("🖼️  Video → image extraction mode (first frame)");
            let (pre, mut post) =
                translator::frame_extract_args(translator::DEFAULT_FRAME_SEEK_SECS);
            post.extend(translator::image_args(&request.output_ext, opts));
            (pre, post)
        } else {
            (Vec::new(), translator::image_args(&request.output_ext, opts))
        };

        self.execute(&pre_input, input, &args, output, opts)
    }

    /// One-click video conversion with per-format defaults; the caller's
    /// quality/preset/output_dir win over the preset's.
    pub fn quick_video_convert(
        &self,
        input: &Path,
        target_format: &str,
        user: &ConvertOptions,
    ) -> Result<ConversionResult> {
        let mut opts = match target_format {
            "mp4" => ConvertOptions {
                quality: Some(23),
                preset: Some("medium".to_string()),
                ..Default::default()
            },
            "avi" => ConvertOptions {
                codec: Some("libxvid".to_string()),
                ..Default::default()
            },
            "mov" => ConvertOptions {
                quality: Some(23),
                ..Default::default()
            },
            "webm" => ConvertOptions {
                quality: Some(28),
                ..Default::default()
            },
            // mkv, wmv and anything else: engine defaults.
            _ => ConvertOptions::default(),
        };
        opts.output_dir = user.output_dir.clone();
        if user.quality.is_some() {
            opts.quality = user.quality;
        }
        if user.preset.is_some() {
            opts.preset = user.preset.clone();
        }

        let output = self.output_path(input, "converted", target_format, opts.output_dir.as_deref())?;
        self.convert(input, &output, &opts)
    }

    /// One-click image conversion with per-format quality defaults.
    pub fn quick_image_convert(
        &self,
        input: &Path,
        target_format: &str,
        user: &ConvertOptions,
    ) -> Result<ConversionResult> {
        let quality = match target_format {
            "jpg" | "jpeg" | "png" => Some(2),
            "webp" => Some(85),
            "bmp" | "gif" => None,
            _ => Some(2),
        };
        let opts = ConvertOptions {
            quality,
            output_dir: user.output_dir.clone(),
            ..Default::default()
        };

        let output = self.output_path(input, "converted", target_format, opts.output_dir.as_deref())?;
        self.convert(input, &output, &opts)
    }

    /// Compress to a target size in MB. The source duration comes from the
    /// probe; failure to probe aborts with no output written.
    pub fn compress_to_target(
        &self,
        input: &Path,
        target_mb: u32,
        user: &ConvertOptions,
    ) -> Result<ConversionResult> {
        let ffprobe_bin = self.engine.ffprobe.as_deref().ok_or_else(|| {
            ConvertError::ProbeFailed("ffprobe is not available".to_string())
        })?;
        let info = ffprobe::probe(ffprobe_bin, input)?;
        let duration = info.duration_secs().ok_or_else(|| {
            ConvertError::ProbeFailed(format!(
                "no duration reported for {}",
                input.display()
            ))
        })?;

        let bitrate = translator::target_bitrate_kbps(target_mb, duration)?;
        info!(
            target_mb,
            duration_secs = duration,
            bitrate = %bitrate,
            "Target-size compression"
        );
        println!("📦 Target size: {} MB", target_mb);
        println!("📦 Computed bitrate: {}", bitrate);

        let opts = ConvertOptions {
            bitrate: Some(bitrate),
            audio_bitrate: Some("128k".to_string()),
            preset: Some("slow".to_string()),
            output_dir: user.output_dir.clone(),
            ..Default::default()
        };
        let output = self.output_path(input, "compressed", "mp4", opts.output_dir.as_deref())?;
        self.convert(input, &output, &opts)
    }

    /// Extract a single frame at `seek_secs` into an image.
    pub fn extract_frame(
        &self,
        input: &Path,
        target_format: &str,
        seek_secs: f64,
        opts: &ConvertOptions,
    ) -> Result<ConversionResult> {
        let (pre, mut post) = translator::frame_extract_args(seek_secs);
        post.extend(translator::image_args(target_format, opts));
        let output = self.output_path(input, "frame", target_format, opts.output_dir.as_deref())?;
        self.execute(&pre, input, &post, &output, opts)
    }

    /// Loop a still image into a fixed-duration mp4.
    pub fn image_to_video(
        &self,
        input: &Path,
        duration_secs: u32,
        opts: &ConvertOptions,
    ) -> Result<ConversionResult> {
        let (pre, post) = translator::image_to_video_args(opts, duration_secs);
        let output = self.output_path(input, "video", "mp4", opts.output_dir.as_deref())?;
        self.execute(&pre, input, &post, &output, opts)
    }

    /// Pull the audio track out of a video as mp3 (engine default encoder).
    pub fn extract_audio(&self, input: &Path, opts: &ConvertOptions) -> Result<ConversionResult> {
        let output = self.output_path(input, "audio", "mp3", opts.output_dir.as_deref())?;
        self.convert(input, &output, opts)
    }

    fn execute(
        &self,
        pre_input: &[String],
        input: &Path,
        args: &[String],
        output: &Path,
        opts: &ConvertOptions,
    ) -> Result<ConversionResult> {
        if !input.exists() {
            return Err(ConvertError::InputNotFound(input.display().to_string()));
        }

        println!(
            "▶ Input:  {}",
            input.file_name().unwrap_or_default().to_string_lossy()
        );
        println!(
            "▶ Output: {}",
            output.file_name().unwrap_or_default().to_string_lossy()
        );
        if let Some(ref dir) = opts.output_dir {
            println!("▶ Directory: {}", dir.display());
        }
        if opts.width.is_some() || opts.height.is_some() {
            println!(
                "▶ Size: {}x{}",
                opts.width.map(|w| w.to_string()).unwrap_or_else(|| "auto".into()),
                opts.height.map(|h| h.to_string()).unwrap_or_else(|| "auto".into()),
            );
        }

        let result = run_ffmpeg(&self.engine.ffmpeg, pre_input, input, args, output, |event| {
            print_progress(event);
        })?;
        // End the overwritten progress line.
        println!();

        if result.success {
            println!(
                "✅ Done! Size: {:.2} MB",
                result.output_size as f64 / 1024.0 / 1024.0
            );
        } else {
            warn!(message = %result.message, "Conversion failed");
            println!("❌ Conversion failed: {}", result.message);
        }
        Ok(result)
    }
}

/// Overwrite the previous progress line in place; history is not kept.
fn print_progress(event: &ProgressEvent) {
    print!("\r\x1b[K▶ {}", event.summary());
    let _ = std::io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn converter() -> MediaConverter {
        MediaConverter::new(Engine {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: None,
        })
    }

    #[test]
    fn test_output_path_next_to_input() {
        let c = converter();
        let out = c
            .output_path(Path::new("/media/clips/holiday.mkv"), "converted", "mp4", None)
            .unwrap();
        assert_eq!(out, PathBuf::from("/media/clips/holiday_converted.mp4"));
    }

    #[test]
    fn test_output_path_suffix_variants() {
        let c = converter();
        let cases: &[(&str, &str, &str)] = &[
            ("converted", "mp4", "clip_converted.mp4"),
            ("compressed", "mp4", "clip_compressed.mp4"),
            ("custom", "webm", "clip_custom.webm"),
            ("frame", "jpg", "clip_frame.jpg"),
            ("video", "mp4", "clip_video.mp4"),
            ("audio", "mp3", "clip_audio.mp3"),
        ];
        for (suffix, ext, expected) in cases {
            let out = c
                .output_path(Path::new("/v/clip.mov"), suffix, ext, None)
                .unwrap();
            assert_eq!(out.file_name().unwrap().to_str().unwrap(), *expected);
        }
    }

    #[test]
    fn test_output_path_creates_custom_dir() {
        let c = converter();
        let tmp = tempfile::tempdir().unwrap();
        let custom = tmp.path().join("exports/today");
        let out = c
            .output_path(Path::new("clip.mp4"), "converted", "webm", Some(&custom))
            .unwrap();
        assert!(custom.is_dir(), "custom directory should be created");
        assert_eq!(out, custom.join("clip_converted.webm"));
    }

    #[test]
    fn test_missing_input_is_reported_not_run() {
        let c = converter();
        let err = c
            .convert(
                Path::new("/definitely/not/here.mp4"),
                Path::new("/tmp/out.webm"),
                &ConvertOptions::default(),
            )
            .unwrap_err();
        assert!(matches!(err, ConvertError::InputNotFound(_)));
    }

    #[test]
    fn test_compress_without_probe_aborts() {
        let c = converter();
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("clip.mp4");
        std::fs::write(&input, b"stub").unwrap();

        let err = c
            .compress_to_target(&input, 50, &ConvertOptions::default())
            .unwrap_err();
        assert!(matches!(err, ConvertError::ProbeFailed(_)));
        // No partial artifact may appear.
        assert!(!tmp.path().join("clip_compressed.mp4").exists());
    }
}
