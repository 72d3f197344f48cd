//! Conversion records
//!
//! One `ConvertOptions` / `ConversionRequest` / `ConversionResult` triple is
//! built per invocation, used once and discarded. Nothing here persists.

use crate::media_kind::{extension_of, routes_as_video, MediaKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User-facing knobs. Every field is optional; `None` means the engine's
/// own default applies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvertOptions {
    /// Output width; height follows aspect ratio when unset.
    pub width: Option<u32>,
    /// Output height; width follows aspect ratio when unset.
    pub height: Option<u32>,
    pub fps: Option<u32>,
    /// Image quality (2-31) or video CRF (0-51), codec semantics.
    pub quality: Option<u32>,
    /// Video bitrate, engine syntax (e.g. "2M", "5000k").
    pub bitrate: Option<String>,
    /// Audio bitrate (e.g. "192k").
    pub audio_bitrate: Option<String>,
    /// Explicit encoder, wins over the extension table.
    pub codec: Option<String>,
    /// Encoding speed preset, passed verbatim.
    pub preset: Option<String>,
    pub extra_args: Vec<String>,
    pub output_dir: Option<PathBuf>,
}

/// Input/output pair with kinds resolved from the extension tables.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub input_kind: MediaKind,
    pub output_kind: MediaKind,
    pub input_is_video: bool,
    pub output_is_video: bool,
    pub output_ext: String,
}

impl ConversionRequest {
    pub fn new(input: &Path, output: &Path) -> Self {
        let input_ext = extension_of(input);
        let output_ext = extension_of(output);
        Self {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            input_kind: MediaKind::classify(&input_ext),
            output_kind: MediaKind::classify(&output_ext),
            input_is_video: routes_as_video(&input_ext),
            output_is_video: routes_as_video(&output_ext),
            output_ext,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    pub success: bool,
    pub output_path: String,
    pub output_size: u64,
    pub exit_code: Option<i32>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_request_resolution() {
        let cases: &[(&str, &str, MediaKind, MediaKind, bool, bool)] = &[
            ("in.mkv", "out.mp4", MediaKind::Video, MediaKind::Video, true, true),
            ("in.png", "out.jpg", MediaKind::Image, MediaKind::Image, false, false),
            ("in.mp4", "out.gif", MediaKind::Video, MediaKind::Image, true, true),
            ("in.gif", "out.mp4", MediaKind::Image, MediaKind::Video, true, true),
            ("in.jpg", "out.mp4", MediaKind::Image, MediaKind::Video, false, true),
            ("in.mp4", "out.mp3", MediaKind::Video, MediaKind::Audio, true, false),
        ];

        for (input, output, in_kind, out_kind, in_vid, out_vid) in cases {
            let req = ConversionRequest::new(&PathBuf::from(input), &PathBuf::from(output));
            assert_eq!(req.input_kind, *in_kind, "{} input kind", input);
            assert_eq!(req.output_kind, *out_kind, "{} output kind", output);
            assert_eq!(req.input_is_video, *in_vid, "{} input routing", input);
            assert_eq!(req.output_is_video, *out_vid, "{} output routing", output);
        }
    }

    #[test]
    fn test_default_options_are_all_absent() {
        let opts = ConvertOptions::default();
        assert!(opts.width.is_none());
        assert!(opts.height.is_none());
        assert!(opts.quality.is_none());
        assert!(opts.bitrate.is_none());
        assert!(opts.codec.is_none());
        assert!(opts.extra_args.is_empty());
        assert!(opts.output_dir.is_none());
    }
}
