//! Codec and quality mapping tables
//!
//! The extension→encoder and extension→quality-range lookups live here as
//! enumerated structures so the mappings stay auditable and testable without
//! touching process execution.

use serde::{Deserialize, Serialize};

/// Quality used for image outputs when the user left it unset.
pub const DEFAULT_IMAGE_QUALITY: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoCodec {
    H264,
    Xvid,
    Vp9,
    Wmv2,
    GifNative,
}

impl VideoCodec {
    /// Default encoder for an output extension. `None` means no `-c:v` flag:
    /// the engine picks its own default for the container.
    pub fn for_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "mp4" | "mov" | "m4v" | "mkv" | "flv" => Some(VideoCodec::H264),
            "avi" => Some(VideoCodec::Xvid),
            "webm" => Some(VideoCodec::Vp9),
            "wmv" => Some(VideoCodec::Wmv2),
            "gif" => Some(VideoCodec::GifNative),
            _ => None,
        }
    }

    pub fn encoder_name(&self) -> &'static str {
        match self {
            VideoCodec::H264 => "libx264",
            VideoCodec::Xvid => "libxvid",
            VideoCodec::Vp9 => "libvpx-vp9",
            VideoCodec::Wmv2 => "wmv2",
            VideoCodec::GifNative => "gif",
        }
    }
}

/// Per-format reinterpretation of the quality scalar for image outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageQualityRule {
    /// `-q:v`, clamped to [2, 31]. Lower is better.
    Jpeg,
    /// `-compression_level`, quality / 3 clamped to [0, 9].
    Png,
    /// `-q:v`, clamped to [1, 100]. Higher is better.
    Webp,
}

impl ImageQualityRule {
    pub fn for_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageQualityRule::Jpeg),
            "png" => Some(ImageQualityRule::Png),
            "webp" => Some(ImageQualityRule::Webp),
            _ => None,
        }
    }

    /// Pixel format forced alongside the quality flag, if any.
    pub fn pixel_format(&self) -> Option<&'static str> {
        match self {
            ImageQualityRule::Jpeg => Some("yuvj420p"),
            _ => None,
        }
    }

    /// Engine flags for a quality value, clamped into the format's range.
    pub fn quality_args(&self, quality: u32) -> Vec<String> {
        match self {
            ImageQualityRule::Jpeg => {
                vec!["-q:v".to_string(), quality.clamp(2, 31).to_string()]
            }
            ImageQualityRule::Png => {
                vec![
                    "-compression_level".to_string(),
                    (quality / 3).clamp(0, 9).to_string(),
                ]
            }
            ImageQualityRule::Webp => {
                vec!["-q:v".to_string(), quality.clamp(1, 100).to_string()]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_for_extension() {
        let cases: &[(&str, Option<VideoCodec>)] = &[
            ("mp4", Some(VideoCodec::H264)),
            (".MP4", Some(VideoCodec::H264)),
            ("mov", Some(VideoCodec::H264)),
            ("m4v", Some(VideoCodec::H264)),
            ("mkv", Some(VideoCodec::H264)),
            ("flv", Some(VideoCodec::H264)),
            ("avi", Some(VideoCodec::Xvid)),
            ("webm", Some(VideoCodec::Vp9)),
            ("wmv", Some(VideoCodec::Wmv2)),
            ("gif", Some(VideoCodec::GifNative)),
            ("ts", None),
            ("ogv", None),
        ];

        for (ext, expected) in cases {
            assert_eq!(
                VideoCodec::for_extension(ext),
                *expected,
                "for_extension({:?}) mismatch",
                ext
            );
        }
    }

    #[test]
    fn test_encoder_names() {
        assert_eq!(VideoCodec::H264.encoder_name(), "libx264");
        assert_eq!(VideoCodec::Xvid.encoder_name(), "libxvid");
        assert_eq!(VideoCodec::Vp9.encoder_name(), "libvpx-vp9");
        assert_eq!(VideoCodec::Wmv2.encoder_name(), "wmv2");
        assert_eq!(VideoCodec::GifNative.encoder_name(), "gif");
    }

    #[test]
    fn test_jpeg_quality_clamping() {
        let rule = ImageQualityRule::Jpeg;
        assert_eq!(rule.quality_args(0), vec!["-q:v", "2"]);
        assert_eq!(rule.quality_args(2), vec!["-q:v", "2"]);
        assert_eq!(rule.quality_args(15), vec!["-q:v", "15"]);
        assert_eq!(rule.quality_args(200), vec!["-q:v", "31"]);
    }

    #[test]
    fn test_png_quality_is_compression_level() {
        let rule = ImageQualityRule::Png;
        assert_eq!(rule.quality_args(0), vec!["-compression_level", "0"]);
        assert_eq!(rule.quality_args(9), vec!["-compression_level", "3"]);
        assert_eq!(rule.quality_args(200), vec!["-compression_level", "9"]);
    }

    #[test]
    fn test_webp_quality_clamping() {
        let rule = ImageQualityRule::Webp;
        assert_eq!(rule.quality_args(0), vec!["-q:v", "1"]);
        assert_eq!(rule.quality_args(85), vec!["-q:v", "85"]);
        assert_eq!(rule.quality_args(200), vec!["-q:v", "100"]);
    }

    #[test]
    fn test_only_jpeg_forces_pixel_format() {
        assert_eq!(ImageQualityRule::Jpeg.pixel_format(), Some("yuvj420p"));
        assert_eq!(ImageQualityRule::Png.pixel_format(), None);
        assert_eq!(ImageQualityRule::Webp.pixel_format(), None);
    }

    #[test]
    fn test_unknown_image_extension_has_no_rule() {
        assert_eq!(ImageQualityRule::for_extension("bmp"), None);
        assert_eq!(ImageQualityRule::for_extension("tiff"), None);
        assert_eq!(ImageQualityRule::for_extension("mp3"), None);
    }
}
