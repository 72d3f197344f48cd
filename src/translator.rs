//! Option translator
//!
//! Pure functions mapping `ConvertOptions` + a target extension into the
//! argument list appended between the engine's input and output flags.
//! No process is ever spawned from this module.

use crate::codec_table::{ImageQualityRule, VideoCodec, DEFAULT_IMAGE_QUALITY};
use crate::errors::{ConvertError, Result};
use crate::options::ConvertOptions;

/// Audio attached to video outputs when no audio bitrate was requested.
pub const DEFAULT_AUDIO_BITRATE: &str = "192k";

/// Fixed audio reservation for target-size compression, bits per second.
/// Applied regardless of the actual audio stream; kept as-is on purpose.
pub const AUDIO_RESERVE_BPS: u64 = 128 * 1024;

/// Safety margin applied to the computed video bitrate.
pub const SIZE_SAFETY_MARGIN: f64 = 0.9;

pub const DEFAULT_GIF_FPS: u32 = 30;
pub const DEFAULT_GIF_WIDTH: u32 = 480;
pub const DEFAULT_STILL_DURATION_SECS: u32 = 5;
pub const DEFAULT_FRAME_SEEK_SECS: f64 = 1.0;

/// Scale filter with `-1` on the unset axis so the engine preserves aspect
/// ratio. Returns `None` when neither axis is set.
pub fn scale_filter(width: Option<u32>, height: Option<u32>) -> Option<String> {
    match (width, height) {
        (None, None) => None,
        (Some(w), None) => Some(format!("scale={}:-1", w)),
        (None, Some(h)) => Some(format!("scale=-1:{}", h)),
        (Some(w), Some(h)) => Some(format!("scale={}:{}", w, h)),
    }
}

/// Image variant: always the two-axis form, lanczos resampling.
pub fn scale_filter_lanczos(width: Option<u32>, height: Option<u32>) -> Option<String> {
    if width.is_none() && height.is_none() {
        return None;
    }
    let w = width.map(|w| w as i64).unwrap_or(-1);
    let h = height.map(|h| h as i64).unwrap_or(-1);
    Some(format!("scale={}:{}:flags=lanczos", w, h))
}

/// `-vf` with the scale and fps filters chained, or nothing.
pub fn filter_args(opts: &ConvertOptions) -> Vec<String> {
    let mut filters = Vec::new();
    if let Some(scale) = scale_filter(opts.width, opts.height) {
        filters.push(scale);
    }
    if let Some(fps) = opts.fps {
        filters.push(format!("fps={}", fps));
    }
    if filters.is_empty() {
        Vec::new()
    } else {
        vec!["-vf".to_string(), filters.join(",")]
    }
}

/// Fixed filter graph for animated-image output: fps + scale folded into a
/// two-pass palette chain (generate, then apply). Not configurable beyond
/// width and frame rate.
pub fn gif_filter_chain(width: Option<u32>, fps: Option<u32>) -> String {
    format!(
        "fps={},scale={}:-1:flags=lanczos,split[s0][s1];[s0]palettegen=max_colors=128[p];[s1][p]paletteuse",
        fps.unwrap_or(DEFAULT_GIF_FPS),
        width.unwrap_or(DEFAULT_GIF_WIDTH),
    )
}

/// Encoder arguments for a video output extension.
pub fn video_args(output_ext: &str, opts: &ConvertOptions) -> Vec<String> {
    let ext = output_ext.trim_start_matches('.').to_lowercase();
    let mut args = filter_args(opts);

    if let Some(ref codec) = opts.codec {
        args.push("-c:v".to_string());
        args.push(codec.clone());
    } else {
        match VideoCodec::for_extension(&ext) {
            Some(VideoCodec::GifNative) => {
                // GIF never takes the plain scale/fps filters: one combined
                // chain replaces them, and no audio/quality flags apply.
                return vec![
                    "-vf".to_string(),
                    gif_filter_chain(opts.width, opts.fps),
                    "-loop".to_string(),
                    "0".to_string(),
                ];
            }
            Some(codec) => {
                args.push("-c:v".to_string());
                args.push(codec.encoder_name().to_string());
            }
            None => {}
        }
    }

    // Quality and bitrate are mutually exclusive; quality wins.
    if let Some(quality) = opts.quality {
        args.push("-crf".to_string());
        args.push(quality.to_string());
    } else if let Some(ref bitrate) = opts.bitrate {
        args.push("-b:v".to_string());
        args.push(bitrate.clone());
    }

    if let Some(ref preset) = opts.preset {
        args.push("-preset".to_string());
        args.push(preset.clone());
    }

    // Audio is never silently dropped for video targets.
    args.push("-c:a".to_string());
    args.push("aac".to_string());
    args.push("-b:a".to_string());
    args.push(
        opts.audio_bitrate
            .clone()
            .unwrap_or_else(|| DEFAULT_AUDIO_BITRATE.to_string()),
    );

    args.extend(opts.extra_args.iter().cloned());
    args
}

/// Encoder arguments for an image (or other non-video) output extension.
pub fn image_args(output_ext: &str, opts: &ConvertOptions) -> Vec<String> {
    let ext = output_ext.trim_start_matches('.').to_lowercase();
    let mut args = Vec::new();
    let mut filters = Vec::new();

    if let Some(scale) = scale_filter_lanczos(opts.width, opts.height) {
        filters.push(scale);
    }

    let quality = opts.quality.unwrap_or(DEFAULT_IMAGE_QUALITY);
    if let Some(rule) = ImageQualityRule::for_extension(&ext) {
        if let Some(pix_fmt) = rule.pixel_format() {
            filters.push(format!("format={}", pix_fmt));
        }
        args.extend(rule.quality_args(quality));
    }

    if !filters.is_empty() {
        args.push("-vf".to_string());
        args.push(filters.join(","));
    }

    args.push("-y".to_string());
    args
}

/// Arguments for synthesizing a fixed-duration video from a still image.
/// Returns `(before_input, after_input)`: the loop flag has to precede `-i`.
pub fn image_to_video_args(
    opts: &ConvertOptions,
    duration_secs: u32,
) -> (Vec<String>, Vec<String>) {
    let pre = vec!["-loop".to_string(), "1".to_string()];

    let mut post = vec![
        "-c:v".to_string(),
        opts.codec
            .clone()
            .unwrap_or_else(|| VideoCodec::H264.encoder_name().to_string()),
        "-t".to_string(),
        duration_secs.to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
    ];
    post.extend(filter_args(opts));
    if let Some(quality) = opts.quality {
        post.push("-crf".to_string());
        post.push(quality.to_string());
    }
    (pre, post)
}

/// Arguments for extracting a single frame: seek before the input, then
/// exactly one frame-count limit.
pub fn frame_extract_args(seek_secs: f64) -> (Vec<String>, Vec<String>) {
    (
        vec!["-ss".to_string(), format_seek(seek_secs)],
        vec!["-vframes".to_string(), "1".to_string()],
    )
}

fn format_seek(secs: f64) -> String {
    if (secs - secs.trunc()).abs() < f64::EPSILON {
        format!("{}", secs as u64)
    } else {
        format!("{:.3}", secs)
    }
}

/// Video bitrate for a target output size, formatted for `-b:v`.
///
/// `targetMB * 8 * 1024 * 1024 / duration`, minus the fixed audio
/// reservation, scaled by the safety margin. A missing or zero duration is
/// a hard failure: no output may be written.
pub fn target_bitrate_kbps(target_mb: u32, duration_secs: f64) -> Result<String> {
    if !(duration_secs > 0.0) {
        return Err(ConvertError::ProbeFailed(
            "source duration unavailable, cannot compute target bitrate".to_string(),
        ));
    }
    let total_bps = (target_mb as f64 * 8.0 * 1024.0 * 1024.0) / duration_secs;
    let video_bps = (total_bps - AUDIO_RESERVE_BPS as f64).max(0.0) * SIZE_SAFETY_MARGIN;
    Ok(format!("{}k", (video_bps as u64) / 1024))
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// One-axis scaling always carries the preserve-aspect marker on
        /// the unset axis.
        #[test]
        fn prop_single_axis_scale_preserves_aspect(dim in 1u32..8192) {
            let w = scale_filter(Some(dim), None).unwrap();
            prop_assert!(w.ends_with(":-1"));
            let h = scale_filter(None, Some(dim)).unwrap();
            prop_assert!(h.starts_with("scale=-1:"));
        }

        /// Image quality flags stay inside each format's range.
        #[test]
        fn prop_image_quality_always_in_range(q in 0u32..10_000) {
            let jpg: u32 = ImageQualityRule::Jpeg.quality_args(q)[1].parse().unwrap();
            prop_assert!((2..=31).contains(&jpg));
            let png: u32 = ImageQualityRule::Png.quality_args(q)[1].parse().unwrap();
            prop_assert!(png <= 9);
            let webp: u32 = ImageQualityRule::Webp.quality_args(q)[1].parse().unwrap();
            prop_assert!((1..=100).contains(&webp));
        }

        /// The margin keeps the computed video bitrate strictly below the
        /// pre-margin total for any sane target/duration pair.
        #[test]
        fn prop_target_bitrate_under_pre_margin(
            target_mb in 1u32..10_000,
            duration in 1.0f64..100_000.0
        ) {
            let formatted = target_bitrate_kbps(target_mb, duration).unwrap();
            prop_assert!(formatted.ends_with('k'));
            let kbps: u64 = formatted.trim_end_matches('k').parse().unwrap();
            let pre_margin = (target_mb as f64 * 8.0 * 1024.0 * 1024.0) / duration;
            prop_assert!((kbps as f64) * 1024.0 < pre_margin);
        }

        /// Quality and bitrate never co-occur in the flag list.
        #[test]
        fn prop_quality_bitrate_exclusive(
            quality in proptest::option::of(0u32..52),
            bitrate in proptest::option::of("[0-9]{3,4}k")
        ) {
            let o = ConvertOptions { quality, bitrate, ..Default::default() };
            let args = video_args("mp4", &o);
            let has_crf = args.contains(&"-crf".to_string());
            let has_bv = args.contains(&"-b:v".to_string());
            prop_assert!(!(has_crf && has_bv));
        }
    }
}
