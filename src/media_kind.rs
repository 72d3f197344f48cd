//! Media kind classification
//!
//! Fixed extension tables deciding whether a path is treated as video,
//! image or audio. GIF lives in the image table but is routed through the
//! video pipeline (animated-image output gets the palette filter graph).

use serde::{Deserialize, Serialize};
use std::path::Path;

pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "avi", "mkv", "mov", "wmv", "flv", "webm", "m4v", "ts", "m2ts",
];

pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "bmp", "gif", "webp", "tiff", "tif", "ico", "raw", "cr2", "nef",
];

pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "aac", "flac", "ogg", "m4a", "wma"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Video,
    Image,
    Audio,
    Unknown,
}

impl MediaKind {
    pub fn classify(ext: &str) -> Self {
        let ext = ext.trim_start_matches('.').to_lowercase();
        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Video
        } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Image
        } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Audio
        } else {
            MediaKind::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Image => "image",
            MediaKind::Audio => "audio",
            MediaKind::Unknown => "unknown",
        }
    }
}

/// GIF takes the video pipeline despite being classified as an image.
pub fn routes_as_video(ext: &str) -> bool {
    let ext = ext.trim_start_matches('.').to_lowercase();
    MediaKind::classify(&ext) == MediaKind::Video || ext == "gif"
}

/// Lowercase extension of a path, without the leading dot.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}
