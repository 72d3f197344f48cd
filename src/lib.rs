//! Mediamorph — interactive FFmpeg front-end
//!
//! Converts between video, image and audio files by building command lines
//! for the external FFmpeg engine and supervising its execution:
//! - Option translation (extension→codec tables, quality rules, filters)
//! - Engine/probe discovery with bounded version verification
//! - Process supervision with a lazy progress-event stream
//! - Interactive menu shell and distribution bundling
//!
//! All actual decode/encode work happens in the engine; nothing here parses
//! media containers.

pub mod bundle;
pub mod codec_table;
pub mod converter;
pub mod engine;
pub mod errors;
pub mod ffprobe;
pub mod logging;
pub mod media_kind;
pub mod menu;
pub mod options;
pub mod runner;
pub mod translator;

pub use converter::MediaConverter;
pub use engine::Engine;
pub use errors::{ConvertError, Result};
pub use media_kind::MediaKind;
pub use options::{ConversionRequest, ConversionResult, ConvertOptions};
