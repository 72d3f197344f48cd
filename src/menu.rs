//! Interactive shell
//!
//! Numbered menu over the conversion API. Pure glue: prompts, path
//! validation, defaults. Malformed input re-prompts or falls back to a
//! default, never aborts the program.

use crate::converter::MediaConverter;
use crate::errors::ConvertError;
use crate::options::ConvertOptions;
use crate::translator::{DEFAULT_FRAME_SEEK_SECS, DEFAULT_STILL_DURATION_SECS};
use anyhow::Result;
use console::{style, Term};
use dialoguer::{Input, Select};
use std::path::PathBuf;

const QUICK_VIDEO_FORMATS: &[&str] = &["mp4", "avi", "mkv", "mov", "webm"];
const QUICK_IMAGE_FORMATS: &[&str] = &["jpg", "png", "webp", "bmp"];
const ADVANCED_VIDEO_FORMATS: &[&str] = &["mp4", "avi", "mkv", "mov", "wmv", "flv", "webm"];

pub fn run(converter: &MediaConverter) -> Result<()> {
    let term = Term::stdout();
    loop {
        let _ = term.clear_screen();
        banner();
        print_menu();

        let choice: String = Input::new()
            .with_prompt("Select [0-15]")
            .allow_empty(true)
            .interact_text()?;

        match choice.trim() {
            "0" => {
                println!("\n👋 Bye!");
                return Ok(());
            }
            c @ ("1" | "2" | "3" | "4" | "5") => {
                let index = c.parse::<usize>().unwrap_or(1) - 1;
                if let Some(input) = prompt_existing_file("Drop a video file") {
                    let opts = ConvertOptions {
                        output_dir: prompt_output_dir(),
                        ..Default::default()
                    };
                    report(converter.quick_video_convert(&input, QUICK_VIDEO_FORMATS[index], &opts));
                }
                pause();
            }
            "6" => {
                if let Some(input) = prompt_existing_file("Drop a video file") {
                    let opts = ConvertOptions {
                        width: Some(480),
                        fps: Some(15),
                        quality: Some(10),
                        output_dir: prompt_output_dir(),
                        ..Default::default()
                    };
                    let output = match converter.output_path(
                        &input,
                        "converted",
                        "gif",
                        opts.output_dir.as_deref(),
                    ) {
                        Ok(p) => p,
                        Err(e) => {
                            println!("❌ {}", e);
                            pause();
                            continue;
                        }
                    };
                    report(converter.convert(&input, &output, &opts));
                }
                pause();
            }
            "7" => {
                if let Some(input) = prompt_existing_file("Drop a video file") {
                    let opts = ConvertOptions {
                        output_dir: prompt_output_dir(),
                        ..Default::default()
                    };
                    report(converter.extract_audio(&input, &opts));
                }
                pause();
            }
            c @ ("8" | "9" | "10" | "11") => {
                let index = c.parse::<usize>().unwrap_or(8) - 8;
                if let Some(input) = prompt_existing_file("Drop an image file") {
                    let opts = ConvertOptions {
                        output_dir: prompt_output_dir(),
                        ..Default::default()
                    };
                    report(converter.quick_image_convert(&input, QUICK_IMAGE_FORMATS[index], &opts));
                }
                pause();
            }
            "12" => {
                advanced_video(converter)?;
                pause();
            }
            "13" => {
                advanced_image(converter)?;
                pause();
            }
            "14" => {
                video_image_bridge(converter)?;
                pause();
            }
            "15" => {
                target_size_compression(converter)?;
                pause();
            }
            _ => {
                println!("{}", style("Invalid choice").red());
                pause();
            }
        }
    }
}

fn banner() {
    println!("{}", "=".repeat(60));
    println!(
        "    {} v{}",
        style("Mediamorph — media format converter").bold().cyan(),
        env!("CARGO_PKG_VERSION")
    );
    println!("    video ↔ video | image ↔ image | video ↔ image");
    println!("{}", "=".repeat(60));
}

fn print_menu() {
    println!("\n{}", style("Quick mode — one-click conversion").bold());
    println!("{}", "-".repeat(50));
    println!(" 1. Video → MP4 (H.264)");
    println!(" 2. Video → AVI");
    println!(" 3. Video → MKV");
    println!(" 4. Video → MOV");
    println!(" 5. Video → WEBM");
    println!(" 6. Video → GIF (animated)");
    println!(" 7. Video → MP3 (extract audio)");
    println!("{}", "-".repeat(50));
    println!(" 8. Image → JPG");
    println!(" 9. Image → PNG");
    println!("10. Image → WEBP");
    println!("11. Image → BMP");
    println!("{}", "-".repeat(50));
    println!("{}", style("Advanced mode — custom parameters").bold());
    println!("12. Video conversion + size/quality/bitrate");
    println!("13. Image conversion + size/quality");
    println!("14. Video ↔ image");
    println!("15. Smart compression (target size in MB)");
    println!("{}", "-".repeat(50));
    println!(" 0. Exit");
    println!("{}", "=".repeat(50));
}

fn advanced_video(converter: &MediaConverter) -> Result<()> {
    let Some(input) = prompt_existing_file("Drop a video file") else {
        return Ok(());
    };

    println!("\nOutput formats: {}", ADVANCED_VIDEO_FORMATS.join(", "));
    let format: String = Input::new()
        .with_prompt("Format")
        .interact_text()?;
    let format = format.trim().to_lowercase();
    if !ADVANCED_VIDEO_FORMATS.contains(&format.as_str()) {
        println!("{}", style("Unsupported format").red());
        return Ok(());
    }

    let opts = advanced_options()?;
    let output = converter.output_path(&input, "custom", &format, opts.output_dir.as_deref())?;
    report(converter.convert(&input, &output, &opts));
    Ok(())
}

fn advanced_image(converter: &MediaConverter) -> Result<()> {
    let Some(input) = prompt_existing_file("Drop an image file") else {
        return Ok(());
    };

    println!("\nOutput formats: jpg, png, webp, bmp, gif, tiff");
    let format: String = Input::new()
        .with_prompt("Format")
        .interact_text()?;
    let format = format.trim().to_lowercase();

    let opts = advanced_options()?;
    let output = converter.output_path(&input, "custom", &format, opts.output_dir.as_deref())?;
    report(converter.convert(&input, &output, &opts));
    Ok(())
}

fn video_image_bridge(converter: &MediaConverter) -> Result<()> {
    let direction = Select::new()
        .with_prompt("Direction")
        .items(&["Video → image (extract frame)", "Image → video (slideshow)"])
        .default(0)
        .interact()?;

    if direction == 0 {
        let Some(input) = prompt_existing_file("Drop a video file") else {
            return Ok(());
        };
        println!("\nOutput formats: jpg, png, webp");
        let format: String = Input::new()
            .with_prompt("Format")
            .interact_text()?;
        let format = format.trim().to_lowercase();

        let seek: String = Input::new()
            .with_prompt("Seek position in seconds (default 1)")
            .allow_empty(true)
            .interact_text()?;
        let seek_secs = seek.trim().parse::<f64>().unwrap_or(DEFAULT_FRAME_SEEK_SECS);

        let mut opts = advanced_options()?;
        if opts.output_dir.is_none() {
            opts.output_dir = prompt_output_dir();
        }
        report(converter.extract_frame(&input, &format, seek_secs, &opts));
    } else {
        let Some(input) = prompt_existing_file("Drop an image file") else {
            return Ok(());
        };
        let duration: String = Input::new()
            .with_prompt("Video length in seconds (default 5)")
            .allow_empty(true)
            .interact_text()?;
        let duration_secs = duration
            .trim()
            .parse::<u32>()
            .unwrap_or(DEFAULT_STILL_DURATION_SECS);

        let mut opts = advanced_options()?;
        if opts.fps.is_none() {
            opts.fps = Some(30);
        }
        report(converter.image_to_video(&input, duration_secs, &opts));
    }
    Ok(())
}

fn target_size_compression(converter: &MediaConverter) -> Result<()> {
    let Some(input) = prompt_existing_file("Drop a video file") else {
        return Ok(());
    };
    let size: String = Input::new()
        .with_prompt("Target size in MB (default 50)")
        .allow_empty(true)
        .interact_text()?;
    let target_mb = size.trim().parse::<u32>().unwrap_or(50);

    let opts = ConvertOptions {
        output_dir: prompt_output_dir(),
        ..Default::default()
    };
    report(converter.compress_to_target(&input, target_mb, &opts));
    Ok(())
}

/// Prompt for a path and require it to exist; reports and skips otherwise.
/// Surrounding quotes from drag-and-drop are stripped.
fn prompt_existing_file(label: &str) -> Option<PathBuf> {
    let raw: String = Input::new()
        .with_prompt(label)
        .allow_empty(true)
        .interact_text()
        .ok()?;
    let trimmed = raw.trim().trim_matches('"').trim_matches('\'');
    if trimmed.is_empty() {
        return None;
    }
    let path = PathBuf::from(trimmed);
    if path.exists() {
        Some(path)
    } else {
        println!("{} {}", style("❌ File not found:").red(), path.display());
        None
    }
}

/// `None` means "same directory as the input file".
fn prompt_output_dir() -> Option<PathBuf> {
    let choice = Select::new()
        .with_prompt("Output directory")
        .items(&["Same directory as input", "Custom directory"])
        .default(0)
        .interact()
        .ok()?;
    if choice != 1 {
        return None;
    }

    let raw: String = Input::new()
        .with_prompt("Directory path")
        .allow_empty(true)
        .interact_text()
        .ok()?;
    let trimmed = raw.trim().trim_matches('"');
    if trimmed.is_empty() {
        return None;
    }
    let dir = PathBuf::from(trimmed);
    if dir.is_dir() {
        return Some(dir);
    }
    match std::fs::create_dir_all(&dir) {
        Ok(()) => Some(dir),
        Err(e) => {
            println!(
                "{} {} ({}) — using default",
                style("⚠️ Cannot create directory:").yellow(),
                dir.display(),
                e
            );
            None
        }
    }
}

/// Interactive advanced parameter entry; empty answers keep the defaults.
fn advanced_options() -> Result<ConvertOptions> {
    let mut opts = ConvertOptions::default();

    println!("\n{}", style("Advanced parameters (Enter keeps defaults)").bold());
    opts.output_dir = prompt_output_dir();

    let size: String = Input::new()
        .with_prompt("Output size (e.g. 1920x1080, 1080p, 720p, or a width)")
        .allow_empty(true)
        .interact_text()?;
    let (width, height) = parse_size(size.trim());
    opts.width = width;
    opts.height = height;

    let quality: String = Input::new()
        .with_prompt("Quality (video CRF 0-51, image 2-31; default auto)")
        .allow_empty(true)
        .interact_text()?;
    if let Ok(q) = quality.trim().parse::<u32>() {
        opts.quality = Some(q);
    }

    let fps: String = Input::new()
        .with_prompt("Frame rate (e.g. 30, 60)")
        .allow_empty(true)
        .interact_text()?;
    if let Ok(f) = fps.trim().parse::<u32>() {
        opts.fps = Some(f);
    }

    let bitrate: String = Input::new()
        .with_prompt("Video bitrate (e.g. 2M, 5000k)")
        .allow_empty(true)
        .interact_text()?;
    if !bitrate.trim().is_empty() {
        opts.bitrate = Some(bitrate.trim().to_string());
    }

    println!("Presets: ultrafast|superfast|veryfast|faster|fast|medium|slow|slower|veryslow");
    let preset: String = Input::new()
        .with_prompt("Preset")
        .allow_empty(true)
        .interact_text()?;
    if !preset.trim().is_empty() {
        opts.preset = Some(preset.trim().to_string());
    }

    Ok(opts)
}

/// Accepts `WxH`, the `1080p`/`720p`/`480p` shortcuts, or a bare width.
pub fn parse_size(size: &str) -> (Option<u32>, Option<u32>) {
    if size.is_empty() {
        return (None, None);
    }

    let lower = size.to_lowercase();
    match lower.as_str() {
        "1080p" => return (Some(1920), Some(1080)),
        "720p" => return (Some(1280), Some(720)),
        "480p" => return (Some(854), Some(480)),
        _ => {}
    }

    if let Some((w, h)) = lower.split_once('x') {
        if let (Ok(w), Ok(h)) = (w.trim().parse(), h.trim().parse()) {
            return (Some(w), Some(h));
        }
    }

    if let Ok(w) = lower.parse::<u32>() {
        return (Some(w), None);
    }

    (None, None)
}

fn report(result: crate::errors::Result<crate::options::ConversionResult>) {
    match result {
        Ok(_) => {}
        Err(ConvertError::InputNotFound(path)) => {
            println!("{} {}", style("❌ File not found:").red(), path);
        }
        Err(e) => {
            println!("{} {}", style("❌").red(), e);
        }
    }
}

fn pause() {
    let _: std::result::Result<String, _> = Input::new()
        .with_prompt("Press Enter to continue")
        .allow_empty(true)
        .interact_text();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        let cases: &[(&str, Option<u32>, Option<u32>)] = &[
            ("", None, None),
            ("1920x1080", Some(1920), Some(1080)),
            ("1280X720", Some(1280), Some(720)),
            ("1080p", Some(1920), Some(1080)),
            ("720P", Some(1280), Some(720)),
            ("480p", Some(854), Some(480)),
            ("640", Some(640), None),
            ("banana", None, None),
            ("12xbroken", None, None),
        ];

        for (input, w, h) in cases {
            assert_eq!(parse_size(input), (*w, *h), "parse_size({:?})", input);
        }
    }
}
