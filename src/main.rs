use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

use mediamorph::bundle::{bundle, BundleConfig};
use mediamorph::logging::{init_logging, LogConfig};
use mediamorph::{menu, Engine, MediaConverter};

#[derive(Parser)]
#[command(name = "mediamorph")]
#[command(version, about = "Interactive FFmpeg front-end for media conversion", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Bundle the application with the engine binaries into a dist directory
    Bundle {
        /// Directory containing ffmpeg/ffprobe to ship
        #[arg(long)]
        ffmpeg_dir: PathBuf,
        /// Destination directory
        #[arg(long, default_value = "dist")]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let _ = init_logging("mediamorph", LogConfig::default().with_level(level));

    ctrlc::set_handler(|| {
        println!("\n👋 Cancelled");
        std::process::exit(130);
    })?;

    match cli.command {
        Some(Commands::Bundle { ffmpeg_dir, output }) => {
            let report = bundle(&BundleConfig { ffmpeg_dir }, &output)?;
            println!(
                "📦 Bundled {} files into {}",
                report.files_copied,
                report.dist_dir.display()
            );
            Ok(())
        }
        None => {
            let engine = match Engine::locate() {
                Ok(engine) => engine,
                Err(e) => {
                    eprintln!("❌ {}", e);
                    eprintln!("   Conversion needs a working FFmpeg installation.");
                    std::process::exit(1);
                }
            };

            match engine.version() {
                Some(version) => println!("✅ FFmpeg: {}", version),
                None => println!("✅ FFmpeg: OK"),
            }

            let converter = MediaConverter::new(engine);
            menu::run(&converter)
        }
    }
}
