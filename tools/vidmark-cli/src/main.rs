//! vidmark CLI: watermark videos from the command line.
//!
//! Usage:
//!   vidmark export <SOURCE> --watermark <IMG>   Watermark a video
//!   vidmark probe <SOURCE>                      Show tracks and orientation
//!   vidmark check                               Check for ffmpeg/ffprobe
//!   vidmark init-config                         Write the default config file

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use vidmark_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "vidmark",
    about = "Overlay a watermark image on a video and re-encode it",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watermark a video
    Export {
        /// Source video
        source: PathBuf,

        /// Watermark image (PNG or JPEG)
        #[arg(short, long)]
        watermark: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output file name
        #[arg(long)]
        name: Option<String>,

        /// Watermark placement: quarter|full-width|centered
        #[arg(long)]
        placement: Option<String>,

        /// Watermark width as a fraction of the frame (centered placement)
        #[arg(long)]
        fraction: Option<f64>,

        /// Output container: mp4|mov
        #[arg(long)]
        container: Option<String>,

        /// Quality preset: highest|medium|low
        #[arg(long)]
        preset: Option<String>,
    },

    /// Show the tracks, orientation, and render size of a video
    Probe {
        /// Source video
        source: PathBuf,
    },

    /// Check for the ffmpeg and ffprobe binaries
    Check,

    /// Write the default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match (&cli.command, &cli.config) {
        (Commands::InitConfig { .. }, _) => AppConfig::default(),
        (_, Some(path)) => AppConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display()))?,
        (_, None) => AppConfig::load(),
    };

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    vidmark_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Export {
            source,
            watermark,
            output,
            name,
            placement,
            fraction,
            container,
            preset,
        } => {
            let args = commands::export::ExportArgs {
                source,
                watermark,
                output,
                name,
                placement,
                fraction,
                container,
                preset,
            };
            commands::export::run(&config, args).await
        }
        Commands::Probe { source } => commands::probe::run(&config, source).await,
        Commands::Check => commands::check::run(),
        Commands::InitConfig { force } => commands::init_config::run(cli.config, force),
    }
}
