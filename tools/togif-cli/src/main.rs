//! togif CLI: turn screen recordings into GIFs.
//!
//! Usage:
//!   togif init <VIDEO>              Probe a clip and write an edit document
//!   togif info <DOC>                Show an edit document
//!   togif replay <DOC> <SCRIPT>     Apply a recorded gesture script
//!   togif plan <DOC>                Print the compiled filter pipeline
//!   togif mask <PNG>                Write a rounded-corner mask image
//!   togif export <DOC>              Render the GIF with ffmpeg
//!   togif check                     Check ffmpeg availability and config

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use togif_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "togif",
    about = "Crop, zoom, and trim screen recordings into GIFs",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/togif/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe a video and create an edit document for it
    Init {
        /// Source video
        source: PathBuf,

        /// Document path (defaults to <source>.togif.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Quality preset: high|medium|low
        #[arg(long)]
        quality: Option<String>,

        /// Enable the rounded background frame
        #[arg(long)]
        background: bool,
    },

    /// Show an edit document
    Info {
        /// Path to the edit document
        document: PathBuf,
    },

    /// Replay a JSONL gesture script against a document
    Replay {
        /// Path to the edit document
        document: PathBuf,

        /// JSONL script of pointer events and editor commands
        script: PathBuf,

        /// Preview container size the script was recorded against
        #[arg(long, default_value = "640")]
        canvas_width: f64,

        #[arg(long, default_value = "360")]
        canvas_height: f64,

        /// Timeline track left edge and width
        #[arg(long, default_value = "100")]
        track_left: f64,

        #[arg(long, default_value = "1000")]
        track_width: f64,

        /// Write the result here instead of updating the document
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the filter pipeline an export would run
    Plan {
        /// Path to the edit document
        document: PathBuf,

        /// Print the pipeline description as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a rounded-corner alpha mask
    Mask {
        /// Output PNG path
        output: PathBuf,

        #[arg(long, default_value = "600")]
        width: u32,

        #[arg(long, default_value = "338")]
        height: u32,

        /// Corner radius in pixels
        #[arg(long, default_value = "16")]
        radius: u32,
    },

    /// Render an edit document to a GIF
    Export {
        /// Path to the edit document
        document: PathBuf,

        /// Output file path (defaults to the source name with .gif)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the document's quality preset: high|medium|low
        #[arg(long)]
        quality: Option<String>,
    },

    /// Check external tools and configuration
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display()))?,
        None => AppConfig::load(),
    };

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    togif_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Init {
            source,
            output,
            quality,
            background,
        } => commands::init::run(&config, source, output, quality, background),
        Commands::Info { document } => commands::info::run(document),
        Commands::Replay {
            document,
            script,
            canvas_width,
            canvas_height,
            track_left,
            track_width,
            output,
        } => commands::replay::run(
            &config,
            document,
            script,
            (canvas_width, canvas_height),
            (track_left, track_width),
            output,
        ),
        Commands::Plan { document, json } => commands::plan::run(document, json),
        Commands::Mask {
            output,
            width,
            height,
            radius,
        } => commands::mask::run(output, width, height, radius),
        Commands::Export {
            document,
            output,
            quality,
        } => commands::export::run(&config, document, output, quality).await,
        Commands::Check => commands::check::run(&config, cli.config.as_deref()),
    }
}
