//! Slidecast CLI: create, inspect, render, and export slide projects.
//!
//! Usage:
//!   slidecast init <NAME>        Create a new project from a template
//!   slidecast info <PATH>        Show project information
//!   slidecast validate <PATH>    Validate a project file
//!   slidecast templates          List built-in templates
//!   slidecast render <PATH>      Render one frame of a page to PNG
//!   slidecast export <PATH>      Export a project to video
//!   slidecast check              Check system capabilities

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use slidecast_common::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "slidecast",
    about = "Animated slides to short vertical videos",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new project file
    Init {
        /// Project name
        name: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Template for the first page
        #[arg(short, long, default_value = "blank")]
        template: String,

        /// Canvas width (defaults to the configured canvas)
        #[arg(long)]
        width: Option<u32>,

        /// Canvas height (defaults to the configured canvas)
        #[arg(long)]
        height: Option<u32>,
    },

    /// Show project information
    Info {
        /// Path to the project file
        path: PathBuf,
    },

    /// Validate a project file
    Validate {
        /// Path to the project file
        path: PathBuf,
    },

    /// List built-in page templates
    Templates {
        /// Print the templates as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a single frame of one page to a PNG file
    Render {
        /// Path to the project file
        path: PathBuf,

        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Animation progress [0.0, 1.0]
        #[arg(long, default_value = "1.0")]
        progress: f64,

        /// Output PNG path
        #[arg(short, long, default_value = "frame.png")]
        output: PathBuf,
    },

    /// Export a project to video
    Export {
        /// Path to the project file
        path: PathBuf,

        /// Output file (or directory for png-sequence)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: webm|mp4|png-sequence
        #[arg(long)]
        format: Option<String>,

        /// Frames per second
        #[arg(long)]
        fps: Option<u32>,

        /// Render as fast as possible instead of at playback speed
        #[arg(long)]
        no_pace: bool,
    },

    /// Check system capabilities
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    // Initialize logging
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    slidecast_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Init {
            name,
            output,
            template,
            width,
            height,
        } => commands::init::run(&config, name, output, template, width, height),
        Commands::Info { path } => commands::info::run(&config, path),
        Commands::Validate { path } => commands::validate::run(path),
        Commands::Templates { json } => commands::templates::run(json),
        Commands::Render {
            path,
            page,
            progress,
            output,
        } => commands::render::run(&config, path, page, progress, output),
        Commands::Export {
            path,
            output,
            format,
            fps,
            no_pace,
        } => commands::export::run(&config, path, output, format, fps, no_pace).await,
        Commands::Check => commands::check::run(&config),
    }
}
