//! webp-resize - bounded, aspect-preserving lossy WebP conversion.
//!
//! Serves an HTTP API that fetches or accepts an image and answers with a
//! WebP that fits inside a bounding box, and converts local files the same
//! way from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Run the HTTP service
//! webp-resize serve --port 8080
//!
//! # Convert a single image next to its source
//! webp-resize convert photo.jpg
//!
//! # Convert a directory into another one, emitting JSONL metadata
//! webp-resize convert ./photos/ -o ./out/ --metadata-format jsonl
//!
//! # View configuration
//! webp-resize config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;
mod server;

/// webp-resize - bounded, aspect-preserving lossy WebP conversion.
#[derive(Parser, Debug)]
#[command(name = "webp-resize")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP service
    Serve(cli::serve::ServeArgs),

    /// Convert local files or a remote URL to WebP
    Convert(cli::convert::ConvertArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match webp_resize_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `webp-resize config path`."
            );
            webp_resize_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("webp-resize v{}", webp_resize_core::VERSION);

    match cli.command {
        Commands::Serve(args) => cli::serve::execute(args, config).await,
        Commands::Convert(args) => cli::convert::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
