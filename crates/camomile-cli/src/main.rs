//! Camomile CLI - inspect patches, manage host state blobs, render audio offline.

mod commands;
mod wav;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "camomile")]
#[command(author, version, about = "Camomile patch host CLI", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the user configuration file)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a patch and list its parameters
    Inspect(commands::inspect::InspectArgs),

    /// Save or restore a host state blob
    State(commands::state::StateArgs),

    /// Render a WAV file through a patch
    Render(commands::render::RenderArgs),

    /// Show or initialize the configuration file
    Config(commands::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Inspect(args) => commands::inspect::run(args, config),
        Commands::State(args) => commands::state::run(args, config),
        Commands::Render(args) => commands::render::run(args, config),
        Commands::Config(args) => commands::config::run(args, config),
    }
}
