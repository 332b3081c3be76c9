//! Configuration file command.

use std::path::Path;

use anyhow::{Context, bail};
use camomile_config::{CamomileConfig, paths};
use clap::{Args, Subcommand};

use super::common;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn run(args: ConfigArgs, config: Option<&Path>) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let loaded = common::load_config(config)?;
            print!("{}", loaded.to_toml()?);
        }
        ConfigCommand::Init { force } => {
            let path = config.map_or_else(paths::user_config_file, Path::to_path_buf);
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            CamomileConfig::default()
                .save(&path)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}
