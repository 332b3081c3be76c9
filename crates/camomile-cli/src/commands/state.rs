//! Host state blob commands.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use camomile_core::{HostState, PatchState};
use clap::{Args, Subcommand};

use super::common;

#[derive(Args)]
pub struct StateArgs {
    #[command(subcommand)]
    command: StateCommand,
}

#[derive(Subcommand)]
enum StateCommand {
    /// Load a patch and write the state a host would store
    Save {
        /// Patch file
        #[arg(value_name = "PATCH")]
        patch: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Restore a state blob and list the resulting parameters
    Load {
        /// State file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

pub fn run(args: StateArgs, config: Option<&Path>) -> anyhow::Result<()> {
    let config = common::load_config(config)?;
    let processor = common::processor(config.processor);

    match args.command {
        StateCommand::Save { patch, output } => {
            common::load(&processor, &patch)?;
            let blob = processor.save_state()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &blob)
                        .with_context(|| format!("writing {}", path.display()))?;
                    tracing::info!(path = %path.display(), bytes = blob.len(), "state saved");
                }
                None => {
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(&blob)?;
                    writeln!(stdout)?;
                }
            }
        }
        StateCommand::Load { file } => {
            let blob =
                std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            processor.restore_state(&blob);
            if processor.patch_state() != PatchState::Loaded {
                bail!("state in {} did not restore a patch", file.display());
            }
            println!("Restored: {}", processor.saved_patch().file_path().display());
            println!();
            common::print_parameters(&processor, false);
        }
    }

    Ok(())
}
