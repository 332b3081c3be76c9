//! Patch inspection command.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use camomile_core::{EditorView, HostParameters};
use clap::Args;

use super::common;

#[derive(Args)]
pub struct InspectArgs {
    /// Patch file
    #[arg(value_name = "PATCH")]
    patch: PathBuf,

    /// Also list unbound slots
    #[arg(long)]
    all: bool,

    /// Print the editor layout
    #[arg(long)]
    editor: bool,
}

pub fn run(args: InspectArgs, config: Option<&Path>) -> anyhow::Result<()> {
    let config = common::load_config(config)?;
    let processor = common::processor(config.processor);
    let editor = args
        .editor
        .then(|| EditorView::open(Arc::clone(&processor), config.editor));

    common::load(&processor, &args.patch)?;

    let bound = processor.with_table(|t| t.bound_count());
    println!("Patch:      {}", processor.patch_name());
    println!("Directory:  {}", processor.patch_directory().display());
    println!("Parameters: {bound} of {}", processor.parameter_count());
    println!();
    common::print_parameters(&processor, args.all);

    if let Some(editor) = editor {
        let (width, height) = editor.size();
        println!();
        println!("Editor: {} ({width}x{height})", editor.title());
        for widget in editor.widgets() {
            let b = widget.bounds;
            println!(
                "  [{:>2}] {:<24} {:>4},{:<4} {}x{}  {}",
                widget.index, widget.label, b.x, b.y, b.width, b.height, widget.text
            );
        }
    }

    Ok(())
}
