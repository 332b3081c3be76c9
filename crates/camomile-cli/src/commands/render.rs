//! Offline rendering through a patch.

use std::path::{Path, PathBuf};

use anyhow::bail;
use camomile_core::{HostParameters, HostRender};
use clap::Args;

use super::common;
use crate::wav;

#[derive(Args)]
pub struct RenderArgs {
    /// Patch file
    #[arg(value_name = "PATCH")]
    patch: PathBuf,

    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file (32-bit float)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Processing block size (defaults to the configured block size)
    #[arg(long)]
    block_size: Option<usize>,

    /// Parameter overrides as normalized values (e.g., "0=0.75")
    #[arg(long, value_parser = common::parse_param, number_of_values = 1)]
    param: Vec<(usize, f32)>,
}

pub fn run(args: RenderArgs, config: Option<&Path>) -> anyhow::Result<()> {
    let config = common::load_config(config)?;

    let (input, spec) = wav::read_planar(&args.input)?;
    let channels = input.len();
    let frames = input.first().map_or(0, Vec::len);
    let block_size = args.block_size.unwrap_or(config.processor.block_size);
    if block_size == 0 {
        bail!("block size must be greater than zero");
    }
    tracing::info!(
        path = %args.input.display(),
        channels,
        frames,
        sample_rate = spec.sample_rate,
        "read input"
    );

    let processor_config = config
        .processor
        .with_channels(channels, channels)
        .with_audio(f64::from(spec.sample_rate), block_size);
    let processor = common::processor(processor_config);
    processor.prepare(f64::from(spec.sample_rate), block_size);
    common::load(&processor, &args.patch)?;

    for &(index, value) in &args.param {
        if index >= processor.parameter_count() {
            bail!(
                "parameter index {index} out of range (0..{})",
                processor.parameter_count()
            );
        }
        processor.set_parameter(index, value);
        tracing::debug!(
            index,
            name = %processor.parameter_name(index),
            value = processor.parameter(index),
            "parameter set"
        );
    }

    let mut block = vec![vec![0.0f32; block_size]; channels];
    let mut output: Vec<Vec<f32>> = vec![Vec::with_capacity(frames); channels];
    for start in (0..frames).step_by(block_size) {
        let n = block_size.min(frames - start);
        for (buffer, source) in block.iter_mut().zip(&input) {
            buffer[..n].copy_from_slice(&source[start..start + n]);
        }
        let mut refs: Vec<&mut [f32]> = block.iter_mut().map(|b| &mut b[..n]).collect();
        processor.process_block(n, &mut refs);
        for (sink, buffer) in output.iter_mut().zip(&block) {
            sink.extend_from_slice(&buffer[..n]);
        }
    }
    processor.release();

    wav::write_planar(&args.output, &output, spec.sample_rate)?;
    tracing::info!(path = %args.output.display(), frames, "wrote output");
    Ok(())
}
