//! WAV file I/O with planar buffers.

use std::path::Path;

use anyhow::Context;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

/// Read a WAV file into one buffer per channel, samples scaled to `[-1, 1]`.
pub fn read_planar(path: &Path) -> anyhow::Result<(Vec<Vec<f32>>, WavSpec)> {
    let reader = WavReader::open(path).with_context(|| format!("opening {}", path.display()))?;
    let spec = reader.spec();
    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    let channels = usize::from(spec.channels.max(1));
    let mut planar = vec![Vec::with_capacity(interleaved.len() / channels); channels];
    for frame in interleaved.chunks_exact(channels) {
        for (buffer, &sample) in planar.iter_mut().zip(frame) {
            buffer.push(sample);
        }
    }
    Ok((planar, spec))
}

/// Write planar buffers as a 32-bit float WAV file.
pub fn write_planar(path: &Path, planar: &[Vec<f32>], sample_rate: u32) -> anyhow::Result<()> {
    let spec = WavSpec {
        channels: u16::try_from(planar.len()).context("too many channels")?,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer =
        WavWriter::create(path, spec).with_context(|| format!("creating {}", path.display()))?;
    let frames = planar.iter().map(Vec::len).min().unwrap_or(0);
    for frame in 0..frames {
        for buffer in planar {
            writer.write_sample(buffer[frame])?;
        }
    }
    writer.finalize()?;
    Ok(())
}
