//! Helpers shared by the commands.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use camomile_config::{CamomileConfig, ProcessorConfig, paths};
use camomile_core::{HostParameters, PatchState, Processor};
use camomile_pd::PdEngineFactory;

/// Load the configuration from `path`, or the user file (defaults if absent).
pub fn load_config(path: Option<&Path>) -> anyhow::Result<CamomileConfig> {
    match path {
        Some(path) => CamomileConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => CamomileConfig::load_or_default(paths::user_config_file())
            .context("loading user config"),
    }
}

/// A processor backed by the Pd engine.
pub fn processor(config: ProcessorConfig) -> Arc<Processor> {
    Arc::new(Processor::new(config, Arc::new(PdEngineFactory)))
}

/// Load `patch`, failing if the processor ends up without a patch.
pub fn load(processor: &Processor, patch: &Path) -> anyhow::Result<()> {
    if processor.load_patch(patch) != PatchState::Loaded {
        bail!("could not load patch {}", patch.display());
    }
    Ok(())
}

/// Parse `index=value` parameter overrides.
pub fn parse_param(s: &str) -> Result<(usize, f32), String> {
    let (index, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid parameter format: '{s}' (expected index=value)"))?;
    let index = index
        .trim()
        .parse()
        .map_err(|_| format!("Invalid parameter index: '{index}'"))?;
    let value = value
        .trim()
        .parse()
        .map_err(|_| format!("Invalid parameter value: '{value}'"))?;
    Ok((index, value))
}

/// Print every bound parameter (all slots with `all`).
pub fn print_parameters(processor: &Processor, all: bool) {
    let max_chars = processor.config().text_max_chars;
    println!(
        "{:>5}  {:<24} {:>8} {:>8} {:>5}  {:<16} FLAGS",
        "INDEX", "NAME", "VALUE", "DEFAULT", "STEPS", "TEXT"
    );
    let bound = processor.with_table(|t| t.iter().map(|s| s.is_bound()).collect::<Vec<_>>());
    for (index, is_bound) in bound.into_iter().enumerate() {
        if !is_bound && !all {
            continue;
        }
        let mut flags = Vec::new();
        if processor.is_parameter_automatable(index) {
            flags.push("automatable");
        }
        if processor.is_meta_parameter(index) {
            flags.push("meta");
        }
        println!(
            "{:>5}  {:<24} {:>8.3} {:>8.3} {:>5}  {:<16} {}",
            index,
            processor.parameter_name(index),
            processor.parameter(index),
            processor.parameter_default(index),
            processor.parameter_steps(index),
            processor.parameter_text_truncated(index, max_chars),
            flags.join(",")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_param_overrides() {
        assert_eq!(parse_param("3=0.5"), Ok((3, 0.5)));
        assert_eq!(parse_param(" 0 = 1 "), Ok((0, 1.0)));
        assert!(parse_param("3").is_err());
        assert!(parse_param("x=0.5").is_err());
        assert!(parse_param("1=loud").is_err());
    }
}
