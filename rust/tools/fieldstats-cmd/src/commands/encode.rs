//! Encode command implementation

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::scenario::Scenario;

pub fn run(input: String, output_dir: String) -> Result<()> {
    for path in encode_scenario(&input, &output_dir)? {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// Writes every reachable partition of the scenario to
/// `<output_dir>/<index>-<shard>.bin` and returns the written paths.
pub fn encode_scenario(input: impl AsRef<Path>, output_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let scenario = Scenario::load(input)?;
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    let mut written = Vec::new();
    for stats in scenario.partition_stats()? {
        let path = output_dir.join(format!("{}-{}.bin", stats.group(), stats.id().shard));
        let bytes = stats
            .to_bytes()
            .with_context(|| format!("Failed to encode partition {}", stats.id()))?;
        fs::write(&path, bytes)
            .with_context(|| format!("Failed to write payload: {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}
