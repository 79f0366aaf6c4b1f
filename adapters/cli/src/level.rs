use std::{fs, path::Path};

use anyhow::{Context, Result};
use tilewalk_world::{Level, LevelDescriptor};

/// Loads the level at `path`, or the built-in mailbox level when absent.
pub(crate) fn load_level(path: Option<&Path>) -> Result<Level> {
    let Some(path) = path else {
        return Ok(Level::mailbox());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read level file at {}", path.display()))?;
    parse_level(&contents).with_context(|| format!("invalid level file {}", path.display()))
}

fn parse_level(contents: &str) -> Result<Level> {
    let descriptor: LevelDescriptor =
        toml::from_str(contents).context("failed to parse level toml contents")?;
    Ok(Level::from_descriptor(descriptor)?)
}
