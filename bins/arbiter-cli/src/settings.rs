//! Engine configuration loading.
//!
//! An explicit `--config` path must exist. Without one, the default
//! location (`<config dir>/arbiter/engine.json`) is used when present, and
//! the built-in defaults otherwise.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use arbiter_core::config::EngineConfig;

/// `<config dir>/arbiter/engine.json`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("arbiter").join("engine.json"))
}

pub fn load(explicit: Option<&Path>) -> Result<EngineConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => path,
            None => {
                debug!("no engine config file, using defaults");
                return Ok(EngineConfig::default());
            }
        },
    };
    load_file(&path)
}

fn load_file(path: &Path) -> Result<EngineConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config = EngineConfig::from_json(&text)
        .with_context(|| format!("Invalid config: {}", path.display()))?;
    debug!(path = %path.display(), "loaded engine config");
    Ok(config)
}
