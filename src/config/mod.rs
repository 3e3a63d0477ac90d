use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::CredsweepError;

/// Default config file name, looked up in the working directory when no
/// explicit path is given.
pub const CONFIG_FILE: &str = "credsweep.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub scan: ScanConfig,
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Base window size in KiB; the engine adds the detector overlap on top.
    pub window_kib: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { window_kib: 64 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    /// Per-request deadline for validator round-trips, in seconds.
    pub timeout_secs: u64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), CredsweepError> {
        if self.scan.window_kib == 0 {
            return Err(CredsweepError::Config(
                "scan.window_kib must be non-zero".into(),
            ));
        }
        if self.validation.timeout_secs == 0 {
            return Err(CredsweepError::Config(
                "validation.timeout_secs must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Load configuration from an explicit path, or `credsweep.toml` in the
/// working directory, or defaults when neither exists. An explicit path that
/// cannot be read is an error; the implicit one is optional.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let (path, required) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (std::path::PathBuf::from(CONFIG_FILE), false),
    };

    if !path.exists() {
        if required {
            anyhow::bail!("config file not found: {}", path.display());
        }
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config from {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("failed to parse config from {}", path.display()))?;
    config.validate()?;
    Ok(config)
}
