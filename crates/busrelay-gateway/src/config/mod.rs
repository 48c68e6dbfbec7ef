//! Relay configuration: optional strict YAML file, then environment, then defaults.

pub mod resolve;
pub mod schema;

use std::fs;

use busrelay_core::error::{RelayError, Result};

pub use resolve::{BusConfig, RelayConfig, TelemetryConfig};
pub use schema::{BusSection, FileConfig, ListenSection, TelemetrySection};

/// Environment variable naming an optional YAML config file.
pub const CONFIG_PATH_VAR: &str = "BUSRELAY_CONFIG";

pub fn load_from_file(path: &str) -> Result<FileConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| RelayError::Config(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<FileConfig> {
    let cfg: FileConfig = serde_yaml::from_str(s)
        .map_err(|e| RelayError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Resolve from the process environment, reading `BUSRELAY_CONFIG` if set.
pub fn from_env() -> Result<RelayConfig> {
    let lookup = |key: &str| std::env::var(key).ok();
    let file = match lookup(CONFIG_PATH_VAR).filter(|p| !p.is_empty()) {
        Some(path) => Some(load_from_file(&path)?),
        None => None,
    };
    RelayConfig::resolve(file.as_ref(), lookup)
}
