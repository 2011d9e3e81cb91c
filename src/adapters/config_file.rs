//! JSON file configuration adapter.
//!
//! Implements [`ConfigPort`] over a single JSON file.  A missing file
//! means "use the defaults"; an unparsable or invalid one is an error, so
//! the machine never starts half-configured.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{error, info};

use crate::app::ports::ConfigPort;
use crate::config::MachineConfig;
use crate::error::ConfigError;

/// Parse and validate a JSON configuration.
pub fn parse_config(json: &str) -> Result<MachineConfig, ConfigError> {
    let config: MachineConfig = serde_json::from_str(json).map_err(|e| {
        error!("Config: parse failed at line {} ({})", e.line(), e);
        ConfigError::Corrupted
    })?;
    config.validate()?;
    Ok(config)
}

pub struct JsonFileConfig {
    path: PathBuf,
}

impl JsonFileConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigPort for JsonFileConfig {
    fn load(&self) -> Result<MachineConfig, ConfigError> {
        match fs::read_to_string(&self.path) {
            Ok(json) => {
                let config = parse_config(&json)?;
                info!("JsonFileConfig: loaded {}", self.path.display());
                Ok(config)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("JsonFileConfig: {} not found, using defaults", self.path.display());
                Ok(MachineConfig::default())
            }
            Err(e) => {
                error!("JsonFileConfig: read {} failed ({})", self.path.display(), e);
                Err(ConfigError::Io)
            }
        }
    }

    fn save(&self, config: &MachineConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config).map_err(|_| ConfigError::Corrupted)?;
        fs::write(&self.path, json).map_err(|e| {
            error!("JsonFileConfig: write {} failed ({})", self.path.display(), e);
            ConfigError::Io
        })?;
        info!("JsonFileConfig: saved {}", self.path.display());
        Ok(())
    }
}
