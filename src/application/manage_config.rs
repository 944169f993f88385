//! Config management use case

use crate::error::Result;
use crate::infrastructure::Config;
use std::path::Path;

/// Service exposing the effective configuration
pub struct ConfigService {
    config: Config,
}

impl ConfigService {
    /// Load from `path` when given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Ok(ConfigService {
            config: Config::load_or_default(path)?,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }

    /// The effective configuration rendered as TOML
    pub fn show(&self) -> Result<String> {
        self.config.to_toml()
    }
}
