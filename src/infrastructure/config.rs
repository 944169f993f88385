//! Configuration management

use crate::domain::extract::ExtractOptions;
use crate::domain::graph::GraphConfig;
use crate::error::{Result, SynergyError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub graph: GraphConfig,
    pub extract: ExtractOptions,
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| SynergyError::ReadArtifact {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents).map_err(|e| match e {
            SynergyError::Config(msg) => {
                SynergyError::Config(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Load from `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                log::debug!("Loading configuration from {}", path.display());
                Self::load(path)
            }
            None => Ok(Config::default()),
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Scores must lie in [0, 1] and the fan-out divisor must be positive
    pub fn validate(&self) -> Result<()> {
        for (name, score) in self.graph.scores() {
            if !(0.0..=1.0).contains(&score) {
                return Err(SynergyError::Config(format!(
                    "graph.{} must be between 0 and 1 (got {})",
                    name, score
                )));
            }
        }
        if !(self.graph.fanout_divisor > 0.0) {
            return Err(SynergyError::Config(format!(
                "graph.fanout_divisor must be positive (got {})",
                self.graph.fanout_divisor
            )));
        }
        Ok(())
    }
}
