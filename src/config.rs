//! Gate Configuration
//!
//! Defines the runtime configuration for the verification server:
//! - Data directory holding the table files
//! - Listen address
//! - Credential matching strategy
//! - CORS toggle for the browser frontend

use crate::credentials::MatchStrategy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Directory holding the csv tables
    pub data_dir: PathBuf,
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// How a team number selects its credential row
    pub match_strategy: MatchStrategy,
    /// Allow cross-origin requests from any origin
    pub cors: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            host: "0.0.0.0".to_string(),
            port: 5000,
            match_strategy: MatchStrategy::Direct,
            cors: true,
        }
    }
}

impl GateConfig {
    /// Load from a TOML file. Missing keys keep their defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        Self::from_toml_str(&text).with_context(|| format!("Invalid config file {:?}", path))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
