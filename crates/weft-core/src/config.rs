//! weft.toml configuration parser.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::RenderMode;

pub const DEFAULT_BUFFER_SIZE: usize = 4096;
pub const DEFAULT_MINIMUM_READ_SIZE: usize = 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid reader config: {0}")]
    InvalidReader(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeftConfig {
    #[serde(default)]
    pub reader: ReaderConfig,
    #[serde(default)]
    pub components: ComponentsConfig,
}

/// Options for the pull-based request body reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Initial capacity used when the reader has to coalesce chunks.
    pub buffer_size: usize,
    /// A read keeps pulling ready chunks until this many new bytes are buffered.
    pub minimum_read_size: usize,
    /// When false, completing the reader also closes the request body stream.
    pub leave_open: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            minimum_read_size: DEFAULT_MINIMUM_READ_SIZE,
            leave_open: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentsConfig {
    pub render_mode: RenderMode,
}

impl WeftConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: WeftConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reader.buffer_size == 0 {
            return Err(ConfigError::InvalidReader(
                "buffer_size must be > 0".to_string(),
            ));
        }
        if self.reader.minimum_read_size == 0 {
            return Err(ConfigError::InvalidReader(
                "minimum_read_size must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Scaffold a weft.toml with every option spelled out.
    pub fn scaffold() -> Self {
        WeftConfig {
            reader: ReaderConfig::default(),
            components: ComponentsConfig {
                render_mode: RenderMode::WebAssembly,
            },
        }
    }
}
