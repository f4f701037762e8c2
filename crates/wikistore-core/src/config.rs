//! Store configuration, read from `wikistore.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::WikiError;

/// File name looked up in the working directory by default.
pub const CONFIG_FILE: &str = "wikistore.toml";

/// Which versions controller backs the page tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionsBackend {
    /// Head only, no history.
    Simple,
    /// Head plus snapshots under `.history/`.
    #[default]
    History,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WikiConfig {
    /// Root directory of the page tree.
    pub root: PathBuf,
    pub versions: VersionsBackend,
    /// Snapshots kept per page by the history backend.
    pub max_versions: usize,
    /// Default author recorded on writes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("FitNesseRoot"),
            versions: VersionsBackend::History,
            max_versions: 10,
            author: None,
        }
    }
}

impl WikiConfig {
    /// Load a config file. A missing file yields the defaults.
    ///
    /// Relative `root` paths are taken relative to the config file's directory.
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::Config`] if the file is not valid TOML for this schema,
    /// or [`WikiError::Io`] if it exists but cannot be read.
    pub fn load(path: &Path) -> Result<Self, WikiError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        let mut config = Self::parse(&text)?;
        if config.root.is_relative() {
            if let Some(dir) = path.parent() {
                config.root = dir.join(&config.root);
            }
        }
        Ok(config)
    }

    /// Parse config TOML.
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::Config`] on malformed input or `max_versions = 0`.
    pub fn parse(text: &str) -> Result<Self, WikiError> {
        let config: Self = toml::from_str(text).map_err(|e| WikiError::Config(e.to_string()))?;
        if config.max_versions == 0 {
            return Err(WikiError::Config(
                "max_versions must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }

    /// Render as TOML, for writing a fresh config file.
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::Config`] if serialization fails.
    pub fn to_toml(&self) -> Result<String, WikiError> {
        toml::to_string(self).map_err(|e| WikiError::Config(e.to_string()))
    }
}
