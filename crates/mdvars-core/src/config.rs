//! Configuration management for mdvars

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tool configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Largest document accepted by `process` and `check` (bytes)
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: u64,

    /// File extensions accepted for documents, without the dot
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,

    /// Write global variables back to the globals file after each change
    #[serde(default = "default_persist_globals")]
    pub persist_globals: bool,
}

fn default_max_document_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_allowed_extensions() -> Vec<String> {
    vec!["md".to_string(), "txt".to_string()]
}

fn default_persist_globals() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_document_bytes: default_max_document_bytes(),
            allowed_extensions: default_allowed_extensions(),
            persist_globals: default_persist_globals(),
        }
    }
}

impl Config {
    /// Load config from file
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Whether a file extension is accepted (case-insensitive)
    pub fn allows_extension(&self, ext: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
    }
}
