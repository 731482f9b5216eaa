//! Standard paths used by mdvars

use std::path::PathBuf;

/// Environment variable that overrides the data directory
pub const DATA_DIR_ENV: &str = "MDVARS_DATA_DIR";

/// Standard mdvars paths
#[derive(Debug, Clone)]
pub struct Paths {
    /// Data directory (~/.local/share/mdvars)
    pub data: PathBuf,
    /// Config directory (~/.config/mdvars)
    pub config: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let data = std::env::var_os(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::data_dir()
                    .unwrap_or_else(|| PathBuf::from("~/.local/share"))
                    .join("mdvars")
            });

        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("mdvars");

        Self { data, config }
    }

    /// Paths rooted at a single directory (for testing)
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            data: root.join("data"),
            config: root.join("config"),
        }
    }

    /// File holding the persisted global variables
    pub fn globals_file(&self) -> PathBuf {
        self.data.join("globals.yaml")
    }

    /// Tool configuration file
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_root() {
        let paths = Paths::with_root("/tmp/mdvars-test");
        assert_eq!(
            paths.globals_file(),
            PathBuf::from("/tmp/mdvars-test/data/globals.yaml")
        );
        assert_eq!(
            paths.config_file(),
            PathBuf::from("/tmp/mdvars-test/config/config.json")
        );
    }
}
