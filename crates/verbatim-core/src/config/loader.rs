//! Configuration file discovery and loading

use super::VerbatimConfig;
use crate::error::VerbatimError;
use crate::result::Result;
use std::path::{Path, PathBuf};

/// Config file names in priority order
const CONFIG_FILES: &[&str] = &["verbatim.toml", "verbatim.json", ".verbatimrc.json"];

/// Configuration loader for discovering and loading config files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Auto-discover a config file by traversing upward from `start_path`
    pub fn auto_discover(start_path: &Path) -> Result<Option<PathBuf>> {
        let mut current = start_path
            .canonicalize()
            .map_err(|e| VerbatimError::config_error(format!("Invalid path: {e}")))?;

        loop {
            for filename in CONFIG_FILES {
                let config_path = current.join(filename);
                if config_path.is_file() {
                    tracing::debug!("Found config: {}", config_path.display());
                    return Ok(Some(config_path));
                }
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    /// Load config from `custom_path`, or discover one from `start_dir`
    ///
    /// Falls back to the default configuration when nothing is found.
    pub fn load(custom_path: Option<&Path>, start_dir: Option<&Path>) -> Result<VerbatimConfig> {
        let config_path = match custom_path {
            Some(path) => {
                if !path.exists() {
                    return Err(VerbatimError::config_error(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                Some(path.to_path_buf())
            }
            None => {
                let start = match start_dir {
                    Some(dir) => dir.to_path_buf(),
                    None => std::env::current_dir()
                        .map_err(|e| VerbatimError::io_error(".", e))?,
                };
                Self::auto_discover(&start)?
            }
        };

        match config_path {
            Some(path) => VerbatimConfig::load(&path),
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(VerbatimConfig::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn discovers_config_in_parent_directory() {
        let root = TempDir::new().unwrap();
        std::fs::write(root.path().join("verbatim.toml"), "recordCursor = true\n").unwrap();
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let found = ConfigLoader::auto_discover(&nested).unwrap().unwrap();
        assert!(found.ends_with("verbatim.toml"));

        let config = ConfigLoader::load(None, Some(&nested)).unwrap();
        assert!(config.record_cursor);
    }

    #[test]
    fn toml_wins_over_json_in_same_directory() {
        let root = TempDir::new().unwrap();
        std::fs::write(root.path().join("verbatim.json"), "{}").unwrap();
        std::fs::write(root.path().join("verbatim.toml"), "").unwrap();

        let found = ConfigLoader::auto_discover(root.path()).unwrap().unwrap();
        assert!(found.ends_with("verbatim.toml"));
    }

    #[test]
    fn missing_custom_path_is_an_error() {
        let err = ConfigLoader::load(Some(Path::new("/nonexistent/verbatim.toml")), None)
            .unwrap_err();
        assert!(matches!(err, VerbatimError::ConfigError { .. }));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("verbatim.yaml");
        std::fs::write(&path, "recordCursor: true\n").unwrap();
        assert!(VerbatimConfig::load(&path).is_err());
    }
}
