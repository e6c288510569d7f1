//! Application path configuration
//!
//! Resolves per-platform config/data directories, with a CLI override that
//! pins both under one directory (portable installs, tests).

use std::path::{Path, PathBuf};

/// Resolved application directories.
#[derive(Debug, Clone)]
pub struct PathConfig {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl PathConfig {
    /// Platform defaults, or everything under `override_dir` when given.
    pub fn from_env_and_cli(override_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = override_dir {
            return Self {
                config_dir: dir.clone(),
                data_dir: dir,
            };
        }

        let config_dir = dirs_next::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("scrolla");
        let data_dir = dirs_next::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("scrolla");

        Self {
            config_dir,
            data_dir,
        }
    }
}

/// Create the application directories if missing.
pub fn ensure_dirs(paths: &PathConfig) -> std::io::Result<()> {
    std::fs::create_dir_all(&paths.config_dir)?;
    std::fs::create_dir_all(&paths.data_dir)?;
    Ok(())
}

/// Path of a file inside the config directory.
pub fn config_file(name: impl AsRef<Path>, paths: &PathConfig) -> PathBuf {
    paths.config_dir.join(name)
}

/// Path of a file inside the data directory.
pub fn data_file(name: impl AsRef<Path>, paths: &PathConfig) -> PathBuf {
    paths.data_dir.join(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: CLI override pins both directories
    #[test]
    fn test_override_dir() {
        let paths = PathConfig::from_env_and_cli(Some(PathBuf::from("/tmp/scrolla-test")));
        assert_eq!(paths.config_dir, PathBuf::from("/tmp/scrolla-test"));
        assert_eq!(paths.data_dir, PathBuf::from("/tmp/scrolla-test"));
        assert_eq!(
            config_file("scrolla.json", &paths),
            PathBuf::from("/tmp/scrolla-test/scrolla.json")
        );
    }

    /// Test: defaults end in the app directory name
    #[test]
    fn test_default_dirs_named() {
        let paths = PathConfig::from_env_and_cli(None);
        assert!(paths.config_dir.ends_with("scrolla"));
        assert!(paths.data_dir.ends_with("scrolla"));
    }
}
