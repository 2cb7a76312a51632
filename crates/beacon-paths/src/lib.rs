use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("home directory not found, set the $HOME environment variable")]
    HomeNotFound,
}

/// Centralized path construction for the `~/.beacon/` directory layout.
///
/// Single source of truth for every path under `~/.beacon/`. Use `resolve()` in
/// production code and `from_dir()` in tests.
#[derive(Debug, Clone)]
pub struct BeaconPaths {
    beacon_dir: PathBuf,
}

impl BeaconPaths {
    /// Resolve paths from the user's home directory (`~/.beacon`).
    pub fn resolve() -> Result<Self, PathError> {
        let home = dirs::home_dir().ok_or(PathError::HomeNotFound)?;
        Ok(Self {
            beacon_dir: home.join(".beacon"),
        })
    }

    /// Create paths from an explicit base directory. Use in tests.
    pub fn from_dir(beacon_dir: PathBuf) -> Self {
        Self { beacon_dir }
    }

    /// The base `~/.beacon` directory.
    pub fn beacon_dir(&self) -> &Path {
        &self.beacon_dir
    }

    /// User-level config: `~/.beacon/config.toml`.
    pub fn user_config(&self) -> PathBuf {
        self.beacon_dir.join("config.toml")
    }

    /// Persisted user preferences written by the settings debouncer.
    pub fn settings_file(&self) -> PathBuf {
        self.beacon_dir.join("settings.toml")
    }

    // --- Static helpers (no self) ---

    /// Project-level config: `<project_root>/.beacon/config.toml`.
    pub fn project_config(project_root: &Path) -> PathBuf {
        project_root.join(".beacon").join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_paths() -> BeaconPaths {
        BeaconPaths::from_dir(PathBuf::from("/home/user/.beacon"))
    }

    #[test]
    fn test_resolve_returns_ok_when_home_set() {
        // HOME is set in CI and dev environments
        let result = BeaconPaths::resolve();
        assert!(result.is_ok());
        let paths = result.unwrap();
        assert!(paths.beacon_dir().to_string_lossy().contains(".beacon"));
    }

    #[test]
    fn test_from_dir() {
        let paths = BeaconPaths::from_dir(PathBuf::from("/tmp/test-beacon"));
        assert_eq!(paths.beacon_dir(), Path::new("/tmp/test-beacon"));
    }

    #[test]
    fn test_user_config() {
        assert_eq!(
            test_paths().user_config(),
            PathBuf::from("/home/user/.beacon/config.toml")
        );
    }

    #[test]
    fn test_settings_file() {
        assert_eq!(
            test_paths().settings_file(),
            PathBuf::from("/home/user/.beacon/settings.toml")
        );
    }

    #[test]
    fn test_project_config() {
        assert_eq!(
            BeaconPaths::project_config(Path::new("/work/shop")),
            PathBuf::from("/work/shop/.beacon/config.toml")
        );
    }
}
