//! Platform-specific state directory management

use std::path::PathBuf;

use directories::ProjectDirs;
use tracing::{debug, warn};

/// File name of the persisted session store
const SESSION_FILE: &str = "session.json";

/// Manages platform-specific application directories
pub struct StateDir {
    /// Project directories from the directories crate
    project_dirs: Option<ProjectDirs>,
    /// Override directory for testing or custom installations
    override_dir: Option<PathBuf>,
}

impl StateDir {
    /// Create a new StateDir instance
    pub fn new() -> Self {
        let project_dirs = ProjectDirs::from("dev", "Shopfront", "shopfront");
        if project_dirs.is_none() {
            warn!("Failed to determine platform-specific directories, will use fallback");
        }
        Self {
            project_dirs,
            override_dir: None,
        }
    }

    /// Create a new StateDir with an override directory
    pub fn with_override(path: impl Into<PathBuf>) -> Self {
        Self {
            project_dirs: None,
            override_dir: Some(path.into()),
        }
    }

    /// Get the configuration directory
    pub fn config_dir(&self) -> PathBuf {
        if let Some(override_dir) = &self.override_dir {
            return override_dir.join("config");
        }

        self.project_dirs.as_ref().map_or_else(
            || PathBuf::from("./config"),
            |dirs| dirs.config_dir().to_path_buf(),
        )
    }

    /// Get the data directory for persistent storage
    pub fn data_dir(&self) -> PathBuf {
        if let Some(override_dir) = &self.override_dir {
            return override_dir.join("data");
        }

        self.project_dirs.as_ref().map_or_else(
            || PathBuf::from("./data"),
            |dirs| dirs.data_dir().to_path_buf(),
        )
    }

    /// Get the path of the session store file
    pub fn session_path(&self) -> PathBuf {
        self.data_dir().join(SESSION_FILE)
    }

    /// Get the path of a component log file
    pub fn log_path(&self, component: &str) -> PathBuf {
        self.data_dir().join(format!("{component}.log"))
    }

    /// Get the default config file path
    pub fn config_path(&self) -> PathBuf {
        self.config_dir().join("config.toml")
    }

    /// Create all required directories
    pub fn create_directories(&self) -> std::io::Result<()> {
        for dir in [self.config_dir(), self.data_dir()] {
            std::fs::create_dir_all(&dir)?;
            debug!("Ensured directory exists: {}", dir.display());
        }
        Ok(())
    }
}

impl Default for StateDir {
    fn default() -> Self {
        Self::new()
    }
}
