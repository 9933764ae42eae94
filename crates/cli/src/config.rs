//! CLI configuration

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shopfront_core::StateDir;
use shopfront_http::ClientConfig;

/// Environment variable prefix, e.g. `SHOPFRONT_CLIENT__BASE_URL`
const ENV_PREFIX: &str = "SHOPFRONT";

/// Settings for the `shopfront` binary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// HTTP client settings
    pub client: ClientConfig,
    /// Directory holding the session store and logs
    pub state_dir: Option<PathBuf>,
}

impl CliConfig {
    /// Load configuration from defaults, an optional file and the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a value fails to parse
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Pick the file to load: `explicit` if given, else the state directory's
    /// `config.toml` when it exists
    pub fn resolve_path(explicit: Option<PathBuf>, state_dir: &StateDir) -> Option<PathBuf> {
        explicit.or_else(|| {
            let default = state_dir.config_path();
            default.is_file().then_some(default)
        })
    }

    fn load_with_env(path: Option<&Path>, env: Option<config::Map<String, String>>) -> Result<Self> {
        let defaults = ClientConfig::default();

        let mut builder = config::Config::builder()
            .set_default("client.base_url", defaults.base_url)?
            .set_default("client.timeout_secs", defaults.timeout_secs)?
            .set_default("client.user_agent", defaults.user_agent)?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .context("Failed to load configuration")?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Option<config::Map<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_defaults() {
        let config = CliConfig::load_with_env(None, env(&[])).unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_file_then_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "state_dir = \"/tmp/shopfront\"\n\n[client]\nbase_url = \"https://file.example.com/api\"\ntimeout_secs = 5\n",
        )
        .unwrap();

        let config = CliConfig::load_with_env(
            Some(&path),
            env(&[("SHOPFRONT_CLIENT__BASE_URL", "https://env.example.com/api")]),
        )
        .unwrap();

        assert_eq!(config.client.base_url, "https://env.example.com/api");
        assert_eq!(config.client.timeout_secs, 5);
        assert_eq!(config.state_dir, Some(PathBuf::from("/tmp/shopfront")));
    }

    #[test]
    fn test_resolve_path_falls_back_to_state_dir() {
        let dir = tempfile::tempdir().unwrap();
        let state_dir = StateDir::with_override(dir.path());

        assert_eq!(CliConfig::resolve_path(None, &state_dir), None);

        let explicit = PathBuf::from("/etc/shopfront.yaml");
        assert_eq!(
            CliConfig::resolve_path(Some(explicit.clone()), &state_dir),
            Some(explicit)
        );

        state_dir.create_directories().unwrap();
        std::fs::write(
            state_dir.config_path(),
            "[client]\nbase_url = \"https://default.example.com/api\"\n",
        )
        .unwrap();
        let resolved = CliConfig::resolve_path(None, &state_dir).unwrap();
        assert_eq!(resolved, state_dir.config_path());

        let config = CliConfig::load_with_env(Some(&resolved), env(&[])).unwrap();
        assert_eq!(config.client.base_url, "https://default.example.com/api");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = CliConfig::load_with_env(Some(&dir.path().join("absent.toml")), env(&[]));
        assert!(result.is_err());
    }
}
