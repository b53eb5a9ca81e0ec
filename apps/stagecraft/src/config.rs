//! # Configuration
//!
//! Layered, later layers win:
//! 1. built-in defaults
//! 2. TOML file (`--config <path>`, or `./stagecraft.toml` when present)
//! 3. environment (`STAGECRAFT_STATE`, `STAGECRAFT_STORE`,
//!    `STAGECRAFT_BACKUP_KEY`, `STAGECRAFT_APP_VERSION`)
//! 4. command-line flags

use serde::{Deserialize, Serialize};
use stagecraft_core::{DEFAULT_BACKUP_KEY, SessionError};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "stagecraft.toml";

pub const ENV_STATE: &str = "STAGECRAFT_STATE";
pub const ENV_STORE: &str = "STAGECRAFT_STORE";
pub const ENV_BACKUP_KEY: &str = "STAGECRAFT_BACKUP_KEY";
pub const ENV_APP_VERSION: &str = "STAGECRAFT_APP_VERSION";

/// Resolved host configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StagecraftConfig {
    /// Written into every exported envelope.
    pub app_version: String,
    /// Live state file.
    pub state_path: PathBuf,
    /// redb database holding backup slots.
    pub store_path: PathBuf,
    pub backup_key: String,
    /// Write a backup after every successful import.
    pub auto_backup: bool,
}

impl Default for StagecraftConfig {
    fn default() -> Self {
        Self {
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            state_path: PathBuf::from("stagecraft-session.json"),
            store_path: PathBuf::from("stagecraft.redb"),
            backup_key: DEFAULT_BACKUP_KEY.to_string(),
            auto_backup: true,
        }
    }
}

impl StagecraftConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, SessionError> {
        toml::from_str(text)
            .map_err(|e| SessionError::Configuration(format!("Invalid config file: {}", e)))
    }

    /// Read and parse a TOML config file.
    pub fn load_file(path: &Path) -> Result<Self, SessionError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            SessionError::Configuration(format!(
                "Cannot read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&text)
    }

    /// Overlay values from the process environment.
    #[must_use]
    pub fn apply_env(self) -> Self {
        self.apply_env_with(|name| std::env::var(name).ok())
    }

    /// Overlay values from an arbitrary variable lookup. Empty values are ignored.
    #[must_use]
    pub fn apply_env_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(path) = get(ENV_STATE) {
            self.state_path = PathBuf::from(path);
        }
        if let Some(path) = get(ENV_STORE) {
            self.store_path = PathBuf::from(path);
        }
        if let Some(key) = get(ENV_BACKUP_KEY) {
            self.backup_key = key;
        }
        if let Some(version) = get(ENV_APP_VERSION) {
            self.app_version = version;
        }
        self
    }

    /// Overlay command-line flags.
    #[must_use]
    pub fn apply_flags(mut self, state: Option<PathBuf>, store: Option<PathBuf>) -> Self {
        if let Some(path) = state {
            self.state_path = path;
        }
        if let Some(path) = store {
            self.store_path = path;
        }
        self
    }

    /// Resolve every layer against the real environment.
    ///
    /// An explicit `config_path` must exist; the implicit `./stagecraft.toml`
    /// is optional.
    pub fn resolve(
        config_path: Option<&Path>,
        state: Option<PathBuf>,
        store: Option<PathBuf>,
    ) -> Result<Self, SessionError> {
        let base = match config_path {
            Some(path) => Self::load_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::load_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        let config = base.apply_env().apply_flags(state, store);
        if config.backup_key.trim().is_empty() {
            return Err(SessionError::Configuration(
                "backup_key must not be empty".to_string(),
            ));
        }

        debug!(
            state = %config.state_path.display(),
            store = %config.store_path.display(),
            "resolved configuration"
        );
        Ok(config)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = StagecraftConfig::default();
        assert_eq!(c.backup_key, DEFAULT_BACKUP_KEY);
        assert_eq!(c.state_path, PathBuf::from("stagecraft-session.json"));
        assert!(c.auto_backup);
        assert!(!c.app_version.is_empty());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = StagecraftConfig::from_toml_str("backup_key = \"nightly\"\nauto_backup = false\n")
            .unwrap();
        assert_eq!(c.backup_key, "nightly");
        assert!(!c.auto_backup);
        assert_eq!(c.store_path, PathBuf::from("stagecraft.redb"));
    }

    #[test]
    fn unknown_toml_key_is_a_configuration_error() {
        let err = StagecraftConfig::from_toml_str("colour = \"blue\"").unwrap_err();
        assert!(matches!(err, SessionError::Configuration(_)));
    }

    #[test]
    fn env_then_flags_override() {
        let c = StagecraftConfig::default()
            .apply_env_with(|name| match name {
                ENV_STATE => Some("env-state.json".into()),
                ENV_STORE => Some("env.redb".into()),
                ENV_APP_VERSION => Some("   ".into()),
                _ => None,
            })
            .apply_flags(Some(PathBuf::from("flag-state.json")), None);

        assert_eq!(c.state_path, PathBuf::from("flag-state.json"));
        assert_eq!(c.store_path, PathBuf::from("env.redb"));
        assert_eq!(c.app_version, env!("CARGO_PKG_VERSION"));
    }
}
