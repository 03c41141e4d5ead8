//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/bted/bted.toml`
//! 3. Explicit config file (`--config`)
//! 4. Environment variables: `BTED_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::DEFAULT_MAX_HISTORY;

/// Default blob key for the persisted tree.
pub const DEFAULT_STORAGE_KEY: &str = "binaryTree";

/// Raw settings for intermediate parsing (Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub data_dir: Option<PathBuf>,
    pub storage_key: Option<String>,
    pub max_history: Option<usize>,
}

/// Unified configuration for bted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory of the file blob store
    pub data_dir: PathBuf,
    /// Blob key the tree is stored under
    pub storage_key: String,
    /// Maximum number of history snapshots
    pub max_history: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            max_history: DEFAULT_MAX_HISTORY,
        }
    }
}

fn default_data_dir() -> PathBuf {
    ProjectDirs::from("", "", "bted")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.bted"))
}

/// Get the XDG config directory for bted.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "bted").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("bted.toml"))
}

/// Expand `~`, `$VAR` and `${VAR}` in a path string.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// File path of the persisted tree.
    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.json", self.storage_key))
    }

    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.data_dir.to_string_lossy().as_ref());
        self.data_dir = PathBuf::from(expanded);
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            data_dir: overlay
                .data_dir
                .clone()
                .unwrap_or_else(|| self.data_dir.clone()),
            storage_key: overlay
                .storage_key
                .clone()
                .unwrap_or_else(|| self.storage_key.clone()),
            max_history: overlay.max_history.unwrap_or(self.max_history),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file, must exist if given
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(path) = config_file {
            current = current.merge_with(&load_raw_settings(path)?);
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        current.validate()?;
        Ok(current)
    }

    /// Apply BTED_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("BTED").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("data_dir") {
            settings.data_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("storage_key") {
            settings.storage_key = val;
        }
        if let Ok(val) = config.get_int("max_history") {
            settings.max_history = usize::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("BTED_MAX_HISTORY must not be negative: {val}"),
            })?;
        }
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.max_history == 0 {
            return Err(ApplicationError::Config {
                message: "max_history must be at least 1".to_string(),
            });
        }
        if self.storage_key.trim().is_empty() {
            return Err(ApplicationError::Config {
                message: "storage_key must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# bted configuration
#
# Locations (by precedence, lowest to highest):
#   Global:   ~/.config/bted/bted.toml
#   Explicit: --config <file>
#   Env:      BTED_* environment variables (e.g. BTED_MAX_HISTORY=100)

# Directory holding the persisted tree
# data_dir = "~/.local/share/bted"

# Key (file name without .json) the tree is stored under
# storage_key = "binaryTree"

# Number of undo snapshots kept per session
# max_history = 50
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_then_match_editor_conventions() {
        let settings = Settings::default();
        assert_eq!(settings.storage_key, "binaryTree");
        assert_eq!(settings.max_history, 50);
    }

    #[test]
    fn given_tilde_in_data_dir_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            data_dir: PathBuf::from("~/.bted"),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        assert!(settings.data_dir.to_string_lossy().starts_with(&home));
        assert!(!settings.data_dir.to_string_lossy().contains('~'));
    }

    #[test]
    fn given_partial_overlay_when_merging_then_keeps_unspecified() {
        let base = Settings::default();
        let overlay = RawSettings {
            data_dir: None,
            storage_key: Some("other".to_string()),
            max_history: None,
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.storage_key, "other");
        assert_eq!(merged.max_history, base.max_history);
        assert_eq!(merged.data_dir, base.data_dir);
    }

    #[test]
    fn given_zero_history_when_validating_then_config_error() {
        let settings = Settings {
            max_history: 0,
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ApplicationError::Config { .. })
        ));
    }

    #[test]
    fn given_settings_when_rendering_toml_then_contains_keys() {
        let toml = Settings::default().to_toml().unwrap();
        assert!(toml.contains("storage_key = \"binaryTree\""));
        assert!(toml.contains("max_history = 50"));
    }
}
