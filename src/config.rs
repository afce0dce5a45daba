//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/orgtree/orgtree.toml`
//! 3. Local config: `<config_dir>/.orgtree.toml`
//! 4. Environment variables: `ORGTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::DEFAULT_MAX_LEVEL;

/// Unified configuration for orgtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Deepest allowed level (root = 0); placements past it are rejected
    pub max_level: usize,
    /// Spaces of indentation per level in the table view
    pub indent_width: usize,
    /// Roster file used when no `--roster` is given
    pub roster: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_level: DEFAULT_MAX_LEVEL,
            indent_width: 2,
            roster: None,
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub max_level: Option<usize>,
    pub indent_width: Option<usize>,
    pub roster: Option<PathBuf>,
}

/// Get the XDG config directory for orgtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "orgtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("orgtree.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".orgtree.toml")
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

/// Expand `~`, `$VAR` and `${VAR}` in a path.
fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(&raw)
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

impl Settings {
    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            max_level: overlay.max_level.unwrap_or(self.max_level),
            indent_width: overlay.indent_width.unwrap_or(self.indent_width),
            roster: overlay.roster.clone().or_else(|| self.roster.clone()),
        }
    }

    fn expand_paths(&mut self) {
        self.roster = self.roster.as_deref().map(expand_path);
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.orgtree.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();
        Ok(current)
    }

    /// Apply ORGTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("ORGTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("max_level") {
            settings.max_level = val.parse().map_err(|e| ApplicationError::Config {
                message: format!("ORGTREE_MAX_LEVEL={val}: {e}"),
            })?;
        }
        if let Ok(val) = config.get_string("indent_width") {
            settings.indent_width = val.parse().map_err(|e| ApplicationError::Config {
                message: format!("ORGTREE_INDENT_WIDTH={val}: {e}"),
            })?;
        }
        if let Ok(val) = config.get_string("roster") {
            settings.roster = Some(PathBuf::from(val));
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        format!(
            r#"# orgtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/orgtree/orgtree.toml
#   Local:  <dir>/.orgtree.toml   (dir given with -C, default cwd)
#   Env:    ORGTREE_* environment variables

# Deepest level an employee may sit at (root = 0)
# max_level = {DEFAULT_MAX_LEVEL}

# Indentation per level in the table view
# indent_width = 2

# Roster used when --roster is omitted (.json or .csv)
# roster = "~/org/roster.csv"
"#
        )
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
    fn given_defaults_when_created_then_bound_matches_builder() {
        let settings = Settings::default();
        assert_eq!(settings.max_level, DEFAULT_MAX_LEVEL);
        assert_eq!(settings.indent_width, 2);
        assert!(settings.roster.is_none());
    }

    #[test]
    fn given_partial_overlay_when_merging_then_unspecified_fields_kept() {
        let base = Settings {
            max_level: 4,
            indent_width: 3,
            roster: Some(PathBuf::from("base.csv")),
        };
        let overlay = RawSettings {
            max_level: Some(8),
            indent_width: None,
            roster: None,
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.max_level, 8);
        assert_eq!(merged.indent_width, 3);
        assert_eq!(merged.roster, Some(PathBuf::from("base.csv")));
    }

    #[test]
    fn given_tilde_in_roster_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            roster: Some(PathBuf::from("~/roster.json")),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let roster = settings.roster.unwrap();
        assert!(roster.to_string_lossy().starts_with(&home));
    }

    #[test]
    fn given_settings_when_serializing_then_round_trips_through_toml() {
        let settings = Settings {
            max_level: 5,
            indent_width: 4,
            roster: Some(PathBuf::from("/tmp/r.json")),
        };

        let text = settings.to_toml().unwrap();
        let parsed: Settings = toml::from_str(&text).unwrap();

        assert_eq!(parsed, settings);
    }

    #[test]
    fn given_template_when_parsing_then_is_valid_toml() {
        let parsed: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(parsed.max_level.is_none());
    }
}
