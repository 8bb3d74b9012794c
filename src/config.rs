//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/matrixnet/matrixnet.toml`
//! 3. Local config: `<dir>/.matrixnet.toml` (default: current directory)
//! 4. Environment variables: `MATRIXNET_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{RankTier, DEFAULT_MAX_ARITY};
use crate::util::path::expand_env_vars;

/// Raw settings for intermediate parsing (all Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub max_arity: Option<usize>,
    pub tree_file: Option<PathBuf>,
    pub required_cpv: Option<u64>,
    pub cycle: Option<String>,
    pub ranks: Option<Vec<RankTier>>,
}

/// Unified configuration for matrixnet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Maximum children per member (default: 3)
    pub max_arity: usize,
    /// Tree file used when a command gets none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree_file: Option<PathBuf>,
    /// Team CPV required for the current cycle
    pub required_cpv: u64,
    /// Label of the current commission cycle
    pub cycle: String,
    /// Rank ladder, any order
    pub ranks: Vec<RankTier>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_arity: DEFAULT_MAX_ARITY,
            tree_file: None,
            required_cpv: 5000,
            cycle: "current".to_string(),
            ranks: default_ranks(),
        }
    }
}

fn default_ranks() -> Vec<RankTier> {
    vec![
        RankTier::new("Associate", 0),
        RankTier::new("Bronze Director", 10),
        RankTier::new("Silver Director", 50),
        RankTier::new("Gold Director", 200),
        RankTier::new("Diamond Director", 1000),
    ]
}

/// Get the XDG config directory for matrixnet.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "matrixnet").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("matrixnet.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".matrixnet.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    parse_raw_settings(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

pub fn parse_raw_settings(content: &str) -> Result<RawSettings, toml::de::Error> {
    toml::from_str(content)
}

impl Settings {
    /// Overlay values win where specified; a specified rank ladder replaces the base one.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            max_arity: overlay.max_arity.unwrap_or(self.max_arity),
            tree_file: overlay
                .tree_file
                .clone()
                .or_else(|| self.tree_file.clone()),
            required_cpv: overlay.required_cpv.unwrap_or(self.required_cpv),
            cycle: overlay.cycle.clone().unwrap_or_else(|| self.cycle.clone()),
            ranks: overlay.ranks.clone().unwrap_or_else(|| self.ranks.clone()),
        }
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(tree_file) = &self.tree_file {
            let expanded = expand_env_vars(tree_file.to_string_lossy().as_ref());
            self.tree_file = Some(PathBuf::from(expanded));
        }
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.max_arity == 0 {
            return Err(ApplicationError::Config {
                message: "max_arity must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Directory holding `.matrixnet.toml`, if any
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

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();
        current.validate()?;
        Ok(current)
    }

    /// Apply MATRIXNET_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("MATRIXNET")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_int("max_arity") {
            settings.max_arity = usize::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("invalid MATRIXNET_MAX_ARITY: {val}"),
            })?;
        }
        if let Ok(val) = config.get_string("tree_file") {
            settings.tree_file = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_int("required_cpv") {
            settings.required_cpv = u64::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("invalid MATRIXNET_REQUIRED_CPV: {val}"),
            })?;
        }
        if let Ok(val) = config.get_string("cycle") {
            settings.cycle = val;
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
        r#"# matrixnet configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/matrixnet/matrixnet.toml
#   Local:  ./.matrixnet.toml
#   Env:    MATRIXNET_* environment variables

# Maximum children per member (3 = ternary matrix)
# max_arity = 3

# Tree file used when a command is given none
# tree_file = "~/network/tree.json"

# Team CPV required for the current cycle
# required_cpv = 5000
# cycle = "January 2026"

# Rank ladder; a list here replaces the inherited one
# [[ranks]]
# name = "Associate"
# min_team_size = 0
#
# [[ranks]]
# name = "Silver Director"
# min_team_size = 50
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
