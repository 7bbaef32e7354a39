//! Configuration loading for entity screens.
//!
//! Every field has a default, so an empty file is a valid configuration.

use crate::selection::SelectionMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tabula_core::{ConfigError, FragmentFailurePolicy, SortOrder};

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const DEFAULT_DISPLAY_TRUNCATE: usize = 25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScreenConfig {
    pub page_size: u64,
    pub selection_mode: SelectionMode,
    pub fragment_failure_policy: FragmentFailurePolicy,
    /// Grid cells are cut to this many characters.
    pub display_truncate: usize,
    pub search_enabled: bool,
    pub auto_initialize_fields: bool,
    /// Sort used when no column sort is active. Identity descending if unset.
    pub default_sort: Option<SortOrder>,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            selection_mode: SelectionMode::Single,
            fragment_failure_policy: FragmentFailurePolicy::Degrade,
            display_truncate: DEFAULT_DISPLAY_TRUNCATE,
            search_enabled: true,
            auto_initialize_fields: true,
            default_sort: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Missing configuration file path (use --config or TABULA_SCREEN_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

impl ScreenConfig {
    pub fn load() -> Result<Self, ConfigLoadError> {
        let path = config_path_from_args().or_else(config_path_from_env);
        let path = path.ok_or(ConfigLoadError::MissingConfigPath)?;
        Self::from_path(&path)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!(path = %path.display(), "Screen config loaded");
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigLoadError> {
        let config: ScreenConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(invalid("page_size", self.page_size, "must be > 0"));
        }
        if self.display_truncate == 0 {
            return Err(invalid("display_truncate", self.display_truncate, "must be > 0"));
        }
        if let Some(sort) = &self.default_sort {
            if sort.field.trim().is_empty() {
                return Err(ConfigError::MissingRequired {
                    field: "default_sort.field".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var("TABULA_SCREEN_CONFIG").ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}
