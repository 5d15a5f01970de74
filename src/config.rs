//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/gradebook/gradebook.toml`
//! 3. Local config: `<dir>/.gradebook.toml` (usually the working directory)
//! 4. Environment variables: `GRADEBOOK_*` prefix

use std::fmt;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;

/// Upper bound for `grades_per_student`; grade trees are walked recursively.
pub const MAX_GRADES_PER_STUDENT: usize = 64;

/// Traversal used when writing the student file.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SaveOrder {
    /// Ascending by surname; reloading yields the same listing.
    #[default]
    InOrder,
    /// Node before its subtrees; reloading yields the same tree shape.
    PreOrder,
}

impl fmt::Display for SaveOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveOrder::InOrder => write!(f, "in-order"),
            SaveOrder::PreOrder => write!(f, "pre-order"),
        }
    }
}

impl std::str::FromStr for SaveOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in-order" | "inorder" => Ok(SaveOrder::InOrder),
            "pre-order" | "preorder" => Ok(SaveOrder::PreOrder),
            other => Err(format!("unknown save order: {}", other)),
        }
    }
}

/// Raw settings for intermediate parsing (Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub grades_per_student: Option<usize>,
    pub save_order: Option<SaveOrder>,
    pub data_file: Option<PathBuf>,
}

/// Unified configuration for gradebook.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Grades recorded per student (default: 5)
    pub grades_per_student: usize,
    /// Traversal used on save (default: in-order)
    pub save_order: SaveOrder,
    /// Default student file for save/load and one-shot commands
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grades_per_student: 5,
            save_order: SaveOrder::default(),
            data_file: None,
        }
    }
}

/// Get the XDG config directory for gradebook.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "gradebook").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("gradebook.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".gradebook.toml")
}

/// Expand `~`, `$VAR` and `${VAR}`; leaves the input unchanged if expansion fails.
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

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            grades_per_student: overlay
                .grades_per_student
                .unwrap_or(self.grades_per_student),
            save_order: overlay.save_order.unwrap_or(self.save_order),
            data_file: overlay.data_file.clone().or_else(|| self.data_file.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.gradebook.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("loading global config {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("loading local config {}", local_path.display());
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        current.validate()?;

        Ok(current)
    }

    /// Apply GRADEBOOK_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("GRADEBOOK").try_parsing(true))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_int("grades_per_student") {
            settings.grades_per_student =
                usize::try_from(val).map_err(|_| ApplicationError::Config {
                    message: format!("grades_per_student must not be negative: {}", val),
                })?;
        }
        if let Ok(val) = config.get_string("save_order") {
            settings.save_order = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Ok(val) = config.get_string("data_file") {
            settings.data_file = Some(PathBuf::from(val));
        }

        Ok(settings)
    }

    fn expand_paths(&mut self) {
        self.data_file = self
            .data_file
            .as_ref()
            .map(|file| PathBuf::from(expand_env_vars(&file.to_string_lossy())));
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if !(1..=MAX_GRADES_PER_STUDENT).contains(&self.grades_per_student) {
            return Err(ApplicationError::Config {
                message: format!(
                    "grades_per_student must be between 1 and {}, got {}",
                    MAX_GRADES_PER_STUDENT, self.grades_per_student
                ),
            });
        }
        Ok(())
    }

    /// Render as TOML for `config show`.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}
