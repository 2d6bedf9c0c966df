//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/hierardoc/hierardoc.toml`
//! 3. Local config: `<project_dir>/.hierardoc.toml`
//! 4. Environment variables: `HIERARDOC_*` prefix

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// How parsed tag trees are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Indented tree of groups and values
    #[default]
    Tree,
    /// Pretty-printed JSON
    Json,
    /// One `key=value` line per fully-qualified key
    Flat,
}

/// Source scanning configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScanConfig {
    /// File extensions searched when scanning a directory (e.g., ["php"])
    pub file_extensions: Vec<String>,
    /// Report doc comments that contain no tags
    pub include_empty: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            file_extensions: vec!["php".into()],
            include_empty: false,
        }
    }
}

/// Raw scan config for intermediate parsing (arrays are Option to detect "not specified").
///
/// Used during layered config merging to distinguish between:
/// - `None` → field not specified, inherit from base
/// - `Some([])` → explicit empty array
/// - `Some([...])` → explicit values to merge
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawScanConfig {
    pub file_extensions: Option<Vec<String>>,
    pub include_empty: Option<bool>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub format: Option<OutputFormat>,
    pub scan: RawScanConfig,
}

impl ScanConfig {
    /// Merge arrays with union semantics and negation support.
    ///
    /// - Items from overlay are added to base
    /// - Items prefixed with `!` remove the corresponding item from the result
    /// - Duplicates are de-duplicated
    ///
    /// # Examples
    /// ```ignore
    /// merge_array(&["php"], &["inc"])          // → ["inc", "php"]
    /// merge_array(&["php", "inc"], &["!inc"])  // → ["php"]
    /// ```
    pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
        let mut result: HashSet<String> = base.iter().cloned().collect();

        for pattern in overlay {
            if let Some(negated) = pattern.strip_prefix('!') {
                result.remove(negated);
            } else {
                result.insert(pattern.clone());
            }
        }

        // Convert to sorted Vec for deterministic output
        let mut vec: Vec<String> = result.into_iter().collect();
        vec.sort();
        vec
    }

    /// Merge overlay config onto self (base).
    ///
    /// - Scalar options: overlay wins if Some, otherwise keep base
    /// - Arrays: union merge with negation support (if overlay specified)
    pub fn merge(&self, overlay: &RawScanConfig) -> Self {
        Self {
            file_extensions: overlay
                .file_extensions
                .as_ref()
                .map(|o| Self::merge_array(&self.file_extensions, o))
                .unwrap_or_else(|| self.file_extensions.clone()),
            include_empty: overlay.include_empty.unwrap_or(self.include_empty),
        }
    }

    /// Apply global config onto defaults.
    ///
    /// Unlike `merge()`, arrays use REPLACE semantics: a global array
    /// completely replaces the default one.
    pub fn apply_global(&self, global: &RawScanConfig) -> Self {
        Self {
            file_extensions: global
                .file_extensions
                .clone()
                .unwrap_or_else(|| self.file_extensions.clone()),
            include_empty: global.include_empty.unwrap_or(self.include_empty),
        }
    }
}

/// Unified configuration for hierardoc.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Output format (default: tree)
    pub format: OutputFormat,
    /// Source scanning settings
    pub scan: ScanConfig,
}

/// Get the XDG config directory for hierardoc.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "hierardoc").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("hierardoc.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".hierardoc.toml")
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
    /// Merge overlay config onto self (base) with union semantics for arrays.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            format: overlay.format.unwrap_or(self.format),
            scan: self.scan.merge(&overlay.scan),
        }
    }

    /// Apply global config onto defaults with REPLACE semantics for arrays.
    fn apply_global(&self, global: &RawSettings) -> Self {
        Self {
            format: global.format.unwrap_or(self.format),
            scan: self.scan.apply_global(&global.scan),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional project directory for local config
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/hierardoc/hierardoc.toml` (arrays REPLACE defaults)
    /// 3. Local config: `<project_dir>/.hierardoc.toml` (arrays UNION with global)
    /// 4. Environment variables: `HIERARDOC_*` prefix (REPLACES - explicit override)
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_layers(global_config_path().as_deref(), project_dir, None)
    }

    /// Load settings from explicit layer sources.
    ///
    /// `env` replaces the process environment when given; keys are full
    /// variable names such as `HIERARDOC_FORMAT`.
    pub fn load_layers(
        global_path: Option<&Path>,
        project_dir: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config (REPLACES defaults)
        if let Some(global_path) = global_path {
            if global_path.exists() {
                let raw = load_raw_settings(global_path)?;
                current = current.apply_global(&raw);
            }
        }

        // 3. Local config (UNION with global)
        if let Some(project) = project_dir {
            let local_path = local_config_path(project);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables (replace)
        Self::apply_env_overrides(current, env)
    }

    /// Apply HIERARDOC_* environment variables as explicit overrides.
    fn apply_env_overrides(
        mut settings: Self,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("HIERARDOC")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("scan.file_extensions")
                .source(env),
        );

        let config = builder.build().map_err(config_err)?;

        if let Some(val) = env_value(config.get_string("format"), "HIERARDOC_FORMAT")? {
            settings.format =
                OutputFormat::from_str(&val, true).map_err(|e| ApplicationError::Config {
                    message: format!("HIERARDOC_FORMAT: {e}"),
                })?;
        }
        if let Some(val) = env_value(
            config.get::<Vec<String>>("scan.file_extensions"),
            "HIERARDOC_SCAN__FILE_EXTENSIONS",
        )? {
            settings.scan.file_extensions = val;
        }
        if let Some(val) = env_value(
            config.get_bool("scan.include_empty"),
            "HIERARDOC_SCAN__INCLUDE_EMPTY",
        )? {
            settings.scan.include_empty = val;
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
        r#"# hierardoc configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/hierardoc/hierardoc.toml  (defines your baseline)
#   Local:  <project_dir>/.hierardoc.toml       (project-specific additions)
#   Env:    HIERARDOC_* environment variables  (explicit overrides)
#
# Array Merge Semantics:
#   Global config REPLACES compiled defaults.
#   Local config UNIONS with global.
#   Use "!item" in local config to REMOVE an inherited item:
#     file_extensions = ["inc", "!php"]

# Output format: tree, json or flat
# format = "tree"

[scan]
# File extensions searched when scanning a directory
# file_extensions = ["php"]

# Report doc comments without any tags
# include_empty = false
"#
        .to_string()
    }
}

/// An unset variable is `None`; a set but unparsable one is an error.
fn env_value<T>(value: Result<T, ConfigError>, var: &str) -> Result<Option<T>, ApplicationError> {
    match value {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(ApplicationError::Config {
            message: format!("{var}: {e}"),
        }),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
