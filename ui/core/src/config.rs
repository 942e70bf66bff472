//! UI Configuration
//!
//! Configuration for the window layer, loaded in layers:
//!
//! 1. Built-in defaults
//! 2. TOML file (`$XDG_CONFIG_HOME/tabletop-ui/ui.toml` or an explicit path)
//! 3. Environment variables
//! 4. Explicit overrides (command-line flags)
//!
//! # Example
//!
//! ```toml
//! [templates]
//! root = "public"
//! allow_prototype_access = false
//!
//! [windows]
//! z_floor = 100
//! z_ceiling = 9999
//!
//! [dialog]
//! reject_close = false
//! enter_without_default = "ignore"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::registry::{ZOrderPolicy, DEFAULT_Z_CEILING, DEFAULT_Z_FLOOR};
use crate::templates::{TemplateOptions, DIALOG_TEMPLATE, WINDOW_SHELL_TEMPLATE};

/// Minimum window width in pixels
pub const MIN_WINDOW_WIDTH: u32 = 200;

/// Minimum window height in pixels
pub const MIN_WINDOW_HEIGHT: u32 = 50;

/// Configuration file name inside the config directory
pub const CONFIG_FILE_NAME: &str = "ui.toml";

// ============================================================================
// Errors
// ============================================================================

/// Errors loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Config file path
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema
    #[error("failed to parse config {path}: {source}")]
    Parse {
        /// Config file path
        path: PathBuf,
        /// Parser failure
        #[source]
        source: toml::de::Error,
    },

    /// A value is out of range
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// ============================================================================
// Sections
// ============================================================================

/// Template loading settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    /// Directory file-backed templates are served from
    pub root: PathBuf,
    /// Let templates read inherited data properties (trusted data only)
    pub allow_prototype_access: bool,
    /// Outer window shell template path
    pub window_shell: String,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            allow_prototype_access: false,
            window_shell: WINDOW_SHELL_TEMPLATE.to_string(),
        }
    }
}

impl TemplatesConfig {
    /// Loader options derived from this section
    #[must_use]
    pub fn loader_options(&self) -> TemplateOptions {
        TemplateOptions {
            allow_prototype_access: self.allow_prototype_access,
        }
    }
}

/// Window sizing and stacking settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowsConfig {
    /// First z-index handed out
    pub z_floor: u32,
    /// Maximum z-index
    pub z_ceiling: u32,
    /// Minimum window width
    pub min_width: u32,
    /// Minimum window height
    pub min_height: u32,
}

impl Default for WindowsConfig {
    fn default() -> Self {
        Self {
            z_floor: DEFAULT_Z_FLOOR,
            z_ceiling: DEFAULT_Z_CEILING,
            min_width: MIN_WINDOW_WIDTH,
            min_height: MIN_WINDOW_HEIGHT,
        }
    }
}

impl WindowsConfig {
    /// Z-order policy derived from this section
    #[must_use]
    pub fn z_policy(&self) -> ZOrderPolicy {
        ZOrderPolicy {
            floor: self.z_floor,
            ceiling: self.z_ceiling,
        }
    }
}

/// What Enter does when a dialog has no default button
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnterFallback {
    /// Do nothing
    #[default]
    Ignore,
    /// Choose the first button
    FirstButton,
}

/// Dialog defaults
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogConfig {
    /// Dialog body template path
    pub template: String,
    /// Default dialog width
    pub width: u32,
    /// Settle a dismissed dialog as an error instead of an empty outcome
    pub reject_close: bool,
    /// Enter key behaviour without a default button
    pub enter_without_default: EnterFallback,
    /// Hand button callbacks the rendered markup rather than an element ref
    pub markup_callbacks: bool,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            template: DIALOG_TEMPLATE.to_string(),
            width: 400,
            reject_close: false,
            enter_without_default: EnterFallback::Ignore,
            markup_callbacks: true,
        }
    }
}

/// Complete UI configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Template settings
    pub templates: TemplatesConfig,
    /// Window settings
    pub windows: WindowsConfig,
    /// Dialog settings
    pub dialog: DialogConfig,
}

impl UiConfig {
    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` or `ConfigError::Invalid`.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides from the process environment
    ///
    /// Environment variables:
    /// - `UI_TEMPLATE_ROOT`: template directory
    /// - `UI_ALLOW_PROTOTYPE_ACCESS`: "1" or "true" to enable
    /// - `UI_Z_FLOOR`: first z-index
    /// - `UI_Z_CEILING`: maximum z-index
    /// - `UI_DIALOG_REJECT_CLOSE`: "1" or "true" to reject on dismissal
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply environment overrides using a custom lookup
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let flag = |v: &str| v == "1" || v.eq_ignore_ascii_case("true");

        if let Some(root) = lookup("UI_TEMPLATE_ROOT") {
            self.templates.root = PathBuf::from(root);
        }
        if let Some(v) = lookup("UI_ALLOW_PROTOTYPE_ACCESS") {
            self.templates.allow_prototype_access = flag(&v);
        }
        if let Some(z) = lookup("UI_Z_FLOOR").and_then(|v| v.parse().ok()) {
            self.windows.z_floor = z;
        }
        if let Some(z) = lookup("UI_Z_CEILING").and_then(|v| v.parse().ok()) {
            self.windows.z_ceiling = z;
        }
        if let Some(v) = lookup("UI_DIALOG_REJECT_CLOSE") {
            self.dialog.reject_close = flag(&v);
        }
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.windows;
        if w.z_floor == 0 {
            return Err(ConfigError::Invalid("windows.z_floor must be at least 1".into()));
        }
        if w.z_floor > w.z_ceiling {
            return Err(ConfigError::Invalid(format!(
                "windows.z_floor ({}) exceeds windows.z_ceiling ({})",
                w.z_floor, w.z_ceiling
            )));
        }
        if w.min_width == 0 || w.min_height == 0 {
            return Err(ConfigError::Invalid(
                "minimum window dimensions must be non-zero".into(),
            ));
        }
        if self.templates.window_shell.is_empty() || self.dialog.template.is_empty() {
            return Err(ConfigError::Invalid("template paths must not be empty".into()));
        }
        Ok(())
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Where the active configuration came from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigSource {
    /// Built-in defaults only
    Defaults,
    /// Loaded from a file
    File(PathBuf),
}

/// Explicit overrides, typically from command-line flags
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Template directory
    pub template_root: Option<PathBuf>,
    /// Prototype access switch
    pub allow_prototype_access: Option<bool>,
    /// Dialog dismissal policy
    pub reject_close: Option<bool>,
}

impl ConfigOverrides {
    /// Apply these overrides on top of `config`
    pub fn apply(&self, config: &mut UiConfig) {
        if let Some(root) = &self.template_root {
            config.templates.root = root.clone();
        }
        if let Some(allow) = self.allow_prototype_access {
            config.templates.allow_prototype_access = allow;
        }
        if let Some(reject) = self.reject_close {
            config.dialog.reject_close = reject;
        }
    }
}

/// Default configuration file path
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tabletop-ui").join(CONFIG_FILE_NAME))
}

/// Load configuration from a specific file
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed or validated.
pub fn load_config_from_path(path: &Path) -> Result<UiConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    UiConfig::from_toml_str(&text, path)
}

/// Load configuration from the default location, then the environment
///
/// A missing file is not an error; defaults are used instead.
///
/// # Errors
///
/// Returns `ConfigError` if a present file is malformed or the final
/// configuration is invalid.
pub fn load_config(overrides: &ConfigOverrides) -> Result<(UiConfig, ConfigSource), ConfigError> {
    let (mut config, source) = match default_config_path() {
        Some(path) if path.exists() => (load_config_from_path(&path)?, ConfigSource::File(path)),
        _ => (UiConfig::default(), ConfigSource::Defaults),
    };

    config.apply_env();
    overrides.apply(&mut config);
    config.validate()?;

    tracing::debug!(source = ?source, "UI configuration loaded");
    Ok((config, source))
}
