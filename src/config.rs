//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/oncodemo/oncodemo.toml`
//! 3. Local config: `<dir>/.oncodemo.toml` (usually the working directory)
//! 4. Environment variables: `ONCODEMO__*` prefix

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{expand_env_vars, Theme};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/api/train";

/// Remote training endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ApiConfig {
    /// Try the endpoint before falling back to the simulated pipeline
    pub enabled: bool,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: DEFAULT_ENDPOINT.into(),
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn merge(&self, overlay: &RawApiConfig) -> Self {
        Self {
            enabled: overlay.enabled.unwrap_or(self.enabled),
            endpoint: overlay
                .endpoint
                .clone()
                .unwrap_or_else(|| self.endpoint.clone()),
            timeout_secs: overlay.timeout_secs.unwrap_or(self.timeout_secs),
        }
    }
}

/// Stage delay scaling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DelayConfig {
    /// Multiplier applied to every stage delay; `0` disables waiting
    pub scale: f64,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl DelayConfig {
    /// Nominal stage delay in milliseconds, scaled.
    pub fn scaled(&self, millis: u64) -> Duration {
        let scale = if self.scale.is_finite() {
            self.scale.max(0.0)
        } else {
            0.0
        };
        Duration::from_millis((millis as f64 * scale).round() as u64)
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawApiConfig {
    pub enabled: Option<bool>,
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawDelayConfig {
    pub scale: Option<f64>,
}

/// Raw settings for intermediate parsing; `None` means "inherit".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub data_dir: Option<PathBuf>,
    pub default_theme: Option<Theme>,
    pub api: RawApiConfig,
    pub delays: RawDelayConfig,
}

/// Unified configuration for oncodemo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Where the form and theme records are stored
    pub data_dir: PathBuf,
    /// Theme reported when none has been stored yet
    pub default_theme: Theme,
    pub api: ApiConfig,
    pub delays: DelayConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            default_theme: Theme::default(),
            api: ApiConfig::default(),
            delays: DelayConfig::default(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    ProjectDirs::from("", "", "oncodemo")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.oncodemo"))
}

/// Get the XDG config directory for oncodemo.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "oncodemo").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("oncodemo.toml"))
}

/// Get the path to the local config file in `dir`.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".oncodemo.toml")
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
    /// Expand shell variables and tilde in `data_dir`.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.data_dir.to_string_lossy().as_ref());
        self.data_dir = PathBuf::from(expanded);
    }

    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            data_dir: overlay
                .data_dir
                .clone()
                .unwrap_or_else(|| self.data_dir.clone()),
            default_theme: overlay.default_theme.unwrap_or(self.default_theme),
            api: self.api.merge(&overlay.api),
            delays: DelayConfig {
                scale: overlay.delays.scale.unwrap_or(self.delays.scale),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Directory searched for `.oncodemo.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.validate()?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply ONCODEMO__* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(Environment::with_prefix("ONCODEMO").separator("__"));

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("data_dir") {
            settings.data_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("default_theme") {
            settings.default_theme = val.parse().map_err(|e| ApplicationError::Config {
                message: format!("ONCODEMO__DEFAULT_THEME: {e}"),
            })?;
        }
        if let Ok(val) = config.get_bool("api.enabled") {
            settings.api.enabled = val;
        }
        if let Ok(val) = config.get_string("api.endpoint") {
            settings.api.endpoint = val;
        }
        if let Ok(val) = config.get_int("api.timeout_secs") {
            settings.api.timeout_secs = u64::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("ONCODEMO__API__TIMEOUT_SECS: {val}"),
            })?;
        }
        if let Ok(val) = config.get_float("delays.scale") {
            settings.delays.scale = val;
        }

        Ok(settings)
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if !self.delays.scale.is_finite() || self.delays.scale < 0.0 {
            return Err(ApplicationError::Config {
                message: format!("delays.scale must be >= 0, got {}", self.delays.scale),
            });
        }
        if self.api.enabled && url::Url::parse(&self.api.endpoint).is_err() {
            return Err(ApplicationError::Config {
                message: format!("api.endpoint is not a valid URL: {}", self.api.endpoint),
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
        r#"# oncodemo configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/oncodemo/oncodemo.toml
#   Local:  ./.oncodemo.toml
#   Env:    ONCODEMO__* environment variables, e.g. ONCODEMO__API__ENABLED=true

# Directory holding the saved form and theme
# data_dir = "~/.local/share/oncodemo"

# Theme used until one is stored with `oncodemo theme set`
# default_theme = "light"

[api]
# Try the remote training endpoint first; failures fall back to the simulation
# enabled = false
# endpoint = "http://localhost:5000/api/train"
# timeout_secs = 30

[delays]
# Multiplier for the simulated stage delays (0 = no waiting)
# scale = 1.0
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
