//! Configuration management for frostlock.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use chrono::format::{Item, StrftimeItems};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Directory name under the user config dir.
const CONFIG_DIR_NAME: &str = "frostlock";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FROSTLOCK_`, `__` between levels)
/// 2. TOML config file at `~/.config/frostlock/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Screenshot and blur configuration.
    pub capture: CaptureConfig,
    /// Authentication configuration.
    pub auth: AuthConfig,
    /// Keyboard configuration.
    pub input: InputConfig,
    /// State revert and redraw timing.
    pub timing: TimingConfig,
    /// Indicator appearance.
    pub indicator: IndicatorConfig,
    /// Window placement.
    pub window: WindowConfig,
}

/// Screenshot and blur configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Compositor IPC command used to list outputs.
    pub outputs_command: String,
    /// Screenshot tool invoked as `<command> -o <output> <path>`.
    pub screenshot_command: String,
    /// Directory for lock images.
    /// Defaults to the system temp directory.
    pub image_dir: Option<PathBuf>,
    /// Blur strength (sigma of the box-blur approximation).
    pub blur_sigma: f32,
    /// Keep lock images on disk after the session ends.
    pub keep_images: bool,
}

/// Authentication configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// PAM service name (`/etc/pam.d/<service>`).
    pub service: String,
    /// User to authenticate. Defaults to the current user.
    pub user: Option<String>,
}

/// Keyboard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Close the lock screen without authentication when `q` is pressed.
    pub quit_key: bool,
}

/// State revert and redraw timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Delay before `Typing` falls back to `Idle`.
    pub typing_revert_ms: u64,
    /// Delay before `Wrong` falls back to `Idle`.
    pub wrong_revert_ms: u64,
    /// Delay before `Clear` falls back to `Idle`.
    pub clear_revert_ms: u64,
    /// Interval between indicator redraws.
    pub redraw_interval_ms: u64,
}

/// Indicator appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// Ring radius in pixels.
    pub radius: f64,
    /// Ring stroke width in pixels.
    pub line_width: f64,
    /// chrono format for the clock line.
    pub clock_format: String,
    /// chrono format for the date line.
    pub date_format: String,
    /// Font size of the clock line.
    pub clock_font_size: f64,
    /// Font size of the date, status and info lines.
    pub text_font_size: f64,
}

/// Window placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Use full-screen layer-shell surfaces. When false, plain windows are
    /// opened instead (useful for testing the indicator).
    pub fullscreen: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            outputs_command: "swaymsg".to_string(),
            screenshot_command: "grim".to_string(),
            image_dir: None, // Resolved to the temp dir at runtime
            blur_sigma: 25.0,
            keep_images: false,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            service: "frostlock".to_string(),
            user: None,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { quit_key: true }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            typing_revert_ms: 500,
            wrong_revert_ms: 2000,
            clear_revert_ms: 2000,
            redraw_interval_ms: 50,
        }
    }
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            radius: 100.0,
            line_width: 8.0,
            clock_format: "%H:%M".to_string(),
            date_format: "%d.%m.%Y".to_string(),
            clock_font_size: 38.0,
            text_font_size: 20.0,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { fullscreen: true }
    }
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("FROSTLOCK_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.capture.outputs_command.trim().is_empty() {
            return Err(invalid("outputs_command must not be empty"));
        }
        if self.capture.screenshot_command.trim().is_empty() {
            return Err(invalid("screenshot_command must not be empty"));
        }
        if !self.capture.blur_sigma.is_finite() || self.capture.blur_sigma <= 0.0 {
            return Err(invalid(format!(
                "blur_sigma must be a positive number, got {}",
                self.capture.blur_sigma
            )));
        }

        if self.auth.service.trim().is_empty() {
            return Err(invalid("auth service must not be empty"));
        }

        let timings = [
            ("typing_revert_ms", self.timing.typing_revert_ms),
            ("wrong_revert_ms", self.timing.wrong_revert_ms),
            ("clear_revert_ms", self.timing.clear_revert_ms),
            ("redraw_interval_ms", self.timing.redraw_interval_ms),
        ];
        for (name, value) in timings {
            if value == 0 {
                return Err(invalid(format!("{name} must be greater than 0")));
            }
        }

        if self.indicator.radius <= 0.0 || self.indicator.line_width <= 0.0 {
            return Err(invalid("indicator radius and line_width must be positive"));
        }
        for format in [&self.indicator.clock_format, &self.indicator.date_format] {
            if StrftimeItems::new(format).any(|item| item == Item::Error) {
                return Err(invalid(format!("invalid time format: {format}")));
            }
        }

        Ok(())
    }

    /// Get the lock image directory, resolving defaults if not set.
    #[must_use]
    pub fn image_dir(&self) -> PathBuf {
        self.capture
            .image_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }

    /// Get the typing revert delay as a Duration.
    #[must_use]
    pub fn typing_revert(&self) -> Duration {
        Duration::from_millis(self.timing.typing_revert_ms)
    }

    /// Get the wrong-password revert delay as a Duration.
    #[must_use]
    pub fn wrong_revert(&self) -> Duration {
        Duration::from_millis(self.timing.wrong_revert_ms)
    }

    /// Get the clear revert delay as a Duration.
    #[must_use]
    pub fn clear_revert(&self) -> Duration {
        Duration::from_millis(self.timing.clear_revert_ms)
    }

    /// Get the redraw interval as a Duration.
    #[must_use]
    pub fn redraw_interval(&self) -> Duration {
        Duration::from_millis(self.timing.redraw_interval_ms)
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::ConfigValidation {
        message: message.into(),
    }
}
