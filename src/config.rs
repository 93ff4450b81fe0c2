// SPDX-License-Identifier: GPL-3.0-only

//! Timing configuration for the input session.
//!
//! All delays the session feeds into the timer scheduler live in one
//! [`TimingConfig`]. The config deserializes from JSON with per-field
//! defaults, so a settings file only needs to name the values it changes:
//!
//! ```json
//! { "long_press_timeout_ms": 450, "key_repeat_interval_ms": 35 }
//! ```

use crate::settings;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Timing parameters of the input session, in milliseconds.
///
/// Use [`Duration`] accessors of the same name (minus the `_ms` suffix)
/// when feeding values to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimingConfig {
    /// Delay before the first key repeat.
    #[serde(default = "default_key_repeat_start_delay_ms")]
    pub key_repeat_start_delay_ms: u64,
    /// Interval between subsequent key repeats.
    #[serde(default = "default_key_repeat_interval_ms")]
    pub key_repeat_interval_ms: u64,
    /// Hold time before a press counts as a long press.
    #[serde(default = "default_long_press_timeout_ms")]
    pub long_press_timeout_ms: u64,
    /// Window for detecting a modifier double tap.
    #[serde(default = "default_double_tap_window_ms")]
    pub double_tap_window_ms: u64,
    /// Idle time after the last typed key before the typing session ends.
    #[serde(default = "default_ignore_alt_code_key_timeout_ms")]
    pub ignore_alt_code_key_timeout_ms: u64,
    /// Interval between batch-input updates. Zero disables them.
    #[serde(default = "default_gesture_update_interval_ms")]
    pub gesture_update_interval_ms: u64,
    /// Delay before a released key's preview popup is dismissed.
    #[serde(default = "default_key_preview_dismiss_delay_ms")]
    pub key_preview_dismiss_delay_ms: u64,
    /// Delay before the floating gesture preview is dismissed.
    #[serde(default = "default_gesture_preview_dismiss_delay_ms")]
    pub gesture_preview_dismiss_delay_ms: u64,
}

fn default_key_repeat_start_delay_ms() -> u64 {
    settings::DEFAULT_KEY_REPEAT_START_DELAY_MS
}

fn default_key_repeat_interval_ms() -> u64 {
    settings::DEFAULT_KEY_REPEAT_INTERVAL_MS
}

fn default_long_press_timeout_ms() -> u64 {
    settings::DEFAULT_LONG_PRESS_TIMEOUT_MS
}

fn default_double_tap_window_ms() -> u64 {
    settings::DEFAULT_DOUBLE_TAP_WINDOW_MS
}

fn default_ignore_alt_code_key_timeout_ms() -> u64 {
    settings::DEFAULT_IGNORE_ALT_CODE_KEY_TIMEOUT_MS
}

fn default_gesture_update_interval_ms() -> u64 {
    settings::DEFAULT_GESTURE_UPDATE_INTERVAL_MS
}

fn default_key_preview_dismiss_delay_ms() -> u64 {
    settings::DEFAULT_KEY_PREVIEW_DISMISS_DELAY_MS
}

fn default_gesture_preview_dismiss_delay_ms() -> u64 {
    settings::DEFAULT_GESTURE_PREVIEW_DISMISS_DELAY_MS
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            key_repeat_start_delay_ms: default_key_repeat_start_delay_ms(),
            key_repeat_interval_ms: default_key_repeat_interval_ms(),
            long_press_timeout_ms: default_long_press_timeout_ms(),
            double_tap_window_ms: default_double_tap_window_ms(),
            ignore_alt_code_key_timeout_ms: default_ignore_alt_code_key_timeout_ms(),
            gesture_update_interval_ms: default_gesture_update_interval_ms(),
            key_preview_dismiss_delay_ms: default_key_preview_dismiss_delay_ms(),
            gesture_preview_dismiss_delay_ms: default_gesture_preview_dismiss_delay_ms(),
        }
    }
}

impl TimingConfig {
    /// Parses a config from a JSON string. Missing fields take their
    /// defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(ConfigError::json_error)
    }

    /// Loads a config from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::io_error_with_path(source, path.display().to_string()))?;
        serde_json::from_str(&contents)
            .map_err(|source| ConfigError::json_error_with_path(source, path.display().to_string()))
    }

    /// Delay before the first key repeat.
    #[must_use]
    pub fn key_repeat_start_delay(&self) -> Duration {
        Duration::from_millis(self.key_repeat_start_delay_ms)
    }

    /// Interval between subsequent key repeats.
    #[must_use]
    pub fn key_repeat_interval(&self) -> Duration {
        Duration::from_millis(self.key_repeat_interval_ms)
    }

    /// Hold time before a press counts as a long press.
    #[must_use]
    pub fn long_press_timeout(&self) -> Duration {
        Duration::from_millis(self.long_press_timeout_ms)
    }

    /// Window for detecting a modifier double tap.
    #[must_use]
    pub fn double_tap_window(&self) -> Duration {
        Duration::from_millis(self.double_tap_window_ms)
    }

    /// Idle time before the typing session ends.
    #[must_use]
    pub fn ignore_alt_code_key_timeout(&self) -> Duration {
        Duration::from_millis(self.ignore_alt_code_key_timeout_ms)
    }

    /// Interval between batch-input updates.
    #[must_use]
    pub fn gesture_update_interval(&self) -> Duration {
        Duration::from_millis(self.gesture_update_interval_ms)
    }

    /// Delay before a key preview popup is dismissed.
    #[must_use]
    pub fn key_preview_dismiss_delay(&self) -> Duration {
        Duration::from_millis(self.key_preview_dismiss_delay_ms)
    }

    /// Delay before the floating gesture preview is dismissed.
    #[must_use]
    pub fn gesture_preview_dismiss_delay(&self) -> Duration {
        Duration::from_millis(self.gesture_preview_dismiss_delay_ms)
    }
}

/// Error type for config loading.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error while reading a config file.
    IoError {
        /// The underlying I/O error.
        source: std::io::Error,
        /// File that failed to load, when loading from a path.
        file_path: Option<String>,
    },

    /// JSON parsing or shape error.
    JsonError {
        /// The underlying JSON error.
        source: serde_json::Error,
        /// File being parsed, when loading from a path.
        file_path: Option<String>,
        /// Line where the error occurred, when serde_json reports one.
        line_number: Option<usize>,
    },
}

impl ConfigError {
    /// Creates a JSON error without file context.
    pub fn json_error(source: serde_json::Error) -> Self {
        let line_number = match source.line() {
            0 => None,
            line => Some(line),
        };
        Self::JsonError {
            source,
            file_path: None,
            line_number,
        }
    }

    /// Creates a JSON error with file context.
    pub fn json_error_with_path(source: serde_json::Error, file_path: impl Into<String>) -> Self {
        let line_number = match source.line() {
            0 => None,
            line => Some(line),
        };
        Self::JsonError {
            source,
            file_path: Some(file_path.into()),
            line_number,
        }
    }

    /// Creates an I/O error with file context.
    pub fn io_error_with_path(source: std::io::Error, file_path: impl Into<String>) -> Self {
        Self::IoError {
            source,
            file_path: Some(file_path.into()),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError { source, file_path } => {
                write!(f, "I/O error")?;
                if let Some(path) = file_path {
                    write!(f, " reading config file '{}'", path)?;
                }
                write!(f, ": {}", source)
            }
            ConfigError::JsonError {
                source,
                file_path,
                line_number,
            } => {
                write!(f, "invalid timing config")?;
                if let Some(path) = file_path {
                    write!(f, " in '{}'", path)?;
                }
                if let Some(line) = line_number {
                    write!(f, " (line {})", line)?;
                }
                write!(f, ": {}", source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::JsonError { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(source: std::io::Error) -> Self {
        Self::IoError {
            source,
            file_path: None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(source: serde_json::Error) -> Self {
        Self::json_error(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = TimingConfig::default();
        assert_eq!(config.key_repeat_start_delay(), Duration::from_millis(400));
        assert_eq!(config.key_repeat_interval(), Duration::from_millis(50));
        assert_eq!(config.long_press_timeout(), Duration::from_millis(300));
        assert_eq!(config.double_tap_window(), Duration::from_millis(300));
        assert_eq!(
            config.ignore_alt_code_key_timeout(),
            Duration::from_millis(350)
        );
        assert_eq!(config.gesture_update_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            TimingConfig::from_json_str(r#"{ "long_press_timeout_ms": 450 }"#).unwrap();
        assert_eq!(config.long_press_timeout(), Duration::from_millis(450));
        assert_eq!(
            config.key_repeat_start_delay_ms,
            settings::DEFAULT_KEY_REPEAT_START_DELAY_MS
        );
    }

    #[test]
    fn test_empty_object_is_all_defaults() {
        let config = TimingConfig::from_json_str("{}").unwrap();
        assert_eq!(config, TimingConfig::default());
    }

    #[test]
    fn test_malformed_json_reports_line() {
        let err = TimingConfig::from_json_str("{ \"long_press_timeout_ms\": }").unwrap_err();
        match err {
            ConfigError::JsonError { line_number, .. } => {
                assert_eq!(line_number, Some(1));
            }
            other => panic!("expected JsonError, got {other}"),
        }
    }

    #[test]
    fn test_from_file_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "key_repeat_interval_ms": 35, "gesture_update_interval_ms": 0 }}"#
        )
        .unwrap();

        let config = TimingConfig::from_file(file.path()).unwrap();
        assert_eq!(config.key_repeat_interval(), Duration::from_millis(35));
        assert!(config.gesture_update_interval().is_zero());
    }

    #[test]
    fn test_from_file_missing_path() {
        let err = TimingConfig::from_file("/nonexistent/softboard-timing.json").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("softboard-timing.json"), "{message}");
        assert!(std::error::Error::source(&err).is_some());
    }
}
