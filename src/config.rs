//! Settings file
//!
//! Optional, read-only TOML at `$XDG_CONFIG_HOME/audio-switcher/config.toml`.
//! A missing file means defaults; the program never creates or writes it.
//! Device choices are not stored here, they come from the invocation string.
//!
//! ```toml
//! [settings]
//! log_level = "info"          # error, warn, info, debug, trace
//! watch_interval_ms = 1000    # default-device poll interval (>= 100)
//! notify_switch = true        # desktop notification when the indicator changes
//! notify_startup = false      # desktop notification once startup completes
//! ```

use color_eyre::eyre::{self, Context, ContextCompat, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const MIN_WATCH_INTERVAL_MS: u64 = 100;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub settings: Settings,
}

/// Global settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub log_level: String,
    pub watch_interval: Duration,
    pub notify_switch: bool,
    pub notify_startup: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let file = SettingsFile::default();
        Self {
            log_level: file.log_level,
            watch_interval: Duration::from_millis(file.watch_interval_ms),
            notify_switch: file.notify_switch,
            notify_startup: file.notify_startup,
        }
    }
}

// ============================================================================
// Config File Deserialization (TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    settings: SettingsFile,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default = "default_watch_interval_ms")]
    watch_interval_ms: u64,
    #[serde(default = "default_true")]
    notify_switch: bool,
    #[serde(default)]
    notify_startup: bool,
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_watch_interval_ms() -> u64 {
    1000
}

impl Default for SettingsFile {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            watch_interval_ms: default_watch_interval_ms(),
            notify_switch: true,
            notify_startup: false,
        }
    }
}

// ============================================================================
// Config Implementation
// ============================================================================

impl Config {
    /// Load from the default XDG path, or defaults if the file does not exist
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read, parsed or validated.
    pub fn load() -> Result<Self> {
        let path = Self::get_config_path()?;
        Self::load_from_path(&path)
    }

    /// Load from `path`, or defaults if it does not exist
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read, parsed or validated.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("Invalid config: {}", path.display()))
    }

    /// Parse and validate TOML contents
    ///
    /// # Errors
    /// Returns an error on malformed TOML, unknown keys or invalid values.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents).context("Failed to parse TOML")?;
        let config = Self {
            settings: Settings {
                log_level: file.settings.log_level,
                watch_interval: Duration::from_millis(file.settings.watch_interval_ms),
                notify_switch: file.settings.notify_switch,
                notify_startup: file.settings.notify_startup,
            },
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        validate_log_level(&self.settings.log_level)?;

        let interval_ms = self.settings.watch_interval.as_millis();
        if interval_ms < u128::from(MIN_WATCH_INTERVAL_MS) {
            eyre::bail!(
                "watch_interval_ms = {interval_ms} is too small (minimum {MIN_WATCH_INTERVAL_MS})"
            );
        }

        Ok(())
    }

    /// XDG config path for the settings file (not created)
    ///
    /// # Errors
    /// Returns an error if no config directory can be determined.
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("audio-switcher");
        Ok(config_dir.join("config.toml"))
    }
}

/// Check a log level name
///
/// # Errors
/// Returns an error naming the accepted levels.
pub fn validate_log_level(level: &str) -> Result<()> {
    match level {
        "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
        level => eyre::bail!(
            "Invalid log_level '{level}'. Must be: error, warn, info, debug, or trace"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.settings.log_level, "info");
        assert_eq!(config.settings.watch_interval, Duration::from_millis(1000));
        assert!(config.settings.notify_switch);
        assert!(!config.settings.notify_startup);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_toml(
            r#"
[settings]
log_level = "debug"
watch_interval_ms = 250
notify_switch = false
notify_startup = true
"#,
        )
        .unwrap();
        assert_eq!(config.settings.log_level, "debug");
        assert_eq!(config.settings.watch_interval, Duration::from_millis(250));
        assert!(!config.settings.notify_switch);
        assert!(config.settings.notify_startup);
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let err = Config::from_toml("[settings]\nlog_level = \"loud\"").unwrap_err();
        assert!(format!("{err:#}").contains("Invalid log_level 'loud'"));
    }

    #[test]
    fn test_interval_floor() {
        assert!(Config::from_toml("[settings]\nwatch_interval_ms = 99").is_err());
        assert!(Config::from_toml("[settings]\nwatch_interval_ms = 100").is_ok());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(Config::from_toml("[settings]\nheadphones = \"A\"").is_err());
    }

    #[test]
    fn test_config_path_under_app_dir() {
        let path = Config::get_config_path().unwrap();
        assert!(path.ends_with("audio-switcher/config.toml"));
    }
}
