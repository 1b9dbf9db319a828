//! Front-end settings loaded from TOML.

use crate::cli::RuleOverrides;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use strictly_2048::GameConfig;
use tracing::{debug, info, instrument};

/// Settings file read when `--config` is not given.
pub const DEFAULT_SETTINGS_PATH: &str = "strictly_2048.toml";

/// Front-end settings.
///
/// ```toml
/// animation_ms = 120
/// frames = 6
/// sound = true
/// best_score_path = "strictly_2048_best.json"
///
/// [game]
/// width = 4
/// height = 4
/// win_value = 2048
/// ```
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Board rules.
    game: GameConfig,

    /// Duration of a slide animation in milliseconds.
    animation_ms: u64,

    /// Frames drawn per slide animation.
    frames: u32,

    /// Ring the terminal bell on merges, wins and game over, until the
    /// player toggles it; the toggle is saved next to the best score.
    sound: bool,

    /// JSON file holding the best score.
    best_score_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            animation_ms: 120,
            frames: 6,
            sound: true,
            best_score_path: PathBuf::from("strictly_2048_best.json"),
        }
    }
}

impl Settings {
    /// Loads settings from `path`, or from [`DEFAULT_SETTINGS_PATH`] if it
    /// exists, or falls back to defaults.
    ///
    /// An explicit path that cannot be read is an error.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_SETTINGS_PATH).exists() => {
                Self::from_file(DEFAULT_SETTINGS_PATH)
            }
            None => {
                debug!("No settings file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Loads settings from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading settings from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read settings file: {}", e)))?;

        let settings: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse settings: {}", e)))?;

        info!(
            width = settings.game.width(),
            height = settings.game.height(),
            "Settings loaded"
        );
        Ok(settings)
    }

    /// Applies command-line rule overrides.
    pub fn with_overrides(mut self, overrides: &RuleOverrides) -> Self {
        let width = overrides.width.unwrap_or(*self.game.width());
        let height = overrides.height.unwrap_or(*self.game.height());
        self.game = self.game.with_size(width, height);
        if let Some(win_value) = overrides.win_value {
            self.game = self.game.with_win_value(win_value);
        }
        self
    }

    /// Checks every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.game
            .validate()
            .map_err(|e| ConfigError::new(e.to_string()))?;
        if self.frames == 0 {
            return Err(ConfigError::new("frames must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Delay between animation frames.
    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.animation_ms / u64::from(self.frames.max(1)))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sound = false\n\n[game]\nwidth = 5\nwin_value = 512").unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert!(!settings.sound());
        assert_eq!(*settings.animation_ms(), 120);
        assert_eq!(*settings.game().width(), 5);
        assert_eq!(*settings.game().height(), 4);
        assert_eq!(*settings.game().win_value(), 512);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.message.contains("Failed to read"));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "frames = \"many\"").unwrap();
        let err = Settings::from_file(file.path()).unwrap_err();
        assert!(err.message.contains("Failed to parse"));
    }

    #[test]
    fn test_overrides_replace_rules() {
        let overrides = RuleOverrides {
            width: Some(6),
            height: None,
            win_value: Some(64),
        };
        let settings = Settings::default().with_overrides(&overrides);
        assert_eq!(*settings.game().width(), 6);
        assert_eq!(*settings.game().height(), 4);
        assert_eq!(*settings.game().win_value(), 64);
    }

    #[test]
    fn test_invalid_rules_rejected() {
        let overrides = RuleOverrides {
            win_value: Some(100),
            ..RuleOverrides::default()
        };
        let settings = Settings::default().with_overrides(&overrides);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_frame_delay() {
        assert_eq!(Settings::default().frame_delay(), Duration::from_millis(20));
    }
}
