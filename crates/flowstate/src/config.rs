//! Store configuration.
//!
//! ```toml
//! # flowstate.toml
//! gesture_debounce_ms = 300
//! default_project_path = "projects/default.fsa"
//! empty_project_path = "projects/empty.fss"
//! ```

use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_GESTURE_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_PROJECT_FILE: &str = "default.fsa";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Time after the first action of a gesture before it is committed.
    pub gesture_debounce_ms: u64,
    /// Target of the open/save default project actions.
    pub default_project_path: PathBuf,
    /// State file loaded by the open-empty-project action. Without one the
    /// built-in empty document is used.
    pub empty_project_path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            gesture_debounce_ms: DEFAULT_GESTURE_DEBOUNCE_MS,
            default_project_path: PathBuf::from(DEFAULT_PROJECT_FILE),
            empty_project_path: None,
        }
    }
}

impl StoreConfig {
    #[must_use]
    pub fn with_gesture_debounce_ms(mut self, ms: u64) -> Self {
        self.gesture_debounce_ms = ms;
        self
    }

    #[must_use]
    pub fn with_default_project_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_project_path = path.into();
        self
    }

    #[must_use]
    pub fn with_empty_project_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.empty_project_path = Some(path.into());
        self
    }

    /// The debounce window as a duration.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] when the window does not fit a duration.
    pub fn gesture_debounce(&self) -> Result<TimeDelta, ConfigError> {
        i64::try_from(self.gesture_debounce_ms)
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .ok_or_else(|| ConfigError::Invalid(format!("gesture_debounce_ms out of range: {}", self.gesture_debounce_ms)))
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gesture_debounce()?;
        if self.default_project_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("default_project_path is empty".into()));
        }
        Ok(())
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.gesture_debounce_ms, 500);
        assert_eq!(config.gesture_debounce().unwrap(), TimeDelta::milliseconds(500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = StoreConfig::from_toml_str("gesture_debounce_ms = 0").unwrap();
        assert_eq!(config.gesture_debounce_ms, 0);
        assert_eq!(config.default_project_path, PathBuf::from(DEFAULT_PROJECT_FILE));
        assert_eq!(config.empty_project_path, None);
    }

    #[test]
    fn full_toml() {
        let config = StoreConfig::from_toml_str(
            r#"
            gesture_debounce_ms = 250
            default_project_path = "p/default.fsd"
            empty_project_path = "p/empty.fss"
            "#,
        )
        .unwrap();
        assert_eq!(
            config,
            StoreConfig::default()
                .with_gesture_debounce_ms(250)
                .with_default_project_path("p/default.fsd")
                .with_empty_project_path("p/empty.fss")
        );
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(StoreConfig::from_toml_str("gesture_debounce_ms = -1"), Err(ConfigError::Parse(_))));
        assert!(matches!(StoreConfig::from_toml_str("default_project_path = \"\""), Err(ConfigError::Invalid(_))));
        let huge = StoreConfig::default().with_gesture_debounce_ms(u64::MAX);
        assert!(matches!(huge.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(StoreConfig::from_toml_file("/nonexistent/flowstate.toml"), Err(ConfigError::Io(_))));
    }
}
