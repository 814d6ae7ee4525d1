//! Configuration management for the game.
//!
//! Configuration starts from built-in defaults and is layered with:
//! 1. a JSON settings file named by `GAME_SETTINGS_FILE` (optional)
//! 2. `GAME_SIZE` - number of tasks per play-through. Defaults to `42`.
//! 3. `GAME_MAX_DELAY_MS` - exclusive upper bound of each fire delay. Defaults to `3000`.
//!
//! Layers merge deep-extend style: later values win, nested groups merge
//! key-wise, and keys a layer leaves out keep their current value.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("Failed to load settings from {0}: {1}")]
    Settings(PathBuf, String),
}

/// Names of the output surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Containers {
    pub log: String,
    pub foos: String,
}

impl Default for Containers {
    fn default() -> Self {
        Self {
            log: "output".to_string(),
            foos: ".foos".to_string(),
        }
    }
}

/// Class names applied to rendered task lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassNames {
    /// Default class of every fired task line
    pub foo: String,
    /// Class added to winning lines
    pub selected: String,
}

impl Default for ClassNames {
    fn default() -> Self {
        Self {
            foo: "foo".to_string(),
            selected: "selected".to_string(),
        }
    }
}

/// Game configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Tasks per play-through (signed so bad input reaches `populate`)
    pub game: i64,

    pub max_delay_ms: u64,

    pub containers: Containers,

    pub class_names: ClassNames,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            game: 42,
            max_delay_ms: 3000,
            containers: Containers::default(),
            class_names: ClassNames::default(),
        }
    }
}

/// Partial containers override.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContainersSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foos: Option<String>,
}

/// Partial class names override.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassNamesSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,
}

/// Override layer for `GameConfig`. Every key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_delay_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub containers: Option<ContainersSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_names: Option<ClassNamesSettings>,
}

impl GameSettings {
    /// Load a settings layer from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Settings(path.to_path_buf(), e.to_string()))?;
        let settings = serde_json::from_str(&contents)
            .map_err(|e| ConfigError::Settings(path.to_path_buf(), e.to_string()))?;
        tracing::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}

fn merge_field<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

impl GameConfig {
    /// Apply an override layer on top of this config.
    pub fn merge(&mut self, settings: GameSettings) -> &mut Self {
        merge_field(&mut self.game, settings.game);
        merge_field(&mut self.max_delay_ms, settings.max_delay_ms);
        if let Some(containers) = settings.containers {
            merge_field(&mut self.containers.log, containers.log);
            merge_field(&mut self.containers.foos, containers.foos);
        }
        if let Some(class_names) = settings.class_names {
            merge_field(&mut self.class_names.foo, class_names.foo);
            merge_field(&mut self.class_names.selected, class_names.selected);
        }
        self
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for unparsable numbers and
    /// `ConfigError::Settings` if the settings file cannot be read.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = lookup("GAME_SETTINGS_FILE") {
            config.merge(GameSettings::load(Path::new(&path))?);
        }

        let env_layer = GameSettings {
            game: parse_var(&lookup, "GAME_SIZE")?,
            max_delay_ms: parse_var(&lookup, "GAME_MAX_DELAY_MS")?,
            ..Default::default()
        };
        config.merge(env_layer);

        Ok(config)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(name)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidValue(name.to_string(), e.to_string()))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = GameConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.game, 42);
        assert_eq!(config.max_delay(), Duration::from_millis(3000));
        assert_eq!(config.containers.log, "output");
        assert_eq!(config.class_names.selected, "selected");
    }

    #[test]
    fn test_merge_is_key_wise() {
        let mut config = GameConfig::default();
        config.merge(GameSettings {
            containers: Some(ContainersSettings {
                log: Some("#log".to_string()),
                foos: None,
            }),
            ..Default::default()
        });

        assert_eq!(config.containers.log, "#log");
        assert_eq!(config.containers.foos, ".foos");
        assert_eq!(config.game, 42);
    }

    #[test]
    fn test_later_layers_win() {
        let mut config = GameConfig::default();
        config
            .merge(GameSettings {
                game: Some(3),
                ..Default::default()
            })
            .merge(GameSettings {
                game: Some(5),
                ..Default::default()
            });
        assert_eq!(config.game, 5);
    }

    #[test]
    fn test_env_overrides_settings_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"game": 7, "max_delay_ms": 10, "class_names": {{"selected": "winner"}}}}"#
        )
        .unwrap();
        let path = file.path().to_string_lossy().to_string();

        let config = GameConfig::from_lookup(lookup(&[
            ("GAME_SETTINGS_FILE", path.as_str()),
            ("GAME_SIZE", "9"),
        ]))
        .unwrap();

        assert_eq!(config.game, 9);
        assert_eq!(config.max_delay_ms, 10);
        assert_eq!(config.class_names.selected, "winner");
        assert_eq!(config.class_names.foo, "foo");
    }

    #[test]
    fn test_negative_size_is_accepted_as_config() {
        let config = GameConfig::from_lookup(lookup(&[("GAME_SIZE", "-3")])).unwrap();
        assert_eq!(config.game, -3);
    }

    #[test]
    fn test_invalid_number() {
        let err = GameConfig::from_lookup(lookup(&[("GAME_MAX_DELAY_MS", "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name, _) if name == "GAME_MAX_DELAY_MS"));
    }

    #[test]
    fn test_missing_settings_file() {
        let err = GameConfig::from_lookup(lookup(&[(
            "GAME_SETTINGS_FILE",
            "/nonexistent/universe-game.json",
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Settings(_, _)));
    }
}
