//! Configuration management for WiiLÖVE
//!
//! Handles runtime behaviour (build mode, quit policy, frame rate), input
//! settings and logging. Configuration is TOML (or JSON, by file extension);
//! a user file is layered over the system file key by key.

mod input;
mod runtime;

pub use input::InputConfig;
pub use runtime::{BuildMode, QuitMode, RuntimeConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV: &str = "WIILOVE_CONFIG";

/// Standard configuration paths
pub const CONFIG_FILE: &str = "wiilove.toml";
pub const SYSTEM_CONFIG_DIR: &str = "/apps/wiilove";

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive; `RUST_LOG` takes precedence
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

/// Main WiiLÖVE configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WiiLoveConfig {
    #[serde(default)]
    pub runtime: RuntimeConfig,

    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Read a file into a TOML tree, whatever its format
fn read_value(path: &Path) -> Result<toml::Value, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    if is_json(path) {
        let mut json: serde_json::Value = serde_json::from_str(&contents)?;
        strip_nulls(&mut json);
        Ok(serde_json::from_value(json)?)
    } else {
        Ok(toml::from_str(&contents)?)
    }
}

/// TOML has no null; an explicit `null` in JSON means "not set"
fn strip_nulls(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        serde_json::Value::Array(items) => {
            items.retain(|v| !v.is_null());
            items.iter_mut().for_each(strip_nulls);
        }
        _ => {}
    }
}

impl WiiLoveConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = if is_json(path) {
            serde_json::from_str(&contents)?
        } else {
            toml::from_str(&contents)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load several files, each one overriding the keys it sets
    ///
    /// Missing files are skipped.
    pub fn load_layered(paths: &[PathBuf]) -> Result<Self, ConfigError> {
        let mut merged = toml::Value::Table(toml::map::Map::new());
        let mut found = false;

        for path in paths {
            if !path.exists() {
                continue;
            }
            tracing::debug!("Loading configuration layer {}", path.display());
            merge_toml(&mut merged, read_value(path)?);
            found = true;
        }

        if !found {
            tracing::warn!("No configuration file found, using defaults");
        }

        let config: Self = merged.try_into()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load_default() -> Result<Self, ConfigError> {
        // An explicit file replaces the search entirely
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::load(Path::new(&path));
        }

        Self::load_layered(&[
            Path::new(SYSTEM_CONFIG_DIR).join(CONFIG_FILE),
            PathBuf::from(CONFIG_FILE),
        ])
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;
        tracing::info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Reject values that would stall or break the frame loop
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.runtime.target_fps == 0 {
            return Err(ConfigError::Invalid("runtime.target_fps must be > 0".into()));
        }
        if self.input.pointer_width == 0 || self.input.pointer_height == 0 {
            return Err(ConfigError::Invalid(
                "input pointer resolution must be non-zero".into(),
            ));
        }
        if let Some(slot) = self.input.connected_at_start.iter().find(|s| **s > 3) {
            return Err(ConfigError::Invalid(format!(
                "input.connected_at_start: slot {} out of range 0-3",
                slot
            )));
        }
        Ok(())
    }
}

/// Helper function to merge TOML values
pub fn merge_toml(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                if let Some(base_value) = base_table.get_mut(&key) {
                    merge_toml(base_value, value);
                } else {
                    base_table.insert(key, value);
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config() {
        let config = WiiLoveConfig::default();
        assert_eq!(config.runtime.target_fps, 60);
        assert_eq!(config.runtime.quit_mode, QuitMode::Event);
        assert_eq!(config.logging.filter, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serialize_deserialize() {
        let config = WiiLoveConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: WiiLoveConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.runtime.mode, parsed.runtime.mode);
        assert_eq!(config.input.pointer_width, parsed.input.pointer_width);
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::NotFound(PathBuf::from("/apps/wiilove/wiilove.toml"));
        assert!(format!("{}", err).contains("not found"));

        let err = ConfigError::Invalid("test error".to_string());
        assert!(format!("{}", err).contains("Invalid"));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let config_content = r#"
[runtime]
mode = "debug"
quit_mode = "immediate"
target_fps = 50

[input]
connected_at_start = [0, 1]
"#;
        write!(temp_file, "{}", config_content).unwrap();

        let config = WiiLoveConfig::load(temp_file.path()).unwrap();
        assert_eq!(config.runtime.mode, BuildMode::Debug);
        assert_eq!(config.runtime.quit_mode, QuitMode::Immediate);
        assert_eq!(config.runtime.target_fps, 50);
        assert_eq!(config.input.connected_at_start, vec![0, 1]);
        // Untouched sections keep their defaults
        assert_eq!(config.input.pointer_width, 640);
    }

    #[test]
    fn test_load_missing_file() {
        let err = WiiLoveConfig::load(Path::new("/nonexistent/wiilove.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "[runtime]\ntarget_fps = 0\n").unwrap();
        assert!(matches!(
            WiiLoveConfig::load(temp_file.path()),
            Err(ConfigError::Invalid(_))
        ));

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "[input]\nconnected_at_start = [4]\n").unwrap();
        assert!(matches!(
            WiiLoveConfig::load(temp_file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_save_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let mut config = WiiLoveConfig::default();
        config.runtime.nickname = Some("HTV".into());

        config.save(&path).unwrap();

        let loaded = WiiLoveConfig::load(&path).unwrap();
        assert_eq!(loaded.runtime.nickname.as_deref(), Some("HTV"));
    }

    #[test]
    fn test_json_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wiilove.json");
        let mut config = WiiLoveConfig::default();
        config.runtime.mode = BuildMode::Final;

        config.save(&path).unwrap();
        let loaded = WiiLoveConfig::load(&path).unwrap();
        assert_eq!(loaded.runtime.mode, BuildMode::Final);
    }

    #[test]
    fn test_load_layered() {
        let dir = TempDir::new().unwrap();
        let system = dir.path().join("system.toml");
        let user = dir.path().join("user.toml");
        std::fs::write(
            &system,
            "[runtime]\nmode = \"final\"\ntarget_fps = 50\n\n[logging]\nfilter = \"warn\"\n",
        )
        .unwrap();
        std::fs::write(&user, "[runtime]\ntarget_fps = 60\n").unwrap();

        let config = WiiLoveConfig::load_layered(&[
            system,
            dir.path().join("missing.toml"),
            user,
        ])
        .unwrap();

        assert_eq!(config.runtime.mode, BuildMode::Final);
        assert_eq!(config.runtime.target_fps, 60);
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn test_load_layered_without_files() {
        let config = WiiLoveConfig::load_layered(&[PathBuf::from("/nonexistent.toml")]).unwrap();
        assert_eq!(config.runtime.target_fps, 60);
    }

    #[test]
    fn test_merge_toml_tables() {
        let base_table = toml::toml! {
            [runtime]
            mode = "release"
            target_fps = 60
        };
        let mut base = toml::Value::Table(base_table);

        let overlay_table = toml::toml! {
            [runtime]
            mode = "debug"
        };
        let overlay = toml::Value::Table(overlay_table);

        merge_toml(&mut base, overlay);

        let table = base.as_table().unwrap();
        let runtime = table.get("runtime").unwrap().as_table().unwrap();
        assert_eq!(runtime.get("mode").unwrap().as_str(), Some("debug"));
        assert_eq!(runtime.get("target_fps").unwrap().as_integer(), Some(60));
    }

    #[test]
    fn test_merge_toml_replaces_non_tables() {
        let mut base = toml::Value::Integer(42);
        let overlay = toml::Value::Integer(100);

        merge_toml(&mut base, overlay);

        assert_eq!(base.as_integer(), Some(100));
    }
}
