//! Runtime behaviour
//!
//! Build mode reported to scripts, how `quit()` behaves, and frame pacing.

use serde::{Deserialize, Serialize};

/// Build flavour reported by `love.getMode()`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildMode {
    /// Shipping build: no debug output
    Final,
    /// Development build with verbose diagnostics
    Debug,
    #[default]
    Release,
}

impl BuildMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildMode::Final => "final",
            BuildMode::Debug => "debug",
            BuildMode::Release => "release",
        }
    }
}

/// What `love.event.quit()` does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuitMode {
    /// Queue a `quit` event for the script's main loop
    #[default]
    Event,
    /// Tear down and exit on the spot
    Immediate,
}

/// Runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub mode: BuildMode,

    #[serde(default)]
    pub quit_mode: QuitMode,

    /// Frames per second the main loop paces itself to
    #[serde(default = "default_fps")]
    pub target_fps: u32,

    /// Nickname reported to scripts instead of the platform's
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,

    /// Seed for `love.math.random`; taken from the clock when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<u64>,
}

fn default_fps() -> u32 {
    60
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            mode: BuildMode::default(),
            quit_mode: QuitMode::default(),
            target_fps: default_fps(),
            nickname: None,
            random_seed: None,
        }
    }
}

impl RuntimeConfig {
    /// Duration of one frame at the target rate
    pub fn frame_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / f64::from(self.target_fps.max(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_strings() {
        assert_eq!(BuildMode::Final.as_str(), "final");
        assert_eq!(BuildMode::Debug.as_str(), "debug");
        assert_eq!(BuildMode::default().as_str(), "release");
    }

    #[test]
    fn test_frame_duration() {
        let config = RuntimeConfig {
            target_fps: 50,
            ..Default::default()
        };
        assert_eq!(config.frame_duration().as_millis(), 20);
    }

    #[test]
    fn test_quit_mode_parse() {
        #[derive(Deserialize)]
        struct Wrapper {
            quit_mode: QuitMode,
        }

        let w: Wrapper = toml::from_str("quit_mode = \"immediate\"").unwrap();
        assert_eq!(w.quit_mode, QuitMode::Immediate);
        assert!(toml::from_str::<Wrapper>("quit_mode = \"later\"").is_err());
    }

    #[test]
    fn test_unset_options_not_written() {
        let json = serde_json::to_value(RuntimeConfig::default()).unwrap();
        assert!(json.get("nickname").is_none());
        assert!(json.get("random_seed").is_none());
    }
}
