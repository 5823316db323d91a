//! The `love` table

use crate::math::RandomGenerator;
use crate::wiimote::WiimoteModule;
use wiilove_config::{BuildMode, WiiLoveConfig};
use wiilove_event::FramePump;
use wiilove_hal::{SystemInfo, Timer};

/// Everything a running game can reach through `love.*`
pub struct Love {
    config: WiiLoveConfig,
    pump: FramePump,
    timer: Timer,
    random: RandomGenerator,
    system: SystemInfo,
}

impl Love {
    /// Set up the modules from configuration
    ///
    /// The pump's quit behaviour is taken from `runtime.quit_mode`.
    pub fn new(config: WiiLoveConfig, pump: FramePump) -> Self {
        let pump = pump.with_quit_mode(config.runtime.quit_mode);

        let random = match config.runtime.random_seed {
            Some(seed) => RandomGenerator::from_seed(seed),
            None => RandomGenerator::from_clock(),
        };

        let (major, minor, patch) = Self::version();
        tracing::info!(
            "WiiLÖVE {}.{}.{} ({} mode)",
            major,
            minor,
            patch,
            config.runtime.mode.as_str()
        );

        let mut love = Self {
            config,
            pump,
            timer: Timer::monotonic(),
            random,
            system: SystemInfo::detect_desktop(),
        };
        love.apply_nickname();
        love
    }

    pub fn with_timer(mut self, timer: Timer) -> Self {
        self.timer = timer;
        self
    }

    /// Replace the detected platform information
    pub fn with_system(mut self, system: SystemInfo) -> Self {
        self.system = system;
        self.apply_nickname();
        self
    }

    fn apply_nickname(&mut self) {
        if let Some(nickname) = &self.config.runtime.nickname {
            self.system.nickname = Some(nickname.clone());
        }
    }

    /// `love.getVersion()`
    pub fn version() -> (u32, u32, u32) {
        (
            env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap_or_default(),
            env!("CARGO_PKG_VERSION_MINOR").parse().unwrap_or_default(),
            env!("CARGO_PKG_VERSION_PATCH").parse().unwrap_or_default(),
        )
    }

    /// `love.getMode()`
    pub fn mode(&self) -> BuildMode {
        self.config.runtime.mode
    }

    pub fn config(&self) -> &WiiLoveConfig {
        &self.config
    }

    /// `love.event`
    pub fn event(&mut self) -> &mut FramePump {
        &mut self.pump
    }

    /// `love.wiimote`
    pub fn wiimote(&mut self) -> WiimoteModule<'_> {
        WiimoteModule::new(&mut self.pump)
    }

    /// `love.timer`
    pub fn timer(&mut self) -> &mut Timer {
        &mut self.timer
    }

    /// `love.math`
    pub fn math(&mut self) -> &mut RandomGenerator {
        &mut self.random
    }

    /// `love.system`
    pub fn system(&self) -> &SystemInfo {
        &self.system
    }
}
