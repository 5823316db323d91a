//! WiiLÖVE scripting surface
//!
//! [`Love`] gathers the modules a game script talks to: `event` (the frame
//! pump), `wiimote`, `timer`, `math` and `system`, plus `getVersion` and
//! `getMode`. Script-facing calls take slot ids and button names as scripts
//! pass them and report bad arguments as [`LoveError`].

pub mod love;
pub mod math;
pub mod wiimote;

pub use love::Love;
pub use math::RandomGenerator;
pub use wiimote::WiimoteModule;

pub use wiilove_config::{BuildMode, QuitMode, WiiLoveConfig};
pub use wiilove_event::{Event, FramePump, Value};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoveError {
    #[error(transparent)]
    Hal(#[from] wiilove_hal::HalError),

    #[error(transparent)]
    Event(#[from] wiilove_event::EventError),

    #[error(transparent)]
    Config(#[from] wiilove_config::ConfigError),
}

pub type Result<T> = std::result::Result<T, LoveError>;
