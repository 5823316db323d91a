//! Hardware Abstraction Layer (HAL)
//!
//! This crate provides the hardware-facing half of WiiLÖVE, allowing the event
//! pump and the scripting surface to talk to controllers, power callbacks and
//! the system clock through a unified interface.
//!
//! # Backends
//!
//! - Console: WPAD sampling behind [`InputSampler`]
//! - Desktop: keyboard sampling (provided by the runner)
//! - Tests: the [`mock`] module
//!
//! # Example
//!
//! ```no_run
//! use wiilove_hal::mock::MockSampler;
//! use wiilove_hal::{Slot, Wiimotes};
//!
//! let mut sampler = MockSampler::new();
//! sampler.connect(Slot::FIRST);
//!
//! let mut wiimotes = Wiimotes::new();
//! let transitions = wiimotes.update(&mut sampler);
//! assert!(transitions.connected(Slot::FIRST));
//! ```

pub mod input;
pub mod mock;
pub mod power;
pub mod system;
pub mod timer;
pub mod wiimote;

pub use input::{
    ClassicButton, Extension, InputSampler, Pointer, SLOT_COUNT, Slot, SlotSample, WiimoteButton,
};
pub use power::{ProcessReset, ShutdownReason, SystemReset, TerminationFlag};
pub use system::{Console, Language, SystemInfo};
pub use timer::{Clock, MonotonicClock, Timer};
pub use wiimote::{SlotTransitions, WiimoteState, Wiimotes};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HalError {
    #[error("Invalid controller slot: {0} (expected 0-{max})", max = SLOT_COUNT - 1)]
    InvalidSlot(i64),

    #[error("Unknown Wii Remote button: {0}")]
    UnknownButton(String),

    #[error("Unknown Classic Controller button: {0}")]
    UnknownClassicButton(String),

    #[error("Controller in slot {0} is not responding")]
    NotResponding(u8),

    #[error("Operation not supported by this input backend: {0}")]
    Unsupported(&'static str),

    #[error("Invalid input script: {0}")]
    InvalidScript(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// HAL Result type
pub type Result<T> = std::result::Result<T, HalError>;
