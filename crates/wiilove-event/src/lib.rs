//! Event queue and frame pump for WiiLÖVE
//!
//! Each frame the script calls [`FramePump::pump`], which:
//!
//! - exits through the configured [`wiilove_hal::SystemReset`] if RESET or
//!   POWER was pressed since the last frame
//! - otherwise discards unread events, samples the Wii Remotes and queues
//!   `homepressed`, `wiimotedisconnected` and `wiimoteconnected` events
//!
//! and then drains the queue with [`FramePump::poll`] until it returns `None`.
//!
//! # Example
//!
//! ```no_run
//! use wiilove_event::{Event, FramePump};
//! use wiilove_hal::mock::{MockReset, MockSampler};
//!
//! let sampler = MockSampler::new();
//! let mut pump = FramePump::new(Box::new(sampler), Box::new(MockReset::new()));
//!
//! pump.pump();
//! while let Some(event) = pump.poll() {
//!     if event == Event::Quit {
//!         break;
//!     }
//! }
//! ```

pub mod event;
pub mod pump;
pub mod queue;

pub use event::{Event, EventError, MAX_VALUES, Value};
pub use pump::FramePump;
pub use queue::EventQueue;
