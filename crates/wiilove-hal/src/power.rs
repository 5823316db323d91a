//! Power management
//!
//! Handles the console's RESET and POWER buttons. The hardware callbacks run
//! outside the main loop, so the only thing they do is record a reason in a
//! [`TerminationFlag`]. The event pump reads the flag once per frame and, when
//! set, tears down and hands over to a [`SystemReset`] that never returns.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU8, Ordering};

/// Why the process is going away
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShutdownReason {
    /// The script asked to quit immediately
    Quit,
    /// RESET pressed: back to the loader / system menu
    ReturnToMenu,
    /// POWER pressed on the console or a Wii Remote
    PowerOff,
}

impl ShutdownReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShutdownReason::Quit => "quit",
            ShutdownReason::ReturnToMenu => "return_to_menu",
            ShutdownReason::PowerOff => "power_off",
        }
    }
}

const RUNNING: u8 = 0;
const RETURN_TO_MENU: u8 = 1;
const POWER_OFF: u8 = 2;

/// Process-wide termination request written from callback context
///
/// The first reason recorded wins; later requests are ignored.
#[derive(Debug, Default)]
pub struct TerminationFlag {
    state: AtomicU8,
}

impl TerminationFlag {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(RUNNING),
        }
    }

    /// Record a termination request. Safe to call from a signal handler.
    pub fn request(&self, reason: ShutdownReason) {
        let value = match reason {
            ShutdownReason::ReturnToMenu => RETURN_TO_MENU,
            // Quit is never raised asynchronously; treat it like a power request
            ShutdownReason::PowerOff | ShutdownReason::Quit => POWER_OFF,
        };
        let _ = self
            .state
            .compare_exchange(RUNNING, value, Ordering::Release, Ordering::Relaxed);
    }

    /// The pending reason, if a request has been recorded
    pub fn observe(&self) -> Option<ShutdownReason> {
        match self.state.load(Ordering::Acquire) {
            RETURN_TO_MENU => Some(ShutdownReason::ReturnToMenu),
            POWER_OFF => Some(ShutdownReason::PowerOff),
            _ => None,
        }
    }

    pub fn is_requested(&self) -> bool {
        self.observe().is_some()
    }
}

/// Final hand-over once the process must stop
pub trait SystemReset {
    fn reset_system(&mut self, reason: ShutdownReason) -> !;
}

/// Desktop reset: log and exit the process
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessReset;

impl SystemReset for ProcessReset {
    fn reset_system(&mut self, reason: ShutdownReason) -> ! {
        tracing::info!("System reset requested ({}), exiting", reason.as_str());
        std::process::exit(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_flag_starts_running() {
        let flag = TerminationFlag::new();
        assert_eq!(flag.observe(), None);
        assert!(!flag.is_requested());
    }

    #[test]
    fn test_first_reason_wins() {
        let flag = TerminationFlag::new();
        flag.request(ShutdownReason::ReturnToMenu);
        flag.request(ShutdownReason::PowerOff);
        assert_eq!(flag.observe(), Some(ShutdownReason::ReturnToMenu));
    }

    #[test]
    fn test_request_from_other_thread() {
        let flag = Arc::new(TerminationFlag::new());
        let writer = Arc::clone(&flag);

        thread::spawn(move || writer.request(ShutdownReason::PowerOff))
            .join()
            .unwrap();

        assert_eq!(flag.observe(), Some(ShutdownReason::PowerOff));
    }

    #[test]
    fn test_static_flag() {
        static FLAG: TerminationFlag = TerminationFlag::new();
        assert!(!FLAG.is_requested());
    }

    #[test]
    fn test_reason_str() {
        assert_eq!(ShutdownReason::ReturnToMenu.as_str(), "return_to_menu");
        assert_eq!(ShutdownReason::PowerOff.as_str(), "power_off");
    }
}
