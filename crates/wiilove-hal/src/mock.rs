//! Mock implementations for testing without real hardware
//!
//! This module provides mock backends for the HAL traits, allowing the event
//! pump to be driven on desktop systems and in tests without a Wii.
//!
//! # Usage
//!
//! ```no_run
//! use wiilove_hal::mock::MockSampler;
//! use wiilove_hal::Slot;
//! use std::path::Path;
//!
//! // Drive slots by hand
//! let sampler = MockSampler::new();
//! sampler.connect(Slot::FIRST);
//!
//! // Or replay a scripted session, one frame per scan
//! let scripted = MockSampler::from_script_file(Path::new("input/session.toml"));
//! ```

use crate::input::{
    ClassicButton, Extension, InputSampler, Pointer, SLOT_COUNT, Slot, SlotSample, WiimoteButton,
};
use crate::power::{ShutdownReason, SystemReset};
use crate::timer::Clock;
use crate::{HalError, Result};
use serde::Deserialize;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Simulated state of one controller channel
#[derive(Debug, Clone, Default)]
pub struct MockSlot {
    pub connected: bool,
    pub buttons_held: u32,
    pub pointer: Pointer,
    pub extension: Extension,
    pub rumbling: bool,
    /// Presses recorded since the last scan
    pending_pressed: u32,
    pending_reconnect: bool,
    pending_failure: bool,
    /// Edges latched by the last scan, reported by probes
    frame_pressed: u32,
    frame_reconnect: bool,
    frame_failure: bool,
}

/// Shared mock state for synchronized access
#[derive(Debug, Default)]
pub struct MockInputState {
    pub slots: [MockSlot; SLOT_COUNT],
    /// Frames still to be replayed from an input script
    pub script: VecDeque<MockFrame>,
    /// Number of scans performed
    pub scans: u64,
    pub shut_down: bool,
}

/// Mock controller backend
///
/// Clones share the same state, so a test can keep one handle while the
/// pump owns another.
#[derive(Debug, Clone, Default)]
pub struct MockSampler {
    state: Arc<RwLock<MockInputState>>,
}

impl MockSampler {
    /// Create a sampler with every slot empty
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sampler with the given slots already connected
    pub fn with_connected(slots: &[Slot]) -> Self {
        let sampler = Self::new();
        for slot in slots {
            sampler.connect(*slot);
        }
        sampler
    }

    /// Create from a TOML input script
    pub fn from_script_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let script = MockInputScript::parse(&contents)?;
        let sampler = Self::new();
        sampler.load_script(script);
        Ok(sampler)
    }

    /// Queue scripted frames; one is applied at the start of each scan
    pub fn load_script(&self, script: MockInputScript) {
        if let Ok(mut state) = self.state.write() {
            state.script.extend(script.frames);
        }
    }

    /// Whether every scripted frame has been replayed
    pub fn script_finished(&self) -> bool {
        self.state
            .read()
            .map(|s| s.script.is_empty())
            .unwrap_or(true)
    }

    /// Get shared state for manipulation in tests
    pub fn state(&self) -> Arc<RwLock<MockInputState>> {
        Arc::clone(&self.state)
    }

    fn with_slot(&self, slot: Slot, f: impl FnOnce(&mut MockSlot)) {
        if let Ok(mut state) = self.state.write() {
            f(&mut state.slots[slot.index()]);
        }
    }

    /// Simulate a remote syncing to a slot
    pub fn connect(&self, slot: Slot) {
        self.with_slot(slot, |s| s.connected = true);
    }

    /// Simulate a remote going away
    pub fn disconnect(&self, slot: Slot) {
        self.with_slot(slot, |s| {
            s.connected = false;
            s.buttons_held = 0;
            s.rumbling = false;
        });
    }

    /// Simulate the link dropping and coming back before the next scan
    pub fn flicker(&self, slot: Slot) {
        self.with_slot(slot, |s| s.pending_reconnect = true);
    }

    /// Make the next probe of a slot fail
    pub fn fail_next_probe(&self, slot: Slot) {
        self.with_slot(slot, |s| s.pending_failure = true);
    }

    /// Simulate pressing buttons (WPAD mask)
    pub fn press(&self, slot: Slot, mask: u32) {
        self.with_slot(slot, |s| {
            s.pending_pressed |= mask & !s.buttons_held;
            s.buttons_held |= mask;
        });
    }

    /// Simulate releasing buttons (WPAD mask)
    pub fn release(&self, slot: Slot, mask: u32) {
        self.with_slot(slot, |s| s.buttons_held &= !mask);
    }

    /// Simulate a HOME press and release within one frame
    pub fn tap_home(&self, slot: Slot) {
        self.with_slot(slot, |s| s.pending_pressed |= WiimoteButton::Home.mask());
    }

    pub fn set_pointer(&self, slot: Slot, pointer: Pointer) {
        self.with_slot(slot, |s| s.pointer = pointer);
    }

    pub fn set_extension(&self, slot: Slot, extension: Extension) {
        self.with_slot(slot, |s| s.extension = extension);
    }

    pub fn is_rumbling(&self, slot: Slot) -> bool {
        self.state
            .read()
            .map(|s| s.slots[slot.index()].rumbling)
            .unwrap_or(false)
    }

    pub fn scans(&self) -> u64 {
        self.state.read().map(|s| s.scans).unwrap_or(0)
    }

    pub fn is_shut_down(&self) -> bool {
        self.state.read().map(|s| s.shut_down).unwrap_or(false)
    }

    fn apply_frame(&self, frame: &MockFrame) {
        for slot in &frame.disconnect {
            self.disconnect(*slot);
        }
        for slot in &frame.connect {
            self.connect(*slot);
        }
        for slot in &frame.flicker {
            self.flicker(*slot);
        }
        for action in &frame.release {
            self.release(action.slot, action.mask);
        }
        for action in &frame.press {
            self.press(action.slot, action.mask);
        }
        for slot in &frame.home {
            self.tap_home(*slot);
        }
    }
}

impl InputSampler for MockSampler {
    fn name(&self) -> &str {
        "mock"
    }

    fn scan_pads(&mut self) {
        let frame = self
            .state
            .write()
            .ok()
            .and_then(|mut s| s.script.pop_front());
        if let Some(frame) = frame {
            self.apply_frame(&frame);
        }

        if let Ok(mut state) = self.state.write() {
            state.scans += 1;
            for slot in state.slots.iter_mut() {
                slot.frame_pressed = std::mem::take(&mut slot.pending_pressed);
                slot.frame_reconnect = std::mem::take(&mut slot.pending_reconnect);
                slot.frame_failure = std::mem::take(&mut slot.pending_failure);
            }
        }
    }

    fn probe(&mut self, slot: Slot) -> Result<SlotSample> {
        let state = self
            .state
            .read()
            .map_err(|_| HalError::NotResponding(slot.id()))?;
        let s = &state.slots[slot.index()];

        if s.frame_failure {
            return Err(HalError::NotResponding(slot.id()));
        }
        if !s.connected {
            return Ok(SlotSample::disconnected());
        }

        Ok(SlotSample {
            connected: true,
            reconnected: s.frame_reconnect,
            buttons_held: s.buttons_held,
            buttons_pressed: s.frame_pressed,
            pointer: s.pointer,
            extension: s.extension,
        })
    }

    fn set_rumble(&mut self, slot: Slot, on: bool) -> Result<()> {
        let mut state = self
            .state
            .write()
            .map_err(|_| HalError::NotResponding(slot.id()))?;
        let s = &mut state.slots[slot.index()];
        if !s.connected {
            return Err(HalError::NotResponding(slot.id()));
        }
        s.rumbling = on;
        tracing::debug!("[MOCK] Rumble on slot {} set to {}", slot, on);
        Ok(())
    }

    fn shutdown(&mut self) {
        if let Ok(mut state) = self.state.write() {
            state.shut_down = true;
        }
        tracing::debug!("[MOCK] Input backend shut down");
    }
}

/// A button change in an input script
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawButtonAction")]
pub struct ButtonAction {
    pub slot: Slot,
    pub mask: u32,
}

#[derive(Debug, Deserialize)]
struct RawButtonAction {
    slot: Slot,
    button: String,
    #[serde(default)]
    classic: bool,
}

impl TryFrom<RawButtonAction> for ButtonAction {
    type Error = HalError;

    fn try_from(raw: RawButtonAction) -> Result<Self> {
        let mask = if raw.classic {
            raw.button.parse::<ClassicButton>()?.mask()
        } else {
            raw.button.parse::<WiimoteButton>()?.mask()
        };
        Ok(Self {
            slot: raw.slot,
            mask,
        })
    }
}

/// Changes applied before one scan
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MockFrame {
    pub connect: Vec<Slot>,
    pub disconnect: Vec<Slot>,
    pub flicker: Vec<Slot>,
    pub home: Vec<Slot>,
    pub press: Vec<ButtonAction>,
    pub release: Vec<ButtonAction>,
}

/// A scripted input session
///
/// ```toml
/// [[frame]]
/// connect = [0]
///
/// [[frame]]
/// press = [{ slot = 0, button = "a" }]
///
/// [[frame]]
/// home = [0]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MockInputScript {
    #[serde(default, rename = "frame")]
    pub frames: Vec<MockFrame>,
}

impl MockInputScript {
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| HalError::InvalidScript(e.to_string()))
    }
}

/// Mock clock advanced by hand (or by sleeping)
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    now: Arc<RwLock<Duration>>,
}

impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.write() {
            *now += by;
        }
    }
}

impl Clock for MockClock {
    fn now(&self) -> Duration {
        self.now.read().map(|n| *n).unwrap_or_default()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

/// Reset handler that records the reason and unwinds instead of exiting
///
/// Tests catch the unwind with `std::panic::catch_unwind`.
#[derive(Debug, Clone, Default)]
pub struct MockReset {
    reason: Arc<RwLock<Option<ShutdownReason>>>,
}

impl MockReset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reason passed to the last reset, if any
    pub fn reason(&self) -> Option<ShutdownReason> {
        self.reason.read().ok().and_then(|r| *r)
    }
}

impl SystemReset for MockReset {
    fn reset_system(&mut self, reason: ShutdownReason) -> ! {
        if let Ok(mut slot) = self.reason.write() {
            *slot = Some(reason);
        }
        panic!("[MOCK] system reset: {:?}", reason);
    }
}
