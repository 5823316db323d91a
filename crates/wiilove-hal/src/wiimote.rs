//! Wii Remote state tracking
//!
//! Keeps the last known state of every slot and derives connection
//! transitions from one scan to the next.

use crate::input::{ClassicButton, Extension, InputSampler, Pointer, SLOT_COUNT, Slot, WiimoteButton};
use crate::Result;

/// Last known state of one slot
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WiimoteState {
    pub connected: bool,
    pub buttons_held: u32,
    pub pointer: Pointer,
    pub extension: Extension,
    pub rumbling: bool,
}

/// What changed during one scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotTransitions {
    connected: [bool; SLOT_COUNT],
    disconnected: [bool; SLOT_COUNT],
    home_pressed: Option<Slot>,
}

impl SlotTransitions {
    pub fn connected(&self, slot: Slot) -> bool {
        self.connected[slot.index()]
    }

    pub fn disconnected(&self, slot: Slot) -> bool {
        self.disconnected[slot.index()]
    }

    /// Lowest slot that pressed HOME during this scan
    pub fn home_pressed(&self) -> Option<Slot> {
        self.home_pressed
    }

    pub fn is_empty(&self) -> bool {
        self.home_pressed.is_none()
            && !self.connected.iter().any(|c| *c)
            && !self.disconnected.iter().any(|d| *d)
    }
}

/// State of all four slots
#[derive(Debug, Clone, Default)]
pub struct Wiimotes {
    slots: [WiimoteState; SLOT_COUNT],
}

impl Wiimotes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan the sampler once and fold the result into the slot states
    pub fn update(&mut self, sampler: &mut dyn InputSampler) -> SlotTransitions {
        let mut transitions = SlotTransitions::default();

        sampler.scan_pads();

        for slot in Slot::ALL {
            let sample = match sampler.probe(slot) {
                Ok(sample) => sample,
                Err(e) => {
                    tracing::debug!(
                        "Probe of slot {} failed, treating as disconnected: {}",
                        slot,
                        e
                    );
                    Default::default()
                }
            };

            let state = &mut self.slots[slot.index()];
            let was_connected = state.connected;

            if was_connected && (!sample.connected || sample.reconnected) {
                transitions.disconnected[slot.index()] = true;
            }
            if sample.connected && (!was_connected || sample.reconnected) {
                transitions.connected[slot.index()] = true;
            }

            if !sample.connected {
                *state = WiimoteState::default();
                continue;
            }

            state.connected = true;

            state.buttons_held = sample.buttons_held;
            state.pointer = sample.pointer;
            state.extension = sample.extension;

            if sample.home_pressed() && transitions.home_pressed.is_none() {
                transitions.home_pressed = Some(slot);
            }
        }

        transitions
    }

    pub fn get(&self, slot: Slot) -> &WiimoteState {
        &self.slots[slot.index()]
    }

    pub fn angle(&self, slot: Slot) -> f32 {
        self.get(slot).pointer.angle
    }

    pub fn extension(&self, slot: Slot) -> Extension {
        self.get(slot).extension
    }

    pub fn position(&self, slot: Slot) -> (f32, f32) {
        let pointer = self.get(slot).pointer;
        (pointer.x, pointer.y)
    }

    pub fn x(&self, slot: Slot) -> f32 {
        self.get(slot).pointer.x
    }

    pub fn y(&self, slot: Slot) -> f32 {
        self.get(slot).pointer.y
    }

    pub fn is_connected(&self, slot: Slot) -> bool {
        self.get(slot).connected
    }

    pub fn is_down(&self, slot: Slot, button: WiimoteButton) -> bool {
        self.get(slot).buttons_held & button.mask() != 0
    }

    pub fn is_classic_down(&self, slot: Slot, button: ClassicButton) -> bool {
        self.get(slot).buttons_held & button.mask() != 0
    }

    pub fn is_rumbling(&self, slot: Slot) -> bool {
        self.get(slot).rumbling
    }

    /// Ask the backend to rumble; the flag only changes when it agrees
    pub fn set_rumble(
        &mut self,
        sampler: &mut dyn InputSampler,
        slot: Slot,
        on: bool,
    ) -> Result<()> {
        sampler.set_rumble(slot, on)?;
        self.slots[slot.index()].rumbling = on;
        Ok(())
    }

    /// Slots currently connected, ascending
    pub fn connected_slots(&self) -> Vec<Slot> {
        Slot::ALL
            .into_iter()
            .filter(|s| self.is_connected(*s))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockSampler;

    fn slot(id: i64) -> Slot {
        Slot::new(id).unwrap()
    }

    #[test]
    fn test_no_change_yields_empty_transitions() {
        let mut sampler = MockSampler::new();
        let mut wiimotes = Wiimotes::new();

        assert!(wiimotes.update(&mut sampler).is_empty());
        assert!(wiimotes.update(&mut sampler).is_empty());
    }

    #[test]
    fn test_connect_then_disconnect() {
        let mut sampler = MockSampler::new();
        let mut wiimotes = Wiimotes::new();

        sampler.connect(slot(2));
        let t = wiimotes.update(&mut sampler);
        assert!(t.connected(slot(2)));
        assert!(!t.disconnected(slot(2)));
        assert!(wiimotes.is_connected(slot(2)));

        // Still connected: no new transition
        assert!(wiimotes.update(&mut sampler).is_empty());

        sampler.disconnect(slot(2));
        let t = wiimotes.update(&mut sampler);
        assert!(t.disconnected(slot(2)));
        assert!(!wiimotes.is_connected(slot(2)));
    }

    #[test]
    fn test_flicker_reports_both_transitions() {
        let mut sampler = MockSampler::new();
        let mut wiimotes = Wiimotes::new();

        sampler.connect(slot(1));
        wiimotes.update(&mut sampler);

        sampler.flicker(slot(1));
        let t = wiimotes.update(&mut sampler);
        assert!(t.disconnected(slot(1)));
        assert!(t.connected(slot(1)));
        assert!(wiimotes.is_connected(slot(1)));
    }

    #[test]
    fn test_probe_failure_counts_as_disconnect() {
        let mut sampler = MockSampler::new();
        let mut wiimotes = Wiimotes::new();

        sampler.connect(slot(0));
        wiimotes.update(&mut sampler);

        sampler.fail_next_probe(slot(0));
        let t = wiimotes.update(&mut sampler);
        assert!(t.disconnected(slot(0)));

        // Next scan succeeds again
        let t = wiimotes.update(&mut sampler);
        assert!(t.connected(slot(0)));
    }

    #[test]
    fn test_home_reports_lowest_slot() {
        let mut sampler = MockSampler::new();
        let mut wiimotes = Wiimotes::new();

        sampler.connect(slot(1));
        sampler.connect(slot(3));
        wiimotes.update(&mut sampler);

        sampler.press(slot(3), WiimoteButton::Home.mask());
        sampler.press(slot(1), ClassicButton::Home.mask());
        let t = wiimotes.update(&mut sampler);
        assert_eq!(t.home_pressed(), Some(slot(1)));

        // Holding HOME is not a new press
        let t = wiimotes.update(&mut sampler);
        assert_eq!(t.home_pressed(), None);
    }

    #[test]
    fn test_held_buttons_and_pointer() {
        let mut sampler = MockSampler::new();
        let mut wiimotes = Wiimotes::new();

        sampler.connect(slot(0));
        sampler.press(slot(0), WiimoteButton::A.mask() | WiimoteButton::NunchukZ.mask());
        sampler.set_pointer(slot(0), Pointer { x: 320.0, y: 240.0, angle: 12.5 });
        sampler.set_extension(slot(0), Extension::Nunchuk);
        wiimotes.update(&mut sampler);

        assert!(wiimotes.is_down(slot(0), WiimoteButton::A));
        assert!(wiimotes.is_down(slot(0), WiimoteButton::NunchukZ));
        assert!(!wiimotes.is_down(slot(0), WiimoteButton::B));
        assert_eq!(wiimotes.position(slot(0)), (320.0, 240.0));
        assert_eq!(wiimotes.angle(slot(0)), 12.5);
        assert_eq!(wiimotes.extension(slot(0)), Extension::Nunchuk);

        sampler.release(slot(0), WiimoteButton::A.mask());
        wiimotes.update(&mut sampler);
        assert!(!wiimotes.is_down(slot(0), WiimoteButton::A));
        assert!(wiimotes.is_down(slot(0), WiimoteButton::NunchukZ));
    }

    #[test]
    fn test_disconnect_forgets_controller() {
        let mut sampler = MockSampler::new();
        let mut wiimotes = Wiimotes::new();

        sampler.connect(slot(1));
        sampler.set_pointer(slot(1), Pointer { x: 100.0, y: 50.0, angle: 3.0 });
        sampler.set_extension(slot(1), Extension::Classic);
        wiimotes.update(&mut sampler);
        assert_eq!(wiimotes.extension(slot(1)), Extension::Classic);

        sampler.disconnect(slot(1));
        wiimotes.update(&mut sampler);
        assert_eq!(wiimotes.get(slot(1)), &WiimoteState::default());
        assert_eq!(wiimotes.extension(slot(1)), Extension::None);
        assert_eq!(wiimotes.position(slot(1)), (0.0, 0.0));

        // Same after a failed probe
        sampler.connect(slot(1));
        wiimotes.update(&mut sampler);
        sampler.fail_next_probe(slot(1));
        wiimotes.update(&mut sampler);
        assert_eq!(wiimotes.extension(slot(1)), Extension::None);
        assert_eq!(wiimotes.angle(slot(1)), 0.0);
    }

    #[test]
    fn test_rumble() {
        let mut sampler = MockSampler::new();
        let mut wiimotes = Wiimotes::new();

        // Rumble on an empty slot is refused
        assert!(wiimotes.set_rumble(&mut sampler, slot(0), true).is_err());
        assert!(!wiimotes.is_rumbling(slot(0)));

        sampler.connect(slot(0));
        wiimotes.update(&mut sampler);
        wiimotes.set_rumble(&mut sampler, slot(0), true).unwrap();
        assert!(wiimotes.is_rumbling(slot(0)));

        sampler.disconnect(slot(0));
        wiimotes.update(&mut sampler);
        assert!(!wiimotes.is_rumbling(slot(0)));
    }

    #[test]
    fn test_connected_slots() {
        let mut sampler = MockSampler::new();
        let mut wiimotes = Wiimotes::new();

        sampler.connect(slot(3));
        sampler.connect(slot(0));
        wiimotes.update(&mut sampler);
        assert_eq!(wiimotes.connected_slots(), vec![slot(0), slot(3)]);
    }
}
