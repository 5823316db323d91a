//! Keyboard input backend
//!
//! Stands in for WPAD on a desktop terminal. Terminals only report key
//! presses, so every button is held for exactly the frame its key arrived in.
//!
//! | Key            | Effect                                   |
//! |----------------|------------------------------------------|
//! | F1-F4          | sync / unsync the remote in slot 1-4     |
//! | Tab            | select the next slot for button input    |
//! | x              | drop and restore the selected link       |
//! | arrows         | D-pad                                    |
//! | a b 1 2 + - z c| buttons of the same name                 |
//! | h, Esc         | HOME                                     |
//! | i j k l        | move the IR pointer                      |
//! | r, Ctrl-C      | RESET (back to the menu)                 |
//! | p              | POWER                                    |

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::sync::Arc;
use std::time::Duration;
use wiilove_config::InputConfig;
use wiilove_hal::{
    Extension, HalError, InputSampler, Pointer, Result, SLOT_COUNT, ShutdownReason, Slot,
    SlotSample, TerminationFlag, WiimoteButton,
};

const POINTER_STEP: f32 = 8.0;

#[derive(Debug, Clone, Copy, Default)]
struct KeySlot {
    connected: bool,
    reconnected: bool,
    pressed: u32,
    pointer: Pointer,
}

pub struct KeyboardSampler {
    slots: [KeySlot; SLOT_COUNT],
    selected: Slot,
    bounds: (f32, f32),
    termination: Arc<TerminationFlag>,
}

impl KeyboardSampler {
    pub fn new(config: &InputConfig, termination: Arc<TerminationFlag>) -> Self {
        let bounds = (config.pointer_width as f32, config.pointer_height as f32);
        let centre = Pointer {
            x: bounds.0 / 2.0,
            y: bounds.1 / 2.0,
            angle: 0.0,
        };

        let mut slots = [KeySlot {
            pointer: centre,
            ..Default::default()
        }; SLOT_COUNT];
        for id in &config.connected_at_start {
            if let Ok(slot) = Slot::try_from(*id) {
                slots[slot.index()].connected = true;
            }
        }

        Self {
            slots,
            selected: Slot::FIRST,
            bounds,
            termination,
        }
    }

    /// Slot receiving button keys
    pub fn selected(&self) -> Slot {
        self.selected
    }

    fn toggle(&mut self, index: usize) {
        let slot = &mut self.slots[index];
        slot.connected = !slot.connected;
        tracing::debug!(
            "Keyboard: slot {} {}",
            index,
            if slot.connected { "synced" } else { "unsynced" }
        );
    }

    fn press(&mut self, button: WiimoteButton) {
        self.slots[self.selected.index()].pressed |= button.mask();
    }

    fn nudge(&mut self, dx: f32, dy: f32) {
        let (width, height) = self.bounds;
        let pointer = &mut self.slots[self.selected.index()].pointer;
        pointer.x = (pointer.x + dx).clamp(0.0, width);
        pointer.y = (pointer.y + dy).clamp(0.0, height);
    }

    /// Apply one key press
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.termination.request(ShutdownReason::ReturnToMenu);
            return;
        }

        match key.code {
            KeyCode::F(n @ 1..=4) => self.toggle(usize::from(n - 1)),
            KeyCode::Tab => {
                let next = (self.selected.index() + 1) % SLOT_COUNT;
                self.selected = Slot::ALL[next];
            }
            KeyCode::Char('x') => {
                let slot = &mut self.slots[self.selected.index()];
                if slot.connected {
                    slot.reconnected = true;
                }
            }
            KeyCode::Up => self.press(WiimoteButton::Up),
            KeyCode::Down => self.press(WiimoteButton::Down),
            KeyCode::Left => self.press(WiimoteButton::Left),
            KeyCode::Right => self.press(WiimoteButton::Right),
            KeyCode::Char('a') => self.press(WiimoteButton::A),
            KeyCode::Char('b') => self.press(WiimoteButton::B),
            KeyCode::Char('1') => self.press(WiimoteButton::One),
            KeyCode::Char('2') => self.press(WiimoteButton::Two),
            KeyCode::Char('+') | KeyCode::Char('=') => self.press(WiimoteButton::Plus),
            KeyCode::Char('-') => self.press(WiimoteButton::Minus),
            KeyCode::Char('z') => self.press(WiimoteButton::NunchukZ),
            KeyCode::Char('c') => self.press(WiimoteButton::NunchukC),
            KeyCode::Char('h') | KeyCode::Esc => self.press(WiimoteButton::Home),
            KeyCode::Char('i') => self.nudge(0.0, -POINTER_STEP),
            KeyCode::Char('k') => self.nudge(0.0, POINTER_STEP),
            KeyCode::Char('j') => self.nudge(-POINTER_STEP, 0.0),
            KeyCode::Char('l') => self.nudge(POINTER_STEP, 0.0),
            KeyCode::Char('r') => self.termination.request(ShutdownReason::ReturnToMenu),
            KeyCode::Char('p') => self.termination.request(ShutdownReason::PowerOff),
            _ => {}
        }
    }

    /// Clear the edges reported by the previous scan
    fn begin_frame(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.pressed = 0;
            slot.reconnected = false;
        }
    }
}

impl InputSampler for KeyboardSampler {
    fn name(&self) -> &str {
        "keyboard"
    }

    fn scan_pads(&mut self) {
        self.begin_frame();

        loop {
            match event::poll(Duration::ZERO) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    tracing::warn!("Keyboard poll failed: {}", e);
                    break;
                }
            }
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => self.handle_key(key),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("Keyboard read failed: {}", e);
                    break;
                }
            }
        }
    }

    fn probe(&mut self, slot: Slot) -> Result<SlotSample> {
        let s = &self.slots[slot.index()];
        if !s.connected {
            return Ok(SlotSample::disconnected());
        }

        Ok(SlotSample {
            connected: true,
            reconnected: s.reconnected,
            buttons_held: s.pressed,
            buttons_pressed: s.pressed,
            pointer: s.pointer,
            extension: Extension::None,
        })
    }

    fn set_rumble(&mut self, slot: Slot, on: bool) -> Result<()> {
        if !self.slots[slot.index()].connected {
            return Err(HalError::NotResponding(slot.id()));
        }
        tracing::debug!(
            "Keyboard: rumble on slot {} {}",
            slot,
            if on { "on" } else { "off" }
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiilove_hal::Wiimotes;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn keyboard() -> (KeyboardSampler, Arc<TerminationFlag>) {
        let flag = Arc::new(TerminationFlag::new());
        (
            KeyboardSampler::new(&InputConfig::default(), Arc::clone(&flag)),
            flag,
        )
    }

    #[test]
    fn test_connected_at_start() {
        let (mut sampler, _) = keyboard();
        assert!(sampler.probe(Slot::FIRST).unwrap().connected);
        assert!(!sampler.probe(Slot::ALL[1]).unwrap().connected);

        let sample = sampler.probe(Slot::FIRST).unwrap();
        assert_eq!((sample.pointer.x, sample.pointer.y), (320.0, 240.0));
    }

    #[test]
    fn test_function_keys_toggle_slots() {
        let (mut sampler, _) = keyboard();
        sampler.handle_key(key(KeyCode::F(3)));
        sampler.handle_key(key(KeyCode::F(1)));

        let mut wiimotes = Wiimotes::new();
        let transitions = wiimotes.update(&mut NoScan(&mut sampler));
        assert!(transitions.connected(Slot::ALL[2]));
        assert!(!transitions.connected(Slot::FIRST));
    }

    #[test]
    fn test_button_lasts_one_frame() {
        let (mut sampler, _) = keyboard();
        sampler.handle_key(key(KeyCode::Char('h')));

        let sample = sampler.probe(Slot::FIRST).unwrap();
        assert!(sample.home_pressed());
        assert_eq!(sample.buttons_held, WiimoteButton::Home.mask());

        sampler.begin_frame();
        let sample = sampler.probe(Slot::FIRST).unwrap();
        assert!(!sample.home_pressed());
        assert_eq!(sample.buttons_held, 0);
    }

    #[test]
    fn test_tab_selects_slot_for_buttons() {
        let (mut sampler, _) = keyboard();
        sampler.handle_key(key(KeyCode::F(2)));
        sampler.handle_key(key(KeyCode::Tab));
        assert_eq!(sampler.selected(), Slot::ALL[1]);

        sampler.handle_key(key(KeyCode::Char('a')));
        assert_eq!(
            sampler.probe(Slot::ALL[1]).unwrap().buttons_pressed,
            WiimoteButton::A.mask()
        );
        assert_eq!(sampler.probe(Slot::FIRST).unwrap().buttons_pressed, 0);

        for _ in 0..3 {
            sampler.handle_key(key(KeyCode::Tab));
        }
        assert_eq!(sampler.selected(), Slot::FIRST);
    }

    #[test]
    fn test_pointer_clamped_to_resolution() {
        let (mut sampler, _) = keyboard();
        for _ in 0..100 {
            sampler.handle_key(key(KeyCode::Char('l')));
            sampler.handle_key(key(KeyCode::Char('i')));
        }
        let pointer = sampler.probe(Slot::FIRST).unwrap().pointer;
        assert_eq!((pointer.x, pointer.y), (640.0, 0.0));
    }

    #[test]
    fn test_flicker_key() {
        let (mut sampler, _) = keyboard();
        sampler.handle_key(key(KeyCode::Char('x')));
        assert!(sampler.probe(Slot::FIRST).unwrap().reconnected);
    }

    #[test]
    fn test_console_buttons_request_termination() {
        let (mut sampler, flag) = keyboard();
        sampler.handle_key(key(KeyCode::Char('p')));
        sampler.handle_key(key(KeyCode::Char('r')));
        assert_eq!(flag.observe(), Some(ShutdownReason::PowerOff));

        let (mut sampler, flag) = keyboard();
        sampler.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(flag.observe(), Some(ShutdownReason::ReturnToMenu));
    }

    #[test]
    fn test_rumble_needs_connection() {
        let (mut sampler, _) = keyboard();
        assert!(sampler.set_rumble(Slot::FIRST, true).is_ok());
        assert!(sampler.set_rumble(Slot::ALL[3], true).is_err());
    }

    /// Forwards probes without touching the terminal
    struct NoScan<'a>(&'a mut KeyboardSampler);

    impl InputSampler for NoScan<'_> {
        fn name(&self) -> &str {
            "keyboard-noscan"
        }

        fn scan_pads(&mut self) {}

        fn probe(&mut self, slot: Slot) -> Result<SlotSample> {
            self.0.probe(slot)
        }
    }
}
