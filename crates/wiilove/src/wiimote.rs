//! `love.wiimote`
//!
//! Queries read the state captured by the last pump; nothing here samples
//! the hardware.

use crate::Result;
use wiilove_event::FramePump;
use wiilove_hal::{ClassicButton, Slot, WiimoteButton, Wiimotes};

pub struct WiimoteModule<'a> {
    pump: &'a mut FramePump,
}

impl<'a> WiimoteModule<'a> {
    pub(crate) fn new(pump: &'a mut FramePump) -> Self {
        Self { pump }
    }

    fn state(&self) -> &Wiimotes {
        self.pump.wiimotes()
    }

    /// Pointer rotation in degrees
    pub fn get_angle(&self, id: i64) -> Result<f32> {
        Ok(self.state().angle(Slot::new(id)?))
    }

    /// Attached extension: `"None"`, `"Nunchuk"`, `"Classic Controller"` or `"Unknown"`
    pub fn get_extension(&self, id: i64) -> Result<&'static str> {
        Ok(self.state().extension(Slot::new(id)?).name())
    }

    pub fn get_position(&self, id: i64) -> Result<(f32, f32)> {
        Ok(self.state().position(Slot::new(id)?))
    }

    pub fn get_x(&self, id: i64) -> Result<f32> {
        Ok(self.state().x(Slot::new(id)?))
    }

    pub fn get_y(&self, id: i64) -> Result<f32> {
        Ok(self.state().y(Slot::new(id)?))
    }

    pub fn is_connected(&self, id: i64) -> Result<bool> {
        Ok(self.state().is_connected(Slot::new(id)?))
    }

    /// Whether a Wii Remote or Nunchuk button is held
    pub fn is_down(&self, id: i64, button: &str) -> Result<bool> {
        let slot = Slot::new(id)?;
        let button: WiimoteButton = button.parse()?;
        Ok(self.state().is_down(slot, button))
    }

    /// Whether a Classic Controller button is held
    pub fn is_classic_down(&self, id: i64, button: &str) -> Result<bool> {
        let slot = Slot::new(id)?;
        let button: ClassicButton = button.parse()?;
        Ok(self.state().is_classic_down(slot, button))
    }

    pub fn is_rumbling(&self, id: i64) -> Result<bool> {
        Ok(self.state().is_rumbling(Slot::new(id)?))
    }

    /// Start or stop rumble; `Ok(false)` when the controller refused
    pub fn set_rumble(&mut self, id: i64, on: bool) -> Result<bool> {
        Ok(self.pump.set_rumble(Slot::new(id)?, on))
    }
}
