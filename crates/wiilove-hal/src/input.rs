//! Input sampling
//!
//! Describes what a controller backend reports once per frame. On the console
//! this is WPAD (`WPAD_ScanPads` followed by a probe per channel); on desktop
//! the runner provides a keyboard backend, and tests use [`crate::mock`].

use crate::{HalError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of Wii Remote channels
pub const SLOT_COUNT: usize = 4;

/// A controller channel (0-3), independent of which physical remote is bound to it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Slot(u8);

impl Slot {
    pub const FIRST: Slot = Slot(0);

    /// All slots in ascending order
    pub const ALL: [Slot; SLOT_COUNT] = [Slot(0), Slot(1), Slot(2), Slot(3)];

    /// Validate a slot id coming from script land
    pub fn new(id: i64) -> Result<Self> {
        if (0..SLOT_COUNT as i64).contains(&id) {
            Ok(Slot(id as u8))
        } else {
            Err(HalError::InvalidSlot(id))
        }
    }

    pub fn id(self) -> u8 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u8> for Slot {
    type Error = HalError;

    fn try_from(id: u8) -> Result<Self> {
        Slot::new(i64::from(id))
    }
}

impl From<Slot> for u8 {
    fn from(slot: Slot) -> u8 {
        slot.0
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wii Remote and Nunchuk buttons (WPAD bit values)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WiimoteButton {
    Two,
    One,
    B,
    A,
    Minus,
    Home,
    Left,
    Right,
    Down,
    Up,
    Plus,
    NunchukZ,
    NunchukC,
}

impl WiimoteButton {
    /// Get all buttons
    pub fn all() -> &'static [WiimoteButton] {
        &[
            WiimoteButton::Two, WiimoteButton::One, WiimoteButton::B, WiimoteButton::A,
            WiimoteButton::Minus, WiimoteButton::Home,
            WiimoteButton::Left, WiimoteButton::Right, WiimoteButton::Down, WiimoteButton::Up,
            WiimoteButton::Plus, WiimoteButton::NunchukZ, WiimoteButton::NunchukC,
        ]
    }

    /// Bit in the WPAD held/pressed mask
    pub fn mask(self) -> u32 {
        match self {
            WiimoteButton::Two => 0x0001,
            WiimoteButton::One => 0x0002,
            WiimoteButton::B => 0x0004,
            WiimoteButton::A => 0x0008,
            WiimoteButton::Minus => 0x0010,
            WiimoteButton::Home => 0x0080,
            WiimoteButton::Left => 0x0100,
            WiimoteButton::Right => 0x0200,
            WiimoteButton::Down => 0x0400,
            WiimoteButton::Up => 0x0800,
            WiimoteButton::Plus => 0x1000,
            WiimoteButton::NunchukZ => 0x0001 << 16,
            WiimoteButton::NunchukC => 0x0002 << 16,
        }
    }

    /// Get button name as used by scripts
    pub fn name(self) -> &'static str {
        match self {
            WiimoteButton::Two => "2",
            WiimoteButton::One => "1",
            WiimoteButton::B => "b",
            WiimoteButton::A => "a",
            WiimoteButton::Minus => "-",
            WiimoteButton::Home => "home",
            WiimoteButton::Left => "left",
            WiimoteButton::Right => "right",
            WiimoteButton::Down => "down",
            WiimoteButton::Up => "up",
            WiimoteButton::Plus => "+",
            WiimoteButton::NunchukZ => "z",
            WiimoteButton::NunchukC => "c",
        }
    }
}

impl FromStr for WiimoteButton {
    type Err = HalError;

    fn from_str(s: &str) -> Result<Self> {
        WiimoteButton::all()
            .iter()
            .copied()
            .find(|b| b.name() == s)
            .ok_or_else(|| HalError::UnknownButton(s.to_string()))
    }
}

/// Classic Controller buttons (WPAD bit values, upper half of the mask)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassicButton {
    Up,
    Left,
    ZR,
    X,
    A,
    Y,
    B,
    ZL,
    R,
    Plus,
    Home,
    Minus,
    L,
    Down,
    Right,
}

impl ClassicButton {
    /// Get all buttons
    pub fn all() -> &'static [ClassicButton] {
        &[
            ClassicButton::Up, ClassicButton::Left, ClassicButton::ZR, ClassicButton::X,
            ClassicButton::A, ClassicButton::Y, ClassicButton::B, ClassicButton::ZL,
            ClassicButton::R, ClassicButton::Plus, ClassicButton::Home, ClassicButton::Minus,
            ClassicButton::L, ClassicButton::Down, ClassicButton::Right,
        ]
    }

    /// Bit in the WPAD held/pressed mask
    pub fn mask(self) -> u32 {
        let bit: u32 = match self {
            ClassicButton::Up => 0x0001,
            ClassicButton::Left => 0x0002,
            ClassicButton::ZR => 0x0004,
            ClassicButton::X => 0x0008,
            ClassicButton::A => 0x0010,
            ClassicButton::Y => 0x0020,
            ClassicButton::B => 0x0040,
            ClassicButton::ZL => 0x0080,
            ClassicButton::R => 0x0200,
            ClassicButton::Plus => 0x0400,
            ClassicButton::Home => 0x0800,
            ClassicButton::Minus => 0x1000,
            ClassicButton::L => 0x2000,
            ClassicButton::Down => 0x4000,
            ClassicButton::Right => 0x8000,
        };
        bit << 16
    }

    /// Get button name as used by scripts
    pub fn name(self) -> &'static str {
        match self {
            ClassicButton::Up => "up",
            ClassicButton::Left => "left",
            ClassicButton::ZR => "zr",
            ClassicButton::X => "x",
            ClassicButton::A => "a",
            ClassicButton::Y => "y",
            ClassicButton::B => "b",
            ClassicButton::ZL => "zl",
            ClassicButton::R => "r",
            ClassicButton::Plus => "+",
            ClassicButton::Home => "home",
            ClassicButton::Minus => "-",
            ClassicButton::L => "l",
            ClassicButton::Down => "down",
            ClassicButton::Right => "right",
        }
    }
}

impl FromStr for ClassicButton {
    type Err = HalError;

    fn from_str(s: &str) -> Result<Self> {
        ClassicButton::all()
            .iter()
            .copied()
            .find(|b| b.name() == s)
            .ok_or_else(|| HalError::UnknownClassicButton(s.to_string()))
    }
}

/// Mask that counts as "HOME pressed" on any controller layout
pub const HOME_MASK: u32 = 0x0080 | (0x0800 << 16);

/// Expansion plugged into a Wii Remote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extension {
    #[default]
    None,
    Nunchuk,
    Classic,
    Unknown,
}

impl Extension {
    /// Map a raw WPAD expansion type
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => Extension::None,
            1 => Extension::Nunchuk,
            2 => Extension::Classic,
            _ => Extension::Unknown,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Extension::None => "None",
            Extension::Nunchuk => "Nunchuk",
            Extension::Classic => "Classic Controller",
            Extension::Unknown => "Unknown",
        }
    }
}

/// IR pointer state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pointer {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
}

/// One slot's state as reported by a single scan
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SlotSample {
    pub connected: bool,
    /// The link dropped and came back since the previous scan
    pub reconnected: bool,
    pub buttons_held: u32,
    /// Buttons that went down since the previous scan
    pub buttons_pressed: u32,
    pub pointer: Pointer,
    pub extension: Extension,
}

impl SlotSample {
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn home_pressed(&self) -> bool {
        self.buttons_pressed & HOME_MASK != 0
    }
}

/// A controller backend polled once per frame
pub trait InputSampler {
    /// Short backend name for logs
    fn name(&self) -> &str;

    /// Refresh the backend's view of every channel
    fn scan_pads(&mut self);

    /// Read one slot after [`InputSampler::scan_pads`]
    fn probe(&mut self, slot: Slot) -> Result<SlotSample>;

    /// Start or stop the rumble motor of a slot
    fn set_rumble(&mut self, _slot: Slot, _on: bool) -> Result<()> {
        Err(HalError::Unsupported("rumble"))
    }

    /// Release backend resources before the process goes away
    fn shutdown(&mut self) {}
}
