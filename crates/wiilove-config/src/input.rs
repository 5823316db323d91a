//! Input settings

use serde::{Deserialize, Serialize};

/// Input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// IR pointer resolution (`WPAD_SetVRes`)
    #[serde(default = "default_width")]
    pub pointer_width: u32,

    #[serde(default = "default_height")]
    pub pointer_height: u32,

    /// Slots the desktop backends report as connected on the first frame
    #[serde(default = "default_connected")]
    pub connected_at_start: Vec<u8>,
}

fn default_width() -> u32 {
    640
}

fn default_height() -> u32 {
    480
}

fn default_connected() -> Vec<u8> {
    vec![0]
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            pointer_width: default_width(),
            pointer_height: default_height(),
            connected_at_start: default_connected(),
        }
    }
}
