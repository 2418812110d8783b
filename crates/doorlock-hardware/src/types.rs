//! Common types shared across device implementations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction command for the door motor.
///
/// Clockwise opens the door, anti-clockwise closes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotorDirection {
    Clockwise,
    AntiClockwise,
    Stop,
}

impl fmt::Display for MotorDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction_str = match self {
            MotorDirection::Clockwise => "CW",
            MotorDirection::AntiClockwise => "A-CW",
            MotorDirection::Stop => "STOP",
        };
        write!(f, "{direction_str}")
    }
}

/// UART frame settings used by both nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSettings {
    /// Baud rate in bits per second.
    pub baud_rate: u32,

    /// Data bits per character.
    pub data_bits: u8,

    /// Even parity when `true`, no parity otherwise.
    pub even_parity: bool,

    /// Stop bits per character.
    pub stop_bits: u8,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            data_bits: 8,
            even_parity: true,
            stop_bits: 1,
        }
    }
}
