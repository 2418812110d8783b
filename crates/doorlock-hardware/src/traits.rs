//! Hardware device trait definitions.
//!
//! This module defines the seams between the controller logic and the
//! peripherals of both nodes: the serial link joining them, the keypad and
//! text display of the Interface node, and the door motor, buzzer and
//! persistent store of the Access node. The tick clock used to time door
//! phases and the alarm is also expressed as a trait so tests can drive it on
//! virtual time.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use doorlock_core::constants::{CHANGE_PASS_CMD, ENTER_KEY, OPEN_DOOR_CMD};

use crate::error::Result;
use crate::types::MotorDirection;

/// Input from a keypad device.
///
/// Each variant maps to the raw code the keypad driver produces. Credential
/// symbols are these raw codes, so any key (not only digits) may appear in a
/// credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeypadInput {
    /// Numeric digit (0-9). The raw code equals the digit value.
    Digit(u8),

    /// Confirm key (`=`).
    Enter,

    /// Open-door menu key (`+`).
    OpenDoor,

    /// Change-password menu key (`-`).
    ChangePassword,

    /// Any other key, carried as its raw code.
    Other(u8),
}

impl KeypadInput {
    /// Decode a raw keypad code.
    ///
    /// ```
    /// use doorlock_hardware::traits::KeypadInput;
    ///
    /// assert_eq!(KeypadInput::from_code(7), KeypadInput::Digit(7));
    /// assert_eq!(KeypadInput::from_code(b'+'), KeypadInput::OpenDoor);
    /// assert_eq!(KeypadInput::from_code(b'A'), KeypadInput::Other(b'A'));
    /// ```
    pub fn from_code(code: u8) -> Self {
        match code {
            0..=9 => Self::Digit(code),
            ENTER_KEY => Self::Enter,
            OPEN_DOOR_CMD => Self::OpenDoor,
            CHANGE_PASS_CMD => Self::ChangePassword,
            other => Self::Other(other),
        }
    }

    /// Raw code of this key.
    pub fn code(&self) -> u8 {
        match self {
            Self::Digit(d) => *d,
            Self::Enter => ENTER_KEY,
            Self::OpenDoor => OPEN_DOOR_CMD,
            Self::ChangePassword => CHANGE_PASS_CMD,
            Self::Other(code) => *code,
        }
    }
}

/// Point-to-point byte channel between the two nodes.
///
/// The link is assumed reliable and ordered. There is no framing, checksum
/// or retransmission above it: a corrupted byte is delivered as-is.
///
/// # Errors
///
/// Both methods fail only when the underlying device is gone or reports an
/// I/O error. A silent peer is not an error here; `recv_byte` simply does not
/// complete.
pub trait SerialLink: Send + Sync {
    /// Write one byte.
    async fn send_byte(&mut self, byte: u8) -> Result<()>;

    /// Block until one byte is available and return it.
    async fn recv_byte(&mut self) -> Result<u8>;
}

/// Keypad device abstraction.
///
/// # Examples
///
/// ```no_run
/// use doorlock_hardware::traits::{KeypadDevice, KeypadInput};
/// use doorlock_hardware::error::Result;
///
/// async fn read_symbols<K: KeypadDevice>(keypad: &mut K) -> Result<Vec<u8>> {
///     let mut symbols = Vec::new();
///
///     loop {
///         match keypad.read_input().await? {
///             KeypadInput::Enter => break,
///             other => symbols.push(other.code()),
///         }
///     }
///
///     Ok(symbols)
/// }
/// ```
pub trait KeypadDevice: Send + Sync {
    /// Read the next key press.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is disconnected.
    async fn read_input(&mut self) -> Result<KeypadInput>;
}

/// Character display of the Interface node.
pub trait DisplayDevice: Send + Sync {
    /// Number of characters per line.
    fn columns(&self) -> usize;

    /// Clear the screen and show `lines`, one per row. The cursor is left at
    /// the end of the last line.
    async fn show(&mut self, lines: &[&str]) -> Result<()>;

    /// Print one character at the cursor.
    async fn put_char(&mut self, c: char) -> Result<()>;
}

/// Door actuator of the Access node.
pub trait DoorMotor: Send + Sync {
    /// Start rotating in `direction`, or stop.
    async fn drive(&mut self, direction: MotorDirection) -> Result<()>;
}

/// Alarm buzzer of the Access node.
pub trait AlarmDevice: Send + Sync {
    /// Switch the buzzer on or off.
    async fn set_active(&mut self, active: bool) -> Result<()>;
}

/// Byte-addressable persistent store (external EEPROM).
///
/// # Errors
///
/// Implementations report addressing and device failures as
/// [`HardwareError::Store`](crate::HardwareError::Store).
pub trait PersistentStore: Send + Sync {
    /// Number of addressable bytes.
    fn capacity(&self) -> usize;

    /// Read the byte at `addr`.
    async fn read_byte(&mut self, addr: u16) -> Result<u8>;

    /// Write `value` at `addr`.
    async fn write_byte(&mut self, addr: u16, value: u8) -> Result<()>;
}

/// Per-node elapsed-time counter advanced by a periodic interrupt.
///
/// The foreground logic only resets and reads the counter; a single producer
/// (see [`TickSource`](crate::tick::TickSource)) advances it. Counters of the
/// two nodes are independent and never resynchronised.
pub trait TickClock: Send + Sync {
    /// Set the counter back to zero.
    fn reset(&self);

    /// Ticks since the last reset.
    fn elapsed(&self) -> u32;

    /// Wait until `elapsed() >= ticks`.
    async fn wait_until(&self, ticks: u32);

    /// Reset, then wait for `ticks` ticks.
    async fn wait_ticks(&self, ticks: u32) {
        self.reset();
        self.wait_until(ticks).await;
    }
}
