//! Hardware device abstraction layer for the door locker controller.
//!
//! This crate provides trait-based abstractions for the peripherals of both
//! nodes: the serial link that joins them, the keypad and character display
//! of the Interface node, the door motor, alarm buzzer and EEPROM of the
//! Access node, and the tick clock each node uses to time phases. Mock
//! implementations allow the controllers to be exercised without hardware.
//!
//! # Design Philosophy
//!
//! - **Async-first**: All I/O operations are asynchronous using native `async fn`
//!   in traits (Rust 1.90 + Edition 2024 RPITIT).
//! - **Thread-safe**: All traits require `Send + Sync` for use with Tokio.
//! - **Error-aware**: All operations return `Result<T>` with detailed error information.
//! - **No hidden recovery**: the link carries raw bytes. There is no framing or
//!   integrity check, so a corrupted byte reaches the controller unchanged.
//!
//! # Example
//!
//! ```
//! use doorlock_hardware::mock::{MockKeypad, MockLink};
//! use doorlock_hardware::traits::{KeypadDevice, KeypadInput, SerialLink};
//!
//! #[tokio::main]
//! async fn main() -> doorlock_hardware::Result<()> {
//!     let (mut keypad, keys) = MockKeypad::new();
//!     let (mut interface, mut access) = MockLink::pair();
//!
//!     keys.send_input(KeypadInput::OpenDoor).await?;
//!     let key = keypad.read_input().await?;
//!     interface.send_byte(key.code()).await?;
//!
//!     assert_eq!(access.recv_byte().await?, b'+');
//!     Ok(())
//! }
//! ```
//!
//! # Tick Clock
//!
//! [`tick::TickCounter`] implements [`TickClock`]. A [`tick::TickSource`]
//! advances it once per period on its own task, standing in for the timer
//! interrupt. Under `tokio::time::pause` the whole node runs on virtual time.

pub mod devices;
pub mod error;
pub mod mock;
#[cfg(feature = "hardware-serial")]
pub mod serial;
pub mod store;
pub mod tick;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{HardwareError, Result};
pub use traits::{
    AlarmDevice, DisplayDevice, DoorMotor, KeypadDevice, KeypadInput, PersistentStore, SerialLink,
    TickClock,
};
pub use types::{LinkSettings, MotorDirection};
