//! Interface and Access node controllers of the door locker.
//!
//! Each node is one cooperative loop built from the handshake primitives of
//! `doorlock-protocol` and the device traits of `doorlock-hardware`:
//!
//! - [`InterfaceController`] reads the keypad, drives the display and starts
//!   every exchange.
//! - [`AccessController`] holds the credential, counts failed attempts,
//!   drives the door motor and sounds the alarm.
//!
//! Both run the same [`NodeConfig`]. Mismatched timing or trial limits
//! between the nodes desynchronise them without any error being raised.
//!
//! # Example
//!
//! ```
//! use doorlock_controller::{
//!     AccessController, AccessPeripherals, InterfaceController, InterfacePeripherals, NodeConfig,
//! };
//! use doorlock_hardware::mock::{
//!     MemoryStore, MockBuzzer, MockDisplay, MockKeypad, MockLink, MockMotor,
//! };
//! use doorlock_hardware::tick::TickCounter;
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() -> doorlock_controller::Result<()> {
//! let (interface_end, access_end) = MockLink::pair();
//! let (keypad, keys) = MockKeypad::new();
//! let (display, screen) = MockDisplay::new();
//! let (store, eeprom) = MemoryStore::new();
//! let (motor, _) = MockMotor::new();
//! let (buzzer, _) = MockBuzzer::new();
//!
//! let mut interface = InterfaceController::new(
//!     InterfacePeripherals { link: interface_end, keypad, display, clock: TickCounter::new() },
//!     NodeConfig::default(),
//! );
//! let mut access = AccessController::new(
//!     AccessPeripherals { link: access_end, store, motor, buzzer, clock: TickCounter::new() },
//!     NodeConfig::default(),
//! );
//!
//! keys.enter_credential(b"12345").await?;
//! keys.enter_credential(b"12345").await?;
//!
//! let (interface_boot, access_boot) = tokio::join!(interface.boot(), access.boot());
//! interface_boot?;
//! access_boot?;
//!
//! assert_eq!(eeprom.peek(0x0311, 5), b"12345".to_vec());
//! assert_eq!(screen.current(), vec!["+ : Open Door", "- : Change Pass"]);
//! # Ok(())
//! # }
//! ```

pub mod access;
pub mod actuation;
pub mod config;
pub mod door;
pub mod error;
pub mod interface;
pub mod screen;
pub mod session;
pub mod store;

pub use access::{AccessController, AccessPeripherals};
pub use actuation::{ActuationPlan, PhaseSink, PhaseStep};
pub use config::{NodeConfig, TimingConfig};
pub use door::{DoorCycle, PhaseTransition};
pub use error::{ControllerError, Result};
pub use interface::{InterfaceController, InterfacePeripherals};
pub use screen::Screen;
pub use session::{AuthOutcome, AuthSession};
pub use store::CredentialStore;
