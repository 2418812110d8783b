//! Mock device implementations for testing and development.
//!
//! This module provides simulated device implementations that can be controlled
//! programmatically without requiring physical hardware.

pub mod actuators;
pub mod display;
pub mod keypad;
pub mod link;
pub mod store;

// Re-export commonly used types
pub use actuators::{MockBuzzer, MockBuzzerHandle, MockMotor, MockMotorHandle, Recorded};
pub use display::{MockDisplay, MockDisplayHandle};
pub use keypad::{MockKeypad, MockKeypadHandle};
pub use link::MockLink;
pub use store::{MemoryStore, MemoryStoreHandle};
