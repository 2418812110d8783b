//! Mock keypad implementation for testing and development.
//!
//! This module provides a simulated keypad device that can be controlled
//! programmatically for testing without requiring physical hardware.

use crate::{
    Result,
    traits::{KeypadDevice, KeypadInput},
};
use tokio::sync::mpsc;

/// Mock keypad device for testing and development.
///
/// This device simulates the 4x4 keypad by receiving input through an
/// internal channel. Tests and applications send key presses using a
/// `MockKeypadHandle`.
///
/// # Examples
///
/// ```
/// use doorlock_hardware::mock::MockKeypad;
/// use doorlock_hardware::traits::{KeypadDevice, KeypadInput};
///
/// #[tokio::main]
/// async fn main() -> doorlock_hardware::Result<()> {
///     let (mut keypad, handle) = MockKeypad::new();
///
///     handle.send_input(KeypadInput::OpenDoor).await?;
///     assert_eq!(keypad.read_input().await?, KeypadInput::OpenDoor);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockKeypad {
    /// Channel receiver for simulated input
    input_rx: mpsc::Receiver<KeypadInput>,
}

impl MockKeypad {
    /// Create a new mock keypad.
    ///
    /// Returns a tuple of (MockKeypad, MockKeypadHandle) where the handle
    /// can be used to simulate input to the keypad.
    pub fn new() -> (Self, MockKeypadHandle) {
        let (input_tx, input_rx) = mpsc::channel(64);
        (Self { input_rx }, MockKeypadHandle { input_tx })
    }
}

impl Default for MockKeypad {
    fn default() -> Self {
        Self::new().0
    }
}

impl KeypadDevice for MockKeypad {
    async fn read_input(&mut self) -> Result<KeypadInput> {
        self.input_rx
            .recv()
            .await
            .ok_or_else(|| crate::HardwareError::disconnected("Keypad input channel closed"))
    }
}

/// Handle for controlling a mock keypad.
///
/// This handle allows programmatic control of the mock keypad by sending
/// input events. It can be cloned and shared across tasks.
#[derive(Debug, Clone)]
pub struct MockKeypadHandle {
    /// Channel sender for simulated input
    input_tx: mpsc::Sender<KeypadInput>,
}

impl MockKeypadHandle {
    /// Send an input event to the mock keypad.
    ///
    /// # Errors
    ///
    /// Returns an error if the keypad has been dropped and the channel is closed.
    pub async fn send_input(&self, input: KeypadInput) -> Result<()> {
        self.input_tx
            .send(input)
            .await
            .map_err(|_| crate::HardwareError::disconnected("Keypad input channel closed"))
    }

    /// Send raw key codes, one press each.
    ///
    /// # Errors
    ///
    /// Returns an error if the keypad has been dropped and the channel is closed.
    pub async fn send_codes(&self, codes: &[u8]) -> Result<()> {
        for &code in codes {
            self.send_input(KeypadInput::from_code(code)).await?;
        }
        Ok(())
    }

    /// Type a credential followed by Enter.
    ///
    /// This is a convenience method for common test scenarios.
    ///
    /// # Examples
    ///
    /// ```
    /// use doorlock_hardware::mock::MockKeypad;
    ///
    /// #[tokio::main]
    /// async fn main() -> doorlock_hardware::Result<()> {
    ///     let (_keypad, handle) = MockKeypad::new();
    ///
    ///     handle.enter_credential(b"12345").await?;
    ///
    ///     Ok(())
    /// }
    /// ```
    pub async fn enter_credential(&self, symbols: &[u8]) -> Result<()> {
        self.send_codes(symbols).await?;
        self.send_input(KeypadInput::Enter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_keypad_basic_input() {
        let (mut keypad, handle) = MockKeypad::new();

        handle.send_input(KeypadInput::Digit(5)).await.unwrap();

        let input = keypad.read_input().await.unwrap();
        assert_eq!(input, KeypadInput::Digit(5));
    }

    #[tokio::test]
    async fn test_mock_keypad_enter_credential() {
        let (mut keypad, handle) = MockKeypad::new();

        tokio::spawn(async move {
            handle.enter_credential(b"AB123").await.unwrap();
        });

        for expected in [b'A', b'B', b'1', b'2', b'3'] {
            let input = keypad.read_input().await.unwrap();
            assert_eq!(input.code(), expected);
        }

        let input = keypad.read_input().await.unwrap();
        assert_eq!(input, KeypadInput::Enter);
    }

    #[tokio::test]
    async fn test_mock_keypad_raw_digit_codes() {
        let (mut keypad, handle) = MockKeypad::new();

        handle.send_codes(&[1, 2, 3]).await.unwrap();

        for expected in [1, 2, 3] {
            let input = keypad.read_input().await.unwrap();
            assert_eq!(input, KeypadInput::Digit(expected));
        }
    }

    #[tokio::test]
    async fn test_mock_keypad_closed_channel() {
        let (mut keypad, handle) = MockKeypad::new();

        // Drop the handle, closing the channel
        drop(handle);

        let result = keypad.read_input().await;
        assert!(result.is_err());
    }
}
