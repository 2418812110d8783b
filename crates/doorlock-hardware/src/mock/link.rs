//! In-memory serial link for testing and single-process simulation.

use tokio::sync::mpsc;
use tracing::trace;

use crate::{HardwareError, Result, traits::SerialLink};

/// Capacity of each direction of the link, in bytes.
const LINK_BUFFER: usize = 256;

/// One end of an in-memory point-to-point link.
///
/// Bytes written on one end arrive, in order, on the other end. Dropping an
/// end makes reads on the other end fail with
/// [`HardwareError::Disconnected`] once the buffered bytes are drained.
///
/// # Examples
///
/// ```
/// use doorlock_hardware::mock::MockLink;
/// use doorlock_hardware::traits::SerialLink;
///
/// #[tokio::main]
/// async fn main() -> doorlock_hardware::Result<()> {
///     let (mut interface, mut access) = MockLink::pair();
///
///     interface.send_byte(0x10).await?;
///     assert_eq!(access.recv_byte().await?, 0x10);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockLink {
    /// Outgoing bytes
    tx: mpsc::Sender<u8>,

    /// Incoming bytes
    rx: mpsc::Receiver<u8>,

    /// End name used in logs and errors
    name: String,
}

impl MockLink {
    /// Create two connected ends named `interface` and `access`.
    pub fn pair() -> (Self, Self) {
        Self::named_pair("interface", "access")
    }

    /// Create two connected ends with custom names.
    pub fn named_pair(first: &str, second: &str) -> (Self, Self) {
        let (first_tx, second_rx) = mpsc::channel(LINK_BUFFER);
        let (second_tx, first_rx) = mpsc::channel(LINK_BUFFER);

        let first = Self {
            tx: first_tx,
            rx: first_rx,
            name: first.to_string(),
        };
        let second = Self {
            tx: second_tx,
            rx: second_rx,
            name: second.to_string(),
        };

        (first, second)
    }

    /// Name of this end.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Take a byte if one is already buffered, without waiting.
    pub fn try_recv_byte(&mut self) -> Option<u8> {
        self.rx.try_recv().ok()
    }
}

impl SerialLink for MockLink {
    async fn send_byte(&mut self, byte: u8) -> Result<()> {
        trace!(end = %self.name, "link tx {byte:#04x}");
        self.tx
            .send(byte)
            .await
            .map_err(|_| HardwareError::disconnected(format!("{} link peer", self.name)))
    }

    async fn recv_byte(&mut self) -> Result<u8> {
        let byte = self
            .rx
            .recv()
            .await
            .ok_or_else(|| HardwareError::disconnected(format!("{} link peer", self.name)))?;
        trace!(end = %self.name, "link rx {byte:#04x}");
        Ok(byte)
    }
}
