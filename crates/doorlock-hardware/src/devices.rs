//! Enum wrappers for device dispatch.
//!
//! Native `async fn` in traits is not object-safe, so `Box<dyn SerialLink>`
//! is not available. Binaries that pick a device at runtime (in-memory
//! simulation or a real port) wrap the concrete types in these enums and
//! dispatch at compile time.
//!
//! # Examples
//!
//! ```
//! use doorlock_hardware::devices::AnyLink;
//! use doorlock_hardware::mock::MockLink;
//!
//! let (interface, _access) = MockLink::pair();
//! let link = AnyLink::Mock(interface);
//! ```

use crate::mock::{MemoryStore, MockLink};
use crate::store::FileStore;
use crate::traits::{PersistentStore, SerialLink};
use crate::Result;

/// Enum wrapper for serial link dispatch.
#[derive(Debug)]
pub enum AnyLink {
    /// In-memory link.
    Mock(MockLink),

    /// UART link.
    #[cfg(feature = "hardware-serial")]
    Serial(crate::serial::SerialPortLink),
}

impl SerialLink for AnyLink {
    async fn send_byte(&mut self, byte: u8) -> Result<()> {
        match self {
            Self::Mock(link) => link.send_byte(byte).await,
            #[cfg(feature = "hardware-serial")]
            Self::Serial(link) => link.send_byte(byte).await,
        }
    }

    async fn recv_byte(&mut self) -> Result<u8> {
        match self {
            Self::Mock(link) => link.recv_byte().await,
            #[cfg(feature = "hardware-serial")]
            Self::Serial(link) => link.recv_byte().await,
        }
    }
}

/// Enum wrapper for persistent store dispatch.
#[derive(Debug)]
pub enum AnyStore {
    /// Volatile store.
    Memory(MemoryStore),

    /// Store image on disk.
    File(FileStore),
}

impl PersistentStore for AnyStore {
    fn capacity(&self) -> usize {
        match self {
            Self::Memory(store) => store.capacity(),
            Self::File(store) => store.capacity(),
        }
    }

    async fn read_byte(&mut self, addr: u16) -> Result<u8> {
        match self {
            Self::Memory(store) => store.read_byte(addr).await,
            Self::File(store) => store.read_byte(addr).await,
        }
    }

    async fn write_byte(&mut self, addr: u16, value: u8) -> Result<()> {
        match self {
            Self::Memory(store) => store.write_byte(addr, value).await,
            Self::File(store) => store.write_byte(addr, value).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_any_link_dispatches_to_mock() {
        let (a, mut b) = MockLink::pair();
        let mut link = AnyLink::Mock(a);

        link.send_byte(0x20).await.unwrap();
        assert_eq!(b.recv_byte().await.unwrap(), 0x20);

        b.send_byte(0x05).await.unwrap();
        assert_eq!(link.recv_byte().await.unwrap(), 0x05);
    }

    #[tokio::test]
    async fn test_any_store_dispatches_to_memory() {
        let (store, handle) = MemoryStore::with_capacity(32);
        let mut store = AnyStore::Memory(store);

        store.write_byte(5, 9).await.unwrap();
        assert_eq!(store.read_byte(5).await.unwrap(), 9);
        assert_eq!(store.capacity(), 32);
        assert_eq!(handle.peek(5, 1), vec![9]);
    }
}
