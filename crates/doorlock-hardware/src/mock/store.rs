//! In-memory persistent store with fault injection.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{HardwareError, Result, traits::PersistentStore};

/// Capacity of a 24C16 EEPROM, in bytes.
pub const DEFAULT_CAPACITY: usize = 2048;

/// Value of an erased EEPROM cell.
pub const ERASED: u8 = 0xFF;

#[derive(Debug)]
struct StoreState {
    bytes: Mutex<Vec<u8>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

/// Byte-addressable store kept in memory.
///
/// Cells start erased (`0xFF`). Failures can be injected through the handle
/// to exercise store I/O error paths.
///
/// # Examples
///
/// ```
/// use doorlock_hardware::mock::MemoryStore;
/// use doorlock_hardware::traits::PersistentStore;
///
/// #[tokio::main]
/// async fn main() -> doorlock_hardware::Result<()> {
///     let (mut store, handle) = MemoryStore::new();
///
///     store.write_byte(0x0311, b'1').await?;
///     assert_eq!(handle.peek(0x0311, 1), vec![b'1']);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MemoryStore {
    state: Arc<StoreState>,
}

impl MemoryStore {
    /// Create an erased store of [`DEFAULT_CAPACITY`] bytes.
    pub fn new() -> (Self, MemoryStoreHandle) {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an erased store of `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> (Self, MemoryStoreHandle) {
        let state = Arc::new(StoreState {
            bytes: Mutex::new(vec![ERASED; capacity]),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        });
        (
            Self {
                state: Arc::clone(&state),
            },
            MemoryStoreHandle { state },
        )
    }

    fn bytes(&self) -> MutexGuard<'_, Vec<u8>> {
        self.state.bytes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self, addr: u16) -> Result<usize> {
        let index = usize::from(addr);
        if index >= self.capacity() {
            return Err(HardwareError::store(format!(
                "Address {addr:#06x} outside {} byte store",
                self.capacity()
            )));
        }
        Ok(index)
    }
}

impl PersistentStore for MemoryStore {
    fn capacity(&self) -> usize {
        self.bytes().len()
    }

    async fn read_byte(&mut self, addr: u16) -> Result<u8> {
        let index = self.check(addr)?;
        if self.state.fail_reads.load(Ordering::Acquire) {
            return Err(HardwareError::store(format!("Read at {addr:#06x} failed")));
        }
        self.state.reads.fetch_add(1, Ordering::AcqRel);
        Ok(self.bytes()[index])
    }

    async fn write_byte(&mut self, addr: u16, value: u8) -> Result<()> {
        let index = self.check(addr)?;
        if self.state.fail_writes.load(Ordering::Acquire) {
            return Err(HardwareError::store(format!("Write at {addr:#06x} failed")));
        }
        self.state.writes.fetch_add(1, Ordering::AcqRel);
        self.bytes()[index] = value;
        Ok(())
    }
}

/// Inspect and manipulate a [`MemoryStore`] from tests.
#[derive(Debug, Clone)]
pub struct MemoryStoreHandle {
    state: Arc<StoreState>,
}

impl MemoryStoreHandle {
    fn bytes(&self) -> MutexGuard<'_, Vec<u8>> {
        self.state.bytes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy `len` bytes starting at `addr`. Bytes past the end are omitted.
    pub fn peek(&self, addr: u16, len: usize) -> Vec<u8> {
        let bytes = self.bytes();
        let start = usize::from(addr).min(bytes.len());
        let end = start.saturating_add(len).min(bytes.len());
        bytes[start..end].to_vec()
    }

    /// Write bytes directly, bypassing fault injection and counters.
    pub fn preload(&self, addr: u16, data: &[u8]) {
        let mut bytes = self.bytes();
        let start = usize::from(addr);
        for (offset, value) in data.iter().enumerate() {
            if let Some(cell) = bytes.get_mut(start + offset) {
                *cell = *value;
            }
        }
    }

    /// Make every subsequent read fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.state.fail_reads.store(fail, Ordering::Release);
    }

    /// Make every subsequent write fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.state.fail_writes.store(fail, Ordering::Release);
    }

    /// Successful reads so far.
    pub fn read_count(&self) -> usize {
        self.state.reads.load(Ordering::Acquire)
    }

    /// Successful writes so far.
    pub fn write_count(&self) -> usize {
        self.state.writes.load(Ordering::Acquire)
    }
}
