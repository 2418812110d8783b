//! Credential persistence on the Access node.
//!
//! The authoritative credential occupies `CREDENTIAL_LENGTH` consecutive
//! bytes of the persistent store starting at a fixed offset. There is no
//! version byte, checksum or "provisioned" marker: a fresh store reads back
//! whatever its erased cells hold.

use std::time::Duration;

use doorlock_core::constants::CREDENTIAL_LENGTH;
use doorlock_core::{CompareMode, Credential};
use doorlock_hardware::{HardwareError, PersistentStore};
use subtle::ConstantTimeEq;
use tracing::{debug, trace};

use crate::config::NodeConfig;
use crate::error::Result;

/// Credential slot inside a byte store.
#[derive(Debug)]
pub struct CredentialStore<S> {
    store: S,
    offset: u16,
    write_delay: Duration,
}

impl<S: PersistentStore> CredentialStore<S> {
    pub fn new(store: S, offset: u16, write_delay: Duration) -> Self {
        Self {
            store,
            offset,
            write_delay,
        }
    }

    /// Slot at the configured offset with the configured write pacing.
    pub fn from_config(store: S, config: &NodeConfig) -> Self {
        Self::new(store, config.store_offset, config.timing.store_write_delay())
    }

    pub fn offset(&self) -> u16 {
        self.offset
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    fn addr(&self, index: usize) -> Result<u16> {
        u16::try_from(index)
            .ok()
            .and_then(|index| self.offset.checked_add(index))
            .ok_or_else(|| {
                HardwareError::store(format!(
                    "Credential byte {index} past the end of the address space (offset {:#06x})",
                    self.offset
                ))
                .into()
            })
    }

    /// Overwrite the stored credential, one byte at a time.
    ///
    /// Each write is followed by the store's write-cycle delay. A failure
    /// part way through leaves a partially written credential behind.
    ///
    /// # Errors
    ///
    /// Returns the store error as soon as one write fails.
    pub async fn save(&mut self, credential: &Credential) -> Result<()> {
        for (index, &symbol) in credential.symbols().iter().enumerate() {
            self.store.write_byte(self.addr(index)?, symbol).await?;
            tokio::time::sleep(self.write_delay).await;
        }
        debug!(offset = self.offset, "credential saved");
        Ok(())
    }

    /// Read the stored credential.
    pub async fn load(&mut self) -> Result<Credential> {
        let mut symbols = [0u8; CREDENTIAL_LENGTH];
        for (index, slot) in symbols.iter_mut().enumerate() {
            *slot = self.store.read_byte(self.addr(index)?).await?;
        }
        Ok(Credential::new(symbols))
    }

    /// Compare `candidate` with the stored credential.
    ///
    /// `EarlyExit` reads the store one byte at a time and stops at the first
    /// differing symbol. `ConstantTime` reads the whole credential and
    /// compares every symbol.
    pub async fn verify(&mut self, candidate: &Credential, mode: CompareMode) -> Result<bool> {
        match mode {
            CompareMode::EarlyExit => {
                for (index, &symbol) in candidate.symbols().iter().enumerate() {
                    let stored = self.store.read_byte(self.addr(index)?).await?;
                    if stored != symbol {
                        trace!(index, "credential differs");
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            CompareMode::ConstantTime => {
                let stored = self.load().await?;
                Ok(stored.symbols().ct_eq(candidate.symbols()).into())
            }
        }
    }
}
