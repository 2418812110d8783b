//! File-backed persistent store.
//!
//! Keeps a full image of the EEPROM on disk so the credential survives
//! process restarts. Every write is flushed to the file before returning.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::mock::store::ERASED;
use crate::{HardwareError, Result, traits::PersistentStore};

/// EEPROM image stored in a file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    image: Vec<u8>,
}

impl FileStore {
    /// Open `path`, creating an erased image of `capacity` bytes if it does
    /// not exist.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::Store` if the existing image has a different
    /// size, and `HardwareError::Io` on file system errors.
    pub async fn open(path: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let image = match tokio::fs::read(&path).await {
            Ok(image) => {
                if image.len() != capacity {
                    return Err(HardwareError::store(format!(
                        "Image {} holds {} bytes, expected {capacity}",
                        path.display(),
                        image.len()
                    )));
                }
                info!(path = %path.display(), "Loaded store image");
                image
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let image = vec![ERASED; capacity];
                tokio::fs::write(&path, &image).await?;
                info!(path = %path.display(), capacity, "Created erased store image");
                image
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self { path, image })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn index(&self, addr: u16) -> Result<usize> {
        let index = usize::from(addr);
        if index >= self.image.len() {
            return Err(HardwareError::store(format!(
                "Address {addr:#06x} outside {} byte store",
                self.image.len()
            )));
        }
        Ok(index)
    }
}

impl PersistentStore for FileStore {
    fn capacity(&self) -> usize {
        self.image.len()
    }

    async fn read_byte(&mut self, addr: u16) -> Result<u8> {
        let index = self.index(addr)?;
        Ok(self.image[index])
    }

    async fn write_byte(&mut self, addr: u16, value: u8) -> Result<()> {
        let index = self.index(addr)?;
        self.image[index] = value;
        tokio::fs::write(&self.path, &self.image).await.map_err(|e| {
            HardwareError::store(format!("Flush to {} failed: {e}", self.path.display()))
        })?;
        debug!(addr = format!("{addr:#06x}"), "Store byte written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_creates_erased_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eeprom.bin");

        let mut store = FileStore::open(&path, 64).await.unwrap();
        assert_eq!(store.capacity(), 64);
        assert_eq!(store.read_byte(10).await.unwrap(), ERASED);
        assert_eq!(std::fs::read(&path).unwrap().len(), 64);
    }

    #[tokio::test]
    async fn test_writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eeprom.bin");

        {
            let mut store = FileStore::open(&path, 64).await.unwrap();
            store.write_byte(3, 42).await.unwrap();
        }

        let mut store = FileStore::open(&path, 64).await.unwrap();
        assert_eq!(store.read_byte(3).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_rejects_image_of_wrong_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eeprom.bin");
        std::fs::write(&path, [0u8; 10]).unwrap();

        let err = FileStore::open(&path, 64).await.unwrap_err();
        assert!(err.is_store_failure());
    }

    #[tokio::test]
    async fn test_out_of_range_address() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path().join("e.bin"), 4).await.unwrap();

        assert!(store.write_byte(4, 0).await.unwrap_err().is_store_failure());
    }
}
