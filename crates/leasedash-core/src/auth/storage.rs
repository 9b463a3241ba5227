use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use keyring::Entry;
use thiserror::Error;

/// Token file name in the cache directory
pub const TOKEN_FILE: &str = "token";

const KEYRING_SERVICE: &str = "leasedash";
const KEYRING_ACCOUNT: &str = "bearer-token";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Token file error: {0}")]
    Io(#[from] io::Error),

    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// A durable single-slot home for the bearer token.
pub trait TokenStorage: Send + Sync {
    /// Read the stored token, `None` when the slot is empty.
    fn read(&self) -> Result<Option<String>, StorageError>;

    /// Replace the stored token.
    fn write(&self, token: &str) -> Result<(), StorageError>;

    /// Empty the slot. Removing an empty slot is not an error.
    fn remove(&self) -> Result<(), StorageError>;
}

/// Token kept as plain text in a file.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage at `<dir>/token`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(TOKEN_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStorage for FileTokenStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, token: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token)?;
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Token kept in the OS keychain.
#[derive(Debug, Clone)]
pub struct KeyringTokenStorage {
    service: String,
    account: String,
}

impl KeyringTokenStorage {
    pub fn new() -> Self {
        Self {
            service: KEYRING_SERVICE.to_string(),
            account: KEYRING_ACCOUNT.to_string(),
        }
    }

    fn entry(&self) -> Result<Entry, StorageError> {
        Ok(Entry::new(&self.service, &self.account)?)
    }
}

impl Default for KeyringTokenStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStorage for KeyringTokenStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, token: &str) -> Result<(), StorageError> {
        self.entry()?.set_password(token)?;
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process slot. Clones share the same slot, so a test can keep a
/// handle and inspect what the session wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStorage {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(token.into()))),
        }
    }

    /// Current slot contents.
    pub fn get(&self) -> Option<String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        // A poisoned slot still holds a valid Option
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        Ok(self.get())
    }

    fn write(&self, token: &str) -> Result<(), StorageError> {
        *self.lock() = Some(token.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        *self.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("leasedash-storage-{:016x}", rand::random::<u64>()))
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = temp_dir();
        let storage = FileTokenStorage::in_dir(&dir);

        assert_eq!(storage.read().unwrap(), None);

        storage.write("first").unwrap();
        storage.write("second").unwrap();
        assert_eq!(storage.read().unwrap().as_deref(), Some("second"));
        assert_eq!(std::fs::read_to_string(storage.path()).unwrap(), "second");

        storage.remove().unwrap();
        assert_eq!(storage.read().unwrap(), None);
        storage.remove().unwrap();

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_file_storage_ignores_blank_file() {
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(TOKEN_FILE), "  \n").unwrap();

        let storage = FileTokenStorage::in_dir(&dir);
        assert_eq!(storage.read().unwrap(), None);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_memory_storage_clones_share_slot() {
        let storage = MemoryTokenStorage::new();
        let handle = storage.clone();

        storage.write("abc").unwrap();
        assert_eq!(handle.get().as_deref(), Some("abc"));

        handle.remove().unwrap();
        assert_eq!(storage.read().unwrap(), None);
    }
}
