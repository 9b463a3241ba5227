use std::fmt;

use tracing::debug;

use super::storage::{MemoryTokenStorage, StorageError, TokenStorage};

/// The single live credential, mirrored to a durable slot.
pub struct SessionStore {
    storage: Box<dyn TokenStorage>,
    token: Option<String>,
}

impl SessionStore {
    /// Create an empty session over a storage backend. Call `load` to
    /// restore a persisted token.
    pub fn new(storage: impl TokenStorage + 'static) -> Self {
        Self::from_boxed(Box::new(storage))
    }

    pub fn from_boxed(storage: Box<dyn TokenStorage>) -> Self {
        Self {
            storage,
            token: None,
        }
    }

    /// Session with no durable backing.
    pub fn in_memory() -> Self {
        Self::new(MemoryTokenStorage::new())
    }

    /// Restore the token from durable storage. Does not check it against
    /// the service.
    pub fn load(&mut self) -> Result<Option<&str>, StorageError> {
        self.token = self.storage.read()?;
        debug!(present = self.token.is_some(), "Session loaded");
        Ok(self.token.as_deref())
    }

    /// Persist a token, replacing any previous one.
    pub fn save(&mut self, token: impl Into<String>) -> Result<(), StorageError> {
        let token = token.into();
        self.storage.write(&token)?;
        self.token = Some(token);
        Ok(())
    }

    /// Forget the token in memory and in durable storage.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.token = None;
        self.storage.remove()
    }

    pub fn is_present(&self) -> bool {
        self.token.is_some()
    }

    /// Get the bearer token, if any
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
