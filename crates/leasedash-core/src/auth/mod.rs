//! Authentication module for managing the bearer-token session.
//!
//! This module provides:
//! - `SessionStore`: the single live credential and its durable copy
//! - `TokenStorage`: the durable slot, backed by a file, the OS keychain,
//!   or memory
//!
//! There is no expiry tracking. A stale token shows up as a 401 on the
//! next request.

pub mod session;
pub mod storage;

pub use session::SessionStore;
pub use storage::{
    FileTokenStorage, KeyringTokenStorage, MemoryTokenStorage, StorageError, TokenStorage,
};
