//! Key-value persistence used to keep session state across restarts
//!
//! A store is a process-wide, synchronous string map. The client writes
//! the bearer token, its expiry and the cached user profile under the
//! well-known [`keys`]. Implementations exist for memory, a JSON file on
//! disk and (on wasm32 with the `web` feature) the browser's
//! `localStorage`.

mod file;
mod memory;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod web;

pub use file::FileStore;
pub use memory::MemoryStore;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use web::LocalStorage;

use crate::error::StorageResult;

/// Well-known keys written by the session client
pub mod keys {
    /// Bearer token
    pub const TOKEN: &str = "token";
    /// RFC 3339 instant after which the token is treated as expired
    pub const TOKEN_EXPIRY: &str = "tokenExpiry";
    /// JSON copy of the last fetched user profile
    pub const USER: &str = "user";
}

/// Synchronous string key-value storage
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete `key`. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}
