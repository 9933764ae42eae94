//! Shopfront core: persistent key-value storage shared by the client and CLI

pub mod error;
pub mod state_dir;
pub mod store;

pub use error::{StorageError, StorageResult};
pub use state_dir::StateDir;
pub use store::{FileStore, KeyValueStore, MemoryStore, keys};

#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use store::LocalStorage;
