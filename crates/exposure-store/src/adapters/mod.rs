//! # Adapters Module
//!
//! Adapter implementations of the outbound ports.
//!
//! ## Modules
//!
//! - `storage`: `KeyValueStore` backends (in-memory, file-backed, RocksDB)
//! - `serializer`: bincode row serializer

pub mod serializer;
pub mod storage;

pub use serializer::BincodeExposureSerializer;
#[cfg(feature = "rocksdb")]
pub use storage::{RocksDbConfig, RocksDbStore};
pub use storage::{FileBackedKVStore, InMemoryKVStore};
