//! # Storage Backend
//!
//! Runtime selection between the key-value adapters.

use anyhow::{Context, Result};
use exposure_store::{
    BatchOperation, FileBackedKVStore, InMemoryKVStore, KVStoreError, KeyValueStore,
};
#[cfg(feature = "rocksdb")]
use exposure_store::RocksDbStore;

use crate::config::{BackendKind, RuntimeConfig};

/// File name of the file-backed store inside the data directory.
pub const FILE_STORE_NAME: &str = "exposures.db";

/// Directory name of the RocksDB store inside the data directory.
pub const ROCKSDB_DIR_NAME: &str = "rocksdb";

/// The backend chosen at startup.
pub enum Backend {
    Memory(InMemoryKVStore),
    File(FileBackedKVStore),
    #[cfg(feature = "rocksdb")]
    RocksDb(RocksDbStore),
}

impl Backend {
    /// Open the backend named by `config`.
    pub fn open(config: &RuntimeConfig) -> Result<Self> {
        match config.backend {
            BackendKind::Memory => Ok(Backend::Memory(InMemoryKVStore::new())),
            BackendKind::File => {
                let path = config.data_dir.join(FILE_STORE_NAME);
                let store = FileBackedKVStore::open(&path)
                    .with_context(|| format!("Failed to open {}", path.display()))?;
                Ok(Backend::File(store))
            }
            #[cfg(feature = "rocksdb")]
            BackendKind::RocksDb => {
                let path = config.data_dir.join(ROCKSDB_DIR_NAME);
                let store = RocksDbStore::open_default(&path)
                    .with_context(|| format!("Failed to open RocksDB at {}", path.display()))?;
                Ok(Backend::RocksDb(store))
            }
            #[cfg(not(feature = "rocksdb"))]
            BackendKind::RocksDb => {
                anyhow::bail!("EXPOSURE_BACKEND=rocksdb requires building with --features rocksdb")
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Backend::Memory(_) => "memory",
            Backend::File(_) => "file",
            #[cfg(feature = "rocksdb")]
            Backend::RocksDb(_) => "rocksdb",
        }
    }
}

impl KeyValueStore for Backend {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        match self {
            Backend::Memory(store) => store.get(key),
            Backend::File(store) => store.get(key),
            #[cfg(feature = "rocksdb")]
            Backend::RocksDb(store) => store.get(key),
        }
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        match self {
            Backend::Memory(store) => store.atomic_batch_write(operations),
            Backend::File(store) => store.atomic_batch_write(operations),
            #[cfg(feature = "rocksdb")]
            Backend::RocksDb(store) => store.atomic_batch_write(operations),
        }
    }

    fn range_scan(
        &self,
        start: &[u8],
        end: &[u8],
        limit: usize,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KVStoreError> {
        match self {
            Backend::Memory(store) => store.range_scan(start, end, limit),
            Backend::File(store) => store.range_scan(start, end, limit),
            #[cfg(feature = "rocksdb")]
            Backend::RocksDb(store) => store.range_scan(start, end, limit),
        }
    }
}
