//! # Outbound Ports (Driven Ports)
//!
//! Dependencies required by the Exposure Store service.
//!
//! These are the interfaces the host application implements: the storage
//! engine, the row serializer and a clock.

use chrono::{DateTime, Utc};

use crate::domain::entities::StoredExposure;
use crate::domain::errors::{KVStoreError, SerializationError};

/// Ordered key-value pairs returned by a scan.
pub type ScanResult = Vec<(Vec<u8>, Vec<u8>)>;

/// Abstract interface for an ordered key-value database.
///
/// Production: `RocksDbStore` (feature `rocksdb`) or `FileBackedKVStore`.
/// Testing: `InMemoryKVStore`.
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Execute an atomic batch write.
    ///
    /// ## Atomicity Guarantee
    ///
    /// Either ALL operations in the batch succeed, or NONE are applied.
    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError>;

    /// Return up to `limit` pairs with `start <= key < end`, ascending by key.
    ///
    /// An empty `end` means no upper bound.
    fn range_scan(&self, start: &[u8], end: &[u8], limit: usize)
        -> Result<ScanResult, KVStoreError>;
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put { key: Vec<u8>, value: Vec<u8> },
    /// Delete a key.
    Delete { key: Vec<u8> },
}

impl BatchOperation {
    /// Create a Put operation.
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a Delete operation.
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

/// True if `key` lies in `[start, end)`; empty `end` is unbounded.
pub(crate) fn key_in_range(key: &[u8], start: &[u8], end: &[u8]) -> bool {
    key >= start && (end.is_empty() || key < end)
}

/// Abstract interface for exposure row serialization.
pub trait ExposureSerializer: Send + Sync {
    /// Serialize a stored exposure to bytes.
    fn serialize(&self, exposure: &StoredExposure) -> Result<Vec<u8>, SerializationError>;

    /// Deserialize bytes to a stored exposure.
    fn deserialize(&self, data: &[u8]) -> Result<StoredExposure, SerializationError>;
}

/// Abstract interface for time operations (for testability).
pub trait TimeSource: Send + Sync {
    /// Current wall-clock time.
    fn now(&self) -> DateTime<Utc>;
}

/// Default time source using the system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_in_range() {
        assert!(key_in_range(b"e:1", b"e:", b"e;"));
        assert!(!key_in_range(b"e;", b"e:", b"e;"));
        assert!(!key_in_range(b"c:1", b"e:", b"e;"));
        assert!(key_in_range(b"zzz", b"e:", b""));
    }
}
