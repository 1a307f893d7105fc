use std::collections::BTreeMap;

use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{key_in_range, BatchOperation, KeyValueStore, ScanResult};

/// In-memory key-value store for unit tests and ephemeral deployments.
///
/// Ordered by key so range scans come back sorted. Batches are applied
/// under the caller's exclusive borrow, which makes them atomic.
#[derive(Debug, Default)]
pub struct InMemoryKVStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl InMemoryKVStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Apply `operations` to an ordered map.
pub(crate) fn apply_batch(data: &mut BTreeMap<Vec<u8>, Vec<u8>>, operations: Vec<BatchOperation>) {
    for op in operations {
        match op {
            BatchOperation::Put { key, value } => {
                data.insert(key, value);
            }
            BatchOperation::Delete { key } => {
                data.remove(&key);
            }
        }
    }
}

/// Range scan over an ordered map.
pub(crate) fn scan_range(
    data: &BTreeMap<Vec<u8>, Vec<u8>>,
    start: &[u8],
    end: &[u8],
    limit: usize,
) -> ScanResult {
    data.range(start.to_vec()..)
        .take_while(|(k, _)| key_in_range(k, start, end))
        .take(limit)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

impl KeyValueStore for InMemoryKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        apply_batch(&mut self.data, operations);
        Ok(())
    }

    fn range_scan(
        &self,
        start: &[u8],
        end: &[u8],
        limit: usize,
    ) -> Result<ScanResult, KVStoreError> {
        Ok(scan_range(&self.data, start, end, limit))
    }
}
