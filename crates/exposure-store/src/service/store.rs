//! # Exposure Store
//!
//! Owns the exposure table inside the key-value backend: batch insert,
//! ordered scan from a position, and age-based delete.
//!
//! ## Locking
//!
//! Writers hold the backend's write lock for their whole read-modify-write,
//! so a reader never observes half a batch or half a delete. Scans take the
//! read lock once per page and release it before running callbacks.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::domain::entities::{truncate_to_micros, Exposure, SequencePosition, StoredExposure};
use crate::domain::errors::{ExposureError, KVStoreError};
use crate::domain::validation::validate_batch;
use crate::domain::value_objects::{ExposureStoreConfig, KeyPrefix};
use crate::ports::outbound::{BatchOperation, ExposureSerializer, KeyValueStore};

/// The exposure table over a `KeyValueStore`.
pub struct ExposureStore<KV, S>
where
    KV: KeyValueStore,
    S: ExposureSerializer,
{
    /// Key-value backend.
    kv: RwLock<KV>,
    /// Row serializer.
    serializer: S,
    /// Store configuration.
    config: ExposureStoreConfig,
}

impl<KV, S> ExposureStore<KV, S>
where
    KV: KeyValueStore,
    S: ExposureSerializer,
{
    pub fn new(kv: KV, serializer: S, config: ExposureStoreConfig) -> Self {
        Self {
            kv: RwLock::new(kv),
            serializer,
            config,
        }
    }

    /// Persist `exposures` as one atomic unit, assigning positions in order.
    ///
    /// Every record is validated first; any rejection fails the whole batch
    /// before the backend is touched.
    pub fn insert_batch(&self, exposures: Vec<Exposure>) -> Result<(), ExposureError> {
        validate_batch(&exposures, self.config.max_insert_batch)?;
        if exposures.is_empty() {
            return Ok(());
        }

        let mut kv = self.kv.write();
        let first = read_next_position(&*kv)?;

        let mut operations = Vec::with_capacity(exposures.len() * 2 + 1);
        let mut position = first;
        for exposure in &exposures {
            let row = StoredExposure::from(exposure);
            let value = self.serializer.serialize(&row)?;
            operations.push(BatchOperation::put(KeyPrefix::exposure_key(position), value));
            operations.push(BatchOperation::put(
                KeyPrefix::created_index_key(row.created_at_micros, position),
                Vec::new(),
            ));
            position = position.successor();
        }
        operations.push(BatchOperation::put(
            KeyPrefix::NEXT_POSITION,
            position.get().to_be_bytes(),
        ));

        kv.atomic_batch_write(operations)?;

        tracing::info!(
            count = exposures.len(),
            first_position = first.get(),
            "[exposure-store] inserted exposure batch"
        );
        Ok(())
    }

    /// Invoke `callback` for every row with position `> after`, ascending.
    ///
    /// Stops at, and returns, the first callback error.
    pub fn scan_from<F>(&self, after: SequencePosition, mut callback: F) -> Result<(), ExposureError>
    where
        F: FnMut(SequencePosition, Exposure) -> Result<(), ExposureError>,
    {
        if after.get() == u64::MAX {
            return Ok(());
        }

        let page_size = self.config.scan_page_size.max(1);
        let end = KeyPrefix::exposure_end();
        let mut start = KeyPrefix::exposure_key(after.successor());

        loop {
            let page = self.kv.read().range_scan(&start, &end, page_size)?;
            let fetched = page.len();

            let mut last = None;
            for (key, value) in page {
                let position = KeyPrefix::position_from_exposure_key(&key)
                    .ok_or_else(|| ExposureError::CorruptRow { key: key.clone() })?;
                let exposure = self
                    .serializer
                    .deserialize(&value)?
                    .into_exposure()
                    .ok_or(ExposureError::CorruptRow { key })?;

                callback(position, exposure)?;
                last = Some(position);
            }

            match last {
                Some(position) if fetched == page_size && position.get() < u64::MAX => {
                    start = KeyPrefix::exposure_key(position.successor());
                }
                _ => return Ok(()),
            }
        }
    }

    /// Remove every row with `created_at < before`; returns the count removed.
    pub fn delete_before(&self, before: DateTime<Utc>) -> Result<i64, ExposureError> {
        let bound = KeyPrefix::created_index_bound(ceil_micros(before));

        let mut kv = self.kv.write();
        let expired = kv.range_scan(KeyPrefix::CREATED_INDEX, &bound, usize::MAX)?;
        if expired.is_empty() {
            return Ok(0);
        }

        let mut operations = Vec::with_capacity(expired.len() * 2);
        for (index_key, _) in expired {
            let position = KeyPrefix::position_from_created_index_key(&index_key)
                .ok_or_else(|| ExposureError::CorruptRow {
                    key: index_key.clone(),
                })?;
            operations.push(BatchOperation::delete(KeyPrefix::exposure_key(position)));
            operations.push(BatchOperation::delete(index_key));
        }

        let count = (operations.len() / 2) as i64;
        kv.atomic_batch_write(operations)?;
        Ok(count)
    }

    /// The position the next inserted row will receive.
    pub(crate) fn next_position(&self) -> Result<SequencePosition, ExposureError> {
        read_next_position(&*self.kv.read())
    }
}

fn read_next_position<KV: KeyValueStore>(kv: &KV) -> Result<SequencePosition, ExposureError> {
    match kv.get(KeyPrefix::NEXT_POSITION)? {
        None => Ok(SequencePosition::START.successor()),
        Some(bytes) => {
            let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                KVStoreError::CorruptionError {
                    message: format!("next position has {} bytes, expected 8", bytes.len()),
                }
            })?;
            Ok(SequencePosition::new(u64::from_be_bytes(raw)))
        }
    }
}

/// Smallest whole microsecond count not earlier than `ts`.
///
/// Stored times are whole microseconds, so `created_at < ts` holds exactly
/// when the stored count is below this value.
fn ceil_micros(ts: DateTime<Utc>) -> i64 {
    let micros = ts.timestamp_micros();
    if truncate_to_micros(ts) < ts {
        micros + 1
    } else {
        micros
    }
}
