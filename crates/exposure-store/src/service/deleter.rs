//! # Exposure Deleter
//!
//! Age-based removal of exposures.

use chrono::{DateTime, Utc};

use crate::domain::errors::ExposureError;
use crate::ports::outbound::{ExposureSerializer, KeyValueStore};

use super::store::ExposureStore;

pub struct ExposureDeleter<'a, KV, S>
where
    KV: KeyValueStore,
    S: ExposureSerializer,
{
    store: &'a ExposureStore<KV, S>,
}

impl<'a, KV, S> ExposureDeleter<'a, KV, S>
where
    KV: KeyValueStore,
    S: ExposureSerializer,
{
    pub fn new(store: &'a ExposureStore<KV, S>) -> Self {
        Self { store }
    }

    /// Delete every exposure created strictly before `before`.
    ///
    /// The zero timestamp is rejected rather than treated as "delete nothing".
    pub fn delete_before(&self, before: DateTime<Utc>) -> Result<i64, ExposureError> {
        if before == DateTime::<Utc>::default() {
            return Err(ExposureError::ZeroTimestamp);
        }

        let deleted = self.store.delete_before(before)?;
        tracing::info!(
            deleted,
            before = %before.to_rfc3339(),
            "[exposure-store] deleted expired exposures"
        );
        Ok(deleted)
    }
}
