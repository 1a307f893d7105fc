//! # Exposure Service
//!
//! The main service implementing the Exposure Store API.
//!
//! ## Architecture
//!
//! - `store` owns the exposure table: insert, ordered scan, age delete
//! - `iterator` adds filtering, cancellation and resume cursors on top
//! - `deleter` guards age-based deletion
//!
//! All backend access goes through the `KeyValueStore` and
//! `ExposureSerializer` ports, injected via [`ExposureDependencies`].

mod deleter;
mod iterator;
mod store;

pub use deleter::ExposureDeleter;
pub use iterator::ExposureIterator;
pub use store::ExposureStore;

use chrono::{DateTime, Utc};

use crate::adapters::{BincodeExposureSerializer, InMemoryKVStore};
use crate::context::ScanContext;
use crate::domain::criteria::IterateCriteria;
use crate::domain::entities::Exposure;
use crate::domain::errors::{ExposureError, IterationError};
use crate::domain::value_objects::ExposureStoreConfig;
use crate::ports::inbound::ExposureApi;
use crate::ports::outbound::{ExposureSerializer, KeyValueStore};

/// The Exposure Store service.
pub struct ExposureService<KV, S>
where
    KV: KeyValueStore,
    S: ExposureSerializer,
{
    pub(crate) store: ExposureStore<KV, S>,
}

/// Dependencies for ExposureService
pub struct ExposureDependencies<KV, S> {
    pub kv_store: KV,
    pub serializer: S,
}

impl<KV, S> ExposureService<KV, S>
where
    KV: KeyValueStore,
    S: ExposureSerializer,
{
    /// Create a new Exposure Service with the given dependencies.
    pub fn new(deps: ExposureDependencies<KV, S>, config: ExposureStoreConfig) -> Self {
        Self {
            store: ExposureStore::new(deps.kv_store, deps.serializer, config),
        }
    }

    pub fn store(&self) -> &ExposureStore<KV, S> {
        &self.store
    }

    pub fn iterator(&self) -> ExposureIterator<'_, KV, S> {
        ExposureIterator::new(&self.store)
    }

    pub fn deleter(&self) -> ExposureDeleter<'_, KV, S> {
        ExposureDeleter::new(&self.store)
    }
}

impl ExposureService<InMemoryKVStore, BincodeExposureSerializer> {
    /// Service over a fresh in-memory backend.
    pub fn new_in_memory(config: ExposureStoreConfig) -> Self {
        Self::new(
            ExposureDependencies {
                kv_store: InMemoryKVStore::new(),
                serializer: BincodeExposureSerializer,
            },
            config,
        )
    }
}

impl<KV, S> ExposureApi for ExposureService<KV, S>
where
    KV: KeyValueStore,
    S: ExposureSerializer,
{
    fn insert_exposures(&self, exposures: Vec<Exposure>) -> Result<(), ExposureError> {
        self.store.insert_batch(exposures)
    }

    fn iterate_exposures<F>(
        &self,
        ctx: &ScanContext,
        criteria: &IterateCriteria,
        callback: F,
    ) -> Result<String, IterationError>
    where
        F: FnMut(Exposure) -> Result<(), ExposureError>,
    {
        self.iterator().run(ctx, criteria, callback)
    }

    fn delete_exposures(&self, before: DateTime<Utc>) -> Result<i64, ExposureError> {
        self.deleter().delete_before(before)
    }
}
