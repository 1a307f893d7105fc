//! # Exposure Store
//!
//! Persistence for diagnosis keys ("exposures") of an exposure-notification
//! key server. Exposures are inserted in batches, streamed to consumers in
//! insertion order with region and time filters, and deleted by age.
//!
//! ## Guarantees
//!
//! | Property | Description |
//! |----------|-------------|
//! | Atomic batches | An insert batch is written entirely or not at all |
//! | Stable order | Every row has a strictly increasing position; scans follow it |
//! | Resumable scans | An interrupted scan returns a cursor that resumes strictly after the last processed row |
//! | Cooperative cancellation | The scan context is checked before every row |
//! | Exclusive cutoff | Deletion removes rows created strictly before the cutoff |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Entities, criteria, cursor codec, validation, errors
//! - `ports/` - Port traits (inbound API, outbound key-value store and serializer)
//! - `adapters/` - In-memory, file-backed and RocksDB stores; bincode serializer
//! - `service/` - Application service implementing the API
//! - `context` - Cancellation and deadlines for scans
//!
//! ## Usage
//!
//! ```ignore
//! use exposure_store::{ExposureApi, ExposureService, ExposureStoreConfig, IterateCriteria, ScanContext};
//!
//! let service = ExposureService::new_in_memory(ExposureStoreConfig::default());
//! service.insert_exposures(batch)?;
//!
//! let criteria = IterateCriteria::new().with_include_regions(["US"]);
//! let cursor = service.iterate_exposures(&ScanContext::background(), &criteria, |exposure| {
//!     publish(exposure)
//! })?;
//! ```

pub mod adapters;
pub mod context;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export key types for convenience
pub use context::{ContextError, ScanContext};
pub use domain::criteria::IterateCriteria;
pub use domain::cursor::{decode_cursor, encode_cursor};
pub use domain::entities::{truncate_to_micros, Exposure, SequencePosition};
pub use domain::errors::{ErrorKind, ExposureError, IterationError, KVStoreError, SerializationError};
pub use domain::value_objects::ExposureStoreConfig;
pub use ports::inbound::ExposureApi;
pub use ports::outbound::{BatchOperation, ExposureSerializer, KeyValueStore, SystemTimeSource, TimeSource};
pub use service::{ExposureDependencies, ExposureService};

// Re-export adapters
pub use adapters::{BincodeExposureSerializer, FileBackedKVStore, InMemoryKVStore};
#[cfg(feature = "rocksdb")]
pub use adapters::{RocksDbConfig, RocksDbStore};
