//! # Inbound Ports (Driving Ports)
//!
//! The primary API of the Exposure Store, used by batch exporters,
//! federation senders and retention jobs.

use chrono::{DateTime, Utc};

use crate::context::ScanContext;
use crate::domain::criteria::IterateCriteria;
use crate::domain::entities::Exposure;
use crate::domain::errors::{ExposureError, IterationError};

/// Primary API of the Exposure Store.
pub trait ExposureApi {
    /// Insert a batch of exposures.
    ///
    /// ## Atomicity
    ///
    /// All records are written together or none are. `created_at` is
    /// truncated to microseconds.
    ///
    /// ## Errors
    ///
    /// - `EmptyExposureKey`, `InvalidRegion`, `BatchTooLarge`: rejected input
    /// - `Storage`: backend failure
    fn insert_exposures(&self, exposures: Vec<Exposure>) -> Result<(), ExposureError>;

    /// Stream exposures matching `criteria` to `callback`, in insertion order.
    ///
    /// Returns the empty cursor once every row has been scanned. On early
    /// stop the error carries a cursor that resumes strictly after the last
    /// processed row when passed back as `criteria.last_cursor`.
    ///
    /// ## Errors
    ///
    /// - `MalformedCursor`: `criteria.last_cursor` is not a valid token
    /// - `Cancelled`: `ctx` was cancelled or its deadline passed
    /// - any error returned by `callback`, unchanged
    /// - `Storage`, `Serialization`, `CorruptRow`: backend failure
    fn iterate_exposures<F>(
        &self,
        ctx: &ScanContext,
        criteria: &IterateCriteria,
        callback: F,
    ) -> Result<String, IterationError>
    where
        F: FnMut(Exposure) -> Result<(), ExposureError>;

    /// Delete every exposure created strictly before `before`.
    ///
    /// Returns the number of exposures removed.
    ///
    /// ## Errors
    ///
    /// - `ZeroTimestamp`: `before` is the zero timestamp
    /// - `Storage`: backend failure
    fn delete_exposures(&self, before: DateTime<Utc>) -> Result<i64, ExposureError>;
}
