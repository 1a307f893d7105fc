//! # Exposure Iterator
//!
//! Streams matching exposures to a consumer callback, resumable by cursor.

use crate::context::ScanContext;
use crate::domain::criteria::IterateCriteria;
use crate::domain::cursor::{decode_cursor, encode_cursor};
use crate::domain::entities::Exposure;
use crate::domain::errors::{ExposureError, IterationError};
use crate::ports::outbound::{ExposureSerializer, KeyValueStore};

use super::store::ExposureStore;

/// Cursor-resumable, cancellable scan over an [`ExposureStore`].
pub struct ExposureIterator<'a, KV, S>
where
    KV: KeyValueStore,
    S: ExposureSerializer,
{
    store: &'a ExposureStore<KV, S>,
}

impl<'a, KV, S> ExposureIterator<'a, KV, S>
where
    KV: KeyValueStore,
    S: ExposureSerializer,
{
    pub fn new(store: &'a ExposureStore<KV, S>) -> Self {
        Self { store }
    }

    /// Deliver every row after `criteria.last_cursor` that matches
    /// `criteria`, in position order.
    ///
    /// The context is checked before each row. Rows that fail the filter
    /// still advance the resume position, so a resumed scan never revisits
    /// them.
    pub fn run<F>(
        &self,
        ctx: &ScanContext,
        criteria: &IterateCriteria,
        mut callback: F,
    ) -> Result<String, IterationError>
    where
        F: FnMut(Exposure) -> Result<(), ExposureError>,
    {
        let start = decode_cursor(&criteria.last_cursor)
            .map_err(|err| IterationError::new(criteria.last_cursor.clone(), err))?;

        let mut last = start;
        let mut scanned = 0u64;
        let mut delivered = 0u64;

        let result = self.store.scan_from(start, |position, exposure| {
            if let Some(reason) = ctx.err() {
                return Err(ExposureError::Cancelled(reason));
            }

            scanned += 1;
            last = position;
            if !criteria.matches(&exposure) {
                return Ok(());
            }
            delivered += 1;
            callback(exposure)
        });

        match result {
            Ok(()) => {
                tracing::debug!(scanned, delivered, "[exposure-store] iteration complete");
                Ok(String::new())
            }
            Err(err) => {
                let cursor = encode_cursor(last);
                if let ExposureError::Cancelled(reason) = &err {
                    tracing::warn!(
                        scanned,
                        delivered,
                        %reason,
                        cursor = %cursor,
                        "[exposure-store] iteration interrupted"
                    );
                } else {
                    tracing::debug!(
                        scanned,
                        delivered,
                        error = %err,
                        cursor = %cursor,
                        "[exposure-store] iteration stopped"
                    );
                }
                Err(IterationError::new(cursor, err))
            }
        }
    }
}
