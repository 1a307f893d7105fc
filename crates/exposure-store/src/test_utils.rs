use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::adapters::{BincodeExposureSerializer, InMemoryKVStore};
use crate::context::ScanContext;
use crate::domain::criteria::IterateCriteria;
use crate::domain::entities::{Exposure, StoredExposure};
use crate::domain::errors::{KVStoreError, SerializationError};
use crate::ports::inbound::ExposureApi;
use crate::ports::outbound::{BatchOperation, ExposureSerializer, KeyValueStore, ScanResult};

pub fn batch_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 5, 1, 0, 0, 0).unwrap()
}

pub fn make_exposure(key: &str, regions: &[&str], interval_number: u32) -> Exposure {
    Exposure {
        exposure_key: key.as_bytes().to_vec(),
        regions: regions.iter().map(|r| r.to_string()).collect(),
        interval_number,
        interval_count: 0,
        created_at: batch_time(),
        local_provenance: true,
    }
}

/// Four exposures created an hour apart with overlapping regions.
pub fn sample_exposures() -> Vec<Exposure> {
    let t = batch_time();
    vec![
        Exposure {
            exposure_key: b"ABC".to_vec(),
            regions: vec!["US".into(), "CA".into(), "MX".into()],
            interval_number: 18,
            interval_count: 0,
            created_at: t,
            local_provenance: true,
        },
        Exposure {
            exposure_key: b"DEF".to_vec(),
            regions: vec!["CA".into()],
            interval_number: 118,
            interval_count: 1,
            created_at: t + Duration::hours(1),
            local_provenance: true,
        },
        Exposure {
            exposure_key: b"123".to_vec(),
            regions: vec!["MX".into(), "CA".into()],
            interval_number: 218,
            interval_count: 2,
            created_at: t + Duration::hours(2),
            local_provenance: false,
        },
        Exposure {
            exposure_key: b"456".to_vec(),
            regions: vec!["US".into()],
            interval_number: 318,
            interval_count: 3,
            created_at: t + Duration::hours(3),
            local_provenance: false,
        },
    ]
}

/// Collect every exposure matching `criteria`.
pub fn list_exposures<A: ExposureApi>(api: &A, criteria: &IterateCriteria) -> Vec<Exposure> {
    let mut seen = Vec::new();
    let cursor = api
        .iterate_exposures(&ScanContext::background(), criteria, |e| {
            seen.push(e);
            Ok(())
        })
        .unwrap();
    assert_eq!(cursor, "");
    seen
}

/// In-memory store with injectable failures.
///
/// Batch writes fail while `fail_writes` is set. While `fail_scans` is set,
/// range scans succeed `scan_budget` more times and then fail.
#[derive(Default)]
pub struct FlakyKVStore {
    inner: InMemoryKVStore,
    pub fail_writes: Arc<AtomicBool>,
    pub fail_scans: Arc<AtomicBool>,
    pub scan_budget: Arc<AtomicUsize>,
}

impl KeyValueStore for FlakyKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.inner.get(key)
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(KVStoreError::IOError {
                message: "injected write failure".into(),
            });
        }
        self.inner.atomic_batch_write(operations)
    }

    fn range_scan(
        &self,
        start: &[u8],
        end: &[u8],
        limit: usize,
    ) -> Result<ScanResult, KVStoreError> {
        if self.fail_scans.load(Ordering::SeqCst) {
            let spent = self
                .scan_budget
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_err();
            if spent {
                return Err(KVStoreError::IOError {
                    message: "injected read failure".into(),
                });
            }
        }
        self.inner.range_scan(start, end, limit)
    }
}

/// Bincode serializer that cancels `ctx` when decoding the `n`th row.
pub struct CancelOnDecode {
    pub ctx: ScanContext,
    pub remaining: AtomicUsize,
}

impl CancelOnDecode {
    pub fn new(ctx: ScanContext, nth: usize) -> Self {
        Self {
            ctx,
            remaining: AtomicUsize::new(nth),
        }
    }
}

impl ExposureSerializer for CancelOnDecode {
    fn serialize(&self, exposure: &StoredExposure) -> Result<Vec<u8>, SerializationError> {
        BincodeExposureSerializer.serialize(exposure)
    }

    fn deserialize(&self, data: &[u8]) -> Result<StoredExposure, SerializationError> {
        if self.remaining.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.ctx.cancel();
        }
        BincodeExposureSerializer.deserialize(data)
    }
}
