//! # Value Objects
//!
//! Store configuration and the key layout of the backing key-value store.

use super::entities::SequencePosition;

/// Configuration for the exposure store.
///
/// All values have sensible defaults for production use.
#[derive(Debug, Clone)]
pub struct ExposureStoreConfig {
    /// Rows fetched from the backend per read during a scan (default: 256).
    ///
    /// Each page is one consistent read; the read lock is released between
    /// pages so scans never stall writers for long.
    pub scan_page_size: usize,

    /// Maximum records accepted by one insert batch (default: 10,000).
    pub max_insert_batch: usize,
}

impl Default for ExposureStoreConfig {
    fn default() -> Self {
        Self {
            scan_page_size: 256,
            max_insert_batch: 10_000,
        }
    }
}

impl ExposureStoreConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scan page size. Zero is treated as one.
    pub fn with_scan_page_size(mut self, size: usize) -> Self {
        self.scan_page_size = size.max(1);
        self
    }

    /// Set the maximum insert batch size.
    pub fn with_max_insert_batch(mut self, max: usize) -> Self {
        self.max_insert_batch = max;
        self
    }
}

/// Key prefixes for the key-value store.
///
/// All keys are prefixed to namespace different data types. Integers are
/// big-endian so lexicographic key order equals numeric order.
pub struct KeyPrefix;

impl KeyPrefix {
    /// Exposure rows: `e:{position}` -> serialized exposure.
    pub const EXPOSURE: &'static [u8] = b"e:";
    /// Creation-time index: `c:{created_at}{position}` -> empty.
    pub const CREATED_INDEX: &'static [u8] = b"c:";
    /// Next position to assign.
    pub const NEXT_POSITION: &'static [u8] = b"m:next_position";

    /// Key of the exposure row at `position`.
    pub fn exposure_key(position: SequencePosition) -> Vec<u8> {
        let mut key = Vec::with_capacity(Self::EXPOSURE.len() + 8);
        key.extend_from_slice(Self::EXPOSURE);
        key.extend_from_slice(&position.get().to_be_bytes());
        key
    }

    /// Exclusive upper bound of the exposure row range.
    pub fn exposure_end() -> Vec<u8> {
        prefix_end(Self::EXPOSURE)
    }

    /// Parse the position out of an exposure row key.
    pub fn position_from_exposure_key(key: &[u8]) -> Option<SequencePosition> {
        let raw = key.strip_prefix(Self::EXPOSURE)?;
        let bytes: [u8; 8] = raw.try_into().ok()?;
        Some(SequencePosition::new(u64::from_be_bytes(bytes)))
    }

    /// Key of the creation-time index entry for a row.
    pub fn created_index_key(created_at_micros: i64, position: SequencePosition) -> Vec<u8> {
        let mut key = Self::created_index_bound(created_at_micros);
        key.extend_from_slice(&position.get().to_be_bytes());
        key
    }

    /// Index key prefix sorting before every entry created at or after
    /// `created_at_micros`.
    pub fn created_index_bound(created_at_micros: i64) -> Vec<u8> {
        let mut key = Vec::with_capacity(Self::CREATED_INDEX.len() + 16);
        key.extend_from_slice(Self::CREATED_INDEX);
        key.extend_from_slice(&sortable_micros(created_at_micros).to_be_bytes());
        key
    }

    /// Parse the position out of a creation-time index key.
    pub fn position_from_created_index_key(key: &[u8]) -> Option<SequencePosition> {
        let raw = key.strip_prefix(Self::CREATED_INDEX)?;
        if raw.len() != 16 {
            return None;
        }
        let bytes: [u8; 8] = raw[8..].try_into().ok()?;
        Some(SequencePosition::new(u64::from_be_bytes(bytes)))
    }
}

/// Map an i64 onto u64 so unsigned big-endian order matches signed order.
fn sortable_micros(micros: i64) -> u64 {
    (micros as u64) ^ (1 << 63)
}

/// Smallest key greater than every key starting with `prefix`.
fn prefix_end(prefix: &[u8]) -> Vec<u8> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < u8::MAX {
            end.push(last + 1);
            return end;
        }
    }
    // All 0xFF: no finite upper bound; callers treat empty as unbounded.
    end
}
