//! # Domain Entities
//!
//! The exposure record, its storage form, and the internal sequence position.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// A stored diagnosis key with temporal and regional metadata.
///
/// Immutable once inserted. The store assigns each exposure an internal
/// [`SequencePosition`] which is not part of this value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Exposure {
    /// Opaque diagnosis key.
    pub exposure_key: Vec<u8>,
    /// Region codes, kept in the order given.
    pub regions: Vec<String>,
    /// Index of the fixed-length interval in which the key was active.
    pub interval_number: u32,
    /// Number of consecutive intervals the key covers.
    pub interval_count: u32,
    /// Creation time, truncated to microseconds on insert.
    pub created_at: DateTime<Utc>,
    /// True if the record originated on this server.
    pub local_provenance: bool,
}

impl Exposure {
    /// True if any of this exposure's regions is in `codes`.
    pub fn has_any_region<'a, I>(&self, codes: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        codes
            .into_iter()
            .any(|code| self.regions.iter().any(|r| r == code))
    }
}

/// Truncate a timestamp to microsecond resolution.
pub fn truncate_to_micros(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(6)
}

/// Internal, strictly increasing identity of a stored row.
///
/// Defines the total scan order. Callers never see raw values; they only
/// hold cursor tokens produced by the cursor codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SequencePosition(u64);

impl SequencePosition {
    /// "Nothing scanned yet". Assigned positions start after it.
    pub const START: SequencePosition = SequencePosition(0);

    pub(crate) const fn new(value: u64) -> Self {
        SequencePosition(value)
    }

    pub(crate) const fn get(self) -> u64 {
        self.0
    }

    /// True for the "nothing scanned yet" sentinel.
    pub fn is_start(self) -> bool {
        self.0 == 0
    }

    /// The position immediately after this one, saturating at the maximum.
    pub(crate) fn successor(self) -> Self {
        SequencePosition(self.0.saturating_add(1))
    }
}

/// Storage form of an exposure.
///
/// `created_at` is kept as integer microseconds since the Unix epoch so the
/// encoding is compact and exact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredExposure {
    pub exposure_key: Vec<u8>,
    pub regions: Vec<String>,
    pub interval_number: u32,
    pub interval_count: u32,
    pub created_at_micros: i64,
    pub local_provenance: bool,
}

impl From<&Exposure> for StoredExposure {
    fn from(exposure: &Exposure) -> Self {
        Self {
            exposure_key: exposure.exposure_key.clone(),
            regions: exposure.regions.clone(),
            interval_number: exposure.interval_number,
            interval_count: exposure.interval_count,
            created_at_micros: exposure.created_at.timestamp_micros(),
            local_provenance: exposure.local_provenance,
        }
    }
}

impl StoredExposure {
    /// Rebuild the logical exposure. `None` if the stored time is out of range.
    pub fn into_exposure(self) -> Option<Exposure> {
        let created_at = DateTime::<Utc>::from_timestamp_micros(self.created_at_micros)?;
        Some(Exposure {
            exposure_key: self.exposure_key,
            regions: self.regions,
            interval_number: self.interval_number,
            interval_count: self.interval_count,
            created_at,
            local_provenance: self.local_provenance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_truncate_to_micros() {
        let ts = Utc.with_ymd_and_hms(2020, 5, 1, 0, 0, 0).unwrap()
            + chrono::Duration::nanoseconds(1_234_567);
        let truncated = truncate_to_micros(ts);
        assert_eq!(truncated.nanosecond(), 1_234_000);
    }

    #[test]
    fn test_stored_exposure_preserves_fields() {
        let exposure = Exposure {
            exposure_key: b"ABC".to_vec(),
            regions: vec!["US".into(), "CA".into(), "MX".into()],
            interval_number: 18,
            interval_count: 2,
            created_at: Utc.with_ymd_and_hms(2020, 5, 1, 1, 0, 0).unwrap(),
            local_provenance: true,
        };

        let stored = StoredExposure::from(&exposure);
        assert_eq!(stored.into_exposure(), Some(exposure));
    }

    #[test]
    fn test_has_any_region() {
        let exposure = Exposure {
            regions: vec!["MX".into(), "CA".into()],
            ..Default::default()
        };
        let us = vec!["US".to_string()];
        let ca = vec!["US".to_string(), "CA".to_string()];
        assert!(!exposure.has_any_region(&us));
        assert!(exposure.has_any_region(&ca));
    }

    #[test]
    fn test_sequence_position_ordering() {
        assert!(SequencePosition::START.is_start());
        assert!(SequencePosition::new(1) > SequencePosition::START);
        assert_eq!(SequencePosition::new(1).successor(), SequencePosition::new(2));
        assert_eq!(
            SequencePosition::new(u64::MAX).successor(),
            SequencePosition::new(u64::MAX)
        );
    }
}
