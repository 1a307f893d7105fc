//! # Iterate Criteria
//!
//! The fixed filter set applied during a scan, and its evaluator.
//!
//! All checks are conjunctive. An empty or unset field imposes nothing.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use super::entities::Exposure;

/// Filters and resume point for one iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IterateCriteria {
    /// If non-empty, a record must share at least one region with this set.
    pub include_regions: BTreeSet<String>,
    /// If non-empty, a record must share no region with this set.
    pub exclude_regions: BTreeSet<String>,
    /// Inclusive lower bound on `created_at`.
    pub since_timestamp: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `created_at`.
    pub until_timestamp: Option<DateTime<Utc>>,
    /// Resume token from a previous iteration. Empty starts from the beginning.
    pub last_cursor: String,
}

impl IterateCriteria {
    /// Criteria matching every record from the beginning.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_include_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_regions = regions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_exclude_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_regions = regions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.since_timestamp = Some(since);
        self
    }

    pub fn with_until(mut self, until: DateTime<Utc>) -> Self {
        self.until_timestamp = Some(until);
        self
    }

    pub fn with_last_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.last_cursor = cursor.into();
        self
    }

    /// Decide whether `exposure` passes every filter.
    pub fn matches(&self, exposure: &Exposure) -> bool {
        if !self.include_regions.is_empty() && !exposure.has_any_region(&self.include_regions) {
            return false;
        }
        if !self.exclude_regions.is_empty() && exposure.has_any_region(&self.exclude_regions) {
            return false;
        }
        if let Some(since) = self.since_timestamp {
            if exposure.created_at < since {
                return false;
            }
        }
        if let Some(until) = self.until_timestamp {
            if exposure.created_at >= until {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 5, 1, 0, 0, 0).unwrap()
    }

    fn exposure(regions: &[&str], hours: i64) -> Exposure {
        Exposure {
            exposure_key: b"key".to_vec(),
            regions: regions.iter().map(|r| r.to_string()).collect(),
            created_at: base_time() + Duration::hours(hours),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_criteria_matches_everything() {
        let criteria = IterateCriteria::new();
        assert!(criteria.matches(&exposure(&[], 0)));
        assert!(criteria.matches(&exposure(&["US"], 5)));
    }

    #[test]
    fn test_include_regions_requires_overlap() {
        let criteria = IterateCriteria::new().with_include_regions(["US"]);
        assert!(criteria.matches(&exposure(&["US", "CA", "MX"], 0)));
        assert!(!criteria.matches(&exposure(&["CA"], 0)));
        // A record without regions cannot overlap a non-empty include set
        assert!(!criteria.matches(&exposure(&[], 0)));
    }

    #[test]
    fn test_exclude_regions_rejects_any_overlap() {
        let criteria = IterateCriteria::new().with_exclude_regions(["US"]);
        assert!(!criteria.matches(&exposure(&["US", "CA", "MX"], 0)));
        assert!(criteria.matches(&exposure(&["MX", "CA"], 0)));
        assert!(criteria.matches(&exposure(&[], 0)));
    }

    #[test]
    fn test_include_and_exclude_combine() {
        let criteria = IterateCriteria::new()
            .with_include_regions(["CA"])
            .with_exclude_regions(["MX"]);
        assert!(criteria.matches(&exposure(&["CA"], 0)));
        assert!(!criteria.matches(&exposure(&["MX", "CA"], 0)));
        assert!(!criteria.matches(&exposure(&["US"], 0)));
    }

    #[test]
    fn test_since_is_inclusive() {
        let criteria = IterateCriteria::new().with_since(base_time() + Duration::hours(2));
        assert!(!criteria.matches(&exposure(&[], 1)));
        assert!(criteria.matches(&exposure(&[], 2)));
        assert!(criteria.matches(&exposure(&[], 3)));
    }

    #[test]
    fn test_until_is_exclusive() {
        let criteria = IterateCriteria::new().with_until(base_time() + Duration::hours(2));
        assert!(criteria.matches(&exposure(&[], 1)));
        assert!(!criteria.matches(&exposure(&[], 2)));
    }

    #[test]
    fn test_contradictory_criteria_match_nothing() {
        let criteria = IterateCriteria::new()
            .with_include_regions(["US"])
            .with_exclude_regions(["US"]);
        assert!(!criteria.matches(&exposure(&["US"], 0)));

        let empty_window = IterateCriteria::new()
            .with_since(base_time() + Duration::hours(3))
            .with_until(base_time() + Duration::hours(1));
        for hour in 0..5 {
            assert!(!empty_window.matches(&exposure(&[], hour)));
        }
    }
}
