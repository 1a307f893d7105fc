//! # Record Validation
//!
//! Checks applied to every record before an insert batch is written. Any
//! rejection fails the whole batch.

use super::entities::Exposure;
use super::errors::ExposureError;

/// Validation limits.
pub mod limits {
    /// Maximum length of a region code.
    pub const MAX_REGION_CODE_LEN: usize = 8;
}

/// True for 1..=MAX_REGION_CODE_LEN ASCII alphanumeric characters.
pub fn is_valid_region_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= limits::MAX_REGION_CODE_LEN
        && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Validate one record; `index` is its offset in the batch.
pub fn validate_exposure(index: usize, exposure: &Exposure) -> Result<(), ExposureError> {
    if exposure.exposure_key.is_empty() {
        return Err(ExposureError::EmptyExposureKey { index });
    }
    if let Some(region) = exposure.regions.iter().find(|r| !is_valid_region_code(r)) {
        return Err(ExposureError::InvalidRegion {
            index,
            region: region.clone(),
        });
    }
    Ok(())
}

/// Validate a batch against the size limit and every record.
pub fn validate_batch(exposures: &[Exposure], max_batch: usize) -> Result<(), ExposureError> {
    if exposures.len() > max_batch {
        return Err(ExposureError::BatchTooLarge {
            size: exposures.len(),
            max: max_batch,
        });
    }
    exposures
        .iter()
        .enumerate()
        .try_for_each(|(index, exposure)| validate_exposure(index, exposure))
}
