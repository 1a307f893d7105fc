//! # Runtime Configuration
//!
//! Settings for the exposure runtime, read from `EXPOSURE_*` environment
//! variables. Unset variables take the defaults below; set but unparseable
//! values fail startup.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use exposure_store::ExposureStoreConfig;
use thiserror::Error;

/// Longest accepted retention window (ten years).
pub const MAX_RETENTION_HOURS: u64 = 24 * 365 * 10;

/// Storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Volatile, for development.
    Memory,
    /// Single file under the data directory.
    File,
    /// RocksDB under the data directory (requires the `rocksdb` feature).
    RocksDb,
}

impl FromStr for BackendKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(BackendKind::Memory),
            "file" => Ok(BackendKind::File),
            "rocksdb" => Ok(BackendKind::RocksDb),
            _ => Err(()),
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Storage backend.
    pub backend: BackendKind,
    /// Directory holding the backend's files.
    pub data_dir: PathBuf,
    /// Exposures older than this are deleted.
    pub retention_hours: u64,
    /// Time between retention passes.
    pub cleanup_interval: Duration,
    /// Store tuning.
    pub store: ExposureStoreConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::File,
            data_dir: PathBuf::from("./data"),
            retention_hours: 14 * 24,
            cleanup_interval: Duration::from_secs(3600),
            store: ExposureStoreConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}={value:?} is not a supported backend (memory, file, rocksdb)")]
    UnknownBackend { var: &'static str, value: String },

    #[error("{var}={value:?}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl RuntimeConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load using `lookup` to resolve variable names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("EXPOSURE_BACKEND") {
            config.backend = value.parse().map_err(|_| ConfigError::UnknownBackend {
                var: "EXPOSURE_BACKEND",
                value: value.clone(),
            })?;
        }

        if let Some(value) = lookup("EXPOSURE_DATA_DIR") {
            if value.trim().is_empty() {
                return Err(invalid("EXPOSURE_DATA_DIR", value, "must not be empty"));
            }
            config.data_dir = PathBuf::from(value);
        }

        if let Some(hours) = parse_positive(&lookup, "EXPOSURE_RETENTION_HOURS")? {
            if hours > MAX_RETENTION_HOURS {
                return Err(invalid(
                    "EXPOSURE_RETENTION_HOURS",
                    hours.to_string(),
                    "exceeds ten years",
                ));
            }
            config.retention_hours = hours;
        }

        if let Some(secs) = parse_positive(&lookup, "EXPOSURE_CLEANUP_INTERVAL_SECS")? {
            config.cleanup_interval = Duration::from_secs(secs);
        }

        if let Some(size) = parse_positive(&lookup, "EXPOSURE_SCAN_PAGE_SIZE")? {
            let size = usize::try_from(size).map_err(|_| {
                invalid("EXPOSURE_SCAN_PAGE_SIZE", size.to_string(), "too large")
            })?;
            config.store = config.store.with_scan_page_size(size);
        }

        Ok(config)
    }

    /// Retention window as a signed duration for timestamp arithmetic.
    pub fn retention(&self) -> chrono::Duration {
        // Bounded by MAX_RETENTION_HOURS on load.
        chrono::Duration::hours(self.retention_hours.min(MAX_RETENTION_HOURS) as i64)
    }
}

fn invalid(var: &'static str, value: String, reason: &'static str) -> ConfigError {
    ConfigError::InvalidValue { var, value, reason }
}

fn parse_positive<F>(lookup: &F, var: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(var) else {
        return Ok(None);
    };
    match value.trim().parse::<u64>() {
        Ok(0) => Err(invalid(var, value, "must be greater than zero")),
        Ok(n) => Ok(Some(n)),
        Err(_) => Err(invalid(var, value, "not an integer")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<RuntimeConfig, ConfigError> {
        let env: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RuntimeConfig::from_lookup(|var| env.get(var).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = load(&[]).unwrap();
        assert_eq!(config.backend, BackendKind::File);
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.retention_hours, 336);
        assert_eq!(config.cleanup_interval, Duration::from_secs(3600));
        assert_eq!(config.store.scan_page_size, 256);
        assert_eq!(config.retention(), chrono::Duration::days(14));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("EXPOSURE_BACKEND", "Memory"),
            ("EXPOSURE_DATA_DIR", "/var/lib/exposures"),
            ("EXPOSURE_RETENTION_HOURS", "48"),
            ("EXPOSURE_CLEANUP_INTERVAL_SECS", "30"),
            ("EXPOSURE_SCAN_PAGE_SIZE", "1000"),
        ])
        .unwrap();
        assert_eq!(config.backend, BackendKind::Memory);
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/exposures"));
        assert_eq!(config.retention(), chrono::Duration::hours(48));
        assert_eq!(config.cleanup_interval, Duration::from_secs(30));
        assert_eq!(config.store.scan_page_size, 1000);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            load(&[("EXPOSURE_BACKEND", "postgres")]),
            Err(ConfigError::UnknownBackend { .. })
        ));
        assert!(matches!(
            load(&[("EXPOSURE_RETENTION_HOURS", "0")]),
            Err(ConfigError::InvalidValue { var: "EXPOSURE_RETENTION_HOURS", .. })
        ));
        assert!(matches!(
            load(&[("EXPOSURE_RETENTION_HOURS", "999999999")]),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            load(&[("EXPOSURE_CLEANUP_INTERVAL_SECS", "soon")]),
            Err(ConfigError::InvalidValue { reason: "not an integer", .. })
        ));
        assert!(load(&[("EXPOSURE_DATA_DIR", "  ")]).is_err());
    }
}
