//! # Exposure Runtime
//!
//! Hosts an exposure store behind the configured backend and keeps it within
//! the retention window.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from `EXPOSURE_*` environment variables
//! 2. Open the storage backend
//! 3. Spawn the retention task
//! 4. Wait for Ctrl-C, then cancel the task and exit

pub mod backend;
pub mod config;
pub mod retention;

pub use backend::Backend;
pub use config::{BackendKind, ConfigError, RuntimeConfig};
pub use retention::{run_retention_pass, spawn_retention_task, RetentionConfig, RetentionTask};
