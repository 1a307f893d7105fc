//! # Domain Errors
//!
//! Error types for the Exposure Store.
//!
//! ## Taxonomy
//!
//! | Kind | Variants | Effect |
//! |------|----------|--------|
//! | Validation | `MalformedCursor`, `EmptyExposureKey`, `InvalidRegion`, `BatchTooLarge`, `ZeroTimestamp` | operation has no effect |
//! | Cancellation | `Cancelled` | partial progress, resumable cursor |
//! | Callback | `Callback` (or any error a callback returns) | propagated unchanged |
//! | Storage | `Storage`, `Serialization`, `CorruptRow` | surfaced without retry |

use thiserror::Error;

use crate::context::ContextError;

/// Errors that can occur during exposure store operations.
#[derive(Debug, Error)]
pub enum ExposureError {
    /// Cursor token could not be decoded to a position.
    #[error("malformed cursor {token:?}: {reason}")]
    MalformedCursor { token: String, reason: &'static str },

    /// Exposure at `index` in the batch has an empty diagnosis key.
    #[error("exposure {index}: diagnosis key is empty")]
    EmptyExposureKey { index: usize },

    /// Exposure at `index` in the batch carries a malformed region code.
    #[error("exposure {index}: invalid region code {region:?}")]
    InvalidRegion { index: usize, region: String },

    /// Insert batch exceeds the configured limit.
    #[error("insert batch too large: {size} records, max {max}")]
    BatchTooLarge { size: usize, max: usize },

    /// Deletion cutoff was the zero timestamp.
    #[error("deletion cutoff must not be the zero timestamp")]
    ZeroTimestamp,

    /// The scan context was cancelled or its deadline passed.
    #[error(transparent)]
    Cancelled(#[from] ContextError),

    /// A consumer callback asked to stop with its own error.
    #[error("callback stopped iteration: {0}")]
    Callback(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Backing key-value store failure.
    #[error("storage error: {0}")]
    Storage(#[from] KVStoreError),

    /// Row encoding or decoding failure.
    #[error(transparent)]
    Serialization(#[from] SerializationError),

    /// A row key in the exposure table was not a valid position.
    #[error("corrupt row key: {key:02x?}")]
    CorruptRow { key: Vec<u8> },
}

/// Coarse classification of an [`ExposureError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Cancellation,
    Callback,
    Storage,
}

impl ExposureError {
    /// Wrap a consumer error so a callback can stop iteration with it.
    pub fn callback(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        ExposureError::Callback(err.into())
    }

    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExposureError::MalformedCursor { .. }
            | ExposureError::EmptyExposureKey { .. }
            | ExposureError::InvalidRegion { .. }
            | ExposureError::BatchTooLarge { .. }
            | ExposureError::ZeroTimestamp => ErrorKind::Validation,
            ExposureError::Cancelled(_) => ErrorKind::Cancellation,
            ExposureError::Callback(_) => ErrorKind::Callback,
            ExposureError::Storage(_)
            | ExposureError::Serialization(_)
            | ExposureError::CorruptRow { .. } => ErrorKind::Storage,
        }
    }
}

/// Failure of a streaming iteration, paired with the cursor to resume from.
///
/// `cursor` encodes the last position that was fully processed before the
/// failure. Passing it back as `last_cursor` with unchanged criteria resumes
/// strictly after that position.
#[derive(Debug, Error)]
#[error("{source} (resume cursor {cursor:?})")]
pub struct IterationError {
    /// Resume token; empty means "start from the beginning".
    pub cursor: String,
    /// The error that stopped iteration, unchanged.
    #[source]
    pub source: ExposureError,
}

impl IterationError {
    pub(crate) fn new(cursor: String, source: ExposureError) -> Self {
        Self { cursor, source }
    }

    /// True if iteration stopped because the scan context was cancelled
    /// or its deadline passed.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.source, ExposureError::Cancelled(_))
    }

    /// Split into the resume cursor and the underlying error.
    pub fn into_parts(self) -> (String, ExposureError) {
        (self.cursor, self.source)
    }
}

/// Key-value store errors.
#[derive(Debug, Clone, Error)]
pub enum KVStoreError {
    /// I/O error during read/write.
    #[error("KV store I/O error: {message}")]
    IOError { message: String },
    /// Data corruption in the store.
    #[error("KV store corruption: {message}")]
    CorruptionError { message: String },
    /// Key not found.
    #[error("Key not found in KV store")]
    NotFound,
}

/// Serialization errors.
#[derive(Debug, Clone, Error)]
#[error("Serialization error: {message}")]
pub struct SerializationError {
    pub message: String,
}
