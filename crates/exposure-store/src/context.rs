//! # Scan Context
//!
//! Cooperative cancellation and deadlines for long-running scans.
//!
//! A `ScanContext` is passed by reference through the iteration call chain
//! and polled between records. Nothing is ever interrupted mid-record: a
//! cancelled scan finishes the record in flight and stops before the next.

use std::time::{Duration, Instant};

use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Why a scan context is no longer live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    /// `cancel()` was called on this context or one of its ancestors.
    #[error("context canceled")]
    Canceled,
    /// The context deadline has passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Cancellation signal plus optional deadline.
///
/// Cloning shares the underlying token: cancelling any clone cancels all.
/// Use [`ScanContext::child`] for a context that can be cancelled on its
/// own while still observing its parent.
#[derive(Debug, Clone)]
pub struct ScanContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Default for ScanContext {
    fn default() -> Self {
        Self::background()
    }
}

impl ScanContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    /// A context that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// A context that expires `timeout` from now.
    ///
    /// A timeout too large to represent as an `Instant` never expires.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// Derive a context cancelled together with `self`, cancellable alone.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Derive a child whose deadline is the earlier of `self`'s and `deadline`.
    pub fn child_with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    /// Cancel this context and all children.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// The underlying token, for use with `tokio::select!`.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// `None` while live; otherwise the reason the context ended.
    ///
    /// Explicit cancellation wins over an expired deadline.
    pub fn err(&self) -> Option<ContextError> {
        if self.token.is_cancelled() {
            return Some(ContextError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }
}
