//! Cross-worker failure state: a cancellation token and a first-error cell

use crate::error::ResolveError;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag checked by every resolver worker
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Single-assignment error cell; the first recorded error wins
///
/// Recording an error also fires the associated [`CancelToken`].
#[derive(Debug, Clone)]
pub struct FirstError {
    slot: Arc<Mutex<Option<ResolveError>>>,
    token: CancelToken,
}

impl FirstError {
    pub fn new(token: CancelToken) -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            token,
        }
    }

    /// Record `err` unless an error is already stored. Returns true if it was stored.
    pub fn record(&self, err: ResolveError) -> bool {
        let stored = {
            let mut slot = self.slot.lock();
            if slot.is_some() {
                false
            } else {
                *slot = Some(err);
                true
            }
        };
        self.token.cancel();
        stored
    }

    pub fn is_set(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Take the recorded error, leaving the cell empty
    pub fn take(&self) -> Option<ResolveError> {
        self.slot.lock().take()
    }
}
