//! Cooperative cancellation.
//!
//! Every edit bumps a shared request generation. A long query takes a token
//! when it starts and checks it between documents; once the counter has
//! moved on, the query's results would describe stale text and it stops.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

/// The query observed a newer edit and stopped.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("request cancelled by a newer edit")]
pub struct Cancelled;

/// Monotonic counter bumped on every edit.
#[derive(Debug, Default)]
pub struct RequestGeneration(AtomicU64);

impl RequestGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    /// Advance the counter, cancelling every outstanding token.
    pub fn bump(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// A token that is cancelled by the next bump.
    pub fn token(self: &Arc<Self>) -> CancellationToken {
        CancellationToken {
            started_at: self.current(),
            counter: Some(Arc::clone(self)),
        }
    }
}

/// A query's view of the request generation when it started.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    counter: Option<Arc<RequestGeneration>>,
    started_at: u64,
}

impl CancellationToken {
    /// A token that is never cancelled.
    pub fn never() -> Self {
        Self {
            counter: None,
            started_at: 0,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.counter
            .as_ref()
            .is_some_and(|counter| counter.current() != self.started_at)
    }

    /// `Err(Cancelled)` once a newer edit has arrived.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() { Err(Cancelled) } else { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_cancels_outstanding_tokens() {
        let counter = Arc::new(RequestGeneration::new());
        let token = counter.token();
        assert_eq!(token.check(), Ok(()));

        counter.bump();
        assert!(token.is_cancelled());
        assert_eq!(token.check(), Err(Cancelled));

        let fresh = counter.token();
        assert!(!fresh.is_cancelled());
    }

    #[test]
    fn test_never() {
        assert!(!CancellationToken::never().is_cancelled());
    }
}
