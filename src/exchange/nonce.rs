//! Replay-protection nonces.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of per-credential nonces. Every value must be larger than the last.
pub trait NonceProvider: Send + Sync {
    fn next(&self) -> u64;
}

/// Strictly increasing nonce that follows the wall clock in milliseconds.
///
/// Two calls inside the same millisecond still get distinct values because
/// each call returns at least `last + 1`.
#[derive(Debug)]
pub struct IncreasingNonce {
    last: AtomicU64,
}

impl IncreasingNonce {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Starts after `floor`, e.g. the last nonce a key used in a previous run.
    pub fn starting_at(floor: u64) -> Self {
        Self {
            last: AtomicU64::new(floor),
        }
    }

    fn now_ms() -> u64 {
        Utc::now().timestamp_millis().max(0) as u64
    }
}

impl Default for IncreasingNonce {
    fn default() -> Self {
        Self::new()
    }
}

impl NonceProvider for IncreasingNonce {
    fn next(&self) -> u64 {
        let now = Self::now_ms();
        let prev = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(last.saturating_add(1).max(now))
            })
            .unwrap_or_else(|last| last);
        prev.saturating_add(1).max(now)
    }
}
