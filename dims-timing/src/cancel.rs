//! Cancellable trigger pair for a single trial.
//!
//! A [`Deadline`] and a [`ResponseListener`] are armed against the same
//! [`CancellationToken`]. Whichever trigger resolves the trial cancels the
//! token, and a cancelled token disarms both.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the token. Returns `true` only for the call that actually
    /// flipped it.
    pub fn cancel(&self) -> bool {
        !self.cancelled.swap(true, Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Fires once when its due time is reached, unless the token was cancelled
/// first.
#[derive(Debug, Clone)]
pub struct Deadline {
    due_ns: u64,
    token: CancellationToken,
}

impl Deadline {
    pub fn arm(token: &CancellationToken, now_ns: u64, duration: Duration) -> Self {
        let due_ns = now_ns.saturating_add(duration.as_nanos() as u64);
        debug!(due_ns, "deadline armed");
        Self {
            due_ns,
            token: token.clone(),
        }
    }

    pub fn due_ns(&self) -> u64 {
        self.due_ns
    }

    pub fn is_armed(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Time left before the deadline; `None` once disarmed.
    pub fn remaining(&self, now_ns: u64) -> Option<Duration> {
        self.is_armed()
            .then(|| Duration::from_nanos(self.due_ns.saturating_sub(now_ns)))
    }

    /// Fires if due and still armed. Firing cancels the shared token.
    pub fn fire(&self, now_ns: u64) -> bool {
        now_ns >= self.due_ns && self.token.cancel()
    }
}

/// Accepts the first press of a valid key, then disarms itself.
#[derive(Debug, Clone)]
pub struct ResponseListener {
    valid: BTreeSet<u32>,
    matched: bool,
    token: CancellationToken,
}

impl ResponseListener {
    pub fn arm(token: &CancellationToken, valid: impl IntoIterator<Item = u32>) -> Self {
        Self {
            valid: valid.into_iter().collect(),
            matched: false,
            token: token.clone(),
        }
    }

    pub fn is_armed(&self) -> bool {
        !self.matched && !self.token.is_cancelled()
    }

    /// Returns `true` if `key` is accepted as the response.
    pub fn accept(&mut self, key: u32) -> bool {
        if !self.is_armed() || !self.valid.contains(&key) {
            return false;
        }
        self.matched = true;
        true
    }
}
