//! Batch-token lifecycle management.
//!
//! The service issues a short-lived token that unlocks a dedicated
//! higher-throughput host for a bounded number of calls or a bounded time
//! window. The manager owns that state for one client instance and decides,
//! per outgoing call, whether the batch route applies and when the token
//! must be retired.
//!
//! The token moves between exactly two states: Empty (no token) and Active
//! (token plus expiry held, counter running). A grant moves Empty to Active
//! or replaces an Active token; hitting either cap moves Active back to
//! Empty. Nothing else transitions the state, and a failed refresh leaves
//! it untouched.

use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Calls permitted per token before it is retired.
pub const MAX_BATCH_REQUESTS: u32 = 200;

#[derive(Debug, Default)]
struct BatchTokenState {
    // token and expires_at are both present or both absent
    token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    request_count: u32,
}

/// Owner of the mutable batch-token state for one client instance.
///
/// Interior mutability behind a mutex so concurrent operations on the same
/// client do not lose counter updates. The lock is only held for short
/// non-async sections.
#[derive(Debug, Default)]
pub struct BatchTokenManager {
    state: Mutex<BatchTokenState>,
}

impl BatchTokenManager {
    /// Create a manager in the Empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BatchTokenState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a token is currently held.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.lock().token.is_some()
    }

    /// The held token, cloned for use as a bearer credential.
    #[must_use]
    pub fn current_token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    /// Calls recorded against the current token.
    #[must_use]
    pub fn request_count(&self) -> u32 {
        self.lock().request_count
    }

    /// Store a freshly issued token and its expiry, resetting the counter.
    ///
    /// Replaces any token already held.
    pub fn grant(&self, token: impl Into<String>, expires_at: DateTime<Utc>) {
        let mut state = self.lock();
        state.token = Some(token.into());
        state.expires_at = Some(expires_at);
        state.request_count = 0;
    }

    /// Drop the token, expiry, and counter.
    pub fn clear(&self) {
        *self.lock() = BatchTokenState::default();
    }

    /// Post-call bookkeeping for a batch-eligible call attempted while a
    /// token was held, success or failure alike.
    ///
    /// Increments the counter, then retires the token once `now` passes the
    /// expiry or the counter reaches [`MAX_BATCH_REQUESTS`]. The two caps
    /// are enforced independently; whichever triggers first wins.
    pub fn record_call(&self, now: DateTime<Utc>) {
        let mut state = self.lock();
        if state.token.is_none() {
            return;
        }
        state.request_count += 1;

        let expired = state.expires_at.is_some_and(|deadline| now > deadline);
        if expired || state.request_count >= MAX_BATCH_REQUESTS {
            *state = BatchTokenState::default();
        }
    }
}
