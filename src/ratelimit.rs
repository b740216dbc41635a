//! Client-side request budget.
//!
//! A token bucket that refills all at once: after a full window has passed
//! since the last refill, the next `acquire` resets the bucket to capacity
//! and releases every queued waiter in FIFO order. There is no background
//! timer, so queued callers only wake when a later `acquire` observes that
//! the window has elapsed.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Default number of requests allowed per window.
pub const DEFAULT_LIMIT_PER_MINUTE: u32 = 20;

/// Window length used by `RateLimiter::per_minute`.
pub const MINUTE: Duration = Duration::from_secs(60);

struct BucketState {
    capacity: u32,
    available: u32,
    last_refill: Instant,
    waiters: VecDeque<oneshot::Sender<()>>,
}

/// Process-wide admission gate for outbound analysis requests.
///
/// Share it behind an `Arc`; every state transition happens under one lock.
pub struct RateLimiter {
    window: Duration,
    state: Mutex<BucketState>,
}

impl RateLimiter {
    /// Create a limiter that starts full.
    pub fn new(capacity: u32, window: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            window,
            state: Mutex::new(BucketState {
                capacity,
                available: capacity,
                last_refill: Instant::now(),
                waiters: VecDeque::new(),
            }),
        }
    }

    /// Create a limiter allowing `limit` requests per minute.
    pub fn per_minute(limit: u32) -> Self {
        Self::new(limit, MINUTE)
    }

    /// Change the capacity. Available tokens are capped to the new capacity
    /// but never raised.
    pub fn configure(&self, limit_per_window: u32) {
        let mut state = self.lock();
        state.capacity = limit_per_window.max(1);
        state.available = state.available.min(state.capacity);
        tracing::debug!(
            capacity = state.capacity,
            available = state.available,
            "rate limiter reconfigured"
        );
    }

    /// Wait for a token and consume it.
    ///
    /// Resolves immediately when a token is available. Otherwise the caller
    /// is queued until a later `acquire` triggers a refill.
    pub async fn acquire(&self) {
        let rx = {
            let mut state = self.lock();
            self.refill_if_due(&mut state);

            if state.available > 0 {
                state.available -= 1;
                return;
            }

            let (tx, rx) = oneshot::channel();
            state.waiters.push_back(tx);
            tracing::debug!(waiting = state.waiters.len(), "rate limit reached, queueing request");
            rx
        };

        // The sender is only dropped after sending, or with the limiter itself.
        let _ = rx.await;
    }

    /// Run the refill check without taking a token.
    ///
    /// `acquire` never wakes queued callers on its own schedule; a caller
    /// that wants waiters released on time can tick the limiter
    /// periodically (see `spawn_ticker`).
    pub fn tick(&self) {
        let mut state = self.lock();
        self.refill_if_due(&mut state);
    }

    fn refill_if_due(&self, state: &mut BucketState) {
        let now = Instant::now();
        if now.duration_since(state.last_refill) < self.window {
            return;
        }

        state.available = state.capacity;
        state.last_refill = now;

        let pending = std::mem::take(&mut state.waiters);
        let mut released = 0usize;
        for waiter in pending {
            // A closed receiver means the caller gave up; it takes no token.
            if waiter.is_closed() {
                continue;
            }
            state.available = state.available.saturating_sub(1);
            if waiter.send(()).is_ok() {
                released += 1;
            }
        }

        tracing::debug!(
            capacity = state.capacity,
            available = state.available,
            released,
            "rate limiter window refilled"
        );
    }

    /// Tokens currently available.
    pub fn available(&self) -> u32 {
        self.lock().available
    }

    /// Current capacity per window.
    pub fn capacity(&self) -> u32 {
        self.lock().capacity
    }

    /// Number of callers queued for the next refill.
    pub fn waiting(&self) -> usize {
        self.lock().waiters.len()
    }

    /// Length of one refill window.
    pub fn window(&self) -> Duration {
        self.window
    }

    fn lock(&self) -> MutexGuard<'_, BucketState> {
        // The critical sections never panic, so a poisoned lock still holds
        // consistent counters.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::per_minute(DEFAULT_LIMIT_PER_MINUTE)
    }
}

/// Tick `limiter` every `period` until the returned handle is aborted.
pub fn spawn_ticker(limiter: Arc<RateLimiter>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            limiter.tick();
        }
    })
}
