//! Process-wide cooldown tracker for the upstream source.
//!
//! One guard instance is shared (via `Arc`) by every pipeline run in the
//! process. Once the upstream signals "too many requests", the guard locks
//! for a fixed window and every source call fails fast without touching the
//! network — all users fall back to cache until the window elapses. There is
//! no per-user granularity, and the check-then-call race between concurrent
//! requests is tolerated: the loser just triggers the lock again.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

pub struct CooldownGuard {
    locked_until: Mutex<Option<DateTime<Utc>>>,
}

impl CooldownGuard {
    pub fn new() -> Self {
        Self {
            locked_until: Mutex::new(None),
        }
    }

    pub fn is_locked(&self) -> bool {
        let locked_until = self.locked_until.lock().expect("guard mutex poisoned");
        matches!(*locked_until, Some(deadline) if Utc::now() < deadline)
    }

    /// Lock for `cooldown` starting now.
    pub fn lock(&self, cooldown: Duration) {
        self.lock_until(Utc::now() + cooldown);
    }

    /// Lock until an absolute deadline. Lets tests drive lock state
    /// deterministically without wall-clock waits.
    pub fn lock_until(&self, deadline: DateTime<Utc>) {
        let mut locked_until = self.locked_until.lock().expect("guard mutex poisoned");
        *locked_until = Some(deadline);
        tracing::warn!(until = %deadline, "Rate-limit guard locked");
    }
}

impl Default for CooldownGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_guard_is_unlocked() {
        assert!(!CooldownGuard::new().is_locked());
    }

    #[test]
    fn locked_until_future_deadline() {
        let guard = CooldownGuard::new();
        guard.lock_until(Utc::now() + Duration::minutes(15));
        assert!(guard.is_locked());
    }

    #[test]
    fn past_deadline_unlocks_without_any_write() {
        let guard = CooldownGuard::new();
        guard.lock_until(Utc::now() - Duration::seconds(1));
        assert!(!guard.is_locked());
    }
}
