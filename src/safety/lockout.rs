// src/safety/lockout.rs

//! Timed lockout armed by the safety gate.
//!
//! Two states, Inert and Armed. Armed -> Inert happens only by the deadline
//! passing, checked lazily whenever the state is read. There is no reset.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// One hour
pub const LOCKOUT_DURATION_MS: i64 = 60 * 60 * 1000;

const MINUTE_MS: i64 = 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockoutState {
    pub armed_at_ms: i64,
    pub duration_ms: i64,
}

impl LockoutState {
    pub fn new(armed_at_ms: i64, duration_ms: i64) -> Self {
        Self {
            armed_at_ms,
            duration_ms,
        }
    }

    pub fn deadline_ms(&self) -> i64 {
        self.armed_at_ms.saturating_add(self.duration_ms)
    }

    /// `now < armed_at + duration`
    pub fn is_locked(&self, now_ms: i64) -> bool {
        now_ms < self.deadline_ms()
    }

    pub fn remaining_ms(&self, now_ms: i64) -> i64 {
        (self.deadline_ms() - now_ms).max(0)
    }

    pub fn status(&self, now_ms: i64) -> LockoutStatus {
        if self.is_locked(now_ms) {
            LockoutStatus::Locked {
                remaining_ms: self.remaining_ms(now_ms),
            }
        } else {
            LockoutStatus::Inert
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockoutStatus {
    Inert,
    Locked { remaining_ms: i64 },
}

impl LockoutStatus {
    pub fn is_locked(&self) -> bool {
        matches!(self, LockoutStatus::Locked { .. })
    }

    /// Remaining time rounded up to whole minutes; 0 when inert.
    pub fn minutes_remaining(&self) -> i64 {
        match self {
            LockoutStatus::Inert => 0,
            LockoutStatus::Locked { remaining_ms } => (remaining_ms + MINUTE_MS - 1) / MINUTE_MS,
        }
    }
}

/// Who a lockout applies to: the verified identity, else the client session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LockoutKey(String);

impl LockoutKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn for_caller(identity_id: Option<&str>, session_id: Option<&str>) -> Option<Self> {
        fn pick(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|s| !s.is_empty())
        }

        pick(identity_id)
            .map(|id| Self(format!("identity:{id}")))
            .or_else(|| pick(session_id).map(|sid| Self(format!("session:{sid}"))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Keyed lockout store.
///
/// Re-arming while armed keeps whichever deadline is later, so the remaining
/// window can grow but never shrink.
#[derive(Debug)]
pub struct LockoutClock {
    duration_ms: i64,
    states: RwLock<HashMap<LockoutKey, LockoutState>>,
}

impl Default for LockoutClock {
    fn default() -> Self {
        Self::with_duration(LOCKOUT_DURATION_MS)
    }
}

impl LockoutClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(duration_ms: i64) -> Self {
        Self {
            duration_ms,
            states: RwLock::new(HashMap::new()),
        }
    }

    pub fn duration_ms(&self) -> i64 {
        self.duration_ms
    }

    /// Arm (or extend) the lockout for `key`, anchored at `now_ms`.
    pub async fn arm(&self, key: &LockoutKey, now_ms: i64) -> LockoutState {
        self.arm_at(key, now_ms, now_ms).await
    }

    /// Re-arm from a client-persisted anchor. Anchors already past their
    /// window are dropped; anchors in the future are pulled back to `now_ms`.
    pub async fn restore(&self, key: &LockoutKey, armed_at_ms: i64, now_ms: i64) -> LockoutStatus {
        let anchor = armed_at_ms.min(now_ms);
        if !LockoutState::new(anchor, self.duration_ms).is_locked(now_ms) {
            return self.status(key, now_ms).await;
        }
        self.arm_at(key, anchor, now_ms).await.status(now_ms)
    }

    async fn arm_at(&self, key: &LockoutKey, anchor_ms: i64, now_ms: i64) -> LockoutState {
        let candidate = LockoutState::new(anchor_ms, self.duration_ms);
        let mut states = self.states.write().await;
        // Sweep expired entries for every key, not just this one
        states.retain(|_, s| s.is_locked(now_ms));

        let state = match states.get(key) {
            Some(existing)
                if existing.is_locked(now_ms) && existing.deadline_ms() >= candidate.deadline_ms() =>
            {
                *existing
            }
            _ => candidate,
        };
        states.insert(key.clone(), state);
        debug!(
            "Lockout armed for {} until {} ({} tracked)",
            key.as_str(),
            state.deadline_ms(),
            states.len()
        );
        state
    }

    /// Current status for `key`. Expired state for any key is removed on the
    /// way out.
    pub async fn status(&self, key: &LockoutKey, now_ms: i64) -> LockoutStatus {
        let (current, has_expired) = {
            let states = self.states.read().await;
            (
                states.get(key).copied(),
                states.values().any(|s| !s.is_locked(now_ms)),
            )
        };

        if !has_expired {
            return current.map_or(LockoutStatus::Inert, |s| s.status(now_ms));
        }

        let mut states = self.states.write().await;
        // Another request may have re-armed in between, so re-read after the sweep
        states.retain(|_, s| s.is_locked(now_ms));
        states
            .get(key)
            .map_or(LockoutStatus::Inert, |s| s.status(now_ms))
    }

    /// Gate used per request. Restores a client-supplied anchor when one is
    /// sent; callers without any key are judged on that anchor alone.
    pub async fn check(
        &self,
        key: Option<&LockoutKey>,
        client_armed_at_ms: Option<i64>,
        now_ms: i64,
    ) -> LockoutStatus {
        match (key, client_armed_at_ms) {
            (Some(key), Some(armed_at)) => self.restore(key, armed_at, now_ms).await,
            (Some(key), None) => self.status(key, now_ms).await,
            (None, Some(armed_at)) => {
                LockoutState::new(armed_at.min(now_ms), self.duration_ms).status(now_ms)
            }
            (None, None) => LockoutStatus::Inert,
        }
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.states.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: i64 = 1_700_000_000_000;
    const D: i64 = LOCKOUT_DURATION_MS;

    fn key() -> LockoutKey {
        LockoutKey::new("identity:user-1")
    }

    #[test]
    fn test_window_is_half_open() {
        let state = LockoutState::new(T, D);
        assert!(state.is_locked(T));
        assert!(state.is_locked(T + D - 1));
        assert!(!state.is_locked(T + D));
        assert!(!state.is_locked(T + D + 1));
    }

    #[test]
    fn test_minutes_round_up() {
        let state = LockoutState::new(T, D);
        assert_eq!(state.status(T).minutes_remaining(), 60);
        assert_eq!(state.status(T + 1).minutes_remaining(), 60);
        assert_eq!(state.status(T + D - 1).minutes_remaining(), 1);
        assert_eq!(state.status(T + D).minutes_remaining(), 0);
    }

    #[test]
    fn test_key_prefers_identity_over_session() {
        assert_eq!(
            LockoutKey::for_caller(Some("u1"), Some("s1")),
            Some(LockoutKey::new("identity:u1"))
        );
        assert_eq!(
            LockoutKey::for_caller(Some("  "), Some("s1")),
            Some(LockoutKey::new("session:s1"))
        );
        assert_eq!(LockoutKey::for_caller(None, None), None);
    }

    #[tokio::test]
    async fn test_armed_then_expires_lazily() {
        let clock = LockoutClock::new();
        clock.arm(&key(), T).await;

        assert!(clock.status(&key(), T).await.is_locked());
        assert!(clock.status(&key(), T + D - 1).await.is_locked());
        assert_eq!(clock.status(&key(), T + D).await, LockoutStatus::Inert);
        assert_eq!(clock.tracked().await, 0, "expired state should be cleared");
    }

    #[tokio::test]
    async fn test_rearm_extends_when_later() {
        let clock = LockoutClock::new();
        clock.arm(&key(), T).await;
        let extended = clock.arm(&key(), T + 10 * MINUTE_MS).await;

        assert_eq!(extended.deadline_ms(), T + 10 * MINUTE_MS + D);
        assert!(clock.status(&key(), T + D + MINUTE_MS).await.is_locked());
    }

    #[tokio::test]
    async fn test_rearm_never_shortens() {
        let clock = LockoutClock::new();
        clock.arm(&key(), T + 10 * MINUTE_MS).await;

        // Restoring an older anchor must not pull the deadline in
        let status = clock.restore(&key(), T, T + 20 * MINUTE_MS).await;
        assert_eq!(
            status,
            LockoutStatus::Locked {
                remaining_ms: D - 10 * MINUTE_MS
            }
        );
        assert!(clock.status(&key(), T + D + 5 * MINUTE_MS).await.is_locked());
    }

    #[tokio::test]
    async fn test_restore_rearms_only_inside_window() {
        let clock = LockoutClock::new();

        let status = clock.restore(&key(), T, T + 30 * MINUTE_MS).await;
        assert_eq!(status.minutes_remaining(), 30);

        let fresh = LockoutClock::new();
        let stale = fresh.restore(&key(), T, T + D).await;
        assert_eq!(stale, LockoutStatus::Inert);
        assert_eq!(fresh.tracked().await, 0);
    }

    #[tokio::test]
    async fn test_future_anchor_is_clamped() {
        let clock = LockoutClock::new();
        let status = clock.restore(&key(), T + 5 * D, T).await;
        assert_eq!(status, LockoutStatus::Locked { remaining_ms: D });
    }

    #[tokio::test]
    async fn test_check_without_key_uses_client_anchor() {
        let clock = LockoutClock::new();
        assert!(clock.check(None, Some(T), T + 1).await.is_locked());
        assert!(!clock.check(None, Some(T), T + D).await.is_locked());
        assert!(!clock.check(None, None, T).await.is_locked());
        assert_eq!(clock.tracked().await, 0);
    }

    #[tokio::test]
    async fn test_expired_keys_are_swept_by_other_callers() {
        let clock = LockoutClock::new();
        for i in 0..500 {
            let stranger = LockoutKey::new(format!("session:s{i}"));
            clock.check(Some(&stranger), Some(T), T).await;
        }
        assert_eq!(clock.tracked().await, 500);

        // A status read for an unrelated key clears everything past its window
        assert_eq!(clock.check(Some(&key()), None, T + 2 * D).await, LockoutStatus::Inert);
        assert_eq!(clock.tracked().await, 0);

        // Arming sweeps too
        for i in 0..10 {
            clock.arm(&LockoutKey::new(format!("session:a{i}")), T).await;
        }
        clock.arm(&key(), T + 2 * D).await;
        assert_eq!(clock.tracked().await, 1);
    }

    #[test]
    fn test_key_values_are_trimmed() {
        assert_eq!(
            LockoutKey::for_caller(Some(" u1 "), None),
            Some(LockoutKey::new("identity:u1"))
        );
        assert_eq!(
            LockoutKey::for_caller(None, Some("\ttab-3 ")),
            Some(LockoutKey::new("session:tab-3"))
        );
    }
}
