//! Login attempt throttling.
//!
//! After too many consecutive failures the login form is locked for a cooldown
//! period. State lives behind an [`AttemptStore`] so it can be kept in memory,
//! in a JSON file, or anywhere else the caller chooses.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::StoreError;

/// Persisted tracker state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptState {
    pub failures: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_until: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remembered_email: Option<String>,
}

/// Persistence for [`AttemptState`]
pub trait AttemptStore {
    fn load(&self) -> Result<AttemptState, StoreError>;
    fn save(&self, state: &AttemptState) -> Result<(), StoreError>;
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<AttemptState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AttemptStore for MemoryStore {
    fn load(&self) -> Result<AttemptState, StoreError> {
        Ok(self
            .state
            .lock()
            .map(|s| s.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone()))
    }

    fn save(&self, state: &AttemptState) -> Result<(), StoreError> {
        match self.state.lock() {
            Ok(mut guard) => *guard = state.clone(),
            Err(poisoned) => *poisoned.into_inner() = state.clone(),
        }
        Ok(())
    }
}

/// JSON file store. A missing file reads as a fresh state.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AttemptStore for JsonFileStore {
    fn load(&self) -> Result<AttemptState, StoreError> {
        if !self.path.exists() {
            return Ok(AttemptState::default());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, state: &AttemptState) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

/// Throttling policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttemptPolicy {
    /// Consecutive failures that trigger a lock
    pub max_attempts: u32,
    pub lockout_minutes: i64,
}

impl Default for AttemptPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            lockout_minutes: 15,
        }
    }
}

impl AttemptPolicy {
    /// Lock duration; negative values count as zero and out-of-range values
    /// saturate at [`Duration::MAX`]
    pub fn lockout(&self) -> Duration {
        Duration::try_minutes(self.lockout_minutes.max(0)).unwrap_or(Duration::MAX)
    }
}

/// Result of a login attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    Failure,
}

/// Tracks consecutive login failures and the resulting lock
pub struct AttemptTracker<S: AttemptStore> {
    store: S,
    policy: AttemptPolicy,
    state: AttemptState,
}

impl<S: AttemptStore> AttemptTracker<S> {
    /// Load state from the store. An unreadable store starts fresh.
    pub fn new(store: S, policy: AttemptPolicy) -> Self {
        let state = store.load().unwrap_or_else(|e| {
            warn!("Could not load login attempt state, starting fresh: {}", e);
            AttemptState::default()
        });
        Self {
            store,
            policy,
            state,
        }
    }

    pub fn state(&self) -> &AttemptState {
        &self.state
    }

    pub fn policy(&self) -> AttemptPolicy {
        self.policy
    }

    /// Record an attempt made at `now`.
    ///
    /// Failures while locked are ignored and do not extend the lock. Once a
    /// lock has expired the counter restarts from zero.
    pub fn record(&mut self, outcome: AttemptOutcome, now: DateTime<Utc>) -> Result<(), StoreError> {
        self.expire(now);

        match outcome {
            AttemptOutcome::Success => {
                self.state.failures = 0;
                self.state.locked_until = None;
            }
            AttemptOutcome::Failure if self.is_blocked(now) => {
                debug!("Login attempt while locked, ignored");
                return Ok(());
            }
            AttemptOutcome::Failure => {
                self.state.failures += 1;
                if self.state.failures >= self.policy.max_attempts {
                    let until = now
                        .checked_add_signed(self.policy.lockout())
                        .unwrap_or(DateTime::<Utc>::MAX_UTC);
                    info!(
                        "{} failed login attempts, locking until {}",
                        self.state.failures, until
                    );
                    self.state.locked_until = Some(until);
                }
            }
        }

        self.store.save(&self.state)
    }

    pub fn is_blocked(&self, now: DateTime<Utc>) -> bool {
        self.state.locked_until.is_some_and(|until| now < until)
    }

    /// Time left before attempts are accepted again, `None` when not blocked
    pub fn remaining_cooldown(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.state
            .locked_until
            .filter(|until| now < *until)
            .map(|until| until - now)
    }

    /// Failures left before a lock
    pub fn attempts_left(&self, now: DateTime<Utc>) -> u32 {
        if self.is_blocked(now) {
            return 0;
        }
        let failures = match self.state.locked_until {
            Some(_) => 0,
            None => self.state.failures,
        };
        self.policy.max_attempts.saturating_sub(failures)
    }

    pub fn remembered_email(&self) -> Option<&str> {
        self.state.remembered_email.as_deref()
    }

    /// Remember (or forget, with `None`) the email used on the login form
    pub fn remember_email(&mut self, email: Option<&str>) -> Result<(), StoreError> {
        self.state.remembered_email = email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty());
        self.store.save(&self.state)
    }

    fn expire(&mut self, now: DateTime<Utc>) {
        if self.state.locked_until.is_some_and(|until| now >= until) {
            debug!("Login lock expired");
            self.state.locked_until = None;
            self.state.failures = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn tracker() -> AttemptTracker<MemoryStore> {
        AttemptTracker::new(MemoryStore::new(), AttemptPolicy::default())
    }

    fn fail(t: &mut AttemptTracker<impl AttemptStore>, n: u32, now: DateTime<Utc>) {
        for _ in 0..n {
            t.record(AttemptOutcome::Failure, now).unwrap();
        }
    }

    #[test]
    fn test_blocks_after_max_failures() {
        let mut t = tracker();
        fail(&mut t, 4, at(0));
        assert!(!t.is_blocked(at(0)));
        assert_eq!(t.attempts_left(at(0)), 1);

        fail(&mut t, 1, at(10));
        assert!(t.is_blocked(at(10)));
        assert_eq!(t.remaining_cooldown(at(10)), Some(Duration::minutes(15)));
        assert_eq!(t.attempts_left(at(10)), 0);
    }

    #[test]
    fn test_cooldown_counts_down_and_expires() {
        let mut t = tracker();
        fail(&mut t, 5, at(0));
        assert_eq!(t.remaining_cooldown(at(600)), Some(Duration::minutes(5)));
        assert!(!t.is_blocked(at(900)));
        assert_eq!(t.remaining_cooldown(at(900)), None);
        assert_eq!(t.attempts_left(at(900)), 5);

        // Counter restarts after the lock expires
        fail(&mut t, 1, at(901));
        assert_eq!(t.state().failures, 1);
        assert!(t.state().locked_until.is_none());
    }

    #[test]
    fn test_failures_while_locked_do_not_extend_lock() {
        let mut t = tracker();
        fail(&mut t, 5, at(0));
        fail(&mut t, 3, at(100));
        assert_eq!(t.state().locked_until, Some(at(900)));
    }

    #[test]
    fn test_success_resets() {
        let mut t = tracker();
        fail(&mut t, 3, at(0));
        t.record(AttemptOutcome::Success, at(1)).unwrap();
        assert_eq!(t.state().failures, 0);
        assert_eq!(t.attempts_left(at(1)), 5);
    }

    #[test]
    fn test_custom_policy() {
        let policy = AttemptPolicy {
            max_attempts: 2,
            lockout_minutes: 1,
        };
        let mut t = AttemptTracker::new(MemoryStore::new(), policy);
        fail(&mut t, 2, at(0));
        assert!(t.is_blocked(at(59)));
        assert!(!t.is_blocked(at(60)));
    }

    #[test]
    fn test_out_of_range_lockout_saturates() {
        let policy = AttemptPolicy {
            max_attempts: 1,
            lockout_minutes: i64::MAX,
        };
        assert_eq!(policy.lockout(), Duration::MAX);

        let mut t = AttemptTracker::new(MemoryStore::new(), policy);
        fail(&mut t, 1, at(0));
        assert!(t.is_blocked(at(365 * 86_400)));
        assert!(t.remaining_cooldown(at(0)).is_some());
    }

    #[test]
    fn test_negative_lockout_does_not_lock() {
        let policy = AttemptPolicy {
            max_attempts: 1,
            lockout_minutes: -5,
        };
        assert_eq!(policy.lockout(), Duration::zero());

        let mut t = AttemptTracker::new(MemoryStore::new(), policy);
        fail(&mut t, 1, at(0));
        assert!(!t.is_blocked(at(0)));
    }

    #[test]
    fn test_remembered_email() {
        let mut t = tracker();
        t.remember_email(Some(" user@vitarenta.tn ")).unwrap();
        assert_eq!(t.remembered_email(), Some("user@vitarenta.tn"));
        t.remember_email(None).unwrap();
        assert_eq!(t.remembered_email(), None);
    }

    #[test]
    fn test_json_file_store_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attempts.json");

        let mut t = AttemptTracker::new(JsonFileStore::new(&path), AttemptPolicy::default());
        fail(&mut t, 5, at(0));
        t.remember_email(Some("a@b.tn")).unwrap();

        let reloaded = AttemptTracker::new(JsonFileStore::new(&path), AttemptPolicy::default());
        assert!(reloaded.is_blocked(at(60)));
        assert_eq!(reloaded.remembered_email(), Some("a@b.tn"));
    }

    #[test]
    fn test_corrupt_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attempts.json");
        fs::write(&path, "not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));

        let t = AttemptTracker::new(store, AttemptPolicy::default());
        assert_eq!(t.state(), &AttemptState::default());
    }
}
