//! Keyed registry of active collection sessions.
//!
//! Turns for the same key are serialized through a per-session mutex;
//! different keys only contend on the registry map itself. Sessions that
//! stay idle past the configured TTL are dropped by [`SessionManager::evict_idle`].

use crate::audit::AuditLog;
use crate::executor::ComponentChecks;
use crate::session::{
    ErrorKind, ErrorResult, PromptResult, Session, SessionConfig, SessionSnapshot,
    SuggestedAction, TurnOutcome,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Time source for idle tracking. Injected so tests can advance time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct SessionSlot {
    session: Session,
    last_activity: Instant,
}

pub struct SessionManager {
    config: SessionConfig,
    clock: Arc<dyn Clock>,
    audit: Arc<dyn AuditLog>,
    checks: Arc<dyn ComponentChecks>,
    sessions: Mutex<HashMap<String, Arc<Mutex<SessionSlot>>>>,
}

impl SessionManager {
    pub fn new(
        config: SessionConfig,
        clock: Arc<dyn Clock>,
        audit: Arc<dyn AuditLog>,
        checks: Arc<dyn ComponentChecks>,
    ) -> Self {
        Self {
            config,
            clock,
            audit,
            checks,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Begin a collection for `key`, creating the session if needed. An
    /// existing session is restarted from scratch.
    pub fn start(&self, key: &str) -> PromptResult {
        let slot = self.ensure_slot(key);
        let mut guard = lock_slot(&slot);
        guard.last_activity = self.clock.now();
        guard.session.start(self.audit.as_ref())
    }

    /// Process one input for `key`. Unknown keys are directed to `start`.
    pub fn submit(&self, key: &str, raw_input: &str) -> TurnOutcome {
        let Some(slot) = self.get_slot(key) else {
            return TurnOutcome::Error(ErrorResult {
                kind: ErrorKind::NotStarted,
                message: format!("no active collection for session `{key}`; start one first"),
                suggested_action: SuggestedAction::Start,
            });
        };
        let mut guard = lock_slot(&slot);
        guard.last_activity = self.clock.now();
        guard
            .session
            .submit(raw_input, &self.config, self.checks.as_ref(), self.audit.as_ref())
    }

    pub fn status(&self, key: &str) -> Option<SessionSnapshot> {
        let slot = self.get_slot(key)?;
        let guard = lock_slot(&slot);
        Some(guard.session.snapshot())
    }

    pub fn reset(&self, key: &str) -> PromptResult {
        let slot = self.ensure_slot(key);
        let mut guard = lock_slot(&slot);
        guard.last_activity = self.clock.now();
        guard.session.reset(self.audit.as_ref())
    }

    /// Drop sessions idle longer than the configured TTL. Returns how many
    /// were removed.
    pub fn evict_idle(&self) -> usize {
        let ttl = Duration::from_secs(self.config.idle_ttl_secs);
        let now = self.clock.now();
        let mut sessions = lock_registry(&self.sessions);
        let before = sessions.len();
        sessions.retain(|key, slot| {
            let guard = lock_slot(slot);
            let keep = now.duration_since(guard.last_activity) < ttl;
            if !keep {
                tracing::debug!(session_id = key.as_str(), "evicting idle session");
            }
            keep
        });
        before - sessions.len()
    }

    pub fn active_sessions(&self) -> usize {
        lock_registry(&self.sessions).len()
    }

    fn get_slot(&self, key: &str) -> Option<Arc<Mutex<SessionSlot>>> {
        lock_registry(&self.sessions).get(key).map(Arc::clone)
    }

    fn ensure_slot(&self, key: &str) -> Arc<Mutex<SessionSlot>> {
        let mut sessions = lock_registry(&self.sessions);
        if let Some(slot) = sessions.get(key) {
            return Arc::clone(slot);
        }
        let slot = Arc::new(Mutex::new(SessionSlot {
            session: Session::new(key),
            last_activity: self.clock.now(),
        }));
        sessions.insert(key.to_string(), Arc::clone(&slot));
        slot
    }
}

// A poisoned mutex means another turn panicked mid-update; the session data
// is still structurally valid (entries are append-only), so recover the
// guard rather than propagate the poison.
fn lock_slot(slot: &Mutex<SessionSlot>) -> std::sync::MutexGuard<'_, SessionSlot> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn lock_registry(
    registry: &Mutex<HashMap<String, Arc<Mutex<SessionSlot>>>>,
) -> std::sync::MutexGuard<'_, HashMap<String, Arc<Mutex<SessionSlot>>>> {
    registry
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::NullAuditLog;
    use crate::executor::ApprovedChecks;
    use crate::session::SessionState;

    struct ManualClock {
        now: Mutex<Instant>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                now: Mutex::new(Instant::now()),
            }
        }

        fn advance(&self, by: Duration) {
            let mut now = self.now.lock().expect("clock lock");
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *self.now.lock().expect("clock lock")
        }
    }

    fn manager_with_clock(clock: Arc<ManualClock>) -> SessionManager {
        SessionManager::new(
            SessionConfig::default(),
            clock,
            Arc::new(NullAuditLog),
            Arc::new(ApprovedChecks),
        )
    }

    #[test]
    fn submit_without_start_returns_not_started() {
        let manager = manager_with_clock(Arc::new(ManualClock::new()));
        let outcome = manager.submit("user-1", "componente-auth");
        let TurnOutcome::Error(err) = outcome else {
            panic!("expected error, got {outcome:?}");
        };
        assert_eq!(err.kind, ErrorKind::NotStarted);
        assert_eq!(err.suggested_action, SuggestedAction::Start);
        assert_eq!(manager.active_sessions(), 0);
    }

    #[test]
    fn sessions_are_isolated_by_key() {
        let manager = manager_with_clock(Arc::new(ManualClock::new()));
        manager.start("user-1");
        manager.start("user-2");

        manager.submit("user-1", "componente-auth");
        manager.submit("user-1", "2.1.0");

        let one = manager.status("user-1").expect("session one");
        let two = manager.status("user-2").expect("session two");
        assert_eq!(one.state, SessionState::AwaitingContinueConfirmation);
        assert_eq!(one.collected.len(), 1);
        assert_eq!(two.state, SessionState::AwaitingName);
        assert!(two.collected.is_empty());
    }

    #[test]
    fn idle_sessions_are_evicted_and_active_ones_survive() {
        let clock = Arc::new(ManualClock::new());
        let manager = manager_with_clock(Arc::clone(&clock));
        manager.start("stale");
        manager.start("fresh");

        clock.advance(Duration::from_secs(1700));
        manager.submit("fresh", "componente-auth");
        clock.advance(Duration::from_secs(200));

        let evicted = manager.evict_idle();
        assert_eq!(evicted, 1);
        assert!(manager.status("stale").is_none());
        assert!(manager.status("fresh").is_some());
    }

    #[test]
    fn start_on_existing_key_restarts_the_session() {
        let manager = manager_with_clock(Arc::new(ManualClock::new()));
        manager.start("user-1");
        manager.submit("user-1", "componente-auth");
        manager.submit("user-1", "2.1.0");

        let prompt = manager.start("user-1");
        assert_eq!(prompt.state, SessionState::AwaitingName);
        let snapshot = manager.status("user-1").expect("session");
        assert!(snapshot.collected.is_empty());
        assert_eq!(manager.active_sessions(), 1);
    }
}
