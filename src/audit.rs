//! Fire-and-forget audit trail for session transitions.
//!
//! Recording an event must never block or fail the caller; the default sink
//! forwards to `tracing` and a no-op sink exists for tests.

pub trait AuditLog: Send + Sync {
    fn record(&self, session_id: &str, event: &str, detail: &str);
}

/// Emits session events as structured log lines.
pub struct TracingAuditLog;

impl AuditLog for TracingAuditLog {
    fn record(&self, session_id: &str, event: &str, detail: &str) {
        tracing::info!(session_id, event, detail, "session event");
    }
}

/// Discards everything. Used by tests that do not assert on the trail.
pub struct NullAuditLog;

impl AuditLog for NullAuditLog {
    fn record(&self, _session_id: &str, _event: &str, _detail: &str) {}
}
