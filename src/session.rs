//! Guided collection state machine.
//!
//! Drives a turn-by-turn dialogue that gathers an ordered list of
//! (component, version) pairs from an operator, then validates every entry
//! through the executor. Each turn is processed synchronously to completion;
//! invalid input never changes state or data, so the operator can simply
//! retry.

use crate::audit::AuditLog;
use crate::executor::{validate_component, ComponentChecks};
use crate::model::{check_name, check_version, ComponentEntry, FieldError, ValidationVerdict};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowercased inputs accepted as "add another component".
pub const AFFIRMATIVE_ANSWERS: &[&str] = &["sim", "s", "yes", "y", "1", "ok"];

/// Lowercased inputs accepted as "finish the collection".
pub const NEGATIVE_ANSWERS: &[&str] = &["não", "nao", "n", "no", "0", "fim", "finalizar"];

/// Tunable limits for a collection session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum accepted length for a single operator input, in bytes.
    #[serde(default = "default_max_input_len")]
    pub max_input_len: usize,
    /// Sessions idle longer than this are eligible for eviction.
    #[serde(default = "default_idle_ttl_secs")]
    pub idle_ttl_secs: u64,
}

fn default_max_input_len() -> usize {
    200
}

fn default_idle_ttl_secs() -> u64 {
    1800
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_input_len: default_max_input_len(),
            idle_ttl_secs: default_idle_ttl_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Initial,
    AwaitingName,
    AwaitingVersion,
    AwaitingContinueConfirmation,
    Finalizing,
    Finalized,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Initial => "initial",
            SessionState::AwaitingName => "awaiting_name",
            SessionState::AwaitingVersion => "awaiting_version",
            SessionState::AwaitingContinueConfirmation => "awaiting_continue_confirmation",
            SessionState::Finalizing => "finalizing",
            SessionState::Finalized => "finalized",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies an error result so callers can branch without string checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    EmptyCollection,
    NotStarted,
    AlreadyFinalized,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    Retry,
    Restart,
    Start,
}

impl SuggestedAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestedAction::Retry => "retry",
            SuggestedAction::Restart => "restart",
            SuggestedAction::Start => "start",
        }
    }
}

impl fmt::Display for SuggestedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptResult {
    pub state: SessionState,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResult {
    pub kind: ErrorKind,
    pub message: String,
    pub suggested_action: SuggestedAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalResult {
    pub collected: Vec<ComponentEntry>,
    pub verdicts: Vec<ValidationVerdict>,
    pub processed: usize,
    pub valid: usize,
    pub failed: usize,
    pub summary: String,
}

/// Outcome of one operator turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TurnOutcome {
    Prompt(PromptResult),
    Final(FinalResult),
    Error(ErrorResult),
}

/// Read-only view of a session for status queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: String,
    pub state: SessionState,
    pub collected: Vec<ComponentEntry>,
    pub pending_name: Option<String>,
}

/// One operator's in-flight collection.
///
/// Mutated exclusively through [`Session::start`], [`Session::submit`] and
/// [`Session::reset`]; entries are immutable once appended.
#[derive(Debug)]
pub struct Session {
    id: String,
    state: SessionState,
    collected: Vec<ComponentEntry>,
    pending_name: Option<String>,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: SessionState::Initial,
            collected: Vec::new(),
            pending_name: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            state: self.state,
            collected: self.collected.clone(),
            pending_name: self.pending_name.clone(),
        }
    }

    /// Begin (or re-begin) the collection dialogue with a greeting prompt.
    pub fn start(&mut self, audit: &dyn AuditLog) -> PromptResult {
        self.state = SessionState::AwaitingName;
        self.collected.clear();
        self.pending_name = None;
        audit.record(&self.id, "session_started", "");
        PromptResult {
            state: self.state,
            message: greeting_prompt(),
        }
    }

    /// Clear everything and return to the initial greeting.
    pub fn reset(&mut self, audit: &dyn AuditLog) -> PromptResult {
        audit.record(&self.id, "session_reset", "");
        self.start(audit)
    }

    /// Process one operator input against the current state.
    pub fn submit(
        &mut self,
        raw_input: &str,
        config: &SessionConfig,
        checks: &dyn ComponentChecks,
        audit: &dyn AuditLog,
    ) -> TurnOutcome {
        match self.state {
            SessionState::Initial => TurnOutcome::Error(not_started_error()),
            SessionState::AwaitingName => self.handle_name(raw_input, config, audit),
            SessionState::AwaitingVersion => self.handle_version(raw_input, config, audit),
            SessionState::AwaitingContinueConfirmation => {
                self.handle_confirmation(raw_input, checks, audit)
            }
            // Finalizing is transient within a single turn; observing it here
            // means a prior turn failed mid-finalization. The session stays
            // resettable.
            SessionState::Finalizing | SessionState::Finalized => {
                TurnOutcome::Error(ErrorResult {
                    kind: ErrorKind::AlreadyFinalized,
                    message: "this collection has already been finalized; restart to begin a new one"
                        .to_string(),
                    suggested_action: SuggestedAction::Restart,
                })
            }
        }
    }

    fn handle_name(
        &mut self,
        raw_input: &str,
        config: &SessionConfig,
        audit: &dyn AuditLog,
    ) -> TurnOutcome {
        let input = raw_input.trim();
        if let Err(err) = check_name(input, config.max_input_len) {
            return TurnOutcome::Error(validation_error(
                err,
                "enter a component name using only letters, digits, `-` and `_`",
            ));
        }
        self.pending_name = Some(input.to_string());
        self.state = SessionState::AwaitingVersion;
        audit.record(&self.id, "name_accepted", input);
        TurnOutcome::Prompt(PromptResult {
            state: self.state,
            message: format!("Enter the version for `{input}` (e.g. 1.2.3 or 2.0.0-rc1)."),
        })
    }

    fn handle_version(
        &mut self,
        raw_input: &str,
        config: &SessionConfig,
        audit: &dyn AuditLog,
    ) -> TurnOutcome {
        let input = raw_input.trim();
        if let Err(err) = check_version(input, config.max_input_len) {
            return TurnOutcome::Error(validation_error(
                err,
                "enter a version like 1.2, 1.2.3 or 1.2.3-rc1",
            ));
        }
        let name = match self.pending_name.take() {
            Some(name) => name,
            None => {
                // A version turn without a pending name means the session was
                // corrupted externally; keep state so the operator can reset.
                return TurnOutcome::Error(ErrorResult {
                    kind: ErrorKind::Internal,
                    message: "no pending component name for this version".to_string(),
                    suggested_action: SuggestedAction::Restart,
                });
            }
        };
        let entry = match ComponentEntry::new(&name, input, config.max_input_len) {
            Ok(entry) => entry,
            Err(err) => {
                self.pending_name = Some(name);
                return TurnOutcome::Error(validation_error(err, "correct the value and retry"));
            }
        };
        audit.record(&self.id, "version_accepted", &entry.to_string());
        let recorded = format!("Recorded {entry}. Add another component? (sim/n\u{e3}o)");
        self.collected.push(entry);
        self.state = SessionState::AwaitingContinueConfirmation;
        TurnOutcome::Prompt(PromptResult {
            state: self.state,
            message: recorded,
        })
    }

    fn handle_confirmation(
        &mut self,
        raw_input: &str,
        checks: &dyn ComponentChecks,
        audit: &dyn AuditLog,
    ) -> TurnOutcome {
        let input = raw_input.trim().to_lowercase();
        if AFFIRMATIVE_ANSWERS.contains(&input.as_str()) {
            self.state = SessionState::AwaitingName;
            audit.record(&self.id, "continue_confirmed", &input);
            return TurnOutcome::Prompt(PromptResult {
                state: self.state,
                message: "Enter the name of the next component.".to_string(),
            });
        }
        if NEGATIVE_ANSWERS.contains(&input.as_str()) {
            if self.collected.is_empty() {
                return TurnOutcome::Error(ErrorResult {
                    kind: ErrorKind::EmptyCollection,
                    message: "no components were collected; restart the collection".to_string(),
                    suggested_action: SuggestedAction::Restart,
                });
            }
            audit.record(&self.id, "collection_closed", &input);
            return self.finalize(checks, audit);
        }
        TurnOutcome::Error(ErrorResult {
            kind: ErrorKind::Validation,
            message: "answer not recognized; reply `sim` to add another component or `n\u{e3}o` to finish"
                .to_string(),
            suggested_action: SuggestedAction::Retry,
        })
    }

    /// Validate every collected entry, in collection order, and close out.
    fn finalize(&mut self, checks: &dyn ComponentChecks, audit: &dyn AuditLog) -> TurnOutcome {
        self.state = SessionState::Finalizing;
        let verdicts: Vec<ValidationVerdict> = self
            .collected
            .iter()
            .map(|entry| validate_component(checks, entry))
            .collect();
        let processed = verdicts.len();
        let valid = verdicts.iter().filter(|v| v.passed).count();
        let failed = processed - valid;
        let summary = render_summary(&verdicts, processed, valid, failed);
        self.state = SessionState::Finalized;
        audit.record(
            &self.id,
            "session_finalized",
            &format!("processed={processed} valid={valid} failed={failed}"),
        );
        TurnOutcome::Final(FinalResult {
            collected: self.collected.clone(),
            verdicts,
            processed,
            valid,
            failed,
            summary,
        })
    }
}

fn greeting_prompt() -> String {
    "Component collection started. Enter the name of the first component delivered in this cycle."
        .to_string()
}

fn not_started_error() -> ErrorResult {
    ErrorResult {
        kind: ErrorKind::NotStarted,
        message: "no active collection for this session; call start first".to_string(),
        suggested_action: SuggestedAction::Start,
    }
}

fn validation_error(err: FieldError, hint: &str) -> ErrorResult {
    ErrorResult {
        kind: ErrorKind::Validation,
        message: format!("{err}; {hint}"),
        suggested_action: SuggestedAction::Retry,
    }
}

fn render_summary(
    verdicts: &[ValidationVerdict],
    processed: usize,
    valid: usize,
    failed: usize,
) -> String {
    let mut lines = vec![format!(
        "Validation finished: {processed} component(s) processed, {valid} passed, {failed} failed."
    )];
    for verdict in verdicts {
        if verdict.passed {
            lines.push(format!("  [pass] {}", verdict.component));
        } else {
            lines.push(format!(
                "  [fail] {}: {}",
                verdict.component,
                verdict.failure_reasons.join(", ")
            ));
        }
    }
    lines.join("\n")
}
