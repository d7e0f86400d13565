//! Core data model shared by the collection flow and the cross-reference
//! engine.
//!
//! Audit records arrive as externally produced JSON; field aliases accept the
//! legacy Portuguese spellings still present in older record files. All input
//! is validated here, at construction time, so the aggregation and session
//! logic can assume well-formed values.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

pub fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid name pattern"))
}

pub fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\d+\.\d+(\.\d+)?(-[A-Za-z0-9]+)?$").expect("valid version pattern")
    })
}

/// A single user-correctable problem with a submitted field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("{field} exceeds the maximum of {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("{field} `{value}` does not match the expected format")]
    Malformed { field: &'static str, value: String },
}

pub fn check_name(input: &str, max_len: usize) -> Result<(), FieldError> {
    check_field("component name", input, max_len, name_pattern())
}

pub fn check_version(input: &str, max_len: usize) -> Result<(), FieldError> {
    check_field("version", input, max_len, version_pattern())
}

fn check_field(
    field: &'static str,
    input: &str,
    max_len: usize,
    pattern: &Regex,
) -> Result<(), FieldError> {
    if input.is_empty() {
        return Err(FieldError::Empty { field });
    }
    if input.len() > max_len {
        return Err(FieldError::TooLong {
            field,
            max: max_len,
        });
    }
    if !pattern.is_match(input) {
        return Err(FieldError::Malformed {
            field,
            value: input.to_string(),
        });
    }
    Ok(())
}

/// One (name, version) pair accepted by the collection flow.
///
/// Immutable once constructed; both fields are validated on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentEntry {
    pub name: String,
    pub version: String,
}

impl ComponentEntry {
    pub fn new(name: &str, version: &str, max_len: usize) -> Result<Self, FieldError> {
        check_name(name, max_len)?;
        check_version(version, max_len)?;
        Ok(Self {
            name: name.to_string(),
            version: version.to_string(),
        })
    }
}

impl fmt::Display for ComponentEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.name, self.version)
    }
}

/// Answer recorded for one criterion in one audited system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    #[serde(alias = "Yes", alias = "Sim", alias = "sim")]
    Yes,
    #[serde(alias = "No", alias = "Não", alias = "Nao", alias = "não", alias = "nao")]
    No,
    #[serde(
        alias = "N/A",
        alias = "n/a",
        alias = "Não se aplica",
        alias = "Não se Aplica",
        alias = "nao_se_aplica"
    )]
    NotApplicable,
}

impl Answer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Answer::Yes => "yes",
            Answer::No => "no",
            Answer::NotApplicable => "not_applicable",
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_category() -> String {
    "general".to_string()
}

/// One criterion answer as it appears inside an audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionRecord {
    #[serde(alias = "pergunta")]
    pub question: String,
    #[serde(default = "default_category", alias = "categoria")]
    pub category: String,
    #[serde(alias = "resposta")]
    pub answer: Answer,
}

/// The audited checklist for one system in one development cycle.
///
/// Read-only input; the core never mutates records after load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    #[serde(alias = "sistema", alias = "system")]
    pub system_name: String,
    #[serde(alias = "criterios_validacao", alias = "validacao")]
    pub criteria: BTreeMap<String, CriterionRecord>,
}

/// Catalog entry enumerating one governance criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionDefinition {
    pub id: String,
    pub question: String,
    #[serde(default = "default_category")]
    pub category: String,
}

/// Outcome of running the three validation checks against one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub component: ComponentEntry,
    pub exists_in_repository: bool,
    pub architecture_compatible: bool,
    pub dependencies_satisfied: bool,
    pub passed: bool,
    pub failure_reasons: Vec<String>,
}

/// Severity bucket for a system's overall compliance rate.
///
/// Thresholds follow the governance scoring rules: >= 80 excellent,
/// >= 60 good, >= 40 regular, below that critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Excellent,
    Good,
    Regular,
    Critical,
}

impl Severity {
    pub fn classify(compliance_rate: f64) -> Self {
        if compliance_rate >= 80.0 {
            Severity::Excellent
        } else if compliance_rate >= 60.0 {
            Severity::Good
        } else if compliance_rate >= 40.0 {
            Severity::Regular
        } else {
            Severity::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Excellent => "excellent",
            Severity::Good => "good",
            Severity::Regular => "regular",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
