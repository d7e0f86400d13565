//! Component validation executor.
//!
//! Composes three pluggable boolean checks into a single verdict. The
//! executor performs no I/O itself; production wiring injects check
//! implementations backed by the component registry and architecture
//! tooling, while tests and the default CLI wiring use [`ApprovedChecks`].

use crate::model::{ComponentEntry, ValidationVerdict};

pub const REASON_NOT_FOUND: &str = "not found in repository";
pub const REASON_INCOMPATIBLE: &str = "incompatible with architecture";
pub const REASON_DEPENDENCIES: &str = "dependencies not satisfied";

/// The three governance checks applied to every collected component.
///
/// Each check is a pure predicate; a remote-backed implementation must
/// resolve its answer before returning.
pub trait ComponentChecks: Send + Sync {
    fn exists(&self, name: &str, version: &str) -> bool;
    fn architecture_compatible(&self, name: &str, version: &str) -> bool;
    fn dependencies_satisfied(&self, name: &str, version: &str) -> bool;
}

/// Always-true checks. Default wiring until the registry integrations land.
pub struct ApprovedChecks;

impl ComponentChecks for ApprovedChecks {
    fn exists(&self, _name: &str, _version: &str) -> bool {
        true
    }

    fn architecture_compatible(&self, _name: &str, _version: &str) -> bool {
        true
    }

    fn dependencies_satisfied(&self, _name: &str, _version: &str) -> bool {
        true
    }
}

/// Run all three checks against one entry and assemble the verdict.
///
/// A check returning false contributes its reason; `passed` requires all
/// three to hold.
pub fn validate_component(
    checks: &dyn ComponentChecks,
    component: &ComponentEntry,
) -> ValidationVerdict {
    let exists = checks.exists(&component.name, &component.version);
    let compatible = checks.architecture_compatible(&component.name, &component.version);
    let dependencies = checks.dependencies_satisfied(&component.name, &component.version);

    let mut failure_reasons = Vec::new();
    if !exists {
        failure_reasons.push(REASON_NOT_FOUND.to_string());
    }
    if !compatible {
        failure_reasons.push(REASON_INCOMPATIBLE.to_string());
    }
    if !dependencies {
        failure_reasons.push(REASON_DEPENDENCIES.to_string());
    }

    ValidationVerdict {
        component: component.clone(),
        exists_in_repository: exists,
        architecture_compatible: compatible,
        dependencies_satisfied: dependencies,
        passed: exists && compatible && dependencies,
        failure_reasons,
    }
}
