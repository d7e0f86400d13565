//! Plain-text rendering of cross-reference reports and validation verdicts.

use crate::crossref::CrossRefReport;
use crate::model::ValidationVerdict;

/// Render the full compliance report as operator-facing text.
pub fn render_crossref(report: &CrossRefReport) -> String {
    let mut out = String::new();
    push_header(&mut out, report);
    push_ranking(&mut out, report);
    push_systems(&mut out, report);
    out
}

fn push_header(out: &mut String, report: &CrossRefReport) {
    out.push_str("ARCHITECTURE GOVERNANCE COMPLIANCE REPORT\n");
    out.push_str(&format!("Audit records analyzed: {}\n", report.total_records));
    out.push_str(&format!("Criteria in catalog:    {}\n", report.total_criteria));
    out.push_str(&format!(
        "With non-compliance:    {} ({:.1}% of catalog)\n",
        report.criteria_with_non_compliance, report.catalog_affected_pct
    ));
}

fn push_ranking(out: &mut String, report: &CrossRefReport) {
    let problematic: Vec<_> = report.problematic().collect();
    if problematic.is_empty() {
        out.push_str("\nNo non-compliant criteria found.\n");
        return;
    }
    out.push_str("\nMost violated criteria (worst first):\n");
    for (rank, stat) in problematic.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}. [{:>5.1}%] {} ({})\n",
            rank + 1,
            stat.non_compliance_rate,
            stat.id,
            stat.category
        ));
        out.push_str(&format!("       {}\n", stat.question));
        out.push_str(&format!(
            "       yes: {}  no: {}  n/a: {}\n",
            stat.yes_count, stat.no_count, stat.not_applicable_count
        ));
    }
}

fn push_systems(out: &mut String, report: &CrossRefReport) {
    if report.systems.is_empty() {
        return;
    }
    out.push_str("\nPer-system compliance:\n");
    for system in &report.systems {
        out.push_str(&format!(
            "  {:<30} {:>5.1}%  {}\n",
            system.system_name, system.compliance_rate, system.classification
        ));
    }
}

/// Render one component's verdict as a short text block.
pub fn render_verdict(verdict: &ValidationVerdict) -> String {
    let mut out = String::new();
    let status = if verdict.passed { "PASS" } else { "FAIL" };
    out.push_str(&format!("{status} {}\n", verdict.component));
    out.push_str(&format!(
        "  exists in repository:      {}\n",
        verdict.exists_in_repository
    ));
    out.push_str(&format!(
        "  architecture compatible:   {}\n",
        verdict.architecture_compatible
    ));
    out.push_str(&format!(
        "  dependencies satisfied:    {}\n",
        verdict.dependencies_satisfied
    ));
    for reason in &verdict.failure_reasons {
        out.push_str(&format!("  reason: {reason}\n"));
    }
    out
}
