//! Criteria cross-reference engine.
//!
//! Aggregates every audit record against the criterion catalog, computes
//! per-criterion non-compliance rates over the applicable answers, and ranks
//! the criteria from worst to best. Per-system compliance rates and severity
//! classifications are derived in the same pass.

use crate::model::{Answer, AuditRecord, CriterionDefinition, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error)]
pub enum CrossRefError {
    #[error("no audit records to cross-reference")]
    NoData,
    #[error("criterion catalog unavailable: {0}")]
    CatalogMissing(String),
}

/// Accumulated answers for one criterion across all records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionStat {
    pub id: String,
    pub question: String,
    pub category: String,
    pub total: usize,
    pub yes_count: usize,
    pub no_count: usize,
    pub not_applicable_count: usize,
    /// Percentage of applicable answers that were "no". 0 when every answer
    /// was not-applicable.
    pub non_compliance_rate: f64,
}

impl CriterionStat {
    fn applicable(&self) -> usize {
        self.total - self.not_applicable_count
    }
}

/// One audited system's overall compliance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemCompliance {
    pub system_name: String,
    pub compliance_rate: f64,
    pub classification: Severity,
}

/// Full cross-reference output, ready for text or JSON rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossRefReport {
    pub total_records: usize,
    pub total_criteria: usize,
    pub criteria_with_non_compliance: usize,
    pub catalog_affected_pct: f64,
    /// Every criterion with at least one applicable answer, ranked by
    /// non-compliance rate descending, ties broken by ascending id.
    pub criteria: Vec<CriterionStat>,
    pub systems: Vec<SystemCompliance>,
}

impl CrossRefReport {
    /// Criteria with at least one non-compliant answer, worst first.
    pub fn problematic(&self) -> impl Iterator<Item = &CriterionStat> {
        self.criteria.iter().filter(|stat| stat.no_count > 0)
    }
}

/// Cross-reference `records` against `catalog`.
///
/// Catalog text wins over record text for question and category; for
/// criteria answered in records but absent from the catalog, the first
/// record occurrence supplies the text. Criteria where every answer was
/// not-applicable are excluded from the ranking.
pub fn cross_reference(
    records: &[AuditRecord],
    catalog: &[CriterionDefinition],
) -> Result<CrossRefReport, CrossRefError> {
    if records.is_empty() {
        return Err(CrossRefError::NoData);
    }
    tracing::debug!(
        records = records.len(),
        catalog = catalog.len(),
        "cross-referencing audit records"
    );

    let mut stats: BTreeMap<String, CriterionStat> = BTreeMap::new();
    for definition in catalog {
        stats.insert(
            definition.id.clone(),
            CriterionStat {
                id: definition.id.clone(),
                question: definition.question.clone(),
                category: definition.category.clone(),
                total: 0,
                yes_count: 0,
                no_count: 0,
                not_applicable_count: 0,
                non_compliance_rate: 0.0,
            },
        );
    }

    let mut systems = Vec::with_capacity(records.len());
    for record in records {
        let mut applicable = 0usize;
        let mut yes = 0usize;
        for (id, criterion) in &record.criteria {
            let stat = stats.entry(id.clone()).or_insert_with(|| CriterionStat {
                id: id.clone(),
                question: criterion.question.clone(),
                category: criterion.category.clone(),
                total: 0,
                yes_count: 0,
                no_count: 0,
                not_applicable_count: 0,
                non_compliance_rate: 0.0,
            });
            stat.total += 1;
            match criterion.answer {
                Answer::Yes => {
                    stat.yes_count += 1;
                    applicable += 1;
                    yes += 1;
                }
                Answer::No => {
                    stat.no_count += 1;
                    applicable += 1;
                }
                Answer::NotApplicable => stat.not_applicable_count += 1,
            }
        }
        let compliance_rate = percentage(yes, applicable);
        systems.push(SystemCompliance {
            system_name: record.system_name.clone(),
            compliance_rate,
            classification: Severity::classify(compliance_rate),
        });
    }

    let total_criteria = stats.len();
    let mut ranked: Vec<CriterionStat> = stats
        .into_values()
        .filter(|stat| stat.applicable() > 0)
        .map(|mut stat| {
            stat.non_compliance_rate = percentage(stat.no_count, stat.applicable());
            stat
        })
        .collect();
    // BTreeMap already yields ascending ids, and the sort is stable, so equal
    // rates keep that order.
    ranked.sort_by(|a, b| b.non_compliance_rate.total_cmp(&a.non_compliance_rate));

    let criteria_with_non_compliance = ranked.iter().filter(|s| s.no_count > 0).count();
    Ok(CrossRefReport {
        total_records: records.len(),
        total_criteria,
        criteria_with_non_compliance,
        catalog_affected_pct: percentage(criteria_with_non_compliance, total_criteria),
        criteria: ranked,
        systems,
    })
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CriterionRecord;

    fn record(system: &str, answers: &[(&str, Answer)]) -> AuditRecord {
        let criteria = answers
            .iter()
            .map(|(id, answer)| {
                (
                    (*id).to_string(),
                    CriterionRecord {
                        question: format!("question for {id}"),
                        category: "platform".to_string(),
                        answer: *answer,
                    },
                )
            })
            .collect();
        AuditRecord {
            system_name: system.to_string(),
            criteria,
        }
    }

    fn definition(id: &str, question: &str) -> CriterionDefinition {
        CriterionDefinition {
            id: id.to_string(),
            question: question.to_string(),
            category: "platform".to_string(),
        }
    }

    #[test]
    fn empty_record_set_is_a_typed_error() {
        let err = cross_reference(&[], &[]).expect_err("no data");
        assert!(matches!(err, CrossRefError::NoData));
    }

    #[test]
    fn rate_ignores_not_applicable_answers() {
        // Three records answer the same criterion: no, no, not applicable.
        // The rate must be computed over the two applicable answers.
        let records = vec![
            record("sys-a", &[("1.4_chassi", Answer::No)]),
            record("sys-b", &[("1.4_chassi", Answer::No)]),
            record("sys-c", &[("1.4_chassi", Answer::NotApplicable)]),
        ];
        let report = cross_reference(&records, &[]).expect("report");
        let stat = &report.criteria[0];
        assert_eq!(stat.total, 3);
        assert_eq!(stat.no_count, 2);
        assert_eq!(stat.not_applicable_count, 1);
        assert_eq!(stat.non_compliance_rate, 100.0);
    }

    #[test]
    fn fully_not_applicable_criteria_are_excluded_from_ranking() {
        let records = vec![
            record(
                "sys-a",
                &[
                    ("1.1_exposicao", Answer::Yes),
                    ("9.9_legado", Answer::NotApplicable),
                ],
            ),
            record("sys-b", &[("9.9_legado", Answer::NotApplicable)]),
        ];
        let report = cross_reference(&records, &[]).expect("report");
        assert_eq!(report.total_criteria, 2);
        assert_eq!(report.criteria.len(), 1);
        assert_eq!(report.criteria[0].id, "1.1_exposicao");
    }

    #[test]
    fn ranking_is_rate_descending_with_id_tie_break() {
        let records = vec![
            record(
                "sys-a",
                &[
                    ("a_criterion", Answer::No),
                    ("b_criterion", Answer::No),
                    ("c_criterion", Answer::Yes),
                    ("d_criterion", Answer::No),
                ],
            ),
            record(
                "sys-b",
                &[
                    ("a_criterion", Answer::No),
                    ("b_criterion", Answer::No),
                    ("c_criterion", Answer::No),
                    ("d_criterion", Answer::Yes),
                ],
            ),
        ];
        let report = cross_reference(&records, &[]).expect("report");
        let order: Vec<&str> = report.criteria.iter().map(|s| s.id.as_str()).collect();
        // a and b tie at 100%, then c and d tie at 50% -> id order.
        assert_eq!(
            order,
            vec!["a_criterion", "b_criterion", "c_criterion", "d_criterion"]
        );
        assert_eq!(report.criteria[0].non_compliance_rate, 100.0);
        assert_eq!(report.criteria[2].non_compliance_rate, 50.0);
    }

    #[test]
    fn repeated_runs_are_deterministic() {
        let records = vec![
            record(
                "sys-a",
                &[("x_one", Answer::No), ("y_two", Answer::No), ("z_three", Answer::Yes)],
            ),
            record(
                "sys-b",
                &[("x_one", Answer::Yes), ("y_two", Answer::No), ("z_three", Answer::No)],
            ),
        ];
        let first = cross_reference(&records, &[]).expect("report");
        let second = cross_reference(&records, &[]).expect("report");
        assert_eq!(first, second);
    }

    #[test]
    fn catalog_text_wins_over_record_text() {
        let records = vec![record("sys-a", &[("1.4_chassi", Answer::No)])];
        let catalog = vec![definition("1.4_chassi", "Adopted the platform chassis?")];
        let report = cross_reference(&records, &catalog).expect("report");
        assert_eq!(report.criteria[0].question, "Adopted the platform chassis?");
    }

    #[test]
    fn catalog_criteria_without_answers_count_toward_totals_only() {
        let records = vec![record("sys-a", &[("1.4_chassi", Answer::No)])];
        let catalog = vec![
            definition("1.4_chassi", "Adopted the platform chassis?"),
            definition("2.1_gateway", "Exposed through the gateway?"),
        ];
        let report = cross_reference(&records, &catalog).expect("report");
        assert_eq!(report.total_criteria, 2);
        assert_eq!(report.criteria.len(), 1);
        assert_eq!(report.criteria_with_non_compliance, 1);
        assert_eq!(report.catalog_affected_pct, 50.0);
    }

    #[test]
    fn system_compliance_is_classified_by_threshold() {
        let records = vec![
            record(
                "all-good",
                &[("a", Answer::Yes), ("b", Answer::Yes), ("c", Answer::NotApplicable)],
            ),
            record(
                "half",
                &[("a", Answer::Yes), ("b", Answer::No)],
            ),
            record(
                "all-bad",
                &[("a", Answer::No), ("b", Answer::No)],
            ),
        ];
        let report = cross_reference(&records, &[]).expect("report");
        let by_name: BTreeMap<&str, &SystemCompliance> = report
            .systems
            .iter()
            .map(|s| (s.system_name.as_str(), s))
            .collect();
        assert_eq!(by_name["all-good"].compliance_rate, 100.0);
        assert_eq!(by_name["all-good"].classification, Severity::Excellent);
        assert_eq!(by_name["half"].compliance_rate, 50.0);
        assert_eq!(by_name["half"].classification, Severity::Regular);
        assert_eq!(by_name["all-bad"].compliance_rate, 0.0);
        assert_eq!(by_name["all-bad"].classification, Severity::Critical);
    }
}
