use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::days_until_deadline;
use crate::models::{Application, DocTemplate};
use crate::readiness::ReadinessRow;

/// Relative importance of each ranking factor. Values are free integers;
/// scoring normalizes by their sum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionMatrixWeights {
    pub readiness: i64,
    pub deadline: i64,
    pub affordability: i64,
    pub decision: i64,
    pub documents: i64,
}

impl Default for DecisionMatrixWeights {
    fn default() -> Self {
        DecisionMatrixWeights {
            readiness: 35,
            deadline: 25,
            affordability: 20,
            decision: 10,
            documents: 10,
        }
    }
}

impl DecisionMatrixWeights {
    /// Sum floored at 1 so an all-zero slider set never divides by zero.
    pub fn total(&self) -> i64 {
        (self.readiness + self.deadline + self.affordability + self.decision + self.documents)
            .max(1)
    }
}

#[derive(Debug, Clone)]
pub struct MatrixRow {
    pub application: Application,
    pub weighted_score: i64,
    pub readiness_score: i64,
    pub deadline_score: i64,
    pub affordability_score: i64,
    pub decision_score: i64,
    pub docs_score: i64,
}

/// Program fee with the application fee as fallback; zero values fall
/// through just like absent ones.
fn fee_candidate(application: &Application) -> f64 {
    let fee = application
        .program_total_fee
        .filter(|value| *value != 0.0)
        .or(application.application_fee.filter(|value| *value != 0.0))
        .unwrap_or(0.0);
    if fee.is_finite() { fee } else { 0.0 }
}

fn deadline_score(days_until: Option<i64>) -> i64 {
    match days_until {
        None => 45,
        Some(days) if days < 0 => 0,
        Some(days) if days <= 7 => 100,
        Some(days) if days <= 21 => 88,
        Some(days) if days <= 45 => 72,
        Some(_) => 55,
    }
}

fn decision_score(decision_status: &str) -> i64 {
    match decision_status {
        "Admitted" => 100,
        "Interview Invite" => 75,
        "Waitlisted" => 55,
        "Pending" => 45,
        "Rejected" => 5,
        _ => 45,
    }
}

/// Scores every application across the five factors and sorts descending by
/// the weighted composite. The sort is stable: ties keep list order.
pub fn decision_matrix_rows(
    rows: &[ReadinessRow],
    weights: &DecisionMatrixWeights,
    templates: &[DocTemplate],
    today: NaiveDate,
) -> Vec<MatrixRow> {
    let weight_total = weights.total();
    let max_fee = rows
        .iter()
        .map(|row| fee_candidate(&row.application))
        .fold(0.0_f64, f64::max);

    let mut scored: Vec<MatrixRow> = rows
        .iter()
        .map(|row| {
            let application = &row.application;
            let days_until = days_until_deadline(application.deadline.as_deref(), today);
            let deadline_score = deadline_score(days_until);

            let affordability_score = if max_fee > 0.0 {
                let ratio = 1.0 - fee_candidate(application) / max_fee;
                ((ratio * 100.0).round() as i64).max(12)
            } else {
                70
            };

            let decision_score = decision_score(&application.decision_status);
            let docs_score = if templates.is_empty() {
                0
            } else {
                ((row.readiness.docs_ready as f64 / templates.len() as f64) * 100.0).round() as i64
            };

            let weighted = (row.readiness.readiness * weights.readiness
                + deadline_score * weights.deadline
                + affordability_score * weights.affordability
                + decision_score * weights.decision
                + docs_score * weights.documents) as f64
                / weight_total as f64;

            MatrixRow {
                application: application.clone(),
                weighted_score: weighted.round() as i64,
                readiness_score: row.readiness.readiness,
                deadline_score,
                affordability_score,
                decision_score,
                docs_score,
            }
        })
        .collect();

    scored.sort_by(|a, b| b.weighted_score.cmp(&a.weighted_score));
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::application;
    use crate::models::DOC_TEMPLATES;
    use crate::readiness::readiness_rows;
    use std::collections::HashMap;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    #[test]
    fn deadline_score_steps() {
        assert_eq!(deadline_score(None), 45);
        assert_eq!(deadline_score(Some(-1)), 0);
        assert_eq!(deadline_score(Some(0)), 100);
        assert_eq!(deadline_score(Some(7)), 100);
        assert_eq!(deadline_score(Some(8)), 88);
        assert_eq!(deadline_score(Some(21)), 88);
        assert_eq!(deadline_score(Some(45)), 72);
        assert_eq!(deadline_score(Some(46)), 55);
    }

    #[test]
    fn decision_lookup_table() {
        assert_eq!(decision_score("Admitted"), 100);
        assert_eq!(decision_score("Interview Invite"), 75);
        assert_eq!(decision_score("Waitlisted"), 55);
        assert_eq!(decision_score("Pending"), 45);
        assert_eq!(decision_score("Rejected"), 5);
        assert_eq!(decision_score("Something Else"), 45);
    }

    #[test]
    fn fee_falls_back_through_zero_values() {
        let mut app = application(1);
        app.program_total_fee = Some(0.0);
        app.application_fee = Some(250.0);
        assert_eq!(fee_candidate(&app), 250.0);
        app.application_fee = None;
        assert_eq!(fee_candidate(&app), 0.0);
    }

    #[test]
    fn cheapest_application_gets_best_affordability() {
        let mut cheap = application(1);
        cheap.program_total_fee = Some(10_000.0);
        let mut steep = application(2);
        steep.program_total_fee = Some(100_000.0);

        let rows = readiness_rows(&[cheap, steep], &[], &HashMap::new(), DOC_TEMPLATES);
        let scored = decision_matrix_rows(&rows, &DecisionMatrixWeights::default(), DOC_TEMPLATES, today());
        let cheap_row = scored.iter().find(|r| r.application.id == 1).unwrap();
        let steep_row = scored.iter().find(|r| r.application.id == 2).unwrap();
        assert_eq!(cheap_row.affordability_score, 90);
        assert_eq!(steep_row.affordability_score, 12); // floored at 12
    }

    #[test]
    fn no_fees_anywhere_scores_seventy() {
        let mut app = application(1);
        app.program_total_fee = None;
        app.application_fee = None;
        let rows = readiness_rows(&[app], &[], &HashMap::new(), DOC_TEMPLATES);
        let scored = decision_matrix_rows(&rows, &DecisionMatrixWeights::default(), DOC_TEMPLATES, today());
        assert_eq!(scored[0].affordability_score, 70);
    }

    #[test]
    fn readiness_only_weights_match_pure_readiness_order() {
        let mut strong = application(1);
        strong.essays_required = 0;
        strong.lors_required = 0;
        strong.deadline = Some("2026-03-12".to_string());
        let mut weak = application(2);
        weak.essays_required = 4;
        weak.lors_submitted = 0;
        weak.deadline = Some("2026-03-12".to_string());

        let rows = readiness_rows(&[weak, strong], &[], &HashMap::new(), DOC_TEMPLATES);
        // Same deadline, fees, and decision status, so only readiness and
        // documents can separate the two; zeroing documents leaves readiness.
        let weights = DecisionMatrixWeights {
            readiness: 100,
            deadline: 25,
            affordability: 20,
            decision: 10,
            documents: 0,
        };
        let scored = decision_matrix_rows(&rows, &weights, DOC_TEMPLATES, today());

        let mut by_readiness = rows.clone();
        by_readiness.sort_by(|a, b| b.readiness.readiness.cmp(&a.readiness.readiness));
        let expected: Vec<i64> = by_readiness.iter().map(|r| r.application.id).collect();
        let actual: Vec<i64> = scored.iter().map(|r| r.application.id).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn ties_keep_original_order() {
        let first = application(1);
        let second = application(2);
        let rows = readiness_rows(&[first, second], &[], &HashMap::new(), DOC_TEMPLATES);
        let scored = decision_matrix_rows(&rows, &DecisionMatrixWeights::default(), DOC_TEMPLATES, today());
        assert_eq!(scored[0].weighted_score, scored[1].weighted_score);
        assert_eq!(scored[0].application.id, 1);
        assert_eq!(scored[1].application.id, 2);
    }

    #[test]
    fn zero_weights_do_not_divide_by_zero() {
        let rows = readiness_rows(&[application(1)], &[], &HashMap::new(), DOC_TEMPLATES);
        let weights = DecisionMatrixWeights {
            readiness: 0,
            deadline: 0,
            affordability: 0,
            decision: 0,
            documents: 0,
        };
        let scored = decision_matrix_rows(&rows, &weights, DOC_TEMPLATES, today());
        assert_eq!(scored[0].weighted_score, 0);
    }
}
