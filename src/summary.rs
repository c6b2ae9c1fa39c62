use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::dates::days_until_deadline;
use crate::models::{doc_scope_key, Application, DocState, DocStatusMap, DocTemplate};

/// Headline portfolio numbers for the home screen and report.
#[derive(Debug, Clone, Default)]
pub struct ApplicationSummary {
    pub upcoming: usize,
    pub due_soon: usize,
    pub application_fees_by_currency: BTreeMap<String, f64>,
    pub program_fees_by_currency: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default)]
pub struct RequirementsSummary {
    pub total_essays_required: i64,
    pub total_lors_required: i64,
    pub total_lors_submitted: i64,
    pub interviews_required: usize,
    pub interviews_completed: usize,
    pub total_applications: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocProgress {
    pub ready: usize,
    pub in_progress: usize,
    pub missing: usize,
}

fn add_currency_total(bucket: &mut BTreeMap<String, f64>, currency: &str, amount: f64) {
    if !amount.is_finite() {
        return;
    }
    let code = if currency.is_empty() { "USD" } else { currency };
    *bucket.entry(code.to_uppercase()).or_insert(0.0) += amount;
}

pub fn application_summary(applications: &[Application], today: NaiveDate) -> ApplicationSummary {
    let mut summary = ApplicationSummary::default();
    for application in applications {
        let days_until = days_until_deadline(application.deadline.as_deref(), today);
        if let Some(days) = days_until {
            if days >= 0 {
                summary.upcoming += 1;
                if days <= 21 {
                    summary.due_soon += 1;
                }
            }
        }
        if let Some(fee) = application.application_fee.filter(|fee| *fee != 0.0) {
            add_currency_total(
                &mut summary.application_fees_by_currency,
                &application.fee_currency,
                fee,
            );
        }
        if let Some(fee) = application.program_total_fee.filter(|fee| *fee != 0.0) {
            add_currency_total(
                &mut summary.program_fees_by_currency,
                &application.fee_currency,
                fee,
            );
        }
    }
    summary
}

fn group_thousands(value: i64) -> String {
    let digits = value.abs().to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Renders per-currency totals as `USD 1,250 | EUR 400`, or `0` when there
/// are none.
pub fn format_currency_totals(totals: &BTreeMap<String, f64>) -> String {
    if totals.is_empty() {
        return "0".to_string();
    }
    totals
        .iter()
        .map(|(currency, amount)| format!("{currency} {}", group_thousands(amount.round() as i64)))
        .collect::<Vec<_>>()
        .join(" | ")
}

pub fn requirements_summary(applications: &[Application]) -> RequirementsSummary {
    let mut summary = RequirementsSummary::default();
    for application in applications {
        summary.total_essays_required += application.essays_required.max(0) as i64;
        summary.total_lors_required += application.lors_required.max(0) as i64;
        summary.total_lors_submitted += application.lors_submitted.max(0) as i64;
        if application.interview_required {
            summary.interviews_required += 1;
        }
        if application.interview_completed {
            summary.interviews_completed += 1;
        }
        summary.total_applications += 1;
    }
    summary
}

/// Checklist progress for a single scope; templates without an entry count
/// as missing.
pub fn doc_progress(
    scope_key: &str,
    doc_status: &DocStatusMap,
    templates: &[DocTemplate],
) -> DocProgress {
    let scope = doc_status.get(scope_key);
    let mut progress = DocProgress::default();
    for template in templates {
        let status = scope
            .and_then(|docs| docs.get(template.id))
            .map(|entry| entry.status)
            .unwrap_or_default();
        match status {
            DocState::Ready => progress.ready += 1,
            DocState::InProgress => progress.in_progress += 1,
            DocState::Missing => progress.missing += 1,
        }
    }
    progress
}

/// Checklist progress summed over every application's scope.
pub fn doc_progress_overall(
    applications: &[Application],
    doc_status: &DocStatusMap,
    templates: &[DocTemplate],
) -> DocProgress {
    let mut overall = DocProgress::default();
    for application in applications {
        let progress = doc_progress(&doc_scope_key(Some(application.id)), doc_status, templates);
        overall.ready += progress.ready;
        overall.in_progress += progress.in_progress;
        overall.missing += progress.missing;
    }
    overall
}
