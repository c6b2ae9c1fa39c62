use std::collections::HashMap;

use chrono::NaiveDate;

use crate::dates::days_until_deadline;
use crate::models::{
    doc_scope_key, DocState, DocStatusMap, DocTemplate, Notification, Severity,
};
use crate::readiness::ReadinessRow;

/// Day counts before a deadline at which a reminder notice fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderMarkers(pub Vec<i64>);

impl Default for ReminderMarkers {
    fn default() -> Self {
        ReminderMarkers(vec![30, 14, 7, 1])
    }
}

impl ReminderMarkers {
    /// Parses a comma-separated preference string, skipping fragments that
    /// are not integers. An input with no usable fragments yields the
    /// default markers.
    pub fn parse(value: &str) -> Self {
        let markers: Vec<i64> = value
            .split(',')
            .filter_map(|part| part.trim().parse().ok())
            .collect();
        if markers.is_empty() {
            return ReminderMarkers::default();
        }
        ReminderMarkers(markers)
    }

    pub fn contains(&self, days: i64) -> bool {
        self.0.contains(&days)
    }
}

fn plural(n: i64) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Generates every advisory notice for the current snapshot, in a fixed
/// per-application order. Ids are deterministic so dismissals persist across
/// recomputation.
pub fn generate_notifications(
    rows: &[ReadinessRow],
    doc_status: &DocStatusMap,
    templates: &[DocTemplate],
    markers: &ReminderMarkers,
    today: NaiveDate,
) -> Vec<Notification> {
    let mut notices = Vec::new();

    for row in rows {
        let application = &row.application;
        let days_until = days_until_deadline(application.deadline.as_deref(), today);
        let scope = doc_status.get(&doc_scope_key(Some(application.id)));
        let missing_docs = templates
            .iter()
            .filter(|template| {
                scope
                    .and_then(|docs| docs.get(template.id))
                    .map(|entry| entry.status == DocState::Missing)
                    .unwrap_or(true)
            })
            .count();

        if let Some(days) = days_until {
            if days < 0 {
                let overdue = days.abs();
                notices.push(Notification {
                    id: format!("deadline-overdue-{}", application.id),
                    severity: Severity::High,
                    title: format!("{} deadline passed", application.school_name),
                    message: format!("{overdue} day{} overdue", plural(overdue)),
                    target_nav: "deadlines",
                    application_id: application.id,
                });
            } else if markers.contains(days) {
                let round = if application.application_round.is_empty() {
                    "Round not set"
                } else {
                    application.application_round.as_str()
                };
                notices.push(Notification {
                    id: format!("deadline-reminder-{}-{days}", application.id),
                    severity: if days <= 7 { Severity::High } else { Severity::Medium },
                    title: format!(
                        "{} due in {days} day{}",
                        application.school_name,
                        plural(days)
                    ),
                    message: format!("{} • {round}", application.program_name),
                    target_nav: "deadlines",
                    application_id: application.id,
                });
            }
        }

        if row.readiness.readiness < 60 {
            notices.push(Notification {
                id: format!("readiness-low-{}", application.id),
                severity: Severity::Medium,
                title: format!(
                    "{} readiness is {}%",
                    application.school_name, row.readiness.readiness
                ),
                message: "Complete essays, LORs, and documents to improve readiness.".to_string(),
                target_nav: "requirements",
                application_id: application.id,
            });
        }

        if application.interview_required && !application.interview_completed {
            notices.push(Notification {
                id: format!("interview-pending-{}", application.id),
                severity: Severity::Medium,
                title: format!("Interview prep pending for {}", application.school_name),
                message: "Add stories, notes, and an interview schedule.".to_string(),
                target_nav: "interviews",
                application_id: application.id,
            });
        }

        if missing_docs >= 3 {
            notices.push(Notification {
                id: format!("docs-missing-{}", application.id),
                severity: Severity::Low,
                title: format!(
                    "{missing_docs} documents missing for {}",
                    application.school_name
                ),
                message: "Update the document checklist.".to_string(),
                target_nav: "docs",
                application_id: application.id,
            });
        }
    }

    notices
}

/// Drops notices whose id has been dismissed. The dismissal map is owned by
/// the caller and passed in untouched.
pub fn active_notifications(
    notices: Vec<Notification>,
    dismissed: &HashMap<String, bool>,
) -> Vec<Notification> {
    notices
        .into_iter()
        .filter(|notice| !dismissed.get(&notice.id).copied().unwrap_or(false))
        .collect()
}
