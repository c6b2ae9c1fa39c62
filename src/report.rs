use std::collections::HashMap;
use std::fmt::Write;

use chrono::NaiveDate;

use crate::matrix::{decision_matrix_rows, DecisionMatrixWeights};
use crate::models::{Application, DocStatusMap, DocTemplate};
use crate::notify::{active_notifications, generate_notifications, ReminderMarkers};
use crate::readiness::{average_readiness, ReadinessRow};
use crate::summary::{
    application_summary, doc_progress_overall, format_currency_totals, requirements_summary,
};
use crate::timeline::deadline_buckets;

fn deadline_section(output: &mut String, heading: &str, applications: &[Application]) {
    if applications.is_empty() {
        return;
    }
    let _ = writeln!(output, "### {heading}");
    for application in applications {
        let _ = writeln!(
            output,
            "- {} {} ({})",
            application.school_name,
            application.program_name,
            application.deadline.as_deref().unwrap_or("no deadline")
        );
    }
    let _ = writeln!(output);
}

pub fn build_report(
    rows: &[ReadinessRow],
    doc_status: &DocStatusMap,
    templates: &[DocTemplate],
    weights: &DecisionMatrixWeights,
    markers: &ReminderMarkers,
    dismissed: &HashMap<String, bool>,
    today: NaiveDate,
) -> String {
    let applications: Vec<Application> =
        rows.iter().map(|row| row.application.clone()).collect();
    let summary = application_summary(&applications, today);
    let requirements = requirements_summary(&applications);
    let docs = doc_progress_overall(&applications, doc_status, templates);
    let buckets = deadline_buckets(&applications, today);
    let notices = active_notifications(
        generate_notifications(rows, doc_status, templates, markers, today),
        dismissed,
    );
    let ranked = decision_matrix_rows(rows, weights, templates, today);

    let mut output = String::new();
    let _ = writeln!(output, "# Admissions Portfolio Report");
    let _ = writeln!(output, "Generated for {today}");
    let _ = writeln!(output);
    let _ = writeln!(output, "## Portfolio");
    let _ = writeln!(output, "- Applications tracked: {}", requirements.total_applications);
    let _ = writeln!(output, "- Average readiness: {}%", average_readiness(rows));
    let _ = writeln!(
        output,
        "- Upcoming deadlines: {} ({} due within 3 weeks)",
        summary.upcoming, summary.due_soon
    );
    let _ = writeln!(
        output,
        "- LORs submitted: {} of {}",
        requirements.total_lors_submitted, requirements.total_lors_required
    );
    let _ = writeln!(
        output,
        "- Documents: {} ready, {} in progress, {} missing",
        docs.ready, docs.in_progress, docs.missing
    );
    let _ = writeln!(
        output,
        "- Application fees: {}",
        format_currency_totals(&summary.application_fees_by_currency)
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Readiness");

    if rows.is_empty() {
        let _ = writeln!(output, "No applications tracked yet.");
    } else {
        for row in rows {
            let _ = writeln!(
                output,
                "- {} {}: {}% (essays {}/{}, LORs {}/{}, docs {}/{})",
                row.application.school_name,
                row.application.program_name,
                row.readiness.readiness,
                row.readiness.essay_drafted,
                row.readiness.essay_target,
                row.readiness.lor_submitted,
                row.readiness.lor_target,
                row.readiness.docs_ready,
                templates.len()
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Deadlines");
    if buckets.overdue.is_empty() && buckets.critical.is_empty() && buckets.upcoming.is_empty() {
        let _ = writeln!(output, "No dated deadlines on file.");
        let _ = writeln!(output);
    } else {
        deadline_section(&mut output, "Overdue", &buckets.overdue);
        deadline_section(&mut output, "Due within two weeks", &buckets.critical);
        deadline_section(&mut output, "Further out", &buckets.upcoming);
    }

    let _ = writeln!(output, "## Notifications");
    if notices.is_empty() {
        let _ = writeln!(output, "Nothing needs attention.");
    } else {
        for notice in &notices {
            let _ = writeln!(output, "- [{}] {}: {}", notice.severity, notice.title, notice.message);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Decision Matrix");
    if ranked.is_empty() {
        let _ = writeln!(output, "No applications to rank.");
    } else {
        for row in ranked.iter().take(10) {
            let _ = writeln!(
                output,
                "- {} {} scored {} (readiness {}, deadline {}, affordability {}, decision {}, docs {})",
                row.application.school_name,
                row.application.program_name,
                row.weighted_score,
                row.readiness_score,
                row.deadline_score,
                row.affordability_score,
                row.decision_score,
                row.docs_score
            );
        }
    }

    output
}
