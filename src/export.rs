use anyhow::Context;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde_json::json;

use crate::dates::{days_until_deadline, parse_date};
use crate::models::{Application, DocStatusMap, Essay};
use crate::readiness::ReadinessRow;

pub const CSV_HEADERS: [&str; 7] = [
    "School",
    "Program",
    "Round",
    "Deadline",
    "Days Until Deadline",
    "Status",
    "Decision",
];

/// Spreadsheet export with every cell quoted. Null deadlines and
/// unparseable days-until render as empty cells.
pub fn applications_csv(applications: &[Application], today: NaiveDate) -> anyhow::Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADERS)?;
    for application in applications {
        let days_until = days_until_deadline(application.deadline.as_deref(), today)
            .map(|days| days.to_string())
            .unwrap_or_default();
        writer.write_record([
            application.school_name.as_str(),
            application.program_name.as_str(),
            application.application_round.as_str(),
            application.deadline.as_deref().unwrap_or(""),
            days_until.as_str(),
            application.status.as_str(),
            application.decision_status.as_str(),
        ])?;
    }

    let bytes = writer.into_inner().context("failed to flush csv buffer")?;
    String::from_utf8(bytes).context("csv output was not valid utf-8")
}

fn ics_sanitize(value: &str) -> String {
    value
        .chars()
        .map(|ch| match ch {
            ',' | ';' | '\n' => ' ',
            other => other,
        })
        .collect()
}

fn or_label<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}

/// Builds an iCalendar file of all-day deadline events. Applications whose
/// deadline does not parse are skipped; with none left, returns `None` so
/// the caller can tell the user instead of writing an empty calendar.
pub fn deadlines_ics(applications: &[Application], now: DateTime<Utc>) -> Option<String> {
    let dated: Vec<(&Application, NaiveDate)> = applications
        .iter()
        .filter_map(|application| {
            let date = parse_date(application.deadline.as_deref()?)?;
            Some((application, date))
        })
        .collect();
    if dated.is_empty() {
        return None;
    }

    let dt_stamp = now.format("%Y%m%dT%H%M%SZ").to_string();
    let mut lines: Vec<String> = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//Admissions Tracker//EN".to_string(),
    ];

    for (application, date) in dated {
        let start = date.format("%Y%m%d").to_string();
        // ICS all-day convention: DTEND is the day after the event.
        let end = (date + Duration::days(1)).format("%Y%m%d").to_string();
        let school = ics_sanitize(or_label(&application.school_name, "Application"));
        let program = ics_sanitize(or_label(&application.program_name, "Program"));
        lines.push("BEGIN:VEVENT".to_string());
        lines.push(format!("UID:{}-{start}@admissions-tracker", application.id));
        lines.push(format!("DTSTAMP:{dt_stamp}"));
        lines.push(format!("DTSTART;VALUE=DATE:{start}"));
        lines.push(format!("DTEND;VALUE=DATE:{end}"));
        lines.push(format!("SUMMARY:{school} {program} Deadline"));
        lines.push(format!(
            "DESCRIPTION:Round: {}\\nStatus: {}\\nDecision: {}",
            ics_sanitize(or_label(&application.application_round, "N/A")),
            ics_sanitize(or_label(&application.status, "Planning")),
            ics_sanitize(or_label(&application.decision_status, "Pending")),
        ));
        lines.push("END:VEVENT".to_string());
    }

    lines.push("END:VCALENDAR".to_string());
    Some(lines.join("\r\n"))
}

/// One JSON document describing the whole portfolio: applications enriched
/// with their derived numbers, plus essays and document state.
pub fn portfolio_snapshot(
    rows: &[ReadinessRow],
    essays: &[Essay],
    doc_status: &DocStatusMap,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> anyhow::Result<serde_json::Value> {
    let mut enriched = Vec::with_capacity(rows.len());
    let mut upcoming = 0usize;
    for row in rows {
        let days_until = days_until_deadline(row.application.deadline.as_deref(), today);
        if days_until.is_some_and(|days| days >= 0) {
            upcoming += 1;
        }
        let mut value = serde_json::to_value(&row.application)?;
        let object = value
            .as_object_mut()
            .context("application serialized to a non-object")?;
        object.insert("readiness_score".to_string(), json!(row.readiness.readiness));
        object.insert("essays_drafted".to_string(), json!(row.readiness.essay_drafted));
        object.insert("docs_ready".to_string(), json!(row.readiness.docs_ready));
        object.insert("days_until_deadline".to_string(), json!(days_until));
        enriched.push(value);
    }

    Ok(json!({
        "generated_at": now.to_rfc3339(),
        "summary": {
            "applications": rows.len(),
            "essays": essays.len(),
            "upcoming_deadlines": upcoming,
        },
        "applications": enriched,
        "essays": essays,
        "documents": doc_status,
    }))
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
    fn csv_has_quoted_header_and_computed_days() {
        let mut app = application(1);
        app.school_name = "X".to_string();
        app.program_name = "Y".to_string();
        app.application_round = "R1".to_string();
        app.deadline = Some("2027-01-15".to_string());

        let csv = applications_csv(&[app], today()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "\"School\",\"Program\",\"Round\",\"Deadline\",\"Days Until Deadline\",\"Status\",\"Decision\""
        );
        let expected_days = (NaiveDate::from_ymd_opt(2027, 1, 15).unwrap() - today()).num_days();
        assert_eq!(
            lines[1],
            format!(
                "\"X\",\"Y\",\"R1\",\"2027-01-15\",\"{expected_days}\",\"Planning\",\"Pending\""
            )
        );
    }

    #[test]
    fn csv_doubles_embedded_quotes_and_blanks_missing_deadlines() {
        let mut app = application(1);
        app.school_name = "Say \"hi\"".to_string();
        app.deadline = None;
        let csv = applications_csv(&[app], today()).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with("\"Say \"\"hi\"\"\""));
        assert!(row.contains("\"\",\"\","));
    }

    #[test]
    fn ics_skips_when_no_dated_applications() {
        let mut undated = application(1);
        undated.deadline = None;
        let mut broken = application(2);
        broken.deadline = Some("soon".to_string());
        assert!(deadlines_ics(&[undated, broken], Utc::now()).is_none());
    }

    #[test]
    fn ics_emits_one_all_day_event_per_dated_application() {
        let mut app = application(3);
        app.deadline = Some("2027-01-15".to_string());
        let ics = deadlines_ics(&[app], Utc::now()).unwrap();

        assert!(ics.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Admissions Tracker//EN"));
        assert!(ics.ends_with("END:VCALENDAR"));
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
        assert_eq!(ics.matches("END:VEVENT").count(), 1);
        assert!(ics.contains("DTSTART;VALUE=DATE:20270115"));
        assert!(ics.contains("DTEND;VALUE=DATE:20270116"));
        assert!(ics.contains("UID:3-20270115@admissions-tracker"));
    }

    #[test]
    fn ics_strips_separator_characters_from_free_text() {
        let mut app = application(4);
        app.deadline = Some("2027-01-15".to_string());
        app.school_name = "Alpha, Beta; Gamma\nDelta".to_string();
        let ics = deadlines_ics(&[app], Utc::now()).unwrap();
        assert!(ics.contains("SUMMARY:Alpha  Beta  Gamma Delta MBA Deadline"));
    }

    #[test]
    fn snapshot_enriches_applications_with_derived_fields() {
        let mut app = application(1);
        app.deadline = Some("2027-01-15".to_string());
        let rows = readiness_rows(&[app], &[], &HashMap::new(), DOC_TEMPLATES);
        let snapshot =
            portfolio_snapshot(&rows, &[], &HashMap::new(), today(), Utc::now()).unwrap();

        assert_eq!(snapshot["summary"]["applications"], 1);
        assert_eq!(snapshot["summary"]["upcoming_deadlines"], 1);
        let first = &snapshot["applications"][0];
        assert!(first["readiness_score"].is_i64());
        assert!(first["days_until_deadline"].as_i64().unwrap() > 0);
        assert_eq!(first["school_name"], "Harborview");
    }
}
