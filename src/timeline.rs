use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};

use crate::dates::{days_until_deadline, parse_date};
use crate::models::Application;

#[derive(Debug, Clone)]
pub enum TimelineCell {
    /// Leading padding before the first weekday of the month.
    Empty { key: String },
    Day {
        key: String,
        day: u32,
        date_value: String,
        applications: Vec<Application>,
    },
}

#[derive(Debug, Clone)]
pub struct TimelineData {
    pub month_label: String,
    pub cells: Vec<TimelineCell>,
    pub applications_by_deadline: Vec<Application>,
}

#[derive(Debug, Clone, Default)]
pub struct DeadlineBuckets {
    pub overdue: Vec<Application>,
    pub critical: Vec<Application>,
    pub upcoming: Vec<Application>,
}

fn month_start(today: NaiveDate, offset: i32) -> Option<NaiveDate> {
    let total = today.year() as i64 * 12 + today.month0() as i64 + offset as i64;
    let year = total.div_euclid(12);
    let month0 = total.rem_euclid(12);
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month0 as u32 + 1, 1)
}

/// Projects applications onto a Sunday-first calendar month grid. Day cells
/// carry the applications whose raw deadline string equals that date; an
/// application with a malformed deadline never lands in a cell. `None` only
/// on month arithmetic overflow.
pub fn timeline_data(
    applications: &[Application],
    month_offset: i32,
    today: NaiveDate,
) -> Option<TimelineData> {
    let start = month_start(today, month_offset)?;
    let next = month_start(start, 1)?;
    let days_in_month = (next - Duration::days(1)).day();
    let month_label = start.format("%B %Y").to_string();
    let start_weekday = start.weekday().num_days_from_sunday();

    let mut by_deadline_key: HashMap<&str, Vec<Application>> = HashMap::new();
    for application in applications {
        if let Some(deadline) = application.deadline.as_deref() {
            by_deadline_key
                .entry(deadline)
                .or_default()
                .push(application.clone());
        }
    }

    let mut cells = Vec::with_capacity(start_weekday as usize + days_in_month as usize);
    for i in 0..start_weekday {
        cells.push(TimelineCell::Empty { key: format!("empty-{i}") });
    }
    for day in 1..=days_in_month {
        let key = format!("{:04}-{:02}-{:02}", start.year(), start.month(), day);
        cells.push(TimelineCell::Day {
            day,
            date_value: key.clone(),
            applications: by_deadline_key.get(key.as_str()).cloned().unwrap_or_default(),
            key,
        });
    }

    let mut applications_by_deadline = applications.to_vec();
    applications_by_deadline.sort_by(|a, b| {
        let a_date = a.deadline.as_deref().and_then(parse_date);
        let b_date = b.deadline.as_deref().and_then(parse_date);
        match (a_date, b_date) {
            (Some(a_date), Some(b_date)) => a_date.cmp(&b_date),
            _ => std::cmp::Ordering::Equal,
        }
    });

    Some(TimelineData {
        month_label,
        cells,
        applications_by_deadline,
    })
}

/// Splits deadline-sorted applications into overdue, critical (due within
/// two weeks), and upcoming. Undated applications are left out entirely.
pub fn deadline_buckets(applications: &[Application], today: NaiveDate) -> DeadlineBuckets {
    let mut buckets = DeadlineBuckets::default();
    for application in applications {
        match days_until_deadline(application.deadline.as_deref(), today) {
            None => continue,
            Some(days) if days < 0 => buckets.overdue.push(application.clone()),
            Some(days) if days <= 14 => buckets.critical.push(application.clone()),
            Some(_) => buckets.upcoming.push(application.clone()),
        }
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::application;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    #[test]
    fn grid_pads_to_the_first_weekday() {
        // March 2026 starts on a Sunday; May 2026 starts on a Friday.
        let march = timeline_data(&[], 0, today()).unwrap();
        assert_eq!(march.month_label, "March 2026");
        assert!(matches!(march.cells[0], TimelineCell::Day { .. }));
        assert_eq!(march.cells.len(), 31);

        let may = timeline_data(&[], 2, today()).unwrap();
        assert_eq!(may.month_label, "May 2026");
        let padding = may
            .cells
            .iter()
            .take_while(|cell| matches!(cell, TimelineCell::Empty { .. }))
            .count();
        assert_eq!(padding, 5);
        assert_eq!(may.cells.len(), 5 + 31);
    }

    #[test]
    fn negative_offsets_cross_year_boundaries() {
        let december = timeline_data(&[], -3, today()).unwrap();
        assert_eq!(december.month_label, "December 2025");
    }

    #[test]
    fn deadline_lands_in_its_exact_day_cell() {
        let mut app = application(1);
        app.deadline = Some("2026-03-15".to_string());
        let data = timeline_data(&[app], 0, today()).unwrap();
        let cell = data
            .cells
            .iter()
            .find_map(|cell| match cell {
                TimelineCell::Day { date_value, applications, .. }
                    if date_value == "2026-03-15" =>
                {
                    Some(applications)
                }
                _ => None,
            })
            .unwrap();
        assert_eq!(cell.len(), 1);
        assert_eq!(cell[0].id, 1);
    }

    #[test]
    fn malformed_deadline_is_not_placed_and_does_not_crash_the_sort() {
        let mut dated = application(1);
        dated.deadline = Some("2026-03-20".to_string());
        let mut earlier = application(2);
        earlier.deadline = Some("2026-03-05".to_string());
        let mut broken = application(3);
        broken.deadline = Some("not-a-date".to_string());

        let data = timeline_data(&[dated, earlier, broken], 0, today()).unwrap();
        let placed: usize = data
            .cells
            .iter()
            .map(|cell| match cell {
                TimelineCell::Day { applications, .. } => applications.len(),
                TimelineCell::Empty { .. } => 0,
            })
            .sum();
        assert_eq!(placed, 2);

        let dated_order: Vec<i64> = data
            .applications_by_deadline
            .iter()
            .filter(|a| a.deadline.as_deref().and_then(parse_date).is_some())
            .map(|a| a.id)
            .collect();
        assert_eq!(dated_order, vec![2, 1]);
    }

    #[test]
    fn buckets_split_on_zero_and_fourteen_days() {
        let mut late = application(1);
        late.deadline = Some("2026-03-09".to_string());
        let mut soon = application(2);
        soon.deadline = Some("2026-03-24".to_string()); // exactly 14 days
        let mut far = application(3);
        far.deadline = Some("2026-03-25".to_string());
        let mut undated = application(4);
        undated.deadline = None;

        let buckets = deadline_buckets(&[late, soon, far, undated], today());
        assert_eq!(buckets.overdue.len(), 1);
        assert_eq!(buckets.critical.len(), 1);
        assert_eq!(buckets.upcoming.len(), 1);
        assert_eq!(buckets.critical[0].id, 2);
    }
}
