use chrono::NaiveDate;

/// Parses a `YYYY-MM-DD` string into a calendar date. Empty, malformed, and
/// out-of-range inputs (month 13, February 31) all come back as `None`; a
/// missing date is never an error anywhere downstream.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let mut parts = value.trim().splitn(3, '-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let day: u32 = parts.next()?.parse().ok()?;
    if year == 0 || month == 0 || day == 0 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Signed whole-day distance from `today` to the deadline. Negative means
/// overdue, zero means due today, `None` means no usable deadline.
pub fn days_until_deadline(deadline: Option<&str>, today: NaiveDate) -> Option<i64> {
    let date = parse_date(deadline?)?;
    Some((date - today).num_days())
}
