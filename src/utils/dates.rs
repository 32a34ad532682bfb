use chrono::NaiveDate;

use crate::error::{HabitError, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a zero-padded `YYYY-MM-DD` day, reporting bad input as a validation
/// error. chrono alone would also accept `2024-6-1`.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let invalid = || HabitError::validation(format!("Invalid date '{}', expected YYYY-MM-DD", s));
    let raw = s.trim();
    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| invalid())?;
    if format_date(date) != raw {
        return Err(invalid());
    }
    Ok(date)
}

/// Whole calendar days from `earlier` to `later`.
pub fn day_gap(earlier: NaiveDate, later: NaiveDate) -> i64 {
    (later - earlier).num_days()
}

/// Every day from `start` to `end`, both inclusive.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn parses_iso_days() {
        assert_eq!(parse_date("2024-03-09").unwrap(), d("2024-03-09"));
        assert!(matches!(parse_date("09/03/2024"), Err(HabitError::Validation(_))));
        assert!(parse_date("2024-02-30").is_err());
    }

    #[test]
    fn rejects_unpadded_days() {
        assert!(matches!(parse_date("2024-6-1"), Err(HabitError::Validation(_))));
        assert!(matches!(parse_date("2024-06-1"), Err(HabitError::Validation(_))));
        assert!(matches!(parse_date("20240-6-01"), Err(HabitError::Validation(_))));
        assert_eq!(parse_date(" 2024-06-01 ").unwrap(), d("2024-06-01"));
    }

    #[test]
    fn gap_ignores_daylight_saving_boundaries() {
        // Spring-forward and fall-back weekends in most zones.
        assert_eq!(day_gap(d("2024-03-09"), d("2024-03-10")), 1);
        assert_eq!(day_gap(d("2024-10-26"), d("2024-10-27")), 1);
        assert_eq!(day_gap(d("2024-02-28"), d("2024-03-01")), 2);
    }

    #[test]
    fn range_is_inclusive() {
        let days: Vec<_> = days_between(d("2024-12-30"), d("2025-01-02")).collect();
        assert_eq!(days.len(), 4);
        assert_eq!(days[0], d("2024-12-30"));
        assert_eq!(days[3], d("2025-01-02"));
        assert_eq!(days_between(d("2025-01-02"), d("2025-01-01")).count(), 0);
    }
}
