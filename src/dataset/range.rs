use chrono::NaiveDate;

use super::loader::parse_timestamp;
use crate::error::{AppError, Result};
use crate::types::TransactionRecord;

/// Inclusive calendar-date range.
///
/// An inverted range (`start > end`) is accepted and matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Parse the `start_date` / `end_date` request parameters.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Ok(Self {
            start: parse_bound("start_date", start)?,
            end: parse_bound("end_date", end)?,
        })
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Records with no timestamp never match.
    pub fn contains(&self, record: &TransactionRecord) -> bool {
        record.date().is_some_and(|d| self.contains_date(d))
    }
}

fn parse_bound(name: &str, raw: &str) -> Result<NaiveDate> {
    let s = raw.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(s).map(|ts| ts.date()))
        .ok_or_else(|| AppError::InvalidDate(format!("{name} '{raw}' is not an ISO-8601 date")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_dates_and_datetimes() {
        let r = DateRange::parse("2023-01-01", "2023-06-15T18:30:00+05:00").unwrap();
        assert_eq!(r, DateRange::new(d(2023, 1, 1), d(2023, 6, 15)));
    }

    #[test]
    fn malformed_bound_names_the_parameter() {
        let err = DateRange::parse("2023-01-01", "june").unwrap_err();
        assert!(matches!(err, AppError::InvalidDate(_)));
        assert!(err.to_string().contains("end_date"));

        let err = DateRange::parse("2023-02-30", "2023-03-01").unwrap_err();
        assert!(err.to_string().contains("start_date"));
    }

    #[test]
    fn bounds_are_inclusive() {
        let r = DateRange::new(d(2023, 1, 1), d(2023, 1, 31));
        assert!(r.contains_date(d(2023, 1, 1)));
        assert!(r.contains_date(d(2023, 1, 31)));
        assert!(!r.contains_date(d(2023, 2, 1)));
        assert!(!r.contains_date(d(2022, 12, 31)));
    }

    #[test]
    fn inverted_range_matches_nothing() {
        let r = DateRange::new(d(2023, 2, 1), d(2023, 1, 1));
        assert!(r.is_inverted());
        assert!(!r.contains_date(d(2023, 1, 15)));
        assert!(!r.contains_date(d(2023, 2, 1)));
    }
}
