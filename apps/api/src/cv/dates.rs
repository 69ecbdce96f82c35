//! Date conventions for CV entries.
//!
//! Entries carry dates as strings: a bare year (`2021`), a year-month pair
//! (`2021-06`) or the full `YYYY-MM-DD` the form date pickers emit. Anything
//! else is treated as absent. An absent end date means the entry is ongoing.

use chrono::{Datelike, NaiveDate};

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2100;

/// Shown in place of a missing end date.
pub const PRESENT: &str = "Present";
/// Shown in place of a missing start date.
pub const UNKNOWN_START: &str = "—";

/// Parses a date spec into the first day it covers.
/// `2021` → 2021-01-01, `2021-06` → 2021-06-01, `2021-06-15` → itself.
pub fn parse_date_spec(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let parts: Vec<&str> = s.split('-').collect();
    let date = match parts.as_slice() {
        [y] if is_digits(y, 4) => NaiveDate::from_ymd_opt(y.parse().ok()?, 1, 1),
        [y, m] if is_digits(y, 4) && is_digits(m, 2) => {
            NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, 1)
        }
        [y, m, d] if is_digits(y, 4) && is_digits(m, 2) && is_digits(d, 2) => {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
        }
        _ => None,
    }?;
    (MIN_YEAR..=MAX_YEAR).contains(&date.year()).then_some(date)
}

/// Keeps a date string only if it is a recognised spec; blanks and free text
/// collapse to `None`.
pub fn normalize_date(s: Option<&str>) -> Option<String> {
    let s = s?.trim();
    parse_date_spec(s).map(|_| s.to_string())
}

/// `"2020-01 – Present"`, `"— – 2019"`, ...
pub fn format_span(start: Option<&str>, end: Option<&str>) -> String {
    format!(
        "{} – {}",
        start.unwrap_or(UNKNOWN_START),
        end.unwrap_or(PRESENT)
    )
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_year_only() {
        assert_eq!(
            parse_date_spec("2021"),
            NaiveDate::from_ymd_opt(2021, 1, 1)
        );
    }

    #[test]
    fn test_parse_year_month() {
        assert_eq!(
            parse_date_spec("2021-06"),
            NaiveDate::from_ymd_opt(2021, 6, 1)
        );
    }

    #[test]
    fn test_parse_full_date() {
        assert_eq!(
            parse_date_spec("2021-06-15"),
            NaiveDate::from_ymd_opt(2021, 6, 15)
        );
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(parse_date_spec("1899").is_none());
        assert!(parse_date_spec("2101-01").is_none());
        assert!(parse_date_spec("2021-13").is_none());
        assert!(parse_date_spec("2021-02-30").is_none());
    }

    #[test]
    fn test_rejects_free_text() {
        assert!(parse_date_spec("June 2025").is_none());
        assert!(parse_date_spec("21-06").is_none());
        assert!(parse_date_spec("").is_none());
    }

    #[test]
    fn test_normalize_date_drops_blank() {
        assert_eq!(normalize_date(Some("  ")), None);
        assert_eq!(normalize_date(None), None);
        assert_eq!(normalize_date(Some(" 2020-03 ")), Some("2020-03".to_string()));
    }

    #[test]
    fn test_format_span_present() {
        assert_eq!(format_span(Some("2020-01"), None), "2020-01 – Present");
        assert_eq!(format_span(None, Some("2019")), "— – 2019");
    }
}
