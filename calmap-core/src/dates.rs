//! Flexible date/time parsing for heterogeneous CSV input.
//!
//! CSV exports carry dates in whatever shape the source tool used. Parsing
//! tries ISO 8601 first, then a fixed list of explicit formats. Ambiguous
//! numeric dates (`03/04/2025`) resolve by list order: US layouts come
//! before European ones, and that order is part of the contract.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

/// A parsed date/time.
///
/// Input without a UTC offset is a wall-clock time; the codec interprets it
/// in the event's effective timezone and emits it unchanged. Input with an
/// explicit offset is an absolute instant and gets projected into the
/// effective timezone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlexDateTime {
    Floating(NaiveDateTime),
    Absolute(DateTime<FixedOffset>),
}

impl FlexDateTime {
    /// Calendar date in the value's own frame (wall clock or carried offset).
    pub fn date_naive(&self) -> NaiveDate {
        match self {
            FlexDateTime::Floating(dt) => dt.date(),
            FlexDateTime::Absolute(dt) => dt.date_naive(),
        }
    }

    /// Naive timeline position for ordering checks. Floating values compare
    /// as if they were UTC; mixed comparisons are best-effort by nature.
    pub fn timeline(&self) -> NaiveDateTime {
        match self {
            FlexDateTime::Floating(dt) => *dt,
            FlexDateTime::Absolute(dt) => dt.naive_utc(),
        }
    }
}

// Datetime layouts, tried in order. US before European is the documented
// tie-break for ambiguous numeric dates.
const DATE_TIME_FORMATS: &[&str] = &[
    // ISO-like
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    // US
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %I:%M:%S %p",
    // European
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    // Other common layouts
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%B %d, %Y %I:%M %p",
    "%B %d, %Y %H:%M",
    "%b %d, %Y %I:%M %p",
    "%b %d, %Y %H:%M",
];

const DATE_ONLY_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%b %d, %Y",
];

// Guards against format cross-matches (e.g. `dd/MM` read as `MM/dd`, or a
// two-digit year read as year 25).
const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2100;

/// Parse a date string using ISO 8601 first, then the format lists.
///
/// Never fails loudly: unparseable input yields `None`. When `include_time`
/// is set and no datetime layout matches, the date-only layouts are retried
/// and the result is midnight wall time.
pub fn parse_flexible(text: &str, include_time: bool) -> Option<FlexDateTime> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    // ISO first. A single space between date and time is accepted as `T`.
    let normalized = trimmed.replacen(' ', "T", 1);
    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(FlexDateTime::Absolute(dt));
    }
    for iso in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, iso) {
            return Some(FlexDateTime::Floating(dt));
        }
    }

    if include_time {
        for fmt in DATE_TIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
                if (MIN_YEAR..=MAX_YEAR).contains(&dt.year()) {
                    return Some(FlexDateTime::Floating(dt));
                }
            }
        }
        // Fall back to a bare date at midnight
        return parse_flexible(trimmed, false);
    }

    for fmt in DATE_ONLY_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            if (MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
                return Some(FlexDateTime::Floating(date.and_time(NaiveTime::MIN)));
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn floating(text: &str) -> NaiveDateTime {
        match parse_flexible(text, true) {
            Some(FlexDateTime::Floating(dt)) => dt,
            other => panic!("expected floating parse for {:?}, got {:?}", text, other),
        }
    }

    #[test]
    fn test_iso_datetime_parses_as_floating() {
        let dt = floating("2025-03-15T09:00:00");
        assert_eq!(dt.to_string(), "2025-03-15 09:00:00");
    }

    #[test]
    fn test_space_separator_normalized_to_t() {
        assert_eq!(floating("2025-03-15 09:00:00"), floating("2025-03-15T09:00:00"));
    }

    #[test]
    fn test_explicit_offset_parses_as_absolute() {
        match parse_flexible("2025-03-15T09:00:00Z", true) {
            Some(FlexDateTime::Absolute(dt)) => {
                assert_eq!(dt.naive_utc().to_string(), "2025-03-15 09:00:00");
            }
            other => panic!("expected absolute, got {:?}", other),
        }
    }

    #[test]
    fn test_ambiguous_numeric_date_is_us_first() {
        // 03/04/2025 must read as March 4th, not April 3rd
        let dt = floating("03/04/2025 10:00");
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2025, 3, 4).unwrap());
    }

    #[test]
    fn test_unambiguous_european_date_parses() {
        // Day 25 can't be a month, so the European layout catches it
        let dt = floating("25/03/2025 10:00");
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2025, 3, 25).unwrap());
    }

    #[test]
    fn test_dotted_european_date() {
        let dt = floating("15.03.2025 18:30");
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
    }

    #[test]
    fn test_twelve_hour_clock() {
        let dt = floating("03/15/2025 2:30 PM");
        assert_eq!(dt.to_string(), "2025-03-15 14:30:00");
    }

    #[test]
    fn test_long_month_name() {
        let dt = floating("March 15, 2025 2:30 PM");
        assert_eq!(dt.to_string(), "2025-03-15 14:30:00");
    }

    #[test]
    fn test_date_only_fallback_is_midnight() {
        let dt = floating("2025-12-25");
        assert_eq!(dt.to_string(), "2025-12-25 00:00:00");
    }

    #[test]
    fn test_date_only_mode_accepts_iso_datetime() {
        // All-day columns sometimes carry full datetimes; the ISO step
        // still captures them in date-only mode.
        let parsed = parse_flexible("2025-12-25T09:00:00", false).unwrap();
        assert_eq!(parsed.date_naive(), NaiveDate::from_ymd_opt(2025, 12, 25).unwrap());
    }

    #[test]
    fn test_year_guard_rejects_two_digit_years() {
        assert!(parse_flexible("03/04/25 10:00", true).is_none());
    }

    #[test]
    fn test_garbage_returns_none() {
        assert!(parse_flexible("not-a-date", true).is_none());
        assert!(parse_flexible("2025/15/45 25:00:00", true).is_none());
        assert!(parse_flexible("", true).is_none());
        assert!(parse_flexible("   ", true).is_none());
    }
}
