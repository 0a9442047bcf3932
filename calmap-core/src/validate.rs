//! Row validation against a template and mapping.
//!
//! Two independent passes over the same normalized rows: a structural pass
//! (hard errors, bounded samples, true counts) and a schema-specific
//! business pass (advisory warnings). Neither pass gates the codec; rows
//! that fail here still serialize so the outputs can be inspected side by
//! side.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::dates::parse_flexible;
use crate::mapping::{self, FieldValue, Mapping, NormalizedRow, SourceRow};
use crate::template::{FieldType, Template};

/// Structural error samples retained per run. `error_count` still reflects
/// the true total.
pub const MAX_SAMPLE_ERRORS: usize = 50;

/// Business warning samples retained per run.
pub const MAX_BUSINESS_WARNINGS: usize = 10;

// Business heuristics for calendar rows.
const FAR_PAST_DAYS: i64 = 365;
const FAR_FUTURE_DAYS: i64 = 3 * 365;
const VERY_LONG_EVENT_DAYS: i64 = 7;
const MIN_TITLE_CHARS: usize = 3;
const GENERIC_TITLES: &[&str] = &[
    "event",
    "meeting",
    "appointment",
    "reminder",
    "busy",
    "untitled",
    "new event",
];

/// One structural problem, addressable to a row and field.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    /// 1-based data row number (the header row is not counted).
    pub row: usize,
    pub field: String,
    pub issue: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    EndBeforeStart,
    EventFarPast,
    EventFarFuture,
    VeryLongEvent,
    ShortTitle,
    GenericTitle,
}

/// One advisory business warning.
#[derive(Debug, Clone, Serialize)]
pub struct BusinessWarning {
    pub row: usize,
    pub kind: WarningKind,
    pub message: String,
}

/// Outcome of a validation run. Derived, never persisted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationResult {
    /// Rows with no structural errors.
    pub ok_count: usize,
    /// Rows with at least one structural error.
    pub error_count: usize,
    pub sample_errors: Vec<ValidationError>,
    pub business_warnings: Vec<BusinessWarning>,
    /// More warnings existed than the sample holds.
    pub warnings_truncated: bool,
}

/// Validate rows against the template through the given mapping.
///
/// Reads the wall clock for the far-past/far-future heuristics; use
/// [`validate_rows_at`] to pin "now" in tests.
pub fn validate_rows(rows: &[SourceRow], template: &Template, mapping: &Mapping) -> ValidationResult {
    validate_rows_at(rows, template, mapping, Utc::now())
}

/// [`validate_rows`] with an explicit "now".
pub fn validate_rows_at(
    rows: &[SourceRow],
    template: &Template,
    mapping: &Mapping,
    now: DateTime<Utc>,
) -> ValidationResult {
    let normalized = mapping::apply_mapping(rows, template, mapping);
    let mut result = ValidationResult::default();
    let mut warnings_total = 0usize;

    for (idx, row) in normalized.rows.iter().enumerate() {
        let row_number = idx + 1;
        let mut row_errors: Vec<ValidationError> = Vec::new();

        structural_pass(row, template, mapping, row_number, &mut row_errors);

        if row_errors.is_empty() {
            result.ok_count += 1;
        } else {
            result.error_count += 1;
        }
        for error in row_errors {
            if result.sample_errors.len() < MAX_SAMPLE_ERRORS {
                result.sample_errors.push(error);
            }
        }

        if template.key == "calendar-ics" {
            for warning in business_pass(row, row_number, now) {
                warnings_total += 1;
                if result.business_warnings.len() < MAX_BUSINESS_WARNINGS {
                    result.business_warnings.push(warning);
                }
            }
        }
    }

    result.warnings_truncated = warnings_total > result.business_warnings.len();
    result
}

fn text_of<'a>(row: &'a NormalizedRow, key: &str) -> Option<&'a str> {
    row.get(key).and_then(FieldValue::as_text)
}

fn structural_pass(
    row: &NormalizedRow,
    template: &Template,
    mapping: &Mapping,
    row_number: usize,
    errors: &mut Vec<ValidationError>,
) {
    for field in template.fields {
        let mapped = mapping.contains_key(field.key);

        if field.required && !mapped {
            errors.push(ValidationError {
                row: row_number,
                field: field.key.to_string(),
                issue: "No column mapped for required field".to_string(),
                value: None,
            });
            continue;
        }
        if !mapped {
            continue;
        }

        let value = row.get(field.key);
        let text = value.and_then(|v| v.as_text());

        if field.required && text.is_none_or(|t| t.is_empty()) {
            errors.push(ValidationError {
                row: row_number,
                field: field.key.to_string(),
                issue: "Missing required value".to_string(),
                value: None,
            });
            continue;
        }

        // Numeric coercion sanity: the `number` transform leaves
        // non-parseable input as text
        if field.field_type == FieldType::Number {
            if let Some(t) = text.filter(|t| !t.is_empty()) {
                errors.push(ValidationError {
                    row: row_number,
                    field: field.key.to_string(),
                    issue: "Not a number".to_string(),
                    value: Some(t.to_string()),
                });
            }
        }
    }

    // Date parseability for the calendar schema
    if template.key == "calendar-ics" {
        for key in ["start", "end"] {
            if let Some(text) = text_of(row, key).filter(|t| !t.is_empty()) {
                if parse_flexible(text, true).is_none() {
                    errors.push(ValidationError {
                        row: row_number,
                        field: key.to_string(),
                        issue: "Unparseable date".to_string(),
                        value: Some(text.to_string()),
                    });
                }
            }
        }
    }
}

fn business_pass(row: &NormalizedRow, row_number: usize, now: DateTime<Utc>) -> Vec<BusinessWarning> {
    let mut warnings = Vec::new();

    let all_day = row
        .get("all_day")
        .and_then(FieldValue::as_flag)
        .unwrap_or(false);
    let start = text_of(row, "start")
        .filter(|t| !t.is_empty())
        .and_then(|t| parse_flexible(t, true));
    let end = text_of(row, "end")
        .filter(|t| !t.is_empty())
        .and_then(|t| parse_flexible(t, true));

    if let (Some(start), Some(end)) = (start, end) {
        let reversed = if all_day {
            end.date_naive() < start.date_naive()
        } else {
            end.timeline() <= start.timeline()
        };
        if reversed {
            warnings.push(BusinessWarning {
                row: row_number,
                kind: WarningKind::EndBeforeStart,
                message: format!("Row {}: End is not after start", row_number),
            });
        } else if end.timeline() - start.timeline() > Duration::days(VERY_LONG_EVENT_DAYS) {
            warnings.push(BusinessWarning {
                row: row_number,
                kind: WarningKind::VeryLongEvent,
                message: format!(
                    "Row {}: Event runs longer than {} days",
                    row_number, VERY_LONG_EVENT_DAYS
                ),
            });
        }
    }

    if let Some(start) = start {
        let age = now.naive_utc() - start.timeline();
        if age > Duration::days(FAR_PAST_DAYS) {
            warnings.push(BusinessWarning {
                row: row_number,
                kind: WarningKind::EventFarPast,
                message: format!("Row {}: Event is more than a year in the past", row_number),
            });
        } else if -age > Duration::days(FAR_FUTURE_DAYS) {
            warnings.push(BusinessWarning {
                row: row_number,
                kind: WarningKind::EventFarFuture,
                message: format!(
                    "Row {}: Event is more than {} years in the future",
                    row_number,
                    FAR_FUTURE_DAYS / 365
                ),
            });
        }
    }

    if let Some(title) = text_of(row, "title").map(str::trim).filter(|t| !t.is_empty()) {
        if title.chars().count() < MIN_TITLE_CHARS {
            warnings.push(BusinessWarning {
                row: row_number,
                kind: WarningKind::ShortTitle,
                message: format!("Row {}: Title {:?} is suspiciously short", row_number, title),
            });
        } else if GENERIC_TITLES.contains(&title.to_lowercase().as_str()) {
            warnings.push(BusinessWarning {
                row: row_number,
                kind: WarningKind::GenericTitle,
                message: format!("Row {}: Title {:?} is generic", row_number, title),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::calendar_ics;
    use chrono::TimeZone;

    fn mapping_for(pairs: &[(&str, &str)]) -> Mapping {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn row_of(pairs: &[(&str, &str)]) -> SourceRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_valid_rows_count_ok() {
        let mapping = mapping_for(&[("title", "Title"), ("start", "Start"), ("end", "End")]);
        let rows = vec![row_of(&[
            ("Title", "Standup"),
            ("Start", "2025-06-15T09:00:00"),
            ("End", "2025-06-15T09:30:00"),
        ])];

        let result = validate_rows_at(&rows, calendar_ics(), &mapping, fixed_now());
        assert_eq!(result.ok_count, 1);
        assert_eq!(result.error_count, 0);
        assert!(result.sample_errors.is_empty());
        assert!(result.business_warnings.is_empty());
    }

    #[test]
    fn test_missing_required_value_is_error() {
        let mapping = mapping_for(&[("title", "Title"), ("start", "Start")]);
        let rows = vec![row_of(&[("Title", ""), ("Start", "2025-06-15")])];

        let result = validate_rows_at(&rows, calendar_ics(), &mapping, fixed_now());
        assert_eq!(result.error_count, 1);
        assert_eq!(result.sample_errors[0].field, "title");
        assert_eq!(result.sample_errors[0].issue, "Missing required value");
    }

    #[test]
    fn test_unmapped_required_field_is_error() {
        let mapping = mapping_for(&[("title", "Title")]);
        let rows = vec![row_of(&[("Title", "Standup")])];

        let result = validate_rows_at(&rows, calendar_ics(), &mapping, fixed_now());
        assert_eq!(result.error_count, 1);
        assert!(
            result
                .sample_errors
                .iter()
                .any(|e| e.field == "start" && e.issue.contains("No column mapped"))
        );
    }

    #[test]
    fn test_unparseable_date_is_error() {
        let mapping = mapping_for(&[("title", "Title"), ("start", "Start")]);
        let rows = vec![row_of(&[("Title", "Standup"), ("Start", "not-a-date")])];

        let result = validate_rows_at(&rows, calendar_ics(), &mapping, fixed_now());
        assert_eq!(result.error_count, 1);
        let error = &result.sample_errors[0];
        assert_eq!(error.field, "start");
        assert_eq!(error.issue, "Unparseable date");
        assert_eq!(error.value.as_deref(), Some("not-a-date"));
    }

    #[test]
    fn test_error_samples_capped_but_count_true() {
        let mapping = mapping_for(&[("title", "Title"), ("start", "Start")]);
        let rows: Vec<SourceRow> = (0..10_000)
            .map(|_| row_of(&[("Title", ""), ("Start", "2025-06-15")]))
            .collect();

        let result = validate_rows_at(&rows, calendar_ics(), &mapping, fixed_now());
        assert_eq!(result.error_count, 10_000);
        assert_eq!(result.sample_errors.len(), MAX_SAMPLE_ERRORS);
    }

    #[test]
    fn test_end_before_start_warning() {
        let mapping = mapping_for(&[("title", "Title"), ("start", "Start"), ("end", "End")]);
        let rows = vec![row_of(&[
            ("Title", "Backwards"),
            ("Start", "2025-06-15T15:00:00"),
            ("End", "2025-06-15T14:00:00"),
        ])];

        let result = validate_rows_at(&rows, calendar_ics(), &mapping, fixed_now());
        assert_eq!(result.error_count, 0, "warnings must not block");
        assert!(
            result
                .business_warnings
                .iter()
                .any(|w| w.kind == WarningKind::EndBeforeStart)
        );
    }

    #[test]
    fn test_all_day_end_before_start_warning() {
        let mapping = mapping_for(&[
            ("title", "Title"),
            ("start", "Start"),
            ("end", "End"),
            ("all_day", "AllDay"),
        ]);
        let rows = vec![row_of(&[
            ("Title", "Backwards holiday"),
            ("Start", "2025-06-15"),
            ("End", "2025-06-10"),
            ("AllDay", "yes"),
        ])];

        let result = validate_rows_at(&rows, calendar_ics(), &mapping, fixed_now());
        assert!(
            result
                .business_warnings
                .iter()
                .any(|w| w.kind == WarningKind::EndBeforeStart)
        );
    }

    #[test]
    fn test_all_day_same_start_and_end_accepted() {
        let mapping = mapping_for(&[
            ("title", "Title"),
            ("start", "Start"),
            ("end", "End"),
            ("all_day", "AllDay"),
        ]);
        let rows = vec![row_of(&[
            ("Title", "Holiday"),
            ("Start", "2025-12-25"),
            ("End", "2025-12-25"),
            ("AllDay", "true"),
        ])];

        let result = validate_rows_at(&rows, calendar_ics(), &mapping, fixed_now());
        assert!(result.business_warnings.is_empty());
    }

    #[test]
    fn test_far_past_and_generic_title_warnings() {
        let mapping = mapping_for(&[("title", "Title"), ("start", "Start")]);
        let rows = vec![
            row_of(&[("Title", "Meeting"), ("Start", "2020-01-01T10:00:00")]),
            row_of(&[("Title", "Q3"), ("Start", "2025-06-20T10:00:00")]),
        ];

        let result = validate_rows_at(&rows, calendar_ics(), &mapping, fixed_now());
        let kinds: Vec<WarningKind> = result.business_warnings.iter().map(|w| w.kind).collect();
        assert!(kinds.contains(&WarningKind::EventFarPast));
        assert!(kinds.contains(&WarningKind::GenericTitle));
        assert!(kinds.contains(&WarningKind::ShortTitle));
    }

    #[test]
    fn test_warning_sample_capped_with_indicator() {
        let mapping = mapping_for(&[("title", "Title"), ("start", "Start")]);
        let rows: Vec<SourceRow> = (0..25)
            .map(|_| row_of(&[("Title", "Meeting"), ("Start", "2025-06-20T10:00:00")]))
            .collect();

        let result = validate_rows_at(&rows, calendar_ics(), &mapping, fixed_now());
        assert_eq!(result.business_warnings.len(), MAX_BUSINESS_WARNINGS);
        assert!(result.warnings_truncated);
    }
}
