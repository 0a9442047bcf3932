//! Golden/red regression corpus for the ICS codec.
//!
//! Golden cases must validate clean; red cases must each produce an issue
//! matching a documented expected substring. The round-trip check pins the
//! contract that the same semantic input yields byte-identical output once
//! the volatile timestamp lines are stripped.

use crate::ics::{IcsCheck, IcsEvent, Severity, generate_ics, validate_events, validate_output};

/// One regression scenario.
pub struct QaCase {
    pub name: &'static str,
    pub description: &'static str,
    pub events: Vec<IcsEvent>,
    pub should_pass: bool,
    /// Substrings that must each match at least one issue message.
    pub expected_issues: &'static [&'static str],
}

/// Scenarios that must validate clean.
pub fn golden_cases() -> Vec<QaCase> {
    vec![
        QaCase {
            name: "Timed Event with Timezone",
            description: "Standard timed event with proper timezone",
            should_pass: true,
            expected_issues: &[],
            events: vec![IcsEvent {
                title: "Team Meeting".to_string(),
                start: "2025-03-15T09:00:00".to_string(),
                end: Some("2025-03-15T10:30:00".to_string()),
                timezone: Some("America/New_York".to_string()),
                location: Some("Conference Room A".to_string()),
                description: Some("Weekly team standup meeting".to_string()),
                ..Default::default()
            }],
        },
        QaCase {
            name: "All-Day Event",
            description: "Simple all-day event",
            should_pass: true,
            expected_issues: &[],
            events: vec![IcsEvent {
                title: "Company Holiday".to_string(),
                start: "2025-12-25".to_string(),
                end: Some("2025-12-25".to_string()),
                all_day: true,
                description: Some("Christmas Day - Office Closed".to_string()),
                ..Default::default()
            }],
        },
        QaCase {
            name: "DST Crossing Event",
            description: "Event that crosses the spring-forward boundary",
            should_pass: true,
            expected_issues: &[],
            events: vec![IcsEvent {
                title: "DST Transition Meeting".to_string(),
                start: "2025-03-09T01:30:00".to_string(),
                end: Some("2025-03-09T03:30:00".to_string()),
                timezone: Some("America/New_York".to_string()),
                description: Some("Meeting that spans the DST transition".to_string()),
                ..Default::default()
            }],
        },
        QaCase {
            name: "UTC Event",
            description: "Event in UTC timezone",
            should_pass: true,
            expected_issues: &[],
            events: vec![IcsEvent {
                title: "Global Standup".to_string(),
                start: "2025-01-15T14:00:00".to_string(),
                end: Some("2025-01-15T14:30:00".to_string()),
                timezone: Some("UTC".to_string()),
                description: Some("Daily global team standup".to_string()),
                ..Default::default()
            }],
        },
        QaCase {
            name: "Multiple Day All-Day Event",
            description: "Multi-day all-day event like a conference",
            should_pass: true,
            expected_issues: &[],
            events: vec![IcsEvent {
                title: "Tech Conference 2025".to_string(),
                start: "2025-06-15".to_string(),
                end: Some("2025-06-17".to_string()),
                all_day: true,
                location: Some("Convention Center".to_string()),
                description: Some("Annual technology conference".to_string()),
                url: Some("https://techconf2025.com".to_string()),
                ..Default::default()
            }],
        },
        QaCase {
            name: "Event with Duration",
            description: "Event using duration instead of end time",
            should_pass: true,
            expected_issues: &[],
            events: vec![IcsEvent {
                title: "Workshop".to_string(),
                start: "2025-04-20T10:00:00".to_string(),
                duration: Some("PT2H30M".to_string()),
                timezone: Some("Europe/London".to_string()),
                description: Some("React Development Workshop".to_string()),
                ..Default::default()
            }],
        },
    ]
}

/// Scenarios that must each fail with a specific, asserted issue.
pub fn red_cases() -> Vec<QaCase> {
    vec![
        QaCase {
            name: "End Before Start",
            description: "End time is before start time",
            should_pass: false,
            expected_issues: &["End time must be after start time"],
            events: vec![IcsEvent {
                title: "Invalid Event".to_string(),
                start: "2025-01-15T15:00:00".to_string(),
                end: Some("2025-01-15T14:00:00".to_string()),
                timezone: Some("UTC".to_string()),
                ..Default::default()
            }],
        },
        QaCase {
            name: "Invalid Timezone",
            description: "Unrecognized timezone identifier",
            should_pass: false,
            expected_issues: &["Unrecognized timezone"],
            events: vec![IcsEvent {
                title: "Bad Timezone Event".to_string(),
                start: "2025-01-15T10:00:00".to_string(),
                end: Some("2025-01-15T11:00:00".to_string()),
                timezone: Some("Invalid/Timezone".to_string()),
                ..Default::default()
            }],
        },
        QaCase {
            name: "Unescaped Special Characters",
            description: "Title and description with raw commas, semicolons, newlines",
            should_pass: false,
            expected_issues: &[
                "Title contains special characters",
                "Description contains special characters",
            ],
            events: vec![IcsEvent {
                title: "Meeting, Review; Planning".to_string(),
                description: Some(
                    "Discuss Q1 results,\nPlan Q2 strategy;\nReview budgets".to_string(),
                ),
                start: "2025-01-15T10:00:00".to_string(),
                end: Some("2025-01-15T11:00:00".to_string()),
                ..Default::default()
            }],
        },
        QaCase {
            name: "Missing Required Fields",
            description: "Event missing title and start",
            should_pass: false,
            expected_issues: &[
                "Missing required field 'title'",
                "Missing required field 'start'",
            ],
            events: vec![IcsEvent {
                description: Some("Event with missing required fields".to_string()),
                ..Default::default()
            }],
        },
        QaCase {
            name: "Invalid Date Format",
            description: "Malformed date strings",
            should_pass: false,
            expected_issues: &["Invalid start date format", "Invalid end date format"],
            events: vec![IcsEvent {
                title: "Bad Date Event".to_string(),
                start: "not-a-date".to_string(),
                end: Some("2025/15/45 25:00:00".to_string()),
                ..Default::default()
            }],
        },
        QaCase {
            name: "Invalid Duration Format",
            description: "Malformed duration string",
            should_pass: false,
            expected_issues: &["Invalid duration format"],
            events: vec![IcsEvent {
                title: "Bad Duration Event".to_string(),
                start: "2025-01-15T10:00:00".to_string(),
                duration: Some("2 hours".to_string()),
                ..Default::default()
            }],
        },
        QaCase {
            name: "Invalid Email Addresses",
            description: "Malformed organizer and attendee emails",
            should_pass: false,
            expected_issues: &["not a valid email address", "Invalid attendee email"],
            events: vec![IcsEvent {
                title: "Email Test Event".to_string(),
                start: "2025-01-15T10:00:00".to_string(),
                end: Some("2025-01-15T11:00:00".to_string()),
                organizer: Some("not-an-email".to_string()),
                attendees: Some("bad-email, also@not@valid".to_string()),
                ..Default::default()
            }],
        },
    ]
}

/// Outcome of one case.
pub struct QaOutcome {
    pub name: &'static str,
    pub passed: bool,
    pub errors: Vec<String>,
    pub check: IcsCheck,
}

/// Suite-level results.
pub struct QaReport {
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
    pub details: Vec<QaOutcome>,
}

/// Run the full golden + red corpus through the semantic validator.
pub fn run_qa_suite() -> QaReport {
    let cases: Vec<QaCase> = golden_cases().into_iter().chain(red_cases()).collect();
    let mut report = QaReport {
        passed: 0,
        failed: 0,
        total: cases.len(),
        details: Vec::new(),
    };

    for case in cases {
        let check = validate_events(&case.events);
        let mut errors: Vec<String> = Vec::new();

        if case.should_pass {
            for issue in check.issues.iter().filter(|i| i.severity == Severity::Error) {
                errors.push(format!("Golden case raised an error: {}", issue.message));
            }
        } else {
            for expected in case.expected_issues {
                let expected_lower = expected.to_lowercase();
                let found = check
                    .issues
                    .iter()
                    .any(|issue| issue.message.to_lowercase().contains(&expected_lower));
                if !found {
                    errors.push(format!("Expected issue not found: {expected}"));
                }
            }
        }

        let passed = errors.is_empty();
        if passed {
            report.passed += 1;
        } else {
            report.failed += 1;
        }
        report.details.push(QaOutcome {
            name: case.name,
            passed,
            errors,
            check,
        });
    }

    report
}

/// Result of a regeneration check.
pub struct RoundTrip {
    pub passed: bool,
    pub differences: Vec<String>,
    pub first: String,
    pub second: String,
}

/// Generate twice from the same events and compare after stripping the
/// volatile timestamp lines; both outputs must also pass structural
/// validation.
pub fn round_trip(events: &[IcsEvent], default_timezone: &str) -> RoundTrip {
    let first = generate_ics(events, default_timezone);
    let second = generate_ics(events, default_timezone);
    let mut differences: Vec<String> = Vec::new();

    if strip_volatile(&first) != strip_volatile(&second) {
        differences.push("regenerated output differs after stripping volatile lines".to_string());
    }
    for (label, text) in [("first", &first), ("second", &second)] {
        let check = validate_output(text);
        if !check.is_valid {
            differences.push(format!("{label} generation failed structural validation"));
        }
    }

    RoundTrip {
        passed: differences.is_empty(),
        differences,
        first,
        second,
    }
}

/// Drop the wall-clock-dependent lines (`DTSTAMP`, `CREATED`,
/// `LAST-MODIFIED`) so outputs can be compared for semantic equality.
pub fn strip_volatile(ics: &str) -> String {
    ics.split("\r\n")
        .filter(|line| {
            !(line.starts_with("DTSTAMP:")
                || line.starts_with("CREATED:")
                || line.starts_with("LAST-MODIFIED:"))
        })
        .collect::<Vec<&str>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suite_is_green() {
        let report = run_qa_suite();
        let failing: Vec<String> = report
            .details
            .iter()
            .filter(|d| !d.passed)
            .map(|d| format!("{}: {:?}", d.name, d.errors))
            .collect();
        assert_eq!(report.failed, 0, "failing cases: {failing:?}");
        assert_eq!(report.passed, report.total);
    }

    #[test]
    fn test_corpus_shape() {
        assert_eq!(golden_cases().len(), 6);
        assert_eq!(red_cases().len(), 7);
        assert!(red_cases().iter().all(|c| !c.expected_issues.is_empty()));
    }

    #[test]
    fn test_round_trip_stable_for_golden_cases() {
        for case in golden_cases() {
            let result = round_trip(&case.events, "UTC");
            assert!(
                result.passed,
                "{} round-trip differences: {:?}",
                case.name, result.differences
            );
        }
    }

    #[test]
    fn test_strip_volatile_removes_timestamp_lines() {
        let ics = generate_ics(&golden_cases()[0].events, "UTC");
        let stripped = strip_volatile(&ics);
        assert!(!stripped.contains("DTSTAMP"));
        assert!(!stripped.contains("CREATED"));
        assert!(!stripped.contains("LAST-MODIFIED"));
        assert!(stripped.contains("SUMMARY:Team Meeting"));
    }
}
