//! Validators for events headed into the codec and for emitted ICS text.
//!
//! Two layers: `validate_events` checks event semantics before generation
//! (required fields, date sanity, timezone/duration/email formats), and
//! `validate_output` checks the serialized text independently of the
//! generator, so it also catches hand-edited or foreign ICS input.

use chrono_tz::Tz;
use serde::Serialize;

use crate::dates::parse_flexible;
use crate::ics::generate::IcsEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One validation finding.
#[derive(Debug, Clone, Serialize)]
pub struct IcsIssue {
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_index: Option<usize>,
    pub message: String,
}

impl IcsIssue {
    fn error(event_index: usize, field: &str, message: String) -> Self {
        IcsIssue {
            severity: Severity::Error,
            field: Some(field.to_string()),
            event_index: Some(event_index),
            message,
        }
    }

    fn warning(event_index: usize, field: Option<&str>, message: String) -> Self {
        IcsIssue {
            severity: Severity::Warning,
            field: field.map(str::to_string),
            event_index: Some(event_index),
            message,
        }
    }

    fn document(severity: Severity, message: String) -> Self {
        IcsIssue {
            severity,
            field: None,
            event_index: None,
            message,
        }
    }
}

/// Aggregate facts about the checked events or document.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct IcsStats {
    pub total_events: usize,
    pub valid_events: usize,
    pub has_all_required_fields: bool,
    pub has_timezone: bool,
    pub has_all_day_events: bool,
    pub has_timed_events: bool,
}

/// Validation outcome: valid means no error-severity issues.
#[derive(Debug, Clone, Serialize)]
pub struct IcsCheck {
    pub is_valid: bool,
    pub issues: Vec<IcsIssue>,
    pub stats: IcsStats,
}

impl IcsCheck {
    fn from_issues(issues: Vec<IcsIssue>, stats: IcsStats) -> Self {
        let is_valid = !issues.iter().any(|i| i.severity == Severity::Error);
        IcsCheck {
            is_valid,
            issues,
            stats,
        }
    }

    pub fn errors(&self) -> impl Iterator<Item = &IcsIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &IcsIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }
}

fn is_known_timezone(tz: &str) -> bool {
    tz.parse::<Tz>().is_ok()
}

fn contains_escapable_chars(text: &str) -> bool {
    text.contains([',', ';', '\\'])
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// RFC 5545 DUR-VALUE without the week form:
/// `P[nY][nM][nD][T[nH][nM][nS]]`, units in order, at least one component.
fn is_valid_duration(value: &str) -> bool {
    let Some(rest) = value.strip_prefix('P') else {
        return false;
    };
    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (rest, None),
    };

    let mut any = false;
    if !scan_units(date_part, &['Y', 'M', 'D'], &mut any) {
        return false;
    }
    match time_part {
        Some("") => return false,
        Some(time) => {
            if !scan_units(time, &['H', 'M', 'S'], &mut any) {
                return false;
            }
        }
        None => {}
    }
    any
}

fn scan_units(mut s: &str, units: &[char], any: &mut bool) -> bool {
    let mut next_unit = 0;
    while !s.is_empty() {
        let digits = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        if digits == 0 {
            return false;
        }
        let Some(unit) = s[digits..].chars().next() else {
            return false;
        };
        match units[next_unit..].iter().position(|&u| u == unit) {
            Some(pos) => next_unit += pos + 1,
            None => return false,
        }
        *any = true;
        s = &s[digits + unit.len_utf8()..];
    }
    true
}

/// Check events for RFC 5545 problems before generation.
///
/// Errors mark an event invalid; warnings are advisory and never block the
/// codec.
pub fn validate_events(events: &[IcsEvent]) -> IcsCheck {
    let mut issues: Vec<IcsIssue> = Vec::new();

    if events.is_empty() {
        issues.push(IcsIssue::document(
            Severity::Error,
            "No events to validate".to_string(),
        ));
        return IcsCheck::from_issues(issues, IcsStats::default());
    }

    let mut stats = IcsStats {
        total_events: events.len(),
        has_all_required_fields: true,
        ..IcsStats::default()
    };

    for (index, event) in events.iter().enumerate() {
        let number = index + 1;
        let mut event_valid = true;

        if event.title.trim().is_empty() {
            issues.push(IcsIssue::error(
                index,
                "title",
                format!("Event {number}: Missing required field 'title'"),
            ));
            event_valid = false;
        }

        let start = if event.start.trim().is_empty() {
            issues.push(IcsIssue::error(
                index,
                "start",
                format!("Event {number}: Missing required field 'start'"),
            ));
            event_valid = false;
            None
        } else {
            let parsed = parse_flexible(&event.start, true);
            if parsed.is_none() {
                issues.push(IcsIssue::error(
                    index,
                    "start",
                    format!("Event {number}: Invalid start date format"),
                ));
                event_valid = false;
            }
            parsed
        };

        let has_end = event.end.as_deref().is_some_and(|e| !e.is_empty());
        let has_duration = event.duration.as_deref().is_some_and(|d| !d.is_empty());

        if !has_end && !has_duration && !event.all_day {
            issues.push(IcsIssue::warning(
                index,
                None,
                format!("Event {number}: No end time or duration specified (defaults to 1 hour)"),
            ));
        }
        if has_end && has_duration {
            issues.push(IcsIssue::warning(
                index,
                None,
                format!("Event {number}: Both end time and duration specified (end time wins)"),
            ));
        }

        let end = match event.end.as_deref().filter(|e| !e.is_empty()) {
            Some(text) => {
                let parsed = parse_flexible(text, true);
                if parsed.is_none() {
                    issues.push(IcsIssue::error(
                        index,
                        "end",
                        format!("Event {number}: Invalid end date format"),
                    ));
                    event_valid = false;
                }
                parsed
            }
            None => None,
        };

        if !event.all_day {
            if let (Some(start), Some(end)) = (start, end) {
                if end.timeline() <= start.timeline() {
                    issues.push(IcsIssue::error(
                        index,
                        "end",
                        format!("Event {number}: End time must be after start time"),
                    ));
                    event_valid = false;
                }
            }
        } else if let (Some(start), Some(end)) = (start, end) {
            if end.date_naive() < start.date_naive() {
                issues.push(IcsIssue::error(
                    index,
                    "end",
                    format!("Event {number}: End date must not be before start date"),
                ));
                event_valid = false;
            }
        }

        if event.all_day {
            stats.has_all_day_events = true;
        } else {
            stats.has_timed_events = true;
        }

        if let Some(tz) = event.timezone.as_deref().filter(|t| !t.is_empty()) {
            stats.has_timezone = true;
            if !is_known_timezone(tz) {
                issues.push(IcsIssue::warning(
                    index,
                    Some("timezone"),
                    format!("Event {number}: Unrecognized timezone '{tz}'"),
                ));
            }
        }

        if let Some(duration) = event.duration.as_deref().filter(|d| !d.is_empty()) {
            if !is_valid_duration(duration) {
                issues.push(IcsIssue::warning(
                    index,
                    Some("duration"),
                    format!(
                        "Event {number}: Invalid duration format (expected RFC 5545, e.g. PT1H)"
                    ),
                ));
            }
        }

        if contains_escapable_chars(&event.title) {
            issues.push(IcsIssue::warning(
                index,
                Some("title"),
                format!("Event {number}: Title contains special characters that will be escaped"),
            ));
        }
        if event
            .description
            .as_deref()
            .is_some_and(contains_escapable_chars)
        {
            issues.push(IcsIssue::warning(
                index,
                Some("description"),
                format!(
                    "Event {number}: Description contains special characters that will be escaped"
                ),
            ));
        }

        if let Some(organizer) = event.organizer.as_deref().filter(|o| !o.is_empty()) {
            if !is_valid_email(organizer) {
                issues.push(IcsIssue::warning(
                    index,
                    Some("organizer"),
                    format!("Event {number}: Organizer '{organizer}' is not a valid email address"),
                ));
            }
        }
        if let Some(attendees) = event.attendees.as_deref() {
            for email in attendees
                .split([';', ','])
                .map(str::trim)
                .filter(|e| !e.is_empty())
            {
                if !is_valid_email(email) {
                    issues.push(IcsIssue::warning(
                        index,
                        Some("attendees"),
                        format!("Event {number}: Invalid attendee email '{email}'"),
                    ));
                }
            }
        }

        if event_valid {
            stats.valid_events += 1;
        } else {
            stats.has_all_required_fields = false;
        }
    }

    if stats.has_timed_events && !stats.has_timezone {
        issues.push(IcsIssue::document(
            Severity::Warning,
            "No timezone specified for timed events (they will be written in the default zone)"
                .to_string(),
        ));
    }

    IcsCheck::from_issues(issues, stats)
}

/// Fold limit in octets per physical line.
const FOLD_LIMIT: usize = 75;

/// Check serialized ICS text for structural compliance.
pub fn validate_output(text: &str) -> IcsCheck {
    let mut issues: Vec<IcsIssue> = Vec::new();

    let lines: Vec<&str> = text.split("\r\n").collect();
    for (i, line) in lines.iter().enumerate() {
        if line.len() > FOLD_LIMIT {
            let folded = lines.get(i + 1).is_some_and(|next| next.starts_with(' '));
            if !folded {
                issues.push(IcsIssue::document(
                    Severity::Error,
                    format!(
                        "Line {}: {} octets without a folded continuation (RFC 5545 folds at {})",
                        i + 1,
                        line.len(),
                        FOLD_LIMIT
                    ),
                ));
            }
        }
    }

    if text.contains('\n') && !text.contains("\r\n") {
        issues.push(IcsIssue::document(
            Severity::Warning,
            "Line endings are LF only; RFC 5545 requires CRLF".to_string(),
        ));
    }

    if !text.contains("BEGIN:VCALENDAR") || !text.contains("END:VCALENDAR") {
        issues.push(IcsIssue::document(
            Severity::Error,
            "Content is not wrapped in a VCALENDAR component".to_string(),
        ));
    }

    let begin_events = text.matches("BEGIN:VEVENT").count();
    let end_events = text.matches("END:VEVENT").count();
    if begin_events != end_events {
        issues.push(IcsIssue::document(
            Severity::Error,
            format!(
                "Mismatched VEVENT blocks: {begin_events} BEGIN:VEVENT vs {end_events} END:VEVENT"
            ),
        ));
    }

    let has_timezone = text.contains("TZID=");
    let stats = IcsStats {
        total_events: begin_events,
        valid_events: begin_events,
        has_all_required_fields: true,
        has_timezone,
        has_all_day_events: text.contains("VALUE=DATE:"),
        has_timed_events: has_timezone || text.contains("DTSTART:"),
    };

    IcsCheck::from_issues(issues, stats)
}
