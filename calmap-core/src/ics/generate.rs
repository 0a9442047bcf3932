//! RFC 5545 document generation.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::dates::{FlexDateTime, parse_flexible};
use crate::mapping::{FieldValue, NormalizedRow, is_truthy};

/// Product identifier emitted in every document.
pub const PRODID: &str = "-//CalMap//CalMap v1//EN";

const UID_DOMAIN: &str = "calmap.app";
const BASIC_DATETIME: &str = "%Y%m%dT%H%M%S";
const BASIC_DATE: &str = "%Y%m%d";

/// One event headed into the codec.
///
/// `start`/`end` stay loosely-formatted strings on purpose: the codec is
/// permissive and serializes whatever it is given (an unparseable date
/// collapses to an empty value), so validation output and codec output can
/// be inspected side by side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IcsEvent {
    pub title: String,
    pub start: String,
    pub end: Option<String>,
    pub duration: Option<String>,
    pub all_day: bool,
    pub timezone: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub uid: Option<String>,
    pub organizer: Option<String>,
    /// Semicolon-delimited email list.
    pub attendees: Option<String>,
}

impl IcsEvent {
    /// Build an event from a normalized row. Empty cells become `None`.
    pub fn from_normalized(row: &NormalizedRow) -> Self {
        let text = |key: &str| -> Option<String> {
            row.get(key)
                .and_then(FieldValue::as_text)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
        };
        let all_day = match row.get("all_day") {
            Some(FieldValue::Flag(flag)) => *flag,
            Some(FieldValue::Text(s)) => is_truthy(s),
            _ => false,
        };

        IcsEvent {
            title: text("title").unwrap_or_default(),
            start: text("start").unwrap_or_default(),
            end: text("end"),
            duration: text("duration"),
            all_day,
            timezone: text("timezone"),
            location: text("location"),
            description: text("description"),
            url: text("url"),
            uid: text("uid"),
            organizer: text("organizer"),
            attendees: text("attendees"),
        }
    }
}

/// Serialize events to an RFC 5545 document, stamping volatile fields with
/// the current instant. Output is identical across calls for identical
/// inputs once `DTSTAMP`/`CREATED`/`LAST-MODIFIED` are stripped.
pub fn generate_ics(events: &[IcsEvent], default_timezone: &str) -> String {
    generate_ics_at(events, default_timezone, Utc::now())
}

/// [`generate_ics`] with an explicit "now" for the volatile timestamp
/// fields. Fully deterministic.
pub fn generate_ics_at(events: &[IcsEvent], default_timezone: &str, now: DateTime<Utc>) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("BEGIN:VCALENDAR".to_string());
    lines.push("VERSION:2.0".to_string());
    lines.push(format!("PRODID:{PRODID}"));
    lines.push("CALSCALE:GREGORIAN".to_string());
    lines.push("METHOD:PUBLISH".to_string());

    let stamp = now.format("%Y%m%dT%H%M%SZ").to_string();

    for (index, event) in events.iter().enumerate() {
        lines.push("BEGIN:VEVENT".to_string());

        let uid = match event.uid.as_deref().filter(|u| !u.is_empty()) {
            Some(uid) => uid.to_string(),
            None => derive_uid(&event.title, &event.start, index),
        };
        lines.push(format!("UID:{uid}"));
        lines.push(format!("DTSTAMP:{stamp}"));
        lines.push(format!("SUMMARY:{}", escape_text(&event.title)));

        let tz = event
            .timezone
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(default_timezone);

        if event.all_day {
            lines.push(format!("DTSTART;VALUE=DATE:{}", format_date_only(&event.start)));
            match event.end.as_deref().filter(|e| !e.is_empty()) {
                Some(end) => {
                    lines.push(format!("DTEND;VALUE=DATE:{}", format_date_only(end)));
                }
                None => {
                    // RFC 5545 all-day DTEND is exclusive: start plus one day
                    lines.push(format!("DTEND;VALUE=DATE:{}", next_day(&event.start)));
                }
            }
        } else {
            lines.push(format!("DTSTART;TZID={tz}:{}", format_date_time(&event.start, tz)));
            if let Some(end) = event.end.as_deref().filter(|e| !e.is_empty()) {
                lines.push(format!("DTEND;TZID={tz}:{}", format_date_time(end, tz)));
            } else if let Some(duration) = event.duration.as_deref().filter(|d| !d.is_empty()) {
                lines.push(format!("DURATION:{duration}"));
            } else {
                lines.push("DURATION:PT1H".to_string());
            }
        }

        if let Some(location) = event.location.as_deref().filter(|v| !v.is_empty()) {
            lines.push(format!("LOCATION:{}", escape_text(location)));
        }
        if let Some(description) = event.description.as_deref().filter(|v| !v.is_empty()) {
            lines.push(format!("DESCRIPTION:{}", escape_text(description)));
        }
        if let Some(url) = event.url.as_deref().filter(|v| !v.is_empty()) {
            lines.push(format!("URL:{url}"));
        }
        if let Some(organizer) = event.organizer.as_deref().filter(|v| !v.is_empty()) {
            lines.push(format!("ORGANIZER:mailto:{organizer}"));
        }
        if let Some(attendees) = event.attendees.as_deref() {
            for email in attendees.split(';').map(str::trim).filter(|e| !e.is_empty()) {
                lines.push(format!("ATTENDEE:mailto:{email}"));
            }
        }

        lines.push(format!("CREATED:{stamp}"));
        lines.push(format!("LAST-MODIFIED:{stamp}"));
        lines.push("END:VEVENT".to_string());
    }

    lines.push("END:VCALENDAR".to_string());

    let folded: Vec<String> = lines.iter().map(|line| fold_line(line)).collect();
    folded.join("\r\n")
}

/// Stable UID for events without one: FNV-1a over `(title, start, index)`,
/// base-36, fixed domain suffix. Regenerating from the same input yields
/// the same UID.
fn derive_uid(title: &str, start: &str, index: usize) -> String {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = FNV_OFFSET;
    let index = index.to_string();
    for byte in title.bytes().chain(start.bytes()).chain(index.bytes()) {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }

    format!("{}@{UID_DOMAIN}", base36(hash))
}

fn base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    // base-36 digits are ASCII
    String::from_utf8(out).unwrap_or_default()
}

fn format_date_only(text: &str) -> String {
    match parse_flexible(text, false) {
        Some(parsed) => parsed.date_naive().format(BASIC_DATE).to_string(),
        None => String::new(),
    }
}

fn next_day(text: &str) -> String {
    parse_flexible(text, false)
        .map(|parsed| parsed.date_naive())
        .and_then(|date| date.succ_opt())
        .map(|date| date.format(BASIC_DATE).to_string())
        .unwrap_or_default()
}

/// Local time in the effective timezone, basic format, no trailing `Z`.
///
/// Floating input is already the wall time in that timezone and passes
/// through; only input with an explicit offset gets projected. An unknown
/// timezone id falls back to the UTC wall time.
fn format_date_time(text: &str, tz: &str) -> String {
    let Some(parsed) = parse_flexible(text, true) else {
        return String::new();
    };
    match parsed {
        FlexDateTime::Floating(naive) => naive.format(BASIC_DATETIME).to_string(),
        FlexDateTime::Absolute(instant) => match tz.parse::<Tz>() {
            Ok(zone) => instant.with_timezone(&zone).format(BASIC_DATETIME).to_string(),
            Err(_) => instant.naive_utc().format(BASIC_DATETIME).to_string(),
        },
    }
}

/// Escape TEXT property values. The single pass escapes backslashes first
/// by construction, so characters introduced by the other substitutions are
/// never re-escaped. Carriage returns are stripped.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Reverse [`escape_text`] for consumers reading ICS text back.
pub fn unescape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some(',') => out.push(','),
            Some(';') => out.push(';'),
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Fold a logical line per RFC 5545: the first physical line holds 75
/// octets, each continuation is a single space plus up to 74 more, joined
/// with CRLF. Splits never land inside a UTF-8 scalar.
pub fn fold_line(line: &str) -> String {
    const LIMIT: usize = 75;
    if line.len() <= LIMIT {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() + 3 * (line.len() / LIMIT + 1));
    let mut rest = line;
    let mut first = true;
    while !rest.is_empty() {
        let budget = if first { LIMIT } else { LIMIT - 1 };
        let take = floor_char_boundary(rest, budget.min(rest.len()));
        let (chunk, tail) = rest.split_at(take);
        if !first {
            out.push_str("\r\n ");
        }
        out.push_str(chunk);
        rest = tail;
        first = false;
    }
    out
}

fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()
    }

    fn timed_event() -> IcsEvent {
        IcsEvent {
            title: "Standup".to_string(),
            start: "2025-03-15T09:00:00".to_string(),
            end: Some("2025-03-15T09:30:00".to_string()),
            timezone: Some("America/New_York".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_document_wrapper() {
        let ics = generate_ics_at(&[timed_event()], "UTC", fixed_now());
        assert!(ics.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n"));
        assert!(ics.contains("PRODID:-//CalMap//CalMap v1//EN"));
        assert!(ics.contains("CALSCALE:GREGORIAN"));
        assert!(ics.contains("METHOD:PUBLISH"));
        assert!(ics.ends_with("END:VCALENDAR"));
    }

    #[test]
    fn test_timed_event_carries_tzid_wall_time() {
        let ics = generate_ics_at(&[timed_event()], "UTC", fixed_now());
        assert!(ics.contains("DTSTART;TZID=America/New_York:20250315T090000"));
        assert!(ics.contains("DTEND;TZID=America/New_York:20250315T093000"));
    }

    #[test]
    fn test_default_timezone_applies_when_event_has_none() {
        let mut event = timed_event();
        event.timezone = None;
        let ics = generate_ics_at(&[event], "Europe/London", fixed_now());
        assert!(ics.contains("DTSTART;TZID=Europe/London:20250315T090000"));
    }

    #[test]
    fn test_explicit_offset_input_is_projected() {
        let mut event = timed_event();
        event.start = "2025-03-15T14:00:00Z".to_string();
        event.end = None;
        let ics = generate_ics_at(&[event], "UTC", fixed_now());
        // 14:00 UTC is 10:00 in New York (EDT)
        assert!(ics.contains("DTSTART;TZID=America/New_York:20250315T100000"));
    }

    #[test]
    fn test_all_day_end_defaults_to_next_day() {
        let event = IcsEvent {
            title: "Holiday".to_string(),
            start: "2025-12-25".to_string(),
            all_day: true,
            ..Default::default()
        };
        let ics = generate_ics_at(&[event], "UTC", fixed_now());
        assert!(ics.contains("DTSTART;VALUE=DATE:20251225"));
        assert!(ics.contains("DTEND;VALUE=DATE:20251226"));
    }

    #[test]
    fn test_all_day_explicit_end_kept() {
        let event = IcsEvent {
            title: "Conference".to_string(),
            start: "2025-06-15".to_string(),
            end: Some("2025-06-17".to_string()),
            all_day: true,
            ..Default::default()
        };
        let ics = generate_ics_at(&[event], "UTC", fixed_now());
        assert!(ics.contains("DTEND;VALUE=DATE:20250617"));
    }

    #[test]
    fn test_duration_used_when_no_end() {
        let event = IcsEvent {
            title: "Workshop".to_string(),
            start: "2025-04-20T10:00:00".to_string(),
            duration: Some("PT2H30M".to_string()),
            ..Default::default()
        };
        let ics = generate_ics_at(&[event], "UTC", fixed_now());
        assert!(ics.contains("DURATION:PT2H30M"));
        assert!(!ics.contains("DTEND"));
    }

    #[test]
    fn test_end_wins_over_duration() {
        let mut event = timed_event();
        event.duration = Some("PT2H".to_string());
        let ics = generate_ics_at(&[event], "UTC", fixed_now());
        assert!(ics.contains("DTEND;TZID="));
        assert!(!ics.contains("DURATION:"));
    }

    #[test]
    fn test_duration_defaults_to_one_hour() {
        let mut event = timed_event();
        event.end = None;
        let ics = generate_ics_at(&[event], "UTC", fixed_now());
        assert!(ics.contains("DURATION:PT1H"));
    }

    #[test]
    fn test_attendee_line_per_email() {
        let mut event = timed_event();
        event.organizer = Some("host@example.com".to_string());
        event.attendees = Some("alice@example.com; bob@example.com;".to_string());
        let ics = generate_ics_at(&[event], "UTC", fixed_now());
        assert!(ics.contains("ORGANIZER:mailto:host@example.com"));
        let attendee_count = ics
            .split("\r\n")
            .filter(|l| l.starts_with("ATTENDEE:mailto:"))
            .count();
        assert_eq!(attendee_count, 2);
    }

    #[test]
    fn test_uid_verbatim_when_provided() {
        let mut event = timed_event();
        event.uid = Some("custom-123@example.com".to_string());
        let ics = generate_ics_at(&[event], "UTC", fixed_now());
        assert!(ics.contains("UID:custom-123@example.com"));
    }

    #[test]
    fn test_uid_derivation_is_idempotent() {
        let event = timed_event();
        let a = generate_ics_at(&[event.clone()], "UTC", fixed_now());
        let b = generate_ics_at(&[event], "UTC", fixed_now());
        let uid_of = |ics: &str| {
            ics.split("\r\n")
                .find(|l| l.starts_with("UID:"))
                .unwrap()
                .to_string()
        };
        assert_eq!(uid_of(&a), uid_of(&b));
        assert!(uid_of(&a).ends_with("@calmap.app"));
    }

    #[test]
    fn test_uid_varies_with_index() {
        let events = vec![timed_event(), timed_event()];
        let ics = generate_ics_at(&events, "UTC", fixed_now());
        let uids: Vec<&str> = ics
            .split("\r\n")
            .filter(|l| l.starts_with("UID:"))
            .collect();
        assert_eq!(uids.len(), 2);
        assert_ne!(uids[0], uids[1]);
    }

    #[test]
    fn test_unparseable_start_collapses_to_empty() {
        let mut event = timed_event();
        event.start = "not-a-date".to_string();
        event.end = None;
        let ics = generate_ics_at(&[event], "UTC", fixed_now());
        // Permissive by design: the document is still produced
        assert!(ics.contains("DTSTART;TZID=America/New_York:\r\n"));
    }

    #[test]
    fn test_escape_text_rules() {
        assert_eq!(escape_text("a,b;c"), "a\\,b\\;c");
        assert_eq!(escape_text("line1\nline2"), "line1\\nline2");
        assert_eq!(escape_text("back\\slash"), "back\\\\slash");
        assert_eq!(escape_text("strip\rme"), "stripme");
        // A backslash before a comma must not double-escape
        assert_eq!(escape_text("\\,"), "\\\\\\,");
    }

    #[test]
    fn test_escape_round_trip() {
        for original in ["plain", "a,b;c", "multi\nline", "tricky\\,mix;\n\\"] {
            let stripped: String = original.chars().filter(|&c| c != '\r').collect();
            assert_eq!(unescape_text(&escape_text(original)), stripped);
        }
    }

    #[test]
    fn test_fold_line_rejoins_to_original() {
        let long = format!("DESCRIPTION:{}", "x".repeat(300));
        let folded = fold_line(&long);
        for physical in folded.split("\r\n") {
            assert!(physical.len() <= 75, "physical line over 75 octets");
        }
        let rejoined: String = folded
            .split("\r\n")
            .enumerate()
            .map(|(i, l)| if i == 0 { l } else { &l[1..] })
            .collect();
        assert_eq!(rejoined, long);
    }

    #[test]
    fn test_fold_line_keeps_multibyte_chars_whole() {
        let long = format!("SUMMARY:{}", "é".repeat(100));
        let folded = fold_line(&long);
        for physical in folded.split("\r\n") {
            assert!(physical.len() <= 75);
            // would panic on a broken UTF-8 boundary
            let _ = physical.chars().count();
        }
    }

    #[test]
    fn test_short_line_not_folded() {
        assert_eq!(fold_line("SUMMARY:short"), "SUMMARY:short");
    }

    #[test]
    fn test_from_normalized_row() {
        let mut row = NormalizedRow::new();
        row.insert("title".into(), FieldValue::Text("Standup".into()));
        row.insert("start".into(), FieldValue::Text("2025-03-15T09:00:00".into()));
        row.insert("end".into(), FieldValue::Text(String::new()));
        row.insert("all_day".into(), FieldValue::Flag(false));
        row.insert("timezone".into(), FieldValue::Text("UTC".into()));

        let event = IcsEvent::from_normalized(&row);
        assert_eq!(event.title, "Standup");
        assert_eq!(event.end, None, "empty cells become None");
        assert!(!event.all_day);
        assert_eq!(event.timezone.as_deref(), Some("UTC"));
    }
}
