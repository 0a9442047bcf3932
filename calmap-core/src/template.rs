//! Schema templates for conversion targets.
//!
//! A template declares the fields of one conversion target: key, label,
//! required flag, value type, transform pipeline, and the synonym table the
//! mapping guesser matches CSV headers against. Templates are immutable and
//! defined at authoring time; field order doubles as guesser priority and
//! display order.

use serde::{Deserialize, Serialize};

use crate::error::{CalMapError, CalMapResult};

/// Value type of a field after transforms are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Enum,
}

/// A single step of a field's transform pipeline, applied in declared order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transform {
    Trim,
    Upper,
    Lower,
    Number,
    Boolean,
}

/// One field of a conversion target.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub key: &'static str,
    pub label: &'static str,
    pub required: bool,
    pub field_type: FieldType,
    pub transform: &'static [Transform],
    pub synonyms: &'static [&'static str],
}

/// A conversion target: ordered field list plus versioning metadata.
#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub key: &'static str,
    pub title: &'static str,
    pub fields: &'static [Field],
    pub notes: &'static [&'static str],
    pub template_version: &'static str,
    pub rule_version: &'static str,
    pub source_urls: &'static [&'static str],
    pub last_verified: &'static str,
}

/// The `calendar-ics` conversion target (RFC 5545).
pub static CALENDAR_ICS: Template = Template {
    key: "calendar-ics",
    title: "Calendar ICS",
    template_version: "2025.1.0",
    rule_version: "1.0.0",
    source_urls: &[
        "https://tools.ietf.org/rfc/rfc5545.txt",
        "https://icalendar.org/",
        "https://en.wikipedia.org/wiki/ICalendar",
    ],
    last_verified: "2025-01-22",
    notes: &[
        "Based on RFC 5545 iCalendar specification (2025)",
        "UTF-8 encoding required, comma-separated values",
        "Start/End must be valid dates or datetimes",
        "All Day events use DATE format (YYYYMMDD)",
        "Timed events use DATETIME format with timezone",
        "Duration can be used instead of End time",
        "UID will be auto-generated if not provided",
    ],
    fields: &[
        Field {
            key: "title",
            label: "Title",
            required: true,
            field_type: FieldType::String,
            transform: &[Transform::Trim],
            synonyms: &[
                "name",
                "event title",
                "summary",
                "subject",
                "event name",
                "título",
                "titulo",
                "nom",
                "bezeichnung",
                "nome",
            ],
        },
        Field {
            key: "start",
            label: "Start",
            required: true,
            field_type: FieldType::String,
            transform: &[Transform::Trim],
            synonyms: &[
                "start date",
                "start time",
                "begin",
                "from",
                "dtstart",
                "date",
                "inicio",
                "début",
                "beginn",
                "inizio",
            ],
        },
        Field {
            key: "end",
            label: "End",
            // Duration can stand in for End
            required: false,
            field_type: FieldType::String,
            transform: &[Transform::Trim],
            synonyms: &[
                "end date",
                "end time",
                "finish",
                "to",
                "dtend",
                "until",
                "fin",
                "ende",
                "fine",
            ],
        },
        Field {
            key: "duration",
            label: "Duration",
            required: false,
            field_type: FieldType::String,
            transform: &[Transform::Trim],
            synonyms: &[
                "length",
                "time",
                "hours",
                "minutes",
                "duración",
                "durée",
                "dauer",
                "durata",
            ],
        },
        Field {
            key: "all_day",
            label: "All Day",
            required: false,
            field_type: FieldType::Boolean,
            transform: &[Transform::Boolean],
            synonyms: &[
                "allday",
                "full day",
                "whole day",
                "all-day",
                "todo el día",
                "toute la journée",
                "ganztägig",
                "tutto il giorno",
            ],
        },
        Field {
            key: "timezone",
            label: "Timezone",
            required: false,
            field_type: FieldType::String,
            transform: &[Transform::Trim],
            synonyms: &[
                "tz",
                "time zone",
                "zona horaria",
                "fuseau horaire",
                "zeitzone",
                "fuso orario",
            ],
        },
        Field {
            key: "location",
            label: "Location",
            required: false,
            field_type: FieldType::String,
            transform: &[Transform::Trim],
            synonyms: &[
                "place",
                "venue",
                "address",
                "where",
                "ubicación",
                "lieu",
                "ort",
                "luogo",
            ],
        },
        Field {
            key: "description",
            label: "Description",
            required: false,
            field_type: FieldType::String,
            transform: &[Transform::Trim],
            synonyms: &[
                "notes",
                "details",
                "body",
                "content",
                "descripción",
                "note",
                "beschreibung",
                "descrizione",
            ],
        },
        Field {
            key: "url",
            label: "URL",
            required: false,
            field_type: FieldType::String,
            transform: &[Transform::Trim],
            synonyms: &[
                "link",
                "website",
                "web",
                "site",
                "enlace",
                "lien",
                "verknüpfung",
                "collegamento",
            ],
        },
        Field {
            key: "uid",
            label: "UID",
            required: false,
            field_type: FieldType::String,
            transform: &[Transform::Trim],
            synonyms: &["id", "unique id", "event id", "identifier"],
        },
        Field {
            key: "organizer",
            label: "Organizer",
            required: false,
            field_type: FieldType::String,
            transform: &[Transform::Trim],
            synonyms: &[
                "organizer email",
                "host",
                "created by",
                "organizador",
                "organisateur",
                "veranstalter",
                "organizzatore",
            ],
        },
        Field {
            key: "attendees",
            label: "Attendees",
            required: false,
            field_type: FieldType::String,
            transform: &[Transform::Trim],
            synonyms: &[
                "guests",
                "participants",
                "invitees",
                "asistentes",
                "teilnehmer",
                "partecipanti",
            ],
        },
    ],
};

/// All registered templates.
pub fn templates() -> &'static [Template] {
    std::slice::from_ref(&CALENDAR_ICS)
}

/// The calendar template.
pub fn calendar_ics() -> &'static Template {
    &CALENDAR_ICS
}

/// Look up a template by schema key.
pub fn find_template(key: &str) -> CalMapResult<&'static Template> {
    templates()
        .iter()
        .find(|t| t.key == key)
        .ok_or_else(|| CalMapError::UnknownSchema(key.to_string()))
}

impl Template {
    /// Field definition by key, if the template has it.
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.key == key)
    }
}
