//! Core engine for converting tabular event data (CSV) into RFC 5545
//! calendar files.
//!
//! The pipeline: raw headers + rows are matched against a schema
//! [`Template`] by the mapping guesser, the resulting [`Mapping`] plus
//! per-field transform pipelines normalize the rows, the validator reports
//! structural errors and business warnings, and the ICS codec serializes
//! normalized events to RFC 5545 text with a companion structural validator
//! for the emitted document.
//!
//! Everything here is a pure, synchronous transformation over in-memory
//! collections: no I/O, no shared state, and no clock reads outside the
//! documented `generate_ics` / `validate_rows` entry points (both of which
//! have `_at` variants taking "now" explicitly). Bad row data is reported,
//! never thrown; the codec stays permissive so validation output and codec
//! output can be inspected side by side.

pub mod artifact;
pub mod dates;
pub mod error;
pub mod ics;
pub mod mapping;
pub mod qa;
pub mod template;
pub mod validate;

pub use artifact::MappingArtifact;
pub use error::{CalMapError, CalMapResult};
pub use ics::{
    IcsCheck, IcsEvent, IcsIssue, IcsStats, Severity, generate_ics, generate_ics_at,
    validate_events, validate_output,
};
pub use mapping::{
    FieldValue, Mapping, MappingResult, NormalizedRow, SourceRow, apply_mapping, guess_mapping,
};
pub use template::{Field, FieldType, Template, Transform, calendar_ics, find_template, templates};
pub use validate::{
    BusinessWarning, ValidationError, ValidationResult, WarningKind, validate_rows,
    validate_rows_at,
};
