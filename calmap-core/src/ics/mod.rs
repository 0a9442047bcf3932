//! ICS document generation and validation.
//!
//! This module writes RFC 5545 text by hand: escaping, 75-octet line
//! folding, and timezone encoding are the contract here, so the bytes are
//! emitted directly rather than through a calendar library.

mod generate;
mod validate;

pub use generate::{
    IcsEvent, PRODID, escape_text, fold_line, generate_ics, generate_ics_at, unescape_text,
};
pub use validate::{IcsCheck, IcsIssue, IcsStats, Severity, validate_events, validate_output};
