//! Header-to-field mapping: guessing a mapping from CSV headers, and
//! applying a mapping plus transform pipelines to raw rows.
//!
//! Both operations are pure functions of their inputs so that validation and
//! codec output stay reproducible from (CSV content, template, mapping).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::template::{Field, Template, Transform};

/// Field key -> source CSV header. Partial: unmapped fields are absent.
pub type Mapping = BTreeMap<String, String>;

/// One raw CSV row, keyed by source header.
pub type SourceRow = BTreeMap<String, String>;

/// One transformed row, keyed by field key.
pub type NormalizedRow = BTreeMap<String, FieldValue>;

/// A cell value after its transform pipeline ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Flag(bool),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Flag(b) => write!(f, "{}", b),
        }
    }
}

/// Result of applying a mapping to a row collection.
#[derive(Debug, Clone)]
pub struct MappingResult {
    /// Mapped field keys, in template field order.
    pub headers: Vec<String>,
    pub rows: Vec<NormalizedRow>,
}

/// Match quality tiers, weakest first. Anything below `Containment` is
/// rejected outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MatchTier {
    Containment,
    Synonym,
    Label,
    Key,
}

/// Reduce a header or synonym to a comparable form: case-folded, with
/// whitespace and punctuation removed ("Start Date" == "start_date").
pub fn normalize_header(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

// Containment matches shorter than this are noise ("to" inside "total").
const MIN_CONTAINMENT_LEN: usize = 3;

fn match_tier(header: &str, field: &Field) -> Option<MatchTier> {
    let key = normalize_header(field.key);
    let label = normalize_header(field.label);

    if header == key {
        return Some(MatchTier::Key);
    }
    if header == label {
        return Some(MatchTier::Label);
    }
    if field.synonyms.iter().any(|s| normalize_header(s) == header) {
        return Some(MatchTier::Synonym);
    }

    let contains = |candidate: &str| {
        candidate.len() >= MIN_CONTAINMENT_LEN
            && header.len() >= MIN_CONTAINMENT_LEN
            && (header.contains(candidate) || candidate.contains(header))
    };
    if contains(&key)
        || contains(&label)
        || field.synonyms.iter().any(|s| contains(&normalize_header(s)))
    {
        return Some(MatchTier::Containment);
    }

    None
}

/// Propose a header -> field assignment for the template.
///
/// Deterministic and total: fields with no acceptable header are simply
/// absent from the result (required-field omission is the validator's job).
/// Earlier template fields claim headers first; within a tier the first
/// header in original order wins; a claimed header is never reused.
pub fn guess_mapping(headers: &[String], template: &Template) -> Mapping {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
    let mut claimed = vec![false; headers.len()];
    let mut mapping = Mapping::new();

    for field in template.fields {
        let mut best: Option<(MatchTier, usize)> = None;
        for (idx, norm) in normalized.iter().enumerate() {
            if claimed[idx] || norm.is_empty() {
                continue;
            }
            let Some(tier) = match_tier(norm, field) else {
                continue;
            };
            if best.is_none_or(|(best_tier, _)| tier > best_tier) {
                best = Some((tier, idx));
            }
        }
        if let Some((_, idx)) = best {
            claimed[idx] = true;
            mapping.insert(field.key.to_string(), headers[idx].clone());
        }
    }

    mapping
}

/// The token set the `boolean` transform coerces to `true`; everything else
/// is `false`.
pub fn is_truthy(text: &str) -> bool {
    matches!(
        text.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "y" | "on"
    )
}

fn apply_transforms(raw: String, pipeline: &[Transform]) -> FieldValue {
    let mut value = FieldValue::Text(raw);
    for transform in pipeline {
        value = match (transform, value) {
            (Transform::Trim, FieldValue::Text(s)) => FieldValue::Text(s.trim().to_string()),
            (Transform::Upper, FieldValue::Text(s)) => FieldValue::Text(s.to_uppercase()),
            (Transform::Lower, FieldValue::Text(s)) => FieldValue::Text(s.to_lowercase()),
            (Transform::Number, FieldValue::Text(s)) => match s.trim().parse::<f64>() {
                Ok(n) => FieldValue::Number(n),
                // Non-parseable numbers stay text; the validator flags them
                Err(_) => FieldValue::Text(s),
            },
            (Transform::Boolean, FieldValue::Text(s)) => FieldValue::Flag(is_truthy(&s)),
            (_, value) => value,
        };
    }
    value
}

/// Apply the mapping and each mapped field's transform pipeline to every row.
///
/// Missing source cells read as empty strings. Unmapped fields are absent
/// from the output rows; downstream consumers apply their own defaults.
pub fn apply_mapping(rows: &[SourceRow], template: &Template, mapping: &Mapping) -> MappingResult {
    let headers: Vec<String> = template
        .fields
        .iter()
        .filter(|f| mapping.contains_key(f.key))
        .map(|f| f.key.to_string())
        .collect();

    let rows = rows
        .iter()
        .map(|row| {
            let mut out = NormalizedRow::new();
            for field in template.fields {
                let Some(source) = mapping.get(field.key) else {
                    continue;
                };
                let raw = row.get(source).cloned().unwrap_or_default();
                out.insert(field.key.to_string(), apply_transforms(raw, field.transform));
            }
            out
        })
        .collect();

    MappingResult { headers, rows }
}
