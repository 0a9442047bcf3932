//! Persisted mapping artifact.
//!
//! The JSON hand-off between the guesser (or a human editing its output)
//! and the codec. The CLI's `map` and `validate` commands consume exactly
//! this shape; a bare `{field: header}` object is accepted too.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CalMapError, CalMapResult};
use crate::mapping::Mapping;
use crate::template::{Template, Transform};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingArtifact {
    pub schema: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_verified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_urls: Option<Vec<String>>,
    pub mapping: Mapping,
    /// Per-field transform pipeline overrides.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub transforms: BTreeMap<String, Vec<Transform>>,
    #[serde(default)]
    pub generated_at: String,
    #[serde(default)]
    pub generated_by: String,
}

impl MappingArtifact {
    /// Wrap a guessed mapping with the template's versioning metadata.
    pub fn new(template: &Template, mapping: Mapping, generated_at: String, generated_by: &str) -> Self {
        MappingArtifact {
            schema: template.key.to_string(),
            template_version: Some(template.template_version.to_string()),
            rule_version: Some(template.rule_version.to_string()),
            last_verified: Some(template.last_verified.to_string()),
            source_urls: Some(template.source_urls.iter().map(|s| s.to_string()).collect()),
            mapping,
            transforms: BTreeMap::new(),
            generated_at,
            generated_by: generated_by.to_string(),
        }
    }

    /// Parse an artifact from JSON. Accepts the full envelope or a bare
    /// `{field: header}` mapping object; anything else is a caller-input
    /// error that should abort the surrounding flow.
    pub fn parse(json: &str) -> CalMapResult<Self> {
        if let Ok(artifact) = serde_json::from_str::<MappingArtifact>(json) {
            return Ok(artifact);
        }
        let mapping: Mapping = serde_json::from_str(json)
            .map_err(|e| CalMapError::Artifact(format!("not a mapping file: {e}")))?;
        Ok(MappingArtifact {
            schema: String::new(),
            template_version: None,
            rule_version: None,
            last_verified: None,
            source_urls: None,
            mapping,
            transforms: BTreeMap::new(),
            generated_at: String::new(),
            generated_by: String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::guess_mapping;
    use crate::template::calendar_ics;

    #[test]
    fn test_envelope_round_trip() {
        let headers: Vec<String> = ["Subject", "Start", "End"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mapping = guess_mapping(&headers, calendar_ics());
        let artifact = MappingArtifact::new(
            calendar_ics(),
            mapping,
            "2025-01-22T10:00:00Z".to_string(),
            "calmap-cli",
        );

        let json = serde_json::to_string_pretty(&artifact).unwrap();
        assert!(json.contains("\"templateVersion\""));
        assert!(json.contains("\"generatedAt\""));

        let parsed = MappingArtifact::parse(&json).unwrap();
        assert_eq!(parsed.schema, "calendar-ics");
        assert_eq!(parsed.mapping.get("title").unwrap(), "Subject");
    }

    #[test]
    fn test_bare_mapping_object_accepted() {
        let parsed = MappingArtifact::parse(r#"{"title": "Subject", "start": "Start"}"#).unwrap();
        assert_eq!(parsed.mapping.get("start").unwrap(), "Start");
        assert!(parsed.schema.is_empty());
    }

    #[test]
    fn test_malformed_artifact_rejected() {
        assert!(MappingArtifact::parse("[1, 2, 3]").is_err());
        assert!(MappingArtifact::parse("not json").is_err());
    }
}
