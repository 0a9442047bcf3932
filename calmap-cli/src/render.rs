//! Terminal rendering for validation and QA results.
//!
//! Extension trait that adds colored reporting to calmap-core result types
//! using owo_colors.

use calmap_core::qa::{QaReport, RoundTrip};
use calmap_core::{IcsCheck, Severity, ValidationResult};
use owo_colors::OwoColorize;

/// Extension trait for terminal rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for ValidationResult {
    fn render(&self) -> String {
        let mut lines: Vec<String> = Vec::new();

        lines.push(format!("{} {} rows valid", "ok".green(), self.ok_count));
        if self.error_count > 0 {
            lines.push(format!(
                "{} {} rows with errors",
                "!!".red(),
                self.error_count
            ));
        }

        if !self.sample_errors.is_empty() {
            lines.push(String::new());
            lines.push("Sample errors:".bold().to_string());
            for error in &self.sample_errors {
                let value = error
                    .value
                    .as_deref()
                    .map(|v| format!(" ({v:?})"))
                    .unwrap_or_default();
                lines.push(format!(
                    "  row {} {}: {}{}",
                    error.row,
                    error.field.bold(),
                    error.issue,
                    value.dimmed()
                ));
            }
            if self.sample_errors.len() == calmap_core::validate::MAX_SAMPLE_ERRORS {
                lines.push(
                    format!("  (first {} errors shown)", self.sample_errors.len())
                        .dimmed()
                        .to_string(),
                );
            }
        }

        if !self.business_warnings.is_empty() {
            lines.push(String::new());
            lines.push("Warnings:".bold().to_string());
            for warning in &self.business_warnings {
                lines.push(format!("  {} {}", "~".yellow(), warning.message));
            }
            if self.warnings_truncated {
                lines.push("  ... more warnings omitted".dimmed().to_string());
            }
        }

        lines.join("\n")
    }
}

impl Render for IcsCheck {
    fn render(&self) -> String {
        let mut lines: Vec<String> = Vec::new();

        let status = if self.is_valid {
            "VALID".green().to_string()
        } else {
            "INVALID".red().to_string()
        };
        lines.push(format!("Status: {status}"));
        lines.push(format!("Events: {}", self.stats.total_events));

        for issue in &self.issues {
            let tag = match issue.severity {
                Severity::Error => "error".red().to_string(),
                Severity::Warning => "warn".yellow().to_string(),
            };
            lines.push(format!("  {tag} {}", issue.message));
        }

        lines.join("\n")
    }
}

impl Render for QaReport {
    fn render(&self) -> String {
        let mut lines: Vec<String> = Vec::new();

        lines.push("QA suite".bold().to_string());
        lines.push(format!(
            "{} passed, {} failed, {} total",
            self.passed.green(),
            if self.failed > 0 {
                self.failed.red().to_string()
            } else {
                self.failed.to_string()
            },
            self.total
        ));
        lines.push(String::new());

        for detail in &self.details {
            let mark = if detail.passed {
                "+".green().to_string()
            } else {
                "x".red().to_string()
            };
            lines.push(format!("{mark} {}", detail.name));
            for error in &detail.errors {
                lines.push(format!("    {}", error.red()));
            }
        }

        lines.join("\n")
    }
}

impl Render for RoundTrip {
    fn render(&self) -> String {
        if self.passed {
            format!("{} round-trip stable", "+".green())
        } else {
            let mut lines = vec![format!("{} round-trip failed", "x".red())];
            for difference in &self.differences {
                lines.push(format!("    {difference}"));
            }
            lines.join("\n")
        }
    }
}
