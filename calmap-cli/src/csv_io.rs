//! CSV reading and report writing for the CLI.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use calmap_core::{SourceRow, ValidationError};

/// Read a CSV file (or stdin) into headers plus rows keyed by header.
///
/// Short records read as empty cells; fully empty lines are skipped.
pub fn read_csv(input: Option<&Path>) -> Result<(Vec<String>, Vec<SourceRow>)> {
    let reader: Box<dyn Read> = match input {
        Some(path) => Box::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        ),
        None => Box::new(io::stdin()),
    };

    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = csv_reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows: Vec<SourceRow> = Vec::new();
    for record in csv_reader.records() {
        let record = record.context("reading CSV record")?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let mut row = SourceRow::new();
        for (header, value) in headers.iter().zip(record.iter()) {
            row.insert(header.clone(), value.to_string());
        }
        rows.push(row);
    }

    Ok((headers, rows))
}

/// Write sample errors as a `Row, Field, Issue, Value` CSV report.
pub fn write_error_report(path: &Path, errors: &[ValidationError]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    writer.write_record(["Row", "Field", "Issue", "Value"])?;
    for error in errors {
        writer.write_record([
            error.row.to_string().as_str(),
            error.field.as_str(),
            error.issue.as_str(),
            error.value.as_deref().unwrap_or(""),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
