use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use calmap_core::{MappingArtifact, find_template, validate_rows};

use crate::csv_io;
use crate::render::Render;

pub fn run(
    schema: &str,
    mapping_path: &Path,
    input: Option<&Path>,
    report: Option<&Path>,
) -> Result<()> {
    let template = find_template(schema)?;

    let mapping_json = fs::read_to_string(mapping_path)
        .with_context(|| format!("reading {}", mapping_path.display()))?;
    let artifact = MappingArtifact::parse(&mapping_json)?;

    let (_headers, rows) = csv_io::read_csv(input)?;
    let result = validate_rows(&rows, template, &artifact.mapping);

    println!("{}", result.render());

    if let Some(path) = report {
        csv_io::write_error_report(path, &result.sample_errors)?;
        println!("Wrote error report to {}", path.display());
    }

    Ok(())
}
