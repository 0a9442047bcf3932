use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use calmap_core::{
    IcsEvent, MappingArtifact, apply_mapping, find_template, generate_ics, validate_events,
};

use crate::csv_io;
use crate::render::Render;

pub fn run(
    schema: &str,
    mapping_path: &Path,
    input: Option<&Path>,
    output: Option<&Path>,
    timezone: &str,
) -> Result<()> {
    let template = find_template(schema)?;

    let mapping_json = fs::read_to_string(mapping_path)
        .with_context(|| format!("reading {}", mapping_path.display()))?;
    let artifact = MappingArtifact::parse(&mapping_json)?;
    if !artifact.schema.is_empty() && artifact.schema != template.key {
        anyhow::bail!(
            "Mapping file was generated for schema '{}', not '{}'",
            artifact.schema,
            template.key
        );
    }

    let (_headers, rows) = csv_io::read_csv(input)?;
    let result = apply_mapping(&rows, template, &artifact.mapping);
    let events: Vec<IcsEvent> = result.rows.iter().map(IcsEvent::from_normalized).collect();

    // Advisory only: the codec serializes invalid events too, so the report
    // and the document can be inspected side by side
    let check = validate_events(&events);
    if !check.issues.is_empty() {
        eprintln!("{}", check.render());
    }

    let ics = generate_ics(&events, timezone);

    match output {
        Some(path) => {
            fs::write(path, &ics).with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote {} event(s) to {}", events.len(), path.display());
        }
        None => println!("{ics}"),
    }

    Ok(())
}
