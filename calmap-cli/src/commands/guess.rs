use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use calmap_core::{MappingArtifact, find_template, guess_mapping};
use chrono::Utc;
use owo_colors::OwoColorize;

use crate::csv_io;

pub fn run(schema: &str, input: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let template = find_template(schema)?;
    let (headers, _rows) = csv_io::read_csv(input)?;

    let mapping = guess_mapping(&headers, template);
    if mapping.is_empty() {
        eprintln!(
            "{}",
            "No headers matched any template field; edit the mapping by hand".yellow()
        );
    }

    let artifact = MappingArtifact::new(
        template,
        mapping,
        Utc::now().to_rfc3339(),
        "calmap-cli",
    );
    let json = serde_json::to_string_pretty(&artifact)?;

    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            println!(
                "Wrote mapping for {} field(s) to {}",
                artifact.mapping.len(),
                path.display().bold()
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}
