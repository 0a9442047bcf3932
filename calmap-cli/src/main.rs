mod commands;
mod csv_io;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "calmap")]
#[command(about = "Convert CSV event data to RFC 5545 calendar files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Guess a mapping from CSV headers and write a mapping file
    Guess {
        /// Target schema (e.g. "calendar-ics")
        #[arg(long)]
        schema: String,

        /// Input CSV file (default: stdin)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Output mapping JSON file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Apply a mapping and generate the calendar file
    Map {
        /// Target schema (e.g. "calendar-ics")
        #[arg(long)]
        schema: String,

        /// Mapping JSON file
        #[arg(long)]
        mapping: PathBuf,

        /// Input CSV file (default: stdin)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Output .ics file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Default timezone for timed events without one
        #[arg(long, default_value = "UTC")]
        timezone: String,
    },
    /// Validate CSV data against a schema and mapping
    Validate {
        /// Target schema (e.g. "calendar-ics")
        #[arg(long)]
        schema: String,

        /// Mapping JSON file
        #[arg(long)]
        mapping: PathBuf,

        /// Input CSV file (default: stdin)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Write sample errors as a CSV report (Row, Field, Issue, Value)
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Run the golden/red regression suite and round-trip checks
    Qa,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Guess {
            schema,
            input,
            output,
        } => commands::guess::run(&schema, input.as_deref(), output.as_deref()),
        Commands::Map {
            schema,
            mapping,
            input,
            output,
            timezone,
        } => commands::map::run(&schema, &mapping, input.as_deref(), output.as_deref(), &timezone),
        Commands::Validate {
            schema,
            mapping,
            input,
            report,
        } => commands::validate::run(&schema, &mapping, input.as_deref(), report.as_deref()),
        Commands::Qa => commands::qa::run(),
    }
}
