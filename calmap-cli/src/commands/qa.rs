use anyhow::Result;
use calmap_core::qa::{golden_cases, round_trip, run_qa_suite};

use crate::render::Render;

pub fn run() -> Result<()> {
    let report = run_qa_suite();
    println!("{}", report.render());

    println!();
    println!("Round-trip checks:");
    let mut round_trip_failed = 0;
    for case in golden_cases() {
        let result = round_trip(&case.events, "UTC");
        if !result.passed {
            round_trip_failed += 1;
        }
        println!("{} {}", case.name, result.render());
    }

    if report.failed > 0 || round_trip_failed > 0 {
        anyhow::bail!(
            "{} QA case(s) and {} round-trip check(s) failed",
            report.failed,
            round_trip_failed
        );
    }
    Ok(())
}
