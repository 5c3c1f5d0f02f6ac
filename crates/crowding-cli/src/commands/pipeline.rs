use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::render;

pub fn run(input: &Path, out_dir: &Path) -> Result<()> {
    let (summary, report) = crowding_core::pipeline::run(input, out_dir)
        .with_context(|| format!("pipeline failed for {}", input.display()))?;

    println!(
        "Parsed {} raw rows ({} time columns, {} encoding) into {} tidy rows",
        summary.raw_rows, summary.time_columns, summary.encoding, summary.tidy_rows
    );
    println!("{}", render::quality_table(&report));
    if summary.passed {
        println!("Acceptance criteria: PASSED");
    } else {
        println!("Acceptance criteria: FAILED (see report above)");
    }
    println!("Artifacts:");
    println!("  {}", summary.artifacts.tidy_csv.display());
    println!("  {}", summary.artifacts.tidy_parquet.display());
    println!("  {}", summary.artifacts.quality_report.display());

    info!(rows = summary.tidy_rows, passed = summary.passed, "pipeline finished");
    Ok(())
}
