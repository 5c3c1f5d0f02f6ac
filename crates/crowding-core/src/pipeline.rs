use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crowding_parser::{read_raw_table_from_path, to_tidy, SchemaMap};

use crate::error::Result;
use crate::outputs::{write_artifacts, ArtifactPaths};
use crate::quality::{quality_report, QualityReport};

/// What one batch run did, for logging and offline inspection.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineSummary {
    pub encoding: &'static str,
    pub raw_rows: usize,
    pub time_columns: usize,
    pub tidy_rows: usize,
    pub passed: bool,
    pub artifacts: ArtifactPaths,
}

/// Runs the one-time batch pipeline: read → normalize → tidy → validate →
/// persist. Nothing is written until the full in-memory result exists, so
/// a failed run leaves any prior artifacts untouched.
pub fn run(input: &Path, out_dir: &Path) -> Result<(PipelineSummary, QualityReport)> {
    info!(path = %input.display(), "reading raw export");
    let table = read_raw_table_from_path(input)?;
    info!(
        encoding = table.encoding,
        rows = table.height(),
        "raw export decoded"
    );

    let schema = SchemaMap::detect(&table.headers)?;
    info!(time_columns = schema.time_slots.len(), "schema normalized");

    let tidy = to_tidy(&table, &schema)?;
    info!(rows = tidy.height(), "tidy table built");

    let report = quality_report(&tidy)?;
    if report.passed {
        info!(
            duplicates = report.duplicate_key_rows,
            negatives = report.negative_crowding_count,
            "quality checks passed"
        );
    } else {
        warn!(
            duplicates = report.duplicate_key_rows,
            negatives = report.negative_crowding_count,
            "quality checks FAILED; artifacts are still written for inspection"
        );
    }

    let artifacts = write_artifacts(&tidy, &report, out_dir)?;
    info!(dir = %out_dir.display(), "artifacts written");

    let summary = PipelineSummary {
        encoding: table.encoding,
        raw_rows: table.height(),
        time_columns: schema.time_slots.len(),
        tidy_rows: tidy.height(),
        passed: report.passed,
        artifacts,
    };

    Ok((summary, report))
}
