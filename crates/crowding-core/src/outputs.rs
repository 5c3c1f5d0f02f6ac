use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use polars::io::parquet::write::{ParquetCompression, ParquetWriter, StatisticsOptions};
use polars::prelude::*;

use crate::error::Result;
use crate::quality::QualityReport;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

pub const TIDY_CSV_NAME: &str = "subway_crowding_tidy.csv";
pub const TIDY_PARQUET_NAME: &str = "subway_crowding_tidy.parquet";
pub const QUALITY_REPORT_NAME: &str = "quality_report.json";

/// Locations of the three artifacts one pipeline run produces.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ArtifactPaths {
    pub tidy_csv: PathBuf,
    pub tidy_parquet: PathBuf,
    pub quality_report: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            tidy_csv: dir.join(TIDY_CSV_NAME),
            tidy_parquet: dir.join(TIDY_PARQUET_NAME),
            quality_report: dir.join(QUALITY_REPORT_NAME),
        }
    }
}

/// Persists the tidy table (CSV twin + parquet) and the quality report.
/// Every artifact is fully serialized in memory first and lands via a
/// `.tmp` sibling rename, so a failed run leaves prior artifacts intact.
pub fn write_artifacts(
    tidy: &DataFrame,
    report: &QualityReport,
    out_dir: &Path,
) -> Result<ArtifactPaths> {
    fs::create_dir_all(out_dir)?;
    let paths = ArtifactPaths::in_dir(out_dir);

    let parquet = parquet_bytes(tidy)?;
    let csv = csv_bytes(tidy)?;
    let json = serde_json::to_vec_pretty(report)?;

    write_atomic(&paths.tidy_parquet, &parquet)?;
    write_atomic(&paths.tidy_csv, &csv)?;
    write_atomic(&paths.quality_report, &json)?;

    Ok(paths)
}

fn parquet_bytes(df: &DataFrame) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buffer);
        let mut clone = df.clone();
        ParquetWriter::new(&mut cursor)
            .with_compression(ParquetCompression::Zstd(None))
            .with_statistics(StatisticsOptions::default())
            .finish(&mut clone)?;
    }
    Ok(buffer)
}

/// CSV rendition with a UTF-8 BOM so spreadsheet tools default to the
/// right encoding for the Korean identity columns.
fn csv_bytes(df: &DataFrame) -> Result<Vec<u8>> {
    let mut buffer = Vec::from(UTF8_BOM);
    let mut clone = df.clone();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .finish(&mut clone)?;
    Ok(buffer)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = tmp_sibling(path);
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
