use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use once_cell::sync::OnceCell;
use polars::prelude::*;

use crate::error::Result;

/// Preferred day-type presentation order; anything else observed in the
/// data is appended in first-seen order.
pub const DAY_TYPE_ORDER: [&str; 3] = ["평일", "토요일", "일요일"];

static DATASET: OnceCell<Dataset> = OnceCell::new();

/// The persisted tidy table loaded into memory, plus the selector
/// enumerations the interactive layer offers. Loaded once per process and
/// shared read-only; the backing file is static per process run, so no
/// invalidation path exists.
#[derive(Debug)]
pub struct Dataset {
    tidy: DataFrame,
    day_types: Vec<String>,
    lines: Vec<String>,
    directions: Vec<String>,
}

impl Dataset {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let tidy = ParquetReader::new(file).finish()?;
        Self::from_frame(tidy)
    }

    pub fn from_frame(tidy: DataFrame) -> Result<Self> {
        let day_types = ordered_day_types(&tidy)?;
        let lines = sorted_distinct(&tidy, "line")?;
        let directions = sorted_distinct(&tidy, "direction")?;
        Ok(Self {
            tidy,
            day_types,
            lines,
            directions,
        })
    }

    /// Process-wide instance, loaded on first access. Later calls ignore
    /// `path` and return the already-initialized dataset.
    pub fn global(path: &Path) -> Result<&'static Dataset> {
        DATASET.get_or_try_init(|| Self::load(path))
    }

    pub fn frame(&self) -> &DataFrame {
        &self.tidy
    }

    pub fn rows(&self) -> usize {
        self.tidy.height()
    }

    pub fn day_types(&self) -> &[String] {
        &self.day_types
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn directions(&self) -> &[String] {
        &self.directions
    }

    /// Sorted distinct station names on one line.
    pub fn stations_on_line(&self, line: &str) -> Result<Vec<String>> {
        self.distinct_on_line(line, "station_name")
    }

    /// Sorted distinct directions on one line.
    pub fn directions_on_line(&self, line: &str) -> Result<Vec<String>> {
        self.distinct_on_line(line, "direction")
    }

    fn distinct_on_line(&self, line: &str, column: &str) -> Result<Vec<String>> {
        let lines = self.tidy.column("line")?.str()?;
        let values = self.tidy.column(column)?.str()?;

        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for idx in 0..self.tidy.height() {
            if lines.get(idx) != Some(line) {
                continue;
            }
            if let Some(value) = values.get(idx) {
                if seen.insert(value.to_string()) {
                    result.push(value.to_string());
                }
            }
        }
        result.sort();
        Ok(result)
    }
}

fn ordered_day_types(tidy: &DataFrame) -> Result<Vec<String>> {
    let column = tidy.column("day_type")?.str()?;

    let mut observed: Vec<String> = Vec::new();
    let mut seen = HashSet::new();
    for idx in 0..tidy.height() {
        if let Some(value) = column.get(idx) {
            if seen.insert(value.to_string()) {
                observed.push(value.to_string());
            }
        }
    }

    let mut ordered: Vec<String> = DAY_TYPE_ORDER
        .iter()
        .filter(|known| observed.iter().any(|o| o == *known))
        .map(|known| known.to_string())
        .collect();
    for value in observed {
        if !ordered.contains(&value) {
            ordered.push(value);
        }
    }
    Ok(ordered)
}

fn sorted_distinct(tidy: &DataFrame, column: &str) -> Result<Vec<String>> {
    let values = tidy.column(column)?.str()?;
    let mut distinct: HashSet<String> = HashSet::new();
    for idx in 0..tidy.height() {
        if let Some(value) = values.get(idx) {
            distinct.insert(value.to_string());
        }
    }
    let mut result: Vec<String> = distinct.into_iter().collect();
    result.sort();
    Ok(result)
}
