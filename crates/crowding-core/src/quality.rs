use std::collections::{HashMap, HashSet};

use chrono::Utc;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Threshold above which a crowding value is suspicious but not rejected.
pub const CROWDING_WARN_CEILING: f64 = 200.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrowdingStats {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

/// Snapshot of validation metrics over one tidy table. Produced once per
/// pipeline run, written alongside the tidy artifact, never read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub timestamp: String,
    pub rows_tidy: usize,
    pub unique_stations: usize,
    pub unique_station_direction_combinations: usize,
    pub day_types: Vec<String>,
    pub lines: Vec<String>,
    pub directions: Vec<String>,
    pub duplicate_key_rows: usize,
    pub crowding_nan_count: usize,
    pub crowding_nan_rate: f64,
    pub negative_crowding_count: usize,
    pub crowding_over_200_count: usize,
    pub all_time_zero_groups: usize,
    pub crowding_stats: CrowdingStats,
    pub passed: bool,
}

#[derive(Default)]
struct GroupStats {
    non_null: usize,
    any_nonzero: bool,
}

/// Computes structural and value-range health metrics over the tidy table.
/// The verdict blocks only on duplicate keys and negative values; over-200
/// counts and all-zero groups are advisory.
pub fn quality_report(tidy: &DataFrame) -> Result<QualityReport> {
    let rows = tidy.height();

    let day_type = tidy.column("day_type")?.str()?;
    let line = tidy.column("line")?.str()?;
    let station_code = tidy.column("station_code")?.str()?;
    let station_name = tidy.column("station_name")?.str()?;
    let direction = tidy.column("direction")?.str()?;
    let time_label = tidy.column("time_label")?.str()?;
    let crowding = tidy.column("crowding")?.f64()?;

    let mut key_counts: HashMap<[String; 6], usize> = HashMap::new();
    let mut groups: HashMap<[String; 5], GroupStats> = HashMap::new();

    let mut day_types: Vec<String> = Vec::new();
    let mut seen_day_types: HashSet<String> = HashSet::new();
    let mut lines: HashSet<String> = HashSet::new();
    let mut directions: HashSet<String> = HashSet::new();
    let mut stations: HashSet<(String, String)> = HashSet::new();

    let mut values: Vec<f64> = Vec::new();
    let mut nulls = 0usize;
    let mut negatives = 0usize;
    let mut over_ceiling = 0usize;

    for idx in 0..rows {
        let day = day_type.get(idx).unwrap_or_default();
        let line_value = line.get(idx).unwrap_or_default();
        let code = station_code.get(idx).unwrap_or_default();
        let name = station_name.get(idx).unwrap_or_default();
        let dir = direction.get(idx).unwrap_or_default();
        let label = time_label.get(idx).unwrap_or_default();

        *key_counts
            .entry([
                day.to_string(),
                line_value.to_string(),
                code.to_string(),
                name.to_string(),
                dir.to_string(),
                label.to_string(),
            ])
            .or_insert(0) += 1;

        let group = groups
            .entry([
                day.to_string(),
                line_value.to_string(),
                code.to_string(),
                name.to_string(),
                dir.to_string(),
            ])
            .or_default();

        if seen_day_types.insert(day.to_string()) {
            day_types.push(day.to_string());
        }
        lines.insert(line_value.to_string());
        directions.insert(dir.to_string());
        stations.insert((code.to_string(), name.to_string()));

        match crowding.get(idx) {
            Some(value) => {
                group.non_null += 1;
                if value != 0.0 {
                    group.any_nonzero = true;
                }
                if value < 0.0 {
                    negatives += 1;
                }
                if value > CROWDING_WARN_CEILING {
                    over_ceiling += 1;
                }
                values.push(value);
            }
            None => nulls += 1,
        }
    }

    let duplicate_key_rows: usize = key_counts.values().map(|count| count - 1).sum();
    let all_time_zero_groups = groups
        .values()
        .filter(|stats| stats.non_null > 0 && !stats.any_nonzero)
        .count();

    let nan_rate = if rows > 0 {
        round4(nulls as f64 / rows as f64)
    } else {
        0.0
    };

    let mut lines: Vec<String> = lines.into_iter().collect();
    lines.sort();
    let mut directions: Vec<String> = directions.into_iter().collect();
    directions.sort();

    let passed = duplicate_key_rows == 0 && negatives == 0;

    Ok(QualityReport {
        timestamp: Utc::now().to_rfc3339(),
        rows_tidy: rows,
        unique_stations: stations.len(),
        unique_station_direction_combinations: groups.len(),
        day_types,
        lines,
        directions,
        duplicate_key_rows,
        crowding_nan_count: nulls,
        crowding_nan_rate: nan_rate,
        negative_crowding_count: negatives,
        crowding_over_200_count: over_ceiling,
        all_time_zero_groups,
        crowding_stats: crowding_stats(&mut values),
        passed,
    })
}

fn crowding_stats(values: &mut Vec<f64>) -> CrowdingStats {
    if values.is_empty() {
        return CrowdingStats {
            min: None,
            max: None,
            mean: None,
            median: None,
        };
    }

    values.sort_by(|a, b| a.total_cmp(b));
    let count = values.len();
    let sum: f64 = values.iter().sum();
    let median = if count % 2 == 1 {
        values[count / 2]
    } else {
        (values[count / 2 - 1] + values[count / 2]) / 2.0
    };

    CrowdingStats {
        min: Some(values[0]),
        max: Some(values[count - 1]),
        mean: Some(sum / count as f64),
        median: Some(median),
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
