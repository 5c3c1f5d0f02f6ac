use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

use crowding_core::aggregate::HeatmapPivot;
use crowding_core::quality::QualityReport;
use crowding_core::types::{KpiSummary, RankingEntry, StationDetail};

fn base_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "n/a".to_string(),
    }
}

pub fn quality_table(report: &QualityReport) -> Table {
    let mut table = base_table();
    table.set_header(vec!["check", "value", "status"]);
    table.add_row(vec!["generated at".to_string(), report.timestamp.clone(), String::new()]);
    table.add_row(vec!["tidy rows".to_string(), report.rows_tidy.to_string(), String::new()]);
    table.add_row(vec![
        "unique stations".to_string(),
        report.unique_stations.to_string(),
        String::new(),
    ]);
    table.add_row(vec![
        "station x direction groups".to_string(),
        report.unique_station_direction_combinations.to_string(),
        String::new(),
    ]);
    table.add_row(vec!["day types".to_string(), report.day_types.join(", "), String::new()]);
    table.add_row(vec!["lines".to_string(), report.lines.join(", "), String::new()]);
    table.add_row(vec!["directions".to_string(), report.directions.join(", "), String::new()]);
    table.add_row(vec![
        "duplicate key rows".to_string(),
        report.duplicate_key_rows.to_string(),
        verdict(report.duplicate_key_rows == 0),
    ]);
    table.add_row(vec![
        "negative crowding".to_string(),
        report.negative_crowding_count.to_string(),
        verdict(report.negative_crowding_count == 0),
    ]);
    table.add_row(vec![
        "missing crowding".to_string(),
        format!(
            "{} ({:.2}%)",
            report.crowding_nan_count,
            report.crowding_nan_rate * 100.0
        ),
        String::new(),
    ]);
    table.add_row(vec![
        "crowding over 200".to_string(),
        report.crowding_over_200_count.to_string(),
        if report.crowding_over_200_count == 0 {
            String::new()
        } else {
            "WARN".to_string()
        },
    ]);
    table.add_row(vec![
        "all-zero station groups".to_string(),
        report.all_time_zero_groups.to_string(),
        if report.all_time_zero_groups == 0 {
            String::new()
        } else {
            "WARN".to_string()
        },
    ]);
    table.add_row(vec![
        "crowding min / max".to_string(),
        format!(
            "{} / {}",
            fmt_opt(report.crowding_stats.min),
            fmt_opt(report.crowding_stats.max)
        ),
        String::new(),
    ]);
    table.add_row(vec![
        "crowding mean / median".to_string(),
        format!(
            "{} / {}",
            fmt_opt(report.crowding_stats.mean),
            fmt_opt(report.crowding_stats.median)
        ),
        String::new(),
    ]);
    table
}

fn verdict(ok: bool) -> String {
    if ok { "PASS".to_string() } else { "FAIL".to_string() }
}

pub fn heatmap_table(pivot: &HeatmapPivot) -> Table {
    let mut table = base_table();
    let mut header = vec!["station".to_string()];
    header.extend(pivot.time_labels.iter().cloned());
    table.set_header(header);
    for (row_idx, station) in pivot.stations.iter().enumerate() {
        let mut row = vec![station.clone()];
        for col_idx in 0..pivot.time_labels.len() {
            row.push(match pivot.cell(row_idx, col_idx) {
                Some(value) => format!("{value:.1}"),
                None => "-".to_string(),
            });
        }
        table.add_row(row);
    }
    table
}

pub fn ranking_table(entries: &[RankingEntry]) -> Table {
    let mut table = base_table();
    table.set_header(vec!["rank", "station", "line", "direction", "avg", "peak"]);
    for entry in entries {
        table.add_row(vec![
            entry.rank.to_string(),
            entry.station_name.clone(),
            entry.line.clone(),
            entry.direction.clone(),
            format!("{:.1}", entry.avg_crowding),
            entry.peak_time_label.clone(),
        ]);
    }
    table
}

pub fn kpi_table(summary: &KpiSummary) -> Table {
    let mut table = base_table();
    table.set_header(vec!["metric", "value"]);
    table.add_row(vec![
        "average crowding".to_string(),
        format!("{:.1}", summary.avg_crowding),
    ]);
    table.add_row(vec![
        "most crowded station".to_string(),
        format!("{} ({:.1})", summary.top_station, summary.top_station_avg),
    ]);
    table.add_row(vec!["peak time".to_string(), summary.peak_time_label.clone()]);
    table.add_row(vec!["stations".to_string(), summary.station_count.to_string()]);
    table.add_row(vec![
        "morning rush avg".to_string(),
        format!("{:.1}", summary.morning_avg),
    ]);
    table.add_row(vec![
        "evening rush avg".to_string(),
        format!("{:.1}", summary.evening_avg),
    ]);
    table
}

pub fn detail_table(detail: &StationDetail) -> Table {
    let mut table = base_table();
    table.set_header(vec!["time", "crowding"]);
    for point in &detail.points {
        table.add_row(vec![
            point.time_label.clone(),
            match point.crowding {
                Some(value) => format!("{value:.1}"),
                None => "-".to_string(),
            },
        ]);
    }
    table
}
