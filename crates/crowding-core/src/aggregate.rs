use std::collections::HashMap;

use polars::prelude::*;

use crate::error::Result;
use crate::types::{
    DetailPoint, KpiSummary, NavigationIntent, RankingEntry, SortMode, StationDetail, TimeWindow,
    EVENING_WINDOW, MORNING_WINDOW,
};

/// Station × time-label matrix of mean crowding for one selection.
/// `values` holds one row per station, aligned with `time_labels`.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapPivot {
    pub stations: Vec<String>,
    pub time_labels: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
    pub color_scale: Option<(f64, f64)>,
}

impl HeatmapPivot {
    fn empty() -> Self {
        Self {
            stations: Vec::new(),
            time_labels: Vec::new(),
            values: Vec::new(),
            color_scale: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn cell(&self, station: usize, time: usize) -> Option<f64> {
        self.values.get(station).and_then(|row| row.get(time)).copied().flatten()
    }
}

/// Null-safe running mean.
#[derive(Debug, Default, Clone, Copy)]
struct MeanAcc {
    sum: f64,
    count: usize,
}

impl MeanAcc {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }

    fn mean_or_zero(&self) -> f64 {
        self.mean().unwrap_or(0.0)
    }
}

fn filter_selection(
    tidy: &DataFrame,
    day_type: &str,
    line: Option<&str>,
    direction: Option<&str>,
    station_name: Option<&str>,
) -> Result<DataFrame> {
    let mut predicate = col("day_type").eq(lit(day_type.to_string()));
    if let Some(line) = line {
        predicate = predicate.and(col("line").eq(lit(line.to_string())));
    }
    if let Some(direction) = direction {
        predicate = predicate.and(col("direction").eq(lit(direction.to_string())));
    }
    if let Some(name) = station_name {
        predicate = predicate.and(col("station_name").eq(lit(name.to_string())));
    }
    Ok(tidy.clone().lazy().filter(predicate).collect()?)
}

/// Builds the heatmap matrix for (day_type, line, direction), aggregating
/// duplicate cells by mean (not expected post-tidy, but tolerated) and
/// ordering stations per `sort_mode`. Zero matching rows yield an empty
/// pivot, not an error.
pub fn heatmap_pivot(
    tidy: &DataFrame,
    day_type: &str,
    line: &str,
    direction: &str,
    sort_mode: SortMode,
) -> Result<HeatmapPivot> {
    let filtered = filter_selection(tidy, day_type, Some(line), Some(direction), None)?;
    if filtered.height() == 0 {
        return Ok(HeatmapPivot::empty());
    }

    let station_name = filtered.column("station_name")?.str()?;
    let station_code = filtered.column("station_code")?.str()?;
    let time_label = filtered.column("time_label")?.str()?;
    let time_order = filtered.column("time_order")?.i64()?;
    let crowding = filtered.column("crowding")?.f64()?;

    // Time axis in chronological order. `time_order` is authoritative;
    // labels only name the columns.
    let mut label_axis: Vec<(i64, String)> = Vec::new();
    for idx in 0..filtered.height() {
        let Some(label) = time_label.get(idx) else {
            continue;
        };
        if !label_axis.iter().any(|(_, seen)| seen == label) {
            label_axis.push((time_order.get(idx).unwrap_or(i64::MAX), label.to_string()));
        }
    }
    label_axis.sort_by_key(|(order, _)| *order);
    let time_labels: Vec<String> = label_axis.into_iter().map(|(_, label)| label).collect();
    let label_index: HashMap<String, usize> = time_labels
        .iter()
        .enumerate()
        .map(|(slot, label)| (label.clone(), slot))
        .collect();

    // Stations in first-seen row order; that order is the tie-breaker for
    // avg_desc and the source of the first-seen code for code_asc.
    let mut stations: Vec<String> = Vec::new();
    let mut first_codes: Vec<String> = Vec::new();
    let mut cells: Vec<Vec<MeanAcc>> = Vec::new();
    let mut station_index: HashMap<String, usize> = HashMap::new();

    for idx in 0..filtered.height() {
        let (Some(name), Some(label)) = (station_name.get(idx), time_label.get(idx)) else {
            continue;
        };
        let station_slot = match station_index.get(name) {
            Some(slot) => *slot,
            None => {
                let slot = stations.len();
                station_index.insert(name.to_string(), slot);
                stations.push(name.to_string());
                first_codes.push(station_code.get(idx).unwrap_or_default().to_string());
                cells.push(vec![MeanAcc::default(); time_labels.len()]);
                slot
            }
        };
        if let (Some(&label_slot), Some(value)) = (label_index.get(label), crowding.get(idx)) {
            cells[station_slot][label_slot].push(value);
        }
    }

    let mut order: Vec<usize> = (0..stations.len()).collect();
    match sort_mode {
        SortMode::AvgDesc => {
            let means: Vec<f64> = cells
                .iter()
                .map(|row| {
                    let mut acc = MeanAcc::default();
                    for cell in row {
                        if let Some(mean) = cell.mean() {
                            acc.push(mean);
                        }
                    }
                    acc.mean().unwrap_or(f64::NEG_INFINITY)
                })
                .collect();
            order.sort_by(|a, b| means[*b].total_cmp(&means[*a]));
        }
        SortMode::NameAsc => order.sort_by(|a, b| stations[*a].cmp(&stations[*b])),
        SortMode::CodeAsc => order.sort_by(|a, b| first_codes[*a].cmp(&first_codes[*b])),
    }

    let mut ordered_stations = Vec::with_capacity(order.len());
    let mut values = Vec::with_capacity(order.len());
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut any_value = false;
    for &slot in &order {
        ordered_stations.push(stations[slot].clone());
        let row: Vec<Option<f64>> = cells[slot].iter().map(MeanAcc::mean).collect();
        for value in row.iter().flatten() {
            min = min.min(*value);
            max = max.max(*value);
            any_value = true;
        }
        values.push(row);
    }

    // Quantile clip at (0.0, 1.0) degenerates to plain (min, max).
    // TODO: confirm whether a narrower percentile clip was intended.
    let color_scale = any_value.then_some((min, max));

    Ok(HeatmapPivot {
        stations: ordered_stations,
        time_labels,
        values,
        color_scale,
    })
}

struct GroupAcc {
    station_name: String,
    line: String,
    direction: String,
    acc: MeanAcc,
    peak: Option<(f64, String)>,
    first_label: String,
}

/// Ranks (station, line, direction) groups by mean crowding over the given
/// rush window, descending, truncated to `top_n`, dense ranks from 1.
/// Ties keep group-iteration (first-seen) order. Empty match → empty vec.
pub fn rush_hour_ranking(
    tidy: &DataFrame,
    day_type: &str,
    line: Option<&str>,
    direction: Option<&str>,
    window: TimeWindow,
    top_n: usize,
) -> Result<Vec<RankingEntry>> {
    let filtered = filter_selection(tidy, day_type, line, direction, None)?;

    let station_name = filtered.column("station_name")?.str()?;
    let line_col = filtered.column("line")?.str()?;
    let direction_col = filtered.column("direction")?.str()?;
    let time_label = filtered.column("time_label")?.str()?;
    let crowding = filtered.column("crowding")?.f64()?;

    let mut groups: Vec<GroupAcc> = Vec::new();
    let mut group_index: HashMap<(String, String, String), usize> = HashMap::new();

    for idx in 0..filtered.height() {
        let (Some(name), Some(line_value), Some(dir), Some(label)) = (
            station_name.get(idx),
            line_col.get(idx),
            direction_col.get(idx),
            time_label.get(idx),
        ) else {
            continue;
        };
        if !window.contains(label) {
            continue;
        }

        let key = (name.to_string(), line_value.to_string(), dir.to_string());
        let slot = match group_index.get(&key) {
            Some(slot) => *slot,
            None => {
                let slot = groups.len();
                group_index.insert(key, slot);
                groups.push(GroupAcc {
                    station_name: name.to_string(),
                    line: line_value.to_string(),
                    direction: dir.to_string(),
                    acc: MeanAcc::default(),
                    peak: None,
                    first_label: label.to_string(),
                });
                slot
            }
        };

        if let Some(value) = crowding.get(idx) {
            let group = &mut groups[slot];
            group.acc.push(value);
            // Strictly-greater keeps the first occurrence on ties.
            if group.peak.as_ref().map_or(true, |(best, _)| value > *best) {
                group.peak = Some((value, label.to_string()));
            }
        }
    }

    let means: Vec<f64> = groups.iter().map(|group| group.acc.mean_or_zero()).collect();
    let mut order: Vec<usize> = (0..groups.len()).collect();
    order.sort_by(|a, b| means[*b].total_cmp(&means[*a]));
    order.truncate(top_n);

    Ok(order
        .into_iter()
        .enumerate()
        .map(|(position, slot)| {
            let group = &groups[slot];
            RankingEntry {
                rank: position as u32 + 1,
                station_name: group.station_name.clone(),
                line: group.line.clone(),
                direction: group.direction.clone(),
                avg_crowding: means[slot],
                peak_time_label: group
                    .peak
                    .as_ref()
                    .map(|(_, label)| label.clone())
                    .unwrap_or_else(|| group.first_label.clone()),
            }
        })
        .collect())
}

/// Scalar KPIs for (day_type, line, direction). Zero matching rows return
/// `None` so the caller can render a "no data" state instead of crashing.
pub fn kpi_summary(
    tidy: &DataFrame,
    day_type: &str,
    line: &str,
    direction: &str,
) -> Result<Option<KpiSummary>> {
    let filtered = filter_selection(tidy, day_type, Some(line), Some(direction), None)?;
    if filtered.height() == 0 {
        return Ok(None);
    }

    let station_name = filtered.column("station_name")?.str()?;
    let time_label = filtered.column("time_label")?.str()?;
    let crowding = filtered.column("crowding")?.f64()?;

    let mut overall = MeanAcc::default();
    let mut morning = MeanAcc::default();
    let mut evening = MeanAcc::default();
    let mut stations: Vec<(String, MeanAcc)> = Vec::new();
    let mut station_index: HashMap<String, usize> = HashMap::new();
    let mut labels: Vec<(String, MeanAcc)> = Vec::new();
    let mut label_index: HashMap<String, usize> = HashMap::new();

    for idx in 0..filtered.height() {
        let (Some(name), Some(label)) = (station_name.get(idx), time_label.get(idx)) else {
            continue;
        };

        let station_slot = match station_index.get(name) {
            Some(slot) => *slot,
            None => {
                let slot = stations.len();
                station_index.insert(name.to_string(), slot);
                stations.push((name.to_string(), MeanAcc::default()));
                slot
            }
        };
        let label_slot = match label_index.get(label) {
            Some(slot) => *slot,
            None => {
                let slot = labels.len();
                label_index.insert(label.to_string(), slot);
                labels.push((label.to_string(), MeanAcc::default()));
                slot
            }
        };

        if let Some(value) = crowding.get(idx) {
            overall.push(value);
            stations[station_slot].1.push(value);
            labels[label_slot].1.push(value);
            if MORNING_WINDOW.contains(&label) {
                morning.push(value);
            }
            if EVENING_WINDOW.contains(&label) {
                evening.push(value);
            }
        }
    }

    if stations.is_empty() || labels.is_empty() {
        return Ok(None);
    }

    // Strictly-greater scans keep the first occurrence on ties.
    let mut top_station = &stations[0];
    for station in &stations[1..] {
        if station.1.mean_or_zero() > top_station.1.mean_or_zero() {
            top_station = station;
        }
    }
    let mut peak_label = &labels[0];
    for label in &labels[1..] {
        if label.1.mean_or_zero() > peak_label.1.mean_or_zero() {
            peak_label = label;
        }
    }

    Ok(Some(KpiSummary {
        avg_crowding: overall.mean_or_zero(),
        top_station: top_station.0.clone(),
        top_station_avg: top_station.1.mean_or_zero(),
        peak_time_label: peak_label.0.clone(),
        station_count: stations.len(),
        morning_avg: morning.mean_or_zero(),
        evening_avg: evening.mean_or_zero(),
    }))
}

/// Chronological crowding series for one station/direction, with its mean
/// and maximum. `None` when the selection matches nothing.
pub fn station_detail(
    tidy: &DataFrame,
    day_type: &str,
    line: &str,
    station_name: &str,
    direction: &str,
) -> Result<Option<StationDetail>> {
    let filtered = filter_selection(tidy, day_type, Some(line), Some(direction), Some(station_name))?;
    if filtered.height() == 0 {
        return Ok(None);
    }

    let time_label = filtered.column("time_label")?.str()?;
    let time_order = filtered.column("time_order")?.i64()?;
    let crowding = filtered.column("crowding")?.f64()?;

    let mut points: Vec<DetailPoint> = Vec::with_capacity(filtered.height());
    let mut acc = MeanAcc::default();
    let mut max_crowding: Option<f64> = None;

    for idx in 0..filtered.height() {
        let Some(label) = time_label.get(idx) else {
            continue;
        };
        let value = crowding.get(idx);
        if let Some(value) = value {
            acc.push(value);
            max_crowding = Some(max_crowding.map_or(value, |max| max.max(value)));
        }
        points.push(DetailPoint {
            time_label: label.to_string(),
            time_order: time_order.get(idx).unwrap_or(i64::MAX),
            crowding: value,
        });
    }

    points.sort_by_key(|point| point.time_order);

    Ok(Some(StationDetail {
        day_type: day_type.to_string(),
        line: line.to_string(),
        station_name: station_name.to_string(),
        direction: direction.to_string(),
        points,
        avg_crowding: acc.mean_or_zero(),
        max_crowding,
    }))
}

/// Detail lookup from an explicit cross-view jump request.
pub fn station_detail_for(tidy: &DataFrame, intent: &NavigationIntent) -> Result<Option<StationDetail>> {
    station_detail(
        tidy,
        &intent.day_type,
        &intent.line,
        &intent.station_name,
        &intent.direction,
    )
}
