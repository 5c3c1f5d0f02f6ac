use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Morning rush window, fixed set of canonical time labels.
pub const MORNING_WINDOW: [&str; 5] = ["07:30", "08:00", "08:30", "09:00", "09:30"];
/// Evening rush window.
pub const EVENING_WINDOW: [&str; 5] = ["17:30", "18:00", "18:30", "19:00", "19:30"];

/// Station ordering for the heatmap pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    AvgDesc,
    NameAsc,
    CodeAsc,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::AvgDesc => "avg_desc",
            SortMode::NameAsc => "name_asc",
            SortMode::CodeAsc => "code_asc",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "avg_desc" => Ok(SortMode::AvgDesc),
            "name_asc" => Ok(SortMode::NameAsc),
            "code_asc" => Ok(SortMode::CodeAsc),
            other => Err(format!("unknown sort mode '{other}'")),
        }
    }
}

/// Time restriction for the rush-window ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    Morning,
    Evening,
    AllDay,
}

impl TimeWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Morning => "morning",
            TimeWindow::Evening => "evening",
            TimeWindow::AllDay => "all_day",
        }
    }

    /// `None` means no restriction (all distinct labels in the table).
    pub fn labels(&self) -> Option<&'static [&'static str]> {
        match self {
            TimeWindow::Morning => Some(&MORNING_WINDOW),
            TimeWindow::Evening => Some(&EVENING_WINDOW),
            TimeWindow::AllDay => None,
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels()
            .map_or(true, |labels| labels.contains(&label))
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeWindow {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "morning" => Ok(TimeWindow::Morning),
            "evening" => Ok(TimeWindow::Evening),
            "all_day" | "all" => Ok(TimeWindow::AllDay),
            other => Err(format!("unknown time window '{other}'")),
        }
    }
}

/// One row of a rush-window ranking, recomputed on every query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub rank: u32,
    pub station_name: String,
    pub line: String,
    pub direction: String,
    pub avg_crowding: f64,
    pub peak_time_label: String,
}

impl RankingEntry {
    /// Jump request for the detail view of this ranked group.
    pub fn navigation_intent(&self, day_type: &str) -> NavigationIntent {
        NavigationIntent {
            day_type: day_type.to_string(),
            line: self.line.clone(),
            station_name: self.station_name.clone(),
            direction: self.direction.clone(),
        }
    }
}

/// Scalar summary over one (day_type, line, direction) selection. A
/// selection matching zero rows yields no summary at all, never a
/// half-populated one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub avg_crowding: f64,
    pub top_station: String,
    pub top_station_avg: f64,
    pub peak_time_label: String,
    pub station_count: usize,
    pub morning_avg: f64,
    pub evening_avg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailPoint {
    pub time_label: String,
    pub time_order: i64,
    pub crowding: Option<f64>,
}

/// Chronological series for one station/direction, plus its headline
/// figures. Feeds the detail line chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationDetail {
    pub day_type: String,
    pub line: String,
    pub station_name: String,
    pub direction: String,
    pub points: Vec<DetailPoint>,
    pub avg_crowding: f64,
    pub max_crowding: Option<f64>,
}

/// Cross-view jump request, passed explicitly from the selection layer to
/// the presentation layer instead of living in ambient session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationIntent {
    pub day_type: String,
    pub line: String,
    pub station_name: String,
    pub direction: String,
}

/// Human-readable direction captions per line, from the source dataset's
/// operator conventions.
static DIRECTION_CAPTIONS: Lazy<HashMap<(&'static str, &'static str), &'static str>> =
    Lazy::new(|| {
        HashMap::from([
            (("1호선", "상선"), "상선 (서울역 방향)"),
            (("1호선", "하선"), "하선 (청량리 방향)"),
            (("2호선", "내선"), "내선 (시계방향)"),
            (("2호선", "외선"), "외선 (반시계방향)"),
            (("3호선", "상선"), "상선 (대화 방향)"),
            (("3호선", "하선"), "하선 (오금 방향)"),
            (("4호선", "상선"), "상선 (당고개 방향)"),
            (("4호선", "하선"), "하선 (오이도 방향)"),
            (("5호선", "상선"), "상선 (방화 방향)"),
            (("5호선", "하선"), "하선 (하남검단산 방향)"),
            (("6호선", "상선"), "상선 (봉화산 방향)"),
            (("6호선", "하선"), "하선 (응암 방향)"),
            (("7호선", "상선"), "상선 (장암 방향)"),
            (("7호선", "하선"), "하선 (부평구청 방향)"),
            (("8호선", "상선"), "상선 (암사 방향)"),
            (("8호선", "하선"), "하선 (모란 방향)"),
        ])
    });

pub fn direction_caption(line: &str, direction: &str) -> Option<&'static str> {
    DIRECTION_CAPTIONS.get(&(line, direction)).copied()
}

/// Caption when known, otherwise the raw direction string.
pub fn direction_display(line: &str, direction: &str) -> String {
    direction_caption(line, direction)
        .map(str::to_string)
        .unwrap_or_else(|| direction.to_string())
}
