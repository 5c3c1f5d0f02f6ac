use csv::StringRecord;
use polars::prelude::DataFrame;

use crate::schema::TimeSlot;

pub const DAY_TYPE_COLUMN: &str = "요일구분";
pub const LINE_COLUMN: &str = "호선";
pub const STATION_CODE_COLUMN: &str = "역번호";
pub const STATION_NAME_COLUMN: &str = "출발역";
pub const DIRECTION_COLUMN: &str = "상하구분";

/// The five identity columns every raw export must carry.
pub const IDENTITY_COLUMNS: [&str; 5] = [
    DAY_TYPE_COLUMN,
    LINE_COLUMN,
    STATION_CODE_COLUMN,
    STATION_NAME_COLUMN,
    DIRECTION_COLUMN,
];

/// Column order of the persisted tidy artifact.
pub const TIDY_COLUMNS: [&str; 8] = [
    "day_type",
    "line",
    "station_code",
    "station_name",
    "direction",
    "time_label",
    "time_order",
    "crowding",
];

/// Decoded raw export: trimmed header names plus unparsed data records.
/// Consumed entirely during normalization.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub encoding: &'static str,
    pub headers: Vec<String>,
    pub records: Vec<StringRecord>,
}

impl RawTable {
    pub fn height(&self) -> usize {
        self.records.len()
    }
}

/// Everything one pipeline run learns from a raw export.
#[derive(Debug, Clone)]
pub struct ParsedExport {
    pub tidy: DataFrame,
    pub encoding: &'static str,
    pub raw_rows: usize,
    pub time_slots: Vec<TimeSlot>,
}
