use csv::StringRecord;
use polars::prelude::*;

use crate::errors::ParserError;
use crate::model::RawTable;
use crate::schema::SchemaMap;

/// Textual stand-ins for "no value" that some exports carry in time cells.
/// "nan" must be caught here because str::parse would accept it as f64::NAN.
const NONE_TOKENS: [&str; 3] = ["nan", "none", "null"];

/// Unpivots the wide raw table into tidy form: one row per
/// (raw row, time column), sorted by (day_type, line, station_code,
/// direction, time_order) with stable order.
pub fn to_tidy(table: &RawTable, schema: &SchemaMap) -> Result<DataFrame, ParserError> {
    let capacity = table.height() * schema.time_slots.len();

    let mut day_type: Vec<String> = Vec::with_capacity(capacity);
    let mut line: Vec<String> = Vec::with_capacity(capacity);
    let mut station_code: Vec<String> = Vec::with_capacity(capacity);
    let mut station_name: Vec<String> = Vec::with_capacity(capacity);
    let mut direction: Vec<String> = Vec::with_capacity(capacity);
    let mut time_label: Vec<String> = Vec::with_capacity(capacity);
    let mut time_order: Vec<i64> = Vec::with_capacity(capacity);
    let mut crowding: Vec<Option<f64>> = Vec::with_capacity(capacity);

    let identity = &schema.identity;
    for record in &table.records {
        let day = field(record, identity.day_type);
        let line_value = field(record, identity.line);
        let code = field(record, identity.station_code).trim();
        let name = field(record, identity.station_name);
        let dir = field(record, identity.direction);

        for slot in &schema.time_slots {
            day_type.push(day.to_string());
            line.push(line_value.to_string());
            station_code.push(code.to_string());
            station_name.push(name.to_string());
            direction.push(dir.to_string());
            time_label.push(slot.label.clone());
            time_order.push(slot.order as i64);
            crowding.push(clean_cell(field(record, slot.column_index)));
        }
    }

    let df = df![
        "day_type" => day_type,
        "line" => line,
        "station_code" => station_code,
        "station_name" => station_name,
        "direction" => direction,
        "time_label" => time_label,
        "time_order" => time_order,
        "crowding" => crowding,
    ]?;

    // Downstream filtering depends on chronological grouping per
    // station/direction, so this sort order is a contract.
    let sorted = df.sort(
        ["day_type", "line", "station_code", "direction", "time_order"],
        SortMultipleOptions::default().with_maintain_order(true),
    )?;

    Ok(sorted)
}

fn field(record: &StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or_default()
}

/// Cleans one crowding cell. Coercion failures become nulls, never errors;
/// the quality report tracks them in aggregate.
pub(crate) fn clean_cell(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty()
        || NONE_TOKENS
            .iter()
            .any(|token| trimmed.eq_ignore_ascii_case(token))
    {
        return None;
    }

    match trimmed.parse::<f64>() {
        Ok(parsed) if parsed.is_nan() => None,
        Ok(parsed) => Some(parsed),
        Err(_) => None,
    }
}
