use crate::errors::SchemaError;
use crate::model::{
    DAY_TYPE_COLUMN, DIRECTION_COLUMN, LINE_COLUMN, STATION_CODE_COLUMN, STATION_NAME_COLUMN,
};

const HOUR_MARKER: char = '시';
const MINUTE_MARKER: char = '분';

/// One time-of-day column of the raw schema. `order` is the zero-based
/// position among the detected time columns in file order and is the sole
/// authority for chronological sequencing; labels are not lexically
/// sortable because of non-zero-padded source variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSlot {
    pub column_index: usize,
    pub order: usize,
    pub hour: u8,
    pub minute: u8,
    pub label: String,
}

/// Positions of the five required identity columns in the raw header.
#[derive(Debug, Clone, Copy)]
pub struct IdentityIndex {
    pub day_type: usize,
    pub line: usize,
    pub station_code: usize,
    pub station_name: usize,
    pub direction: usize,
}

#[derive(Debug, Clone)]
pub struct SchemaMap {
    pub identity: IdentityIndex,
    pub time_slots: Vec<TimeSlot>,
}

impl SchemaMap {
    /// Classifies the raw header row. Columns matching neither the time
    /// pattern nor an identity name are ignored.
    pub fn detect(headers: &[String]) -> Result<Self, SchemaError> {
        let identity = find_identity_columns(headers)?;

        let mut time_slots = Vec::new();
        for (column_index, header) in headers.iter().enumerate() {
            if let Some((hour_digits, minute_digits)) = match_time_column(header) {
                let order = time_slots.len();
                time_slots.push(build_slot(
                    header,
                    column_index,
                    order,
                    hour_digits,
                    minute_digits,
                )?);
            }
        }

        if time_slots.is_empty() {
            return Err(SchemaError::NoTimeColumns);
        }

        Ok(Self {
            identity,
            time_slots,
        })
    }
}

fn find_identity_columns(headers: &[String]) -> Result<IdentityIndex, SchemaError> {
    let position = |name: &str| headers.iter().position(|header| header == name);

    let mut missing = Vec::new();
    let mut require = |name: &str| match position(name) {
        Some(index) => index,
        None => {
            missing.push(name.to_string());
            0
        }
    };

    let index = IdentityIndex {
        day_type: require(DAY_TYPE_COLUMN),
        line: require(LINE_COLUMN),
        station_code: require(STATION_CODE_COLUMN),
        station_name: require(STATION_NAME_COLUMN),
        direction: require(DIRECTION_COLUMN),
    };
    if !missing.is_empty() {
        return Err(SchemaError::MissingIdentityColumns { columns: missing });
    }

    Ok(index)
}

/// Matches `H시MM분` with optional surrounding whitespace, one or two
/// digits on each side of the markers, and nothing else.
fn match_time_column(header: &str) -> Option<(&str, &str)> {
    let trimmed = header.trim();
    let rest = trimmed.strip_suffix(MINUTE_MARKER)?;
    let (hour_digits, minute_digits) = rest.split_once(HOUR_MARKER)?;
    if !digit_run(hour_digits) || !digit_run(minute_digits) {
        return None;
    }
    Some((hour_digits, minute_digits))
}

fn digit_run(text: &str) -> bool {
    let count = text.chars().count();
    (1..=2).contains(&count) && text.chars().all(char::is_numeric)
}

fn build_slot(
    header: &str,
    column_index: usize,
    order: usize,
    hour_digits: &str,
    minute_digits: &str,
) -> Result<TimeSlot, SchemaError> {
    let parse = |digits: &str| -> Result<u8, SchemaError> {
        digits.parse::<u8>().map_err(|err| SchemaError::TimeDigits {
            column: header.trim().to_string(),
            message: err.to_string(),
        })
    };

    let hour = parse(hour_digits)?;
    let minute = parse(minute_digits)?;

    Ok(TimeSlot {
        column_index,
        order,
        hour,
        minute,
        label: format!("{hour:02}:{minute:02}"),
    })
}
