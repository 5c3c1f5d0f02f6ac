pub mod errors;
pub mod model;
pub mod reader;
pub mod schema;
pub mod tidy;

use std::path::Path;

pub use errors::{DecodeAttempt, DecodeError, ParserError, SchemaError};
pub use model::{ParsedExport, RawTable, IDENTITY_COLUMNS, TIDY_COLUMNS};
pub use reader::{read_raw_table, read_raw_table_from_path, ENCODING_CANDIDATES};
pub use schema::{IdentityIndex, SchemaMap, TimeSlot};
pub use tidy::to_tidy;

/// One-shot entry point: decoded bytes in, tidy table out.
pub fn parse_export(bytes: &[u8]) -> Result<ParsedExport, ParserError> {
    let table = read_raw_table(bytes)?;
    let schema = SchemaMap::detect(&table.headers)?;
    let tidy = to_tidy(&table, &schema)?;
    Ok(ParsedExport {
        tidy,
        encoding: table.encoding,
        raw_rows: table.records.len(),
        time_slots: schema.time_slots,
    })
}

pub fn parse_export_path(path: impl AsRef<Path>) -> Result<ParsedExport, ParserError> {
    let bytes = std::fs::read(path)?;
    parse_export(&bytes)
}
