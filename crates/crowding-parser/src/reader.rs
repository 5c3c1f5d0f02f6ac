use std::path::Path;

use csv::StringRecord;
use encoding_rs::{Encoding, EUC_KR, UTF_8};

use crate::errors::{DecodeAttempt, DecodeError, ParserError};
use crate::model::RawTable;

/// Candidate encodings, tried in order. `Encoding::decode` handles a UTF-8
/// BOM, and encoding_rs's EUC-KR table is the Windows-949 superset, so the
/// two entries cover exports labeled utf-8-sig, cp949, or euc-kr.
pub const ENCODING_CANDIDATES: [&Encoding; 2] = [UTF_8, EUC_KR];

/// Decodes a raw delimited export into a [`RawTable`]. The first encoding
/// whose output also parses as CSV wins; each failure is recorded and
/// exhaustion surfaces every attempt.
pub fn read_raw_table(bytes: &[u8]) -> Result<RawTable, DecodeError> {
    let mut attempts = Vec::new();

    for encoding in ENCODING_CANDIDATES {
        let (text, _, had_errors) = encoding.decode(bytes);
        if had_errors {
            attempts.push(DecodeAttempt::new(
                encoding.name(),
                "malformed byte sequence",
            ));
            continue;
        }

        match parse_records(&text) {
            Ok((headers, records)) => {
                return Ok(RawTable {
                    encoding: encoding.name(),
                    headers,
                    records,
                })
            }
            Err(err) => attempts.push(DecodeAttempt::new(encoding.name(), err.to_string())),
        }
    }

    Err(DecodeError { attempts })
}

pub fn read_raw_table_from_path(path: impl AsRef<Path>) -> Result<RawTable, ParserError> {
    let bytes = std::fs::read(path)?;
    Ok(read_raw_table(&bytes)?)
}

fn parse_records(text: &str) -> Result<(Vec<String>, Vec<StringRecord>), csv::Error> {
    let mut reader = csv::ReaderBuilder::new().from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|name| name.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for record in reader.records() {
        records.push(record?);
    }

    Ok((headers, records))
}
