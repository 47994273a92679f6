use crate::constants::MISSING_MARKERS;
use crate::error::{ReportError, Result};
use polars::prelude::*;
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Load a comma-delimited file with a header row into a dataframe.
#[instrument]
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    info!("📥 Loading {}", path.display());
    let bytes = fs::read(path)?;
    let frame = load_csv_from_bytes(bytes)?;
    info!("✅ Loaded {} rows x {} columns", frame.height(), frame.width());
    Ok(frame)
}

/// Load CSV content from any reader. Ragged rows are a parse error.
pub fn load_csv_from_reader<R: Read>(mut reader: R) -> Result<DataFrame> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    load_csv_from_bytes(bytes)
}

fn load_csv_from_bytes(bytes: Vec<u8>) -> Result<DataFrame> {
    let records = check_structure(&bytes)?;
    debug!("Read {} raw records", records);

    // Whole-column inference, like a pandas read
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(
            CsvParseOptions::default()
                .with_missing_is_null(true)
                .with_null_values(Some(missing_markers())),
        )
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .map_err(|e| ReportError::Parse(e.to_string()))
}

/// Every row must have as many fields as the header; the dataframe reader
/// would pad short rows with nulls instead.
fn check_structure(bytes: &[u8]) -> Result<usize> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);

    let headers = reader.headers()?;
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ReportError::Parse("missing header row".to_string()));
    }

    let mut record = csv::ByteRecord::new();
    let mut count = 0;
    while reader.read_byte_record(&mut record)? {
        count += 1;
    }
    Ok(count)
}

fn missing_markers() -> NullValues {
    NullValues::AllColumns(
        MISSING_MARKERS
            .iter()
            .map(|marker| PlSmallStr::from(*marker))
            .collect(),
    )
}
