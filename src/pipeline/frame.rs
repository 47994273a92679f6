use crate::error::{ReportError, Result};
use polars::prelude::*;
use serde::Serialize;

/// Inferred storage kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Int,
    Float,
    Text,
    /// Every cell missing
    Empty,
}

impl ColumnKind {
    fn of(column: &Column) -> Self {
        let dtype = column.dtype();
        if column.null_count() == column.len() {
            ColumnKind::Empty
        } else if dtype.is_integer() {
            ColumnKind::Int
        } else if dtype.is_float() {
            ColumnKind::Float
        } else {
            ColumnKind::Text
        }
    }
}

/// Per-column overview: name, kind and how many cells hold a value.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub kind: ColumnKind,
    pub non_missing: usize,
}

/// `df.info()`-style overview of every column, in frame order.
pub fn profile(frame: &DataFrame) -> Vec<ColumnProfile> {
    frame
        .get_columns()
        .iter()
        .map(|column| ColumnProfile {
            name: column.name().to_string(),
            kind: ColumnKind::of(column),
            non_missing: column.len() - column.null_count(),
        })
        .collect()
}

pub fn column_names(frame: &DataFrame) -> Vec<String> {
    frame
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

/// Look up a column, reporting an absent one as a schema error.
pub fn require_column<'a>(frame: &'a DataFrame, name: &str) -> Result<&'a Column> {
    frame
        .column(name)
        .map_err(|_| ReportError::Schema(name.to_string()))
}

/// Cells of a column as optional strings, whatever its inferred type.
pub fn text_values(frame: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = require_column(frame, name)?.cast(&DataType::String)?;
    Ok(column
        .str()?
        .into_iter()
        .map(|cell| cell.map(str::to_string))
        .collect())
}

/// Cells of a column as optional floats.
///
/// Text cells must parse as numbers once trimmed; the first one that does not
/// is reported with its row.
pub fn float_values(frame: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = require_column(frame, name)?;
    if column.dtype() == &DataType::String {
        return column
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, cell)| match cell {
                None => Ok(None),
                Some(s) => s.trim().parse::<f64>().map(Some).map_err(|_| ReportError::Type {
                    column: name.to_string(),
                    row,
                    message: format!("non-numeric value '{s}'"),
                }),
            })
            .collect();
    }
    let floats = column.cast(&DataType::Float64)?;
    Ok(floats.f64()?.into_iter().collect())
}
