use crate::constants::{
    GENRE_COLUMN, PLATFORM_COLUMN, RELEASE_DATE_COLUMN, SALES_EU_COLUMN, SALES_JP_COLUMN,
    SALES_NA_COLUMN, SALES_OTHER_COLUMN, SALES_REPORTED_TOTAL_COLUMN, SALES_SUM_COLUMN,
};
use crate::error::{ReportError, Result};
use crate::pipeline::frame::{float_values, require_column, text_values};
use polars::prelude::{DataFrame, DataType};
use serde::{Deserialize, Serialize};

/// One cleaned game/platform release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub platform: String,
    pub release_year: i32,
    pub genre: Option<String>,
    pub sales_na: f64,
    pub sales_eu: f64,
    pub sales_jp: f64,
    pub sales_other: f64,
    /// Total as reported by the source, kept for reference only
    pub sales_reported_total: f64,
    /// Sum of the four regional fields
    pub sales_total: f64,
}

impl GameRecord {
    /// Convert a fully cleaned frame into typed records.
    ///
    /// Expects the release year column to hold integers and every sales column
    /// to be filled, which the cleaning stages guarantee.
    pub fn from_frame(frame: &DataFrame) -> Result<Vec<GameRecord>> {
        let platforms = text_values(frame, PLATFORM_COLUMN)?;
        let years = years(frame)?;
        let genres = text_values(frame, GENRE_COLUMN)?;
        let na = filled_sales(frame, SALES_NA_COLUMN)?;
        let eu = filled_sales(frame, SALES_EU_COLUMN)?;
        let jp = filled_sales(frame, SALES_JP_COLUMN)?;
        let other = filled_sales(frame, SALES_OTHER_COLUMN)?;
        let reported = filled_sales(frame, SALES_REPORTED_TOTAL_COLUMN)?;
        let total = filled_sales(frame, SALES_SUM_COLUMN)?;

        Ok((0..frame.height())
            .map(|i| GameRecord {
                platform: platforms[i].clone().unwrap_or_default(),
                release_year: years[i],
                genre: genres[i].clone(),
                sales_na: na[i],
                sales_eu: eu[i],
                sales_jp: jp[i],
                sales_other: other[i],
                sales_reported_total: reported[i],
                sales_total: total[i],
            })
            .collect())
    }
}

fn years(frame: &DataFrame) -> Result<Vec<i32>> {
    let column = require_column(frame, RELEASE_DATE_COLUMN)?;
    let type_error = |row: usize, message: String| ReportError::Type {
        column: RELEASE_DATE_COLUMN.to_string(),
        row,
        message,
    };
    if column.dtype() != &DataType::Int64 {
        return Err(type_error(0, format!("expected integer years, found {}", column.dtype())));
    }

    column
        .i64()?
        .into_iter()
        .enumerate()
        .map(|(row, cell)| match cell {
            Some(v) => i32::try_from(v).map_err(|_| type_error(row, format!("year {v} out of range"))),
            None => Err(type_error(row, "missing release year".to_string())),
        })
        .collect()
}

fn filled_sales(frame: &DataFrame, name: &str) -> Result<Vec<f64>> {
    float_values(frame, name)?
        .into_iter()
        .enumerate()
        .map(|(row, cell)| {
            cell.ok_or_else(|| ReportError::Type {
                column: name.to_string(),
                row,
                message: "missing sales value after filling".to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn cleaned(year: Series) -> DataFrame {
        let mut frame = df!(
            "nombre" => ["Tetris"],
            "plataforma" => ["GB"],
            "genero" => ["Puzzle"],
            "ventas_na" => [1.0],
            "ventas_eu" => [2.0],
            "ventas_jp" => [3.0],
            "ventas_otras" => [0.5],
            "ventas_tot" => [0.0],
            "ventas_suma" => [6.5]
        )
        .unwrap();
        frame.with_column(year).unwrap();
        frame
    }

    #[test]
    fn test_from_frame_reads_typed_fields() {
        let frame = cleaned(Series::new("fecha_salida".into(), [1989i64]));
        let records = GameRecord::from_frame(&frame).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].platform, "GB");
        assert_eq!(records[0].release_year, 1989);
        assert_eq!(records[0].genre.as_deref(), Some("Puzzle"));
        assert_eq!(records[0].sales_total, 6.5);
    }

    #[test]
    fn test_from_frame_rejects_uncast_year() {
        let frame = cleaned(Series::new("fecha_salida".into(), [1972.0]));
        assert!(matches!(
            GameRecord::from_frame(&frame),
            Err(ReportError::Type { column, .. }) if column == "fecha_salida"
        ));
    }
}
