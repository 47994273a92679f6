use crate::constants::{correct_year, RELEASE_DATE_COLUMN, YEAR_CORRECTIONS, YEAR_CORRECTION_LOOKUP};
use crate::error::{ReportError, Result};
use crate::pipeline::frame::require_column;
use crate::pipeline::{Stage, StageOutput, StageReport};
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// Replaces the dataset's known off-by-a-century years and casts the release
/// date column to integers.
///
/// Runs after [`RowFilter`](super::filter::RowFilter); a missing date here is a
/// broken precondition and fails the run.
#[derive(Debug, Default)]
pub struct DateCorrector;

/// Range of release years seen in one column snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub min: i64,
    pub max: i64,
}

impl std::fmt::Display for YearRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.min, self.max)
    }
}

impl DateCorrector {
    pub fn new() -> Self {
        Self
    }

    fn type_error(row: usize, message: String) -> ReportError {
        ReportError::Type {
            column: RELEASE_DATE_COLUMN.to_string(),
            row,
            message,
        }
    }

    fn year_from_text(text: &str, row: usize) -> Result<i64> {
        let text = text.trim();
        text.parse::<i64>()
            .ok()
            .or_else(|| {
                text.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .map(|v| v.trunc() as i64)
            })
            .ok_or_else(|| Self::type_error(row, format!("non-numeric year '{text}'")))
    }

    /// Integer years of the release date column: integers kept, finite floats
    /// truncated, numeric text parsed. A missing year is an error.
    fn cast_years(frame: &DataFrame) -> Result<Vec<i64>> {
        let column = require_column(frame, RELEASE_DATE_COLUMN)?;
        let missing = |row: usize| {
            Self::type_error(row, "missing release year reached date correction".to_string())
        };

        let dtype = column.dtype();
        if dtype == &DataType::String {
            column
                .str()?
                .into_iter()
                .enumerate()
                .map(|(row, cell)| Self::year_from_text(cell.ok_or_else(|| missing(row))?, row))
                .collect()
        } else if dtype.is_float() {
            let floats = column.cast(&DataType::Float64)?;
            floats
                .f64()?
                .into_iter()
                .enumerate()
                .map(|(row, cell)| match cell {
                    Some(v) if v.is_finite() => Ok(v.trunc() as i64),
                    Some(v) => Err(Self::type_error(row, format!("non-finite year {v}"))),
                    None => Err(missing(row)),
                })
                .collect()
        } else {
            let ints = column.cast(&DataType::Int64)?;
            ints.i64()?
                .into_iter()
                .enumerate()
                .map(|(row, cell)| cell.ok_or_else(|| missing(row)))
                .collect()
        }
    }

    /// Nested `when` chain replacing each corrupted year with its fix.
    fn correct_years() -> Expr {
        let year = col(RELEASE_DATE_COLUMN);
        YEAR_CORRECTIONS
            .iter()
            .fold(year.clone(), |acc, (corrupted, fixed)| {
                when(year.clone().eq(lit(*corrupted))).then(lit(*fixed)).otherwise(acc)
            })
            .alias(RELEASE_DATE_COLUMN)
    }

    fn range_of(years: &[i64]) -> Option<YearRange> {
        let min = years.iter().min()?;
        let max = years.iter().max()?;
        Some(YearRange { min: *min, max: *max })
    }
}

impl Stage for DateCorrector {
    fn stage_name(&self) -> &'static str {
        "correct_dates"
    }

    #[instrument(skip_all, fields(stage = "correct_dates", rows = frame.height()))]
    fn apply(&self, frame: &DataFrame) -> Result<StageOutput> {
        let raw_years = Self::cast_years(frame)?;

        let mut corrupted: BTreeMap<i64, usize> = BTreeMap::new();
        for year in raw_years.iter().filter(|y| YEAR_CORRECTION_LOOKUP.contains_key(*y)) {
            *corrupted.entry(*year).or_default() += 1;
        }

        let mut cast = frame.clone();
        cast.with_column(Series::new(RELEASE_DATE_COLUMN.into(), raw_years.as_slice()))?;
        let corrected = cast.lazy().with_column(Self::correct_years()).collect()?;
        let corrected_years: Vec<i64> = corrected
            .column(RELEASE_DATE_COLUMN)?
            .i64()?
            .into_iter()
            .flatten()
            .collect();

        let before = Self::range_of(&raw_years);
        let after = Self::range_of(&corrected_years);
        let fixed: usize = corrupted.values().sum();
        for (year, count) in &corrupted {
            debug!("Corrected {} rows dated {} to {}", count, year, correct_year(*year));
        }

        let fmt_range = |r: Option<YearRange>| r.map(|r| r.to_string()).unwrap_or_else(|| "n/a".to_string());
        let message = format!(
            "corrected {} release years; range {} -> {}",
            fixed,
            fmt_range(before),
            fmt_range(after)
        );
        info!("📅 {}", message);

        let mut report = StageReport::new(self.stage_name(), frame.height(), corrected.height(), message)
            .with_metadata("corrected_cells", fixed)
            .with_metadata("range_before", fmt_range(before))
            .with_metadata("range_after", fmt_range(after));
        for (year, count) in corrupted {
            report = report.with_metadata(&format!("corrupted_{year}"), count);
        }
        Ok(StageOutput { frame: corrected, report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn correct(frame: DataFrame) -> Result<StageOutput> {
        DateCorrector::new().apply(&frame)
    }

    fn years(out: &StageOutput) -> Vec<Option<i64>> {
        out.frame.column("fecha_salida").unwrap().i64().unwrap().into_iter().collect()
    }

    #[test]
    fn test_corrects_known_years_and_casts() {
        let frame = df!(
            "plataforma" => ["PC", "PC", "PC", "PC"],
            "fecha_salida" => [2070.0, 2079.0, 1998.0, 2020.0]
        )
        .unwrap();
        let out = correct(frame).unwrap();
        assert_eq!(years(&out), vec![Some(1970), Some(1979), Some(1998), Some(2020)]);
        assert_eq!(out.report.metadata["corrected_cells"], "2");
        assert_eq!(out.report.metadata["range_before"], "1998 - 2079");
        assert_eq!(out.report.metadata["range_after"], "1970 - 2020");
        assert_eq!(out.report.metadata["corrupted_2070"], "1");
    }

    #[test]
    fn test_no_corrupted_year_survives() {
        let frame = df!("fecha_salida" => [2070i64, 2073, 2075, 2077, 2078, 2079, 2071, 1985]).unwrap();
        let out = correct(frame).unwrap();
        for year in years(&out) {
            let year = year.unwrap();
            assert!(!YEAR_CORRECTION_LOOKUP.contains_key(&year));
        }
    }

    #[test]
    fn test_float_years_are_truncated() {
        let frame = df!("fecha_salida" => [1999.7]).unwrap();
        assert_eq!(years(&correct(frame).unwrap()), vec![Some(1999)]);
    }

    #[test]
    fn test_numeric_text_is_cast() {
        let frame = df!("fecha_salida" => [" 2077 "]).unwrap();
        assert_eq!(years(&correct(frame).unwrap()), vec![Some(1977)]);
    }

    #[test]
    fn test_missing_year_is_fatal() {
        let frame = df!("fecha_salida" => [Some(2001i64), None]).unwrap();
        let err = correct(frame).unwrap_err();
        assert!(matches!(err, ReportError::Type { row: 1, .. }));
    }

    #[test]
    fn test_non_numeric_year_is_fatal() {
        let frame = df!("fecha_salida" => ["TBA"]).unwrap();
        assert!(matches!(correct(frame).unwrap_err(), ReportError::Type { .. }));
    }
}
