use crate::constants::{
    translate_genre, GENRE_COLUMN, GENRE_TRANSLATIONS, REGIONAL_SALES_COLUMNS, SALES_COLUMNS,
    SALES_SUM_COLUMN,
};
use crate::error::Result;
use crate::pipeline::frame::{float_values, text_values};
use crate::pipeline::{Stage, StageOutput, StageReport};
use polars::prelude::*;
use tracing::{debug, info, instrument};

/// Fills missing sales with zero, translates genre labels and derives `ventas_suma`.
///
/// Zero-filling conflates "no sales" with "not reported"; the charts do not
/// use sales, the fill keeps the cleaned table complete.
#[derive(Debug, Default)]
pub struct FieldNormalizer;

impl FieldNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Casts every sales column to floats; returns the frame and the number of missing cells.
    fn numeric_sales(frame: &DataFrame) -> Result<(DataFrame, usize)> {
        let mut numeric = frame.clone();
        let mut missing = 0;
        for column in SALES_COLUMNS {
            let values = float_values(frame, column)?;
            missing += values.iter().filter(|v| v.is_none()).count();
            numeric.with_column(Series::new(column.into(), values))?;
        }
        Ok((numeric, missing))
    }

    fn count_translatable(frame: &DataFrame) -> Result<usize> {
        Ok(text_values(frame, GENRE_COLUMN)?
            .iter()
            .flatten()
            .filter(|genre| translate_genre(genre) != genre.as_str())
            .count())
    }

    /// Nested `when` chain mapping each source label to its Spanish name.
    fn translate_genres() -> Expr {
        let genre = col(GENRE_COLUMN).cast(DataType::String);
        GENRE_TRANSLATIONS
            .iter()
            .fold(genre.clone(), |acc, (from, to)| {
                when(genre.clone().eq(lit(*from))).then(lit(*to)).otherwise(acc)
            })
            .alias(GENRE_COLUMN)
    }

    fn regional_total() -> Expr {
        REGIONAL_SALES_COLUMNS
            .iter()
            .map(|column| col(*column))
            .fold(lit(0.0), |acc, sales| acc + sales)
            .alias(SALES_SUM_COLUMN)
    }
}

impl Stage for FieldNormalizer {
    fn stage_name(&self) -> &'static str {
        "normalize"
    }

    #[instrument(skip_all, fields(stage = "normalize", rows = frame.height()))]
    fn apply(&self, frame: &DataFrame) -> Result<StageOutput> {
        let (numeric, filled) = Self::numeric_sales(frame)?;
        debug!("Filling {} missing sales cells with 0.0", filled);

        let translated = Self::count_translatable(&numeric)?;
        debug!("Translating {} genre labels", translated);

        let fills: Vec<Expr> = SALES_COLUMNS
            .iter()
            .map(|column| col(*column).fill_null(lit(0.0)))
            .collect();
        let normalized = numeric
            .lazy()
            .with_columns(fills)
            .with_column(Self::translate_genres())
            .with_column(Self::regional_total())
            .collect()?;

        let message = format!(
            "filled {} missing sales cells, translated {} genres, derived {}",
            filled, translated, SALES_SUM_COLUMN
        );
        info!("🔧 {}", message);

        let report = StageReport::new(self.stage_name(), frame.height(), normalized.height(), message)
            .with_metadata("filled_sales_cells", filled)
            .with_metadata("translated_genres", translated);
        Ok(StageOutput { frame: normalized, report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportError;
    use crate::pipeline::frame::column_names;
    use crate::pipeline::ingestion::load_csv_from_reader;

    const HEADER: &str = "plataforma,fecha_salida,genero,ventas_na,ventas_eu,ventas_jp,ventas_otras,ventas_tot\n";

    fn normalize(body: &str) -> Result<StageOutput> {
        let frame = load_csv_from_reader(format!("{HEADER}{body}").as_bytes())?;
        FieldNormalizer::new().apply(&frame)
    }

    fn sums(out: &StageOutput) -> Vec<Option<f64>> {
        float_values(&out.frame, "ventas_suma").unwrap()
    }

    #[test]
    fn test_fills_missing_sales_and_sums_regions() {
        let out = normalize("PS4,2015,Action,,1.0,0,0,\nPC,2010,Strategy,0.25,0.5,NA,0.25,9.9\n").unwrap();

        for column in SALES_COLUMNS {
            let c = out.frame.column(column).unwrap();
            assert_eq!(c.dtype(), &DataType::Float64);
            assert_eq!(c.null_count(), 0);
        }
        // ventas_tot never feeds the derived total
        assert_eq!(sums(&out), vec![Some(1.0), Some(1.0)]);
        assert_eq!(out.report.metadata["filled_sales_cells"], "3");
        assert_eq!(column_names(&out.frame).last().map(String::as_str), Some("ventas_suma"));
    }

    #[test]
    fn test_sum_matches_regional_fields_exactly() {
        let out = normalize("PS2,2004,Racing,0.1,0.2,0.3,0.4,1.0\n").unwrap();
        let expected = 0.1 + 0.2 + 0.3 + 0.4;
        assert_eq!(sums(&out), vec![Some(expected)]);
    }

    #[test]
    fn test_translates_genres_and_passes_unknown_through() {
        let out = normalize(
            "PS4,2015,Action,,,,,\nPC,2003,MMO,,,,,\nPC,2003,Role-Playing,,,,,\nPC,2003,,,,,,\n",
        )
        .unwrap();
        let genres = text_values(&out.frame, "genero").unwrap();
        assert_eq!(
            genres,
            vec![
                Some("Acción".to_string()),
                Some("MMO".to_string()),
                Some("RPG".to_string()),
                None
            ]
        );
        assert_eq!(out.report.metadata["translated_genres"], "2");
    }

    #[test]
    fn test_normalizing_twice_is_stable() {
        let once = normalize("PS4,2015,Action,,1.0,0,0,\n").unwrap();
        let twice = FieldNormalizer::new().apply(&once.frame).unwrap();
        assert!(once.frame.equals_missing(&twice.frame));
        assert_eq!(twice.report.metadata["translated_genres"], "0");
    }

    #[test]
    fn test_non_numeric_sales_is_type_error() {
        let err = normalize("PS4,2015,Action,lots,1.0,0,0,\n").unwrap_err();
        assert!(matches!(err, ReportError::Type { column, row: 0, .. } if column == "ventas_na"));
    }

    #[test]
    fn test_missing_sales_column_is_schema_error() {
        let frame = load_csv_from_reader("plataforma,fecha_salida,genero\nPC,2000,Action\n".as_bytes()).unwrap();
        let err = FieldNormalizer::new().apply(&frame).unwrap_err();
        assert!(matches!(err, ReportError::Schema(_)));
    }
}
