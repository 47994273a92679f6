use crate::constants::{AGGREGATE_PLATFORMS, LEADING_ID_COLUMNS, PLATFORM_COLUMN, RELEASE_DATE_COLUMN};
use crate::error::{ReportError, Result};
use crate::pipeline::frame::{column_names, require_column};
use crate::pipeline::{Stage, StageOutput, StageReport};
use polars::prelude::*;
use tracing::{debug, info, instrument};

/// Drops identifier columns, aggregate platform rows and rows without a release date.
///
/// The identifier columns are removed by position, so the input must follow
/// the source schema's column order.
#[derive(Debug, Default)]
pub struct RowFilter;

impl RowFilter {
    pub fn new() -> Self {
        Self
    }

    fn drop_leading_columns(frame: &DataFrame) -> Result<DataFrame> {
        let names = column_names(frame);
        if names.len() < LEADING_ID_COLUMNS {
            return Err(ReportError::Schema(format!(
                "expected at least {} leading identifier columns, found {} columns",
                LEADING_ID_COLUMNS,
                names.len()
            )));
        }
        Ok(frame.select(names[LEADING_ID_COLUMNS..].iter().map(String::as_str))?)
    }

    /// True for "Series"/"All"; a missing platform is not an aggregate.
    fn is_aggregate_platform() -> Expr {
        let platform = col(PLATFORM_COLUMN).cast(DataType::String);
        AGGREGATE_PLATFORMS
            .iter()
            .fold(lit(false), |acc, name| acc.or(platform.clone().eq_missing(lit(*name))))
    }
}

impl Stage for RowFilter {
    fn stage_name(&self) -> &'static str {
        "filter"
    }

    #[instrument(skip_all, fields(stage = "filter", rows = frame.height()))]
    fn apply(&self, frame: &DataFrame) -> Result<StageOutput> {
        let trimmed = Self::drop_leading_columns(frame)?;
        require_column(&trimmed, PLATFORM_COLUMN)?;
        require_column(&trimmed, RELEASE_DATE_COLUMN)?;

        let without_aggregates = trimmed
            .clone()
            .lazy()
            .filter(Self::is_aggregate_platform().not())
            .collect()?;
        let aggregate_rows = trimmed.height() - without_aggregates.height();
        debug!("Dropped {} aggregate platform rows", aggregate_rows);

        let filtered = without_aggregates
            .clone()
            .lazy()
            .filter(col(RELEASE_DATE_COLUMN).is_not_null())
            .collect()?;
        let undated_rows = without_aggregates.height() - filtered.height();
        debug!("Dropped {} rows without release date", undated_rows);

        let message = format!(
            "kept {} of {} rows ({} aggregate platform, {} undated)",
            filtered.height(),
            frame.height(),
            aggregate_rows,
            undated_rows
        );
        info!("🧹 {}", message);

        let report = StageReport::new(self.stage_name(), frame.height(), filtered.height(), message)
            .with_metadata("aggregate_platform_rows", aggregate_rows)
            .with_metadata("undated_rows", undated_rows);
        Ok(StageOutput { frame: filtered, report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::frame::text_values;
    use crate::pipeline::ingestion::load_csv_from_reader;

    const HEADER: &str = "img,titulo,plataforma,fecha_salida,genero\n";

    #[test]
    fn test_drops_aggregates_and_undated_rows() {
        let csv = format!(
            "{HEADER}\
             a,Halo,XB,2001,Shooter\n\
             b,Halo,Series,2001,Shooter\n\
             c,Halo,All,,Shooter\n\
             d,Tetris,GB,,Puzzle\n\
             e,Doom,PC,1993,Shooter\n"
        );
        let frame = load_csv_from_reader(csv.as_bytes()).unwrap();
        let out = RowFilter::new().apply(&frame).unwrap();

        assert_eq!(column_names(&out.frame), vec!["plataforma", "fecha_salida", "genero"]);
        assert_eq!(out.frame.height(), 2);
        let platforms = text_values(&out.frame, "plataforma").unwrap();
        assert_eq!(platforms, vec![Some("XB".to_string()), Some("PC".to_string())]);
        assert_eq!(out.frame.column("fecha_salida").unwrap().null_count(), 0);
        assert_eq!(out.report.rows_dropped(), 3);
        assert_eq!(out.report.metadata["aggregate_platform_rows"], "2");
        assert_eq!(out.report.metadata["undated_rows"], "1");
        // input snapshot untouched
        assert_eq!(frame.height(), 5);
    }

    #[test]
    fn test_platform_match_is_exact() {
        let csv = format!("{HEADER}a,X,series,2001,Misc\nb,Y,All Stars,2002,Misc\n");
        let frame = load_csv_from_reader(csv.as_bytes()).unwrap();
        let out = RowFilter::new().apply(&frame).unwrap();
        assert_eq!(out.frame.height(), 2);
    }

    #[test]
    fn test_missing_platform_is_kept() {
        let csv = format!("{HEADER}a,X,,2001,Misc\nb,Y,Series,2002,Misc\n");
        let frame = load_csv_from_reader(csv.as_bytes()).unwrap();
        let out = RowFilter::new().apply(&frame).unwrap();
        assert_eq!(out.frame.height(), 1);
        assert_eq!(text_values(&out.frame, "plataforma").unwrap(), vec![None]);
    }

    #[test]
    fn test_missing_platform_column_is_schema_error() {
        let csv = "img,titulo,consola,fecha_salida\na,b,PC,2000\n";
        let frame = load_csv_from_reader(csv.as_bytes()).unwrap();
        let err = RowFilter::new().apply(&frame).unwrap_err();
        assert!(matches!(err, ReportError::Schema(c) if c == "plataforma"));
    }
}
