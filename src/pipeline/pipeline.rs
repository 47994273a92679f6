use crate::error::Result;
use crate::pipeline::processing::dates::DateCorrector;
use crate::pipeline::processing::filter::RowFilter;
use crate::pipeline::processing::normalize::FieldNormalizer;
use crate::pipeline::frame::{profile, ColumnProfile};
use crate::pipeline::{Stage, StageReport};
use crate::types::GameRecord;
use polars::prelude::DataFrame;
use tracing::{debug, error, info, instrument};

/// Output of the cleaning stages
#[derive(Debug, Clone)]
pub struct CleanedData {
    /// Final dataframe snapshot, still in source column layout
    pub frame: DataFrame,
    /// Typed view of `frame`
    pub records: Vec<GameRecord>,
    pub reports: Vec<StageReport>,
    pub loaded_profile: Vec<ColumnProfile>,
    pub cleaned_profile: Vec<ColumnProfile>,
}

/// Ordered sequence of cleaning stages.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl Pipeline {
    /// filter → normalize → correct dates
    pub fn standard() -> Self {
        Self {
            stages: vec![
                Box::new(RowFilter::new()),
                Box::new(FieldNormalizer::new()),
                Box::new(DateCorrector::new()),
            ],
        }
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.stage_name()).collect()
    }

    /// Run every stage in order. The first failure aborts the run and is
    /// tagged with the name of the failing stage.
    #[instrument(skip_all, fields(rows = frame.height()))]
    pub fn clean(&self, frame: &DataFrame) -> Result<CleanedData> {
        let loaded_profile = profile(frame);
        for column in &loaded_profile {
            debug!(
                "loaded column {:<14} {:?} non-missing={}",
                column.name, column.kind, column.non_missing
            );
        }

        let mut current = frame.clone();
        let mut reports = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            let name = stage.stage_name();
            let output = stage.apply(&current).map_err(|e| {
                error!("Stage {} failed: {}", name, e);
                e.in_stage(name)
            })?;
            debug!("Stage {} -> {} rows", name, output.frame.height());
            reports.push(output.report);
            current = output.frame;
        }

        let records = GameRecord::from_frame(&current).map_err(|e| e.in_stage("records"))?;
        let cleaned_profile = profile(&current);
        info!(
            "✅ Cleaned {} -> {} rows through {} stages",
            frame.height(),
            records.len(),
            reports.len()
        );

        Ok(CleanedData {
            frame: current,
            records,
            reports,
            loaded_profile,
            cleaned_profile,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportError;
    use crate::pipeline::ingestion::load_csv_from_reader;

    const HEADER: &str =
        "img,titulo,plataforma,fecha_salida,genero,ventas_na,ventas_eu,ventas_jp,ventas_otras,ventas_tot\n";

    fn clean(body: &str) -> Result<CleanedData> {
        let frame = load_csv_from_reader(format!("{HEADER}{body}").as_bytes())?;
        Pipeline::standard().clean(&frame)
    }

    #[test]
    fn test_stage_order() {
        assert_eq!(
            Pipeline::standard().stage_names(),
            vec!["filter", "normalize", "correct_dates"]
        );
    }

    #[test]
    fn test_corrupted_action_row_end_to_end() {
        let cleaned = clean("a.png,Pong,PS4,2070,Action,NaN,1.0,0,0,\n").unwrap();
        let record = &cleaned.records[0];
        assert_eq!(record.release_year, 1970);
        assert_eq!(record.genre.as_deref(), Some("Acción"));
        assert_eq!(record.sales_na, 0.0);
        assert_eq!(record.sales_total, 1.0);
        assert_eq!(cleaned.reports.len(), 3);
    }

    #[test]
    fn test_aggregate_and_undated_rows_are_gone() {
        let cleaned = clean(
            "a,Halo,Series,2001,Shooter,,,,,\n\
             b,Halo,XB,2001,Shooter,,,,,\n\
             c,Tetris,GB,,Puzzle,,,,,\n",
        )
        .unwrap();
        assert_eq!(cleaned.records.len(), 1);
        assert_eq!(cleaned.records[0].platform, "XB");
    }

    #[test]
    fn test_failure_names_the_stage() {
        let err = clean("a,Halo,XB,2001,Shooter,lots,,,,\n").unwrap_err();
        assert_eq!(err.stage(), Some("normalize"));
        assert!(matches!(err.root(), ReportError::Type { .. }));
    }

    #[test]
    fn test_profiles_capture_before_and_after() {
        let cleaned = clean("a,Halo,XB,2001,Shooter,,1.5,,,\n").unwrap();
        assert_eq!(cleaned.loaded_profile.len(), 10);
        // two identifier columns dropped, ventas_suma added
        assert_eq!(cleaned.cleaned_profile.len(), 9);
        assert!(cleaned.cleaned_profile.iter().any(|c| c.name == "ventas_suma"));
    }
}
