use polars::prelude::DataFrame;
use std::path::PathBuf;
use tracing::{info, instrument};

use crate::analysis::Analysis;
use crate::config::ReportConfig;
use crate::error::Result;
use crate::pipeline::{load_csv, Pipeline, QualityGate};
use crate::render::{
    excluded_genre_chart_file, pie_slices, render_all, ChartData, ChartJob, GENRE_CHART_FILE,
    RELEASES_CHART_FILE,
};
use crate::report::{persist_summary, Summary};

/// Outcome of a full report run
#[derive(Debug)]
pub struct ReportRun {
    pub summary: Summary,
    pub charts: Vec<PathBuf>,
    pub summary_path: Option<PathBuf>,
}

/// Use case for load → clean → aggregate → render
pub struct ReportUseCase {
    config: ReportConfig,
    pipeline: Pipeline,
}

impl ReportUseCase {
    pub fn new(config: ReportConfig) -> Self {
        Self {
            config,
            pipeline: Pipeline::standard(),
        }
    }

    /// Clean and aggregate without rendering anything
    #[instrument(skip(self), fields(input = %self.config.input.display()))]
    pub fn analyze(&self) -> Result<Summary> {
        let frame = load_csv(&self.config.input).map_err(|e| e.in_stage("load"))?;
        self.analyze_frame(&frame)
    }

    fn analyze_frame(&self, frame: &DataFrame) -> Result<Summary> {
        let cleaned = self.pipeline.clean(frame)?;
        let quality = QualityGate::new(self.config.strict_year_range)
            .assess(&cleaned.records)
            .map_err(|e| e.in_stage("quality_gate"))?;
        let analysis = Analysis::compute(
            &cleaned.frame,
            self.config.share_threshold,
            &self.config.excluded_genre,
        )
        .map_err(|e| e.in_stage("analysis"))?;
        Ok(Summary::new(&self.config.input, frame.height(), &cleaned, quality, analysis))
    }

    /// Full run: charts are only drawn once every earlier step succeeded
    pub fn run(&self) -> Result<ReportRun> {
        let mut summary = self.analyze()?;
        let jobs = self.chart_jobs(&summary);
        let size = (self.config.chart.width, self.config.chart.height);
        let charts = render_all(&jobs, &self.config.output_dir, size).map_err(|e| e.in_stage("render"))?;
        summary.charts = charts.iter().map(|p| p.display().to_string()).collect();

        let summary_path = if self.config.write_summary {
            let path = persist_summary(&summary, &self.config.output_dir)?;
            info!("💾 Saved summary to {}", path.display());
            Some(path)
        } else {
            None
        };

        Ok(ReportRun {
            summary,
            charts,
            summary_path,
        })
    }

    /// Every chart's data, prepared before anything is written
    fn chart_jobs(&self, summary: &Summary) -> Vec<ChartJob> {
        let analysis = &summary.analysis;
        let show_rolled_up = self.config.show_rolled_up_slice;
        vec![
            ChartJob {
                file_name: RELEASES_CHART_FILE.to_string(),
                data: ChartData::Releases(analysis.releases_per_year.clone()),
            },
            ChartJob {
                file_name: GENRE_CHART_FILE.to_string(),
                data: ChartData::Pie {
                    title: "Juegos publicados por género (%)".to_string(),
                    slices: pie_slices(&analysis.genre_share, show_rolled_up),
                },
            },
            ChartJob {
                file_name: excluded_genre_chart_file(&self.config.excluded_genre),
                data: ChartData::Pie {
                    title: format!(
                        "Juegos publicados por género, sin {} (%)",
                        self.config.excluded_genre
                    ),
                    slices: pie_slices(&analysis.genre_share_excluded, show_rolled_up),
                },
            },
        ]
    }
}
