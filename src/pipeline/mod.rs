// Cleaning pipeline: ingestion, processing stages and orchestration

pub mod frame;
pub mod ingestion;
pub mod pipeline;
pub mod processing;

use crate::error::Result;
use polars::prelude::DataFrame;
use serde::Serialize;
use std::collections::BTreeMap;

/// Common trait for all cleaning stages.
///
/// A stage reads one dataframe snapshot and returns a new one; the input is
/// left untouched so each stage can be tested in isolation.
pub trait Stage {
    /// Get the name of this stage, used in logs and error diagnostics
    fn stage_name(&self) -> &'static str;

    /// Apply this stage to a snapshot
    fn apply(&self, frame: &DataFrame) -> Result<StageOutput>;
}

/// New snapshot plus what the stage did to get there
#[derive(Debug, Clone)]
pub struct StageOutput {
    pub frame: DataFrame,
    pub report: StageReport,
}

/// Result of executing a stage
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: String,
    pub rows_in: usize,
    pub rows_out: usize,
    pub message: String,
    pub metadata: BTreeMap<String, String>,
}

impl StageReport {
    pub fn new(stage: &str, rows_in: usize, rows_out: usize, message: String) -> Self {
        Self {
            stage: stage.to_string(),
            rows_in,
            rows_out,
            message,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: impl ToString) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn rows_dropped(&self) -> usize {
        self.rows_in.saturating_sub(self.rows_out)
    }
}

pub use ingestion::{load_csv, load_csv_from_reader};
pub use pipeline::{CleanedData, Pipeline};
pub use processing::dates::DateCorrector;
pub use processing::filter::RowFilter;
pub use processing::normalize::FieldNormalizer;
pub use processing::quality_gate::{QualityGate, QualityReport};
pub use frame::{ColumnKind, ColumnProfile};
