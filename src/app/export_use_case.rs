use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::error::Result;
use crate::pipeline::{load_csv, CleanedData, Pipeline};

/// Use case for writing the cleaned table back out as CSV
pub struct ExportUseCase {
    pipeline: Pipeline,
}

impl Default for ExportUseCase {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportUseCase {
    pub fn new() -> Self {
        Self {
            pipeline: Pipeline::standard(),
        }
    }

    /// Clean `input` and write the result to `output`; returns the cleaned data
    #[instrument(skip(self))]
    pub fn export(&self, input: &Path, output: &Path) -> Result<CleanedData> {
        let frame = load_csv(input).map_err(|e| e.in_stage("load"))?;
        let cleaned = self.pipeline.clean(&frame)?;
        write_frame(&cleaned.frame, output)?;
        info!("💾 Wrote {} cleaned rows to {}", cleaned.frame.height(), output.display());
        Ok(cleaned)
    }
}

/// Write a dataframe snapshot as comma-delimited text with a header row.
/// Float columns keep their decimal point, so a reload infers the same types.
pub fn write_frame(frame: &DataFrame, output: &Path) -> Result<PathBuf> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(output)?;
    let mut frame = frame.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut frame)?;
    Ok(output.to_path_buf())
}
