use crate::analysis::{Analysis, GenreShare};
use crate::error::Result;
use crate::pipeline::{CleanedData, ColumnProfile, QualityReport, StageReport};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Everything a run produced, persisted as JSON next to the charts
#[derive(Debug, Serialize)]
pub struct Summary {
    pub generated_at: DateTime<Utc>,
    pub input: String,
    pub rows_loaded: usize,
    pub rows_cleaned: usize,
    pub loaded_columns: Vec<ColumnProfile>,
    pub cleaned_columns: Vec<ColumnProfile>,
    pub stages: Vec<StageReport>,
    pub quality: QualityReport,
    pub analysis: Analysis,
    pub charts: Vec<String>,
}

impl Summary {
    pub fn new(
        input: &Path,
        rows_loaded: usize,
        cleaned: &CleanedData,
        quality: QualityReport,
        analysis: Analysis,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            input: input.display().to_string(),
            rows_loaded,
            rows_cleaned: cleaned.records.len(),
            loaded_columns: cleaned.loaded_profile.clone(),
            cleaned_columns: cleaned.cleaned_profile.clone(),
            stages: cleaned.reports.clone(),
            quality,
            analysis,
            charts: Vec::new(),
        }
    }
}

/// Persist the summary to `summary_<timestamp>.json` in `output_dir`
pub fn persist_summary(summary: &Summary, output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;

    let timestamp = summary.generated_at.format("%Y%m%d_%H%M%S");
    let filepath = output_dir.join(format!("summary_{timestamp}.json"));

    let json_content = serde_json::to_string_pretty(summary)?;
    fs::write(&filepath, json_content)?;

    Ok(filepath)
}

/// Plain-text rendition of the aggregate tables.
pub fn format_summary(summary: &Summary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "\n📊 {}: {} rows loaded, {} rows after cleaning\n",
        summary.input, summary.rows_loaded, summary.rows_cleaned
    ));

    out.push_str("\n🧹 Stages:\n");
    for stage in &summary.stages {
        out.push_str(&format!("   {:<14} {}\n", stage.stage, stage.message));
    }

    out.push_str("\n📋 Columns after cleaning:\n");
    for column in &summary.cleaned_columns {
        out.push_str(&format!(
            "   {:<14} {:>8} non-missing  {:?}\n",
            column.name, column.non_missing, column.kind
        ));
    }

    out.push_str("\n🏆 Most published genre per year:\n");
    for mode in &summary.analysis.modal_genre_per_year {
        let genres = if mode.genres.is_empty() {
            "-".to_string()
        } else {
            mode.genres.join(", ")
        };
        out.push_str(&format!("   {}  {} ({})\n", mode.year, genres, mode.count));
    }

    out.push_str(&format_share("🎮 Genre share", &summary.analysis.genre_share));
    out.push_str(&format_share(
        "🎮 Genre share without excluded genres",
        &summary.analysis.genre_share_excluded,
    ));

    if !summary.charts.is_empty() {
        out.push_str("\n🖼️  Charts:\n");
        for chart in &summary.charts {
            out.push_str(&format!("   {chart}\n"));
        }
    }
    out
}

fn format_share(title: &str, share: &GenreShare) -> String {
    let mut out = format!("\n{title}:\n");
    for slice in &share.slices {
        out.push_str(&format!(
            "   {:<16} {:>7} {:>6.1}%\n",
            slice.genre, slice.count, slice.percentage
        ));
    }
    if !share.rolled_up.genres.is_empty() {
        out.push_str(&format!(
            "   {:<16} {:>7} {:>6.1}%  ({})\n",
            share.rolled_up.label,
            share.rolled_up.count,
            share.rolled_up.percentage,
            share.rolled_up.genres.join(", ")
        ));
    }
    if !share.excluded.is_empty() {
        out.push_str(&format!("   excluded: {}\n", share.excluded.join(", ")));
    }
    out
}
