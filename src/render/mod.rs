// SVG chart rendering for the cleaned dataset

pub mod bar;
pub mod pie;

use crate::analysis::YearCount;
use crate::error::{ReportError, Result};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub use bar::render_releases_per_year;
pub use pie::{pie_slices, render_genre_pie, PieSlice};

pub const RELEASES_CHART_FILE: &str = "releases_per_year.svg";
pub const GENRE_CHART_FILE: &str = "genre_share.svg";

/// File name of the pie chart that leaves `excluded` out, e.g. `genre_share_without_misc.svg`.
pub fn excluded_genre_chart_file(excluded: &str) -> String {
    let slug: String = excluded
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    format!("genre_share_without_{slug}.svg")
}

pub(crate) const FONT: &str = "sans-serif";

pub(crate) const GOLD: RGBColor = RGBColor(255, 215, 0);

/// Qualitative palette, cycled when there are more slices than colors
pub(crate) const SET2: [RGBColor; 8] = [
    RGBColor(102, 194, 165),
    RGBColor(252, 141, 98),
    RGBColor(141, 160, 203),
    RGBColor(231, 138, 195),
    RGBColor(166, 216, 84),
    RGBColor(255, 217, 47),
    RGBColor(229, 196, 148),
    RGBColor(179, 179, 179),
];

/// Text drawn in place of a chart whose data is empty.
pub const NO_DATA_MESSAGE: &str = "Sin datos";

pub(crate) fn render_err<E: std::fmt::Display>(err: E) -> ReportError {
    ReportError::Render(err.to_string())
}

/// Titled chart carrying only a centered notice, drawn when there is nothing to plot.
pub(crate) fn render_placeholder(title: &str, path: &Path, size: (u32, u32)) -> Result<()> {
    warn!("Nothing to plot for '{}', writing a placeholder", title);
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let area = root.titled(title, (FONT, 24)).map_err(render_err)?;

    let (width, height) = area.dim_in_pixel();
    let style = TextStyle::from((FONT, 20).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    area.draw(&Text::new(
        NO_DATA_MESSAGE,
        (width as i32 / 2, height as i32 / 2),
        style,
    ))
    .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

/// What one chart file shows.
#[derive(Debug, Clone)]
pub enum ChartData {
    Releases(Vec<YearCount>),
    Pie { title: String, slices: Vec<PieSlice> },
}

/// One chart to write: file name inside the output directory plus its data.
#[derive(Debug, Clone)]
pub struct ChartJob {
    pub file_name: String,
    pub data: ChartData,
}

impl ChartJob {
    fn draw(&self, path: &Path, size: (u32, u32)) -> Result<()> {
        match &self.data {
            ChartData::Releases(counts) => render_releases_per_year(counts, path, size),
            ChartData::Pie { title, slices } => render_genre_pie(slices, title, path, size),
        }
    }
}

/// Draw every job into `dir`.
///
/// Charts are drawn to hidden `.partial` files first and only renamed into
/// place once all of them succeeded; on failure no chart file is left behind.
pub fn render_all(jobs: &[ChartJob], dir: &Path, size: (u32, u32)) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(jobs.len());
    for job in jobs {
        let target = dir.join(&job.file_name);
        let partial = dir.join(format!(".{}.partial", job.file_name));
        if let Err(e) = job.draw(&partial, size) {
            discard(staged.iter().map(|(p, _)| p.as_path()).chain([partial.as_path()]));
            return Err(e);
        }
        staged.push((partial, target));
    }

    let mut written = Vec::with_capacity(staged.len());
    for (partial, target) in staged {
        fs::rename(&partial, &target)?;
        info!("🖼️  Wrote {}", target.display());
        written.push(target);
    }
    Ok(written)
}

fn discard<'a>(paths: impl Iterator<Item = &'a Path>) {
    for path in paths {
        if path.exists() {
            if let Err(e) = fs::remove_file(path) {
                warn!("Could not remove {}: {}", path.display(), e);
            }
        }
    }
}
