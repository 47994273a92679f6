use super::{render_err, render_placeholder, FONT, GOLD};
use crate::analysis::YearCount;
use crate::error::Result;
use plotters::prelude::*;
use std::path::Path;
use tracing::{debug, instrument};

const TITLE: &str = "Número de videojuegos publicados por año";

/// Bar chart with one bar per release year present in `counts`, in the given order.
/// Without any year a placeholder chart is written instead.
#[instrument(skip(counts), fields(years = counts.len()))]
pub fn render_releases_per_year(counts: &[YearCount], path: &Path, size: (u32, u32)) -> Result<()> {
    if counts.is_empty() {
        return render_placeholder(TITLE, path, size);
    }
    let years: Vec<String> = counts.iter().map(|c| c.year.to_string()).collect();
    let max = counts.iter().map(|c| c.count).max().unwrap_or(0) as u32;

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(TITLE, (FONT, 24))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d((0..counts.len()).into_segmented(), 0u32..(max + max / 10 + 1))
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(counts.len())
        .x_label_formatter(&|v: &SegmentValue<usize>| match v {
            SegmentValue::CenterOf(i) => years.get(*i).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .x_label_style((FONT, 9).into_font().transform(FontTransform::Rotate90))
        .x_desc("Año")
        .y_desc("Número de videojuegos publicados")
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(counts.iter().enumerate().map(|(i, c)| {
            let mut bar = Rectangle::new(
                [
                    (SegmentValue::Exact(i), 0u32),
                    (SegmentValue::Exact(i + 1), c.count as u32),
                ],
                GOLD.filled(),
            );
            bar.set_margin(0, 0, 1, 1);
            bar
        }))
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    debug!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_svg_with_year_labels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("releases.svg");
        let counts = vec![
            YearCount { year: 1970, count: 3 },
            YearCount { year: 1985, count: 12 },
            YearCount { year: 2001, count: 40 },
        ];

        render_releases_per_year(&counts, &path, (800, 600)).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("1985"));
    }

    #[test]
    fn test_empty_counts_draw_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.svg");
        render_releases_per_year(&[], &path, (800, 600)).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains(crate::render::NO_DATA_MESSAGE));
    }
}
