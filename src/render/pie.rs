use super::{render_err, render_placeholder, FONT, SET2};
use crate::analysis::GenreShare;
use crate::error::Result;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use serde::Serialize;
use std::f64::consts::PI;
use std::path::Path;
use tracing::{debug, instrument};

/// Radial position of the percentage text, as a fraction of the radius
const PCT_DISTANCE: f64 = 0.8;
/// Radial position of the genre label
const LABEL_DISTANCE: f64 = 1.1;

/// One drawn slice: label, row count and share of the drawn pie in percent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub count: usize,
    pub share: f64,
}

impl PieSlice {
    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.share)
    }
}

/// Slices to draw for a genre distribution.
///
/// Shares are relative to what is drawn, so they always add up to 100 even
/// though the rolled-up bucket is normally left out.
pub fn pie_slices(share: &GenreShare, include_rolled_up: bool) -> Vec<PieSlice> {
    let mut slices: Vec<(String, usize)> = share
        .slices
        .iter()
        .map(|s| (s.genre.clone(), s.count))
        .collect();
    if include_rolled_up && share.rolled_up.count > 0 {
        slices.push((share.rolled_up.label.clone(), share.rolled_up.count));
    }

    let drawn: usize = slices.iter().map(|(_, c)| c).sum();
    slices
        .into_iter()
        .map(|(label, count)| PieSlice {
            label,
            count,
            share: if drawn == 0 {
                0.0
            } else {
                count as f64 / drawn as f64 * 100.0
            },
        })
        .collect()
}

/// Point on the circle at `angle` radians, counter-clockwise from 3 o'clock.
fn polar(center: (i32, i32), radius: f64, angle: f64) -> (i32, i32) {
    (
        center.0 + (radius * angle.cos()).round() as i32,
        center.1 - (radius * angle.sin()).round() as i32,
    )
}

fn wedge(center: (i32, i32), radius: f64, start: f64, end: f64) -> Vec<(i32, i32)> {
    let steps = (((end - start) / (PI / 180.0)).ceil() as usize).max(1);
    let mut points = Vec::with_capacity(steps + 2);
    points.push(center);
    for step in 0..=steps {
        let angle = start + (end - start) * step as f64 / steps as f64;
        points.push(polar(center, radius, angle));
    }
    points
}

#[instrument(skip(slices), fields(slices = slices.len()))]
pub fn render_genre_pie(slices: &[PieSlice], title: &str, path: &Path, size: (u32, u32)) -> Result<()> {
    let drawn: usize = slices.iter().map(|s| s.count).sum();
    if drawn == 0 {
        return render_placeholder(title, path, size);
    }

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let area = root.titled(title, (FONT, 24)).map_err(render_err)?;

    let (width, height) = area.dim_in_pixel();
    let center = (width as i32 / 2, height as i32 / 2);
    let radius = f64::from(width.min(height)) * 0.35;

    let label_style = TextStyle::from((FONT, 14).into_font()).color(&BLACK);
    let pct_style = TextStyle::from((FONT, 12).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));

    let mut start = 0.0;
    for (i, slice) in slices.iter().enumerate() {
        let sweep = slice.count as f64 / drawn as f64 * 2.0 * PI;
        let end = start + sweep;
        let color = SET2[i % SET2.len()];

        area.draw(&Polygon::new(wedge(center, radius, start, end), color.filled()))
            .map_err(render_err)?;

        let mid = start + sweep / 2.0;
        let h_pos = if mid.cos() >= 0.0 { HPos::Left } else { HPos::Right };
        area.draw(&Text::new(
            slice.label.clone(),
            polar(center, radius * LABEL_DISTANCE, mid),
            label_style.pos(Pos::new(h_pos, VPos::Center)),
        ))
        .map_err(render_err)?;
        area.draw(&Text::new(
            slice.percent_label(),
            polar(center, radius * PCT_DISTANCE, mid),
            pct_style.clone(),
        ))
        .map_err(render_err)?;

        start = end;
    }

    root.present().map_err(render_err)?;
    debug!("Wrote {}", path.display());
    Ok(())
}
