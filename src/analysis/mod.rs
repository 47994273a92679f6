// Aggregations over the cleaned dataframe that feed the charts and the summary

pub mod genre_share;
pub mod yearly;

pub use genre_share::{genre_counts, roll_up, GenreShare, GenreSlice, RolledUp};
pub use yearly::{modal_genre_per_year, releases_per_year, YearCount, YearModalGenre};

use crate::error::Result;
use polars::prelude::*;
use serde::Serialize;
use tracing::{info, instrument};

/// Name of the row-count column produced by [`count_by`].
pub(crate) const COUNT_COLUMN: &str = "count";

/// Every aggregate computed for one run
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub releases_per_year: Vec<YearCount>,
    pub modal_genre_per_year: Vec<YearModalGenre>,
    /// All genres, rolled up below the threshold
    pub genre_share: GenreShare,
    /// Same as `genre_share` with the catch-all genre dropped first
    pub genre_share_excluded: GenreShare,
}

impl Analysis {
    #[instrument(skip(frame), fields(rows = frame.height()))]
    pub fn compute(frame: &DataFrame, threshold: f64, excluded_genre: &str) -> Result<Self> {
        let all = genre_counts(frame)?;
        let analysis = Self {
            releases_per_year: releases_per_year(frame)?,
            modal_genre_per_year: modal_genre_per_year(frame)?,
            genre_share: roll_up(&all, threshold, &[]),
            genre_share_excluded: roll_up(&all, threshold, &[excluded_genre]),
        };
        info!(
            "📊 {} release years, {} genres ({} rolled up below {}%)",
            analysis.releases_per_year.len(),
            all.len(),
            analysis.genre_share.rolled_up.genres.len(),
            threshold
        );
        Ok(analysis)
    }
}

/// Row counts per distinct combination of `keys`, sorted by the keys.
pub(crate) fn count_by(frame: &DataFrame, keys: &[&str]) -> Result<DataFrame> {
    let by: Vec<Expr> = keys.iter().map(|k| col(*k)).collect();
    Ok(frame
        .clone()
        .lazy()
        .group_by(by.clone())
        .agg([len().cast(DataType::UInt64).alias(COUNT_COLUMN)])
        .sort_by_exprs(by, SortMultipleOptions::default())
        .collect()?)
}

/// The `count` column of a [`count_by`] result.
pub(crate) fn counts(grouped: &DataFrame) -> Result<Vec<usize>> {
    Ok(grouped
        .column(COUNT_COLUMN)?
        .u64()?
        .into_iter()
        .map(|c| c.unwrap_or(0) as usize)
        .collect())
}
