use super::{count_by, counts};
use crate::constants::{GENRE_COLUMN, RELEASE_DATE_COLUMN};
use crate::error::Result;
use crate::pipeline::frame::text_values;
use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

/// Most frequent genre(s) of one release year.
///
/// `genres` holds every genre tied at the top frequency, sorted ascending.
/// It is empty when none of the year's rows carries a genre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearModalGenre {
    pub year: i32,
    pub genres: Vec<String>,
    pub count: usize,
}

fn year_keys(grouped: &DataFrame) -> Result<Vec<i32>> {
    let years = grouped.column(RELEASE_DATE_COLUMN)?.cast(&DataType::Int64)?;
    Ok(years
        .i64()?
        .into_iter()
        .map(|y| y.unwrap_or_default() as i32)
        .collect())
}

/// Releases per year, ascending by year.
pub fn releases_per_year(frame: &DataFrame) -> Result<Vec<YearCount>> {
    let grouped = count_by(frame, &[RELEASE_DATE_COLUMN])?;
    Ok(year_keys(&grouped)?
        .into_iter()
        .zip(counts(&grouped)?)
        .map(|(year, count)| YearCount { year, count })
        .collect())
}

/// Modal genre per year, ascending by year, keeping all tied winners.
pub fn modal_genre_per_year(frame: &DataFrame) -> Result<Vec<YearModalGenre>> {
    let grouped = count_by(frame, &[RELEASE_DATE_COLUMN, GENRE_COLUMN])?;
    let years = year_keys(&grouped)?;
    let genres = text_values(&grouped, GENRE_COLUMN)?;
    let counts = counts(&grouped)?;

    // Years whose rows all lack a genre still get an (empty) entry
    let mut by_year: BTreeMap<i32, Vec<(String, usize)>> = BTreeMap::new();
    for ((year, genre), count) in years.into_iter().zip(genres).zip(counts) {
        let entry = by_year.entry(year).or_default();
        if let Some(genre) = genre {
            entry.push((genre, count));
        }
    }

    Ok(by_year
        .into_iter()
        .map(|(year, genres)| {
            let count = genres.iter().map(|(_, c)| *c).max().unwrap_or(0);
            let mut winners: Vec<String> = genres
                .into_iter()
                .filter(|(_, c)| *c == count)
                .map(|(g, _)| g)
                .collect();
            winners.sort();
            YearModalGenre {
                year,
                genres: winners,
                count,
            }
        })
        .collect())
}
