use super::{count_by, counts};
use crate::constants::{GENRE_COLUMN, ROLLED_UP_LABEL};
use crate::error::Result;
use crate::pipeline::frame::text_values;
use polars::prelude::*;
use serde::Serialize;

/// One genre's row count and share of all rows carrying a genre.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreSlice {
    pub genre: String,
    pub count: usize,
    pub percentage: f64,
}

/// Sub-threshold genres merged into a single bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RolledUp {
    pub label: String,
    pub genres: Vec<String>,
    pub count: usize,
    pub percentage: f64,
}

/// Genre distribution after exclusion and roll-up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreShare {
    /// Genres at or above the threshold, ascending by name
    pub slices: Vec<GenreSlice>,
    pub rolled_up: RolledUp,
    /// Genres hard-dropped before the roll-up
    pub excluded: Vec<String>,
    pub threshold: f64,
    /// Rows carrying a genre, before exclusion; percentages are relative to it
    pub total: usize,
}

/// Count rows per genre, ascending by genre name, with percentages of the total.
/// Rows without a genre are not counted.
pub fn genre_counts(frame: &DataFrame) -> Result<Vec<GenreSlice>> {
    let with_genre = frame
        .clone()
        .lazy()
        .filter(col(GENRE_COLUMN).is_not_null())
        .collect()?;
    let grouped = count_by(&with_genre, &[GENRE_COLUMN])?;
    let genres = text_values(&grouped, GENRE_COLUMN)?;
    let counts = counts(&grouped)?;
    let total: usize = counts.iter().sum();

    Ok(genres
        .into_iter()
        .zip(counts)
        .map(|(genre, count)| GenreSlice {
            genre: genre.unwrap_or_default(),
            count,
            percentage: count as f64 / total as f64 * 100.0,
        })
        .collect())
}

/// Drop `excluded` genres, then merge every genre strictly below `threshold`
/// percent into the rolled-up bucket.
///
/// Percentages keep the full genre set as their base, so excluding a genre
/// removes it from the view without inflating the others.
pub fn roll_up(all: &[GenreSlice], threshold: f64, excluded: &[&str]) -> GenreShare {
    let total = all.iter().map(|s| s.count).sum();
    let (kept, small): (Vec<GenreSlice>, Vec<GenreSlice>) = all
        .iter()
        .filter(|s| !excluded.contains(&s.genre.as_str()))
        .cloned()
        .partition(|s| s.percentage >= threshold);

    let rolled_up = RolledUp {
        label: ROLLED_UP_LABEL.to_string(),
        genres: small.iter().map(|s| s.genre.clone()).collect(),
        count: small.iter().map(|s| s.count).sum(),
        percentage: small.iter().map(|s| s.percentage).sum(),
    };

    GenreShare {
        slices: kept,
        rolled_up,
        excluded: excluded.iter().map(|s| s.to_string()).collect(),
        threshold,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(genres: &[(&str, usize)]) -> DataFrame {
        let column: Vec<&str> = genres
            .iter()
            .flat_map(|(genre, n)| std::iter::repeat(*genre).take(*n))
            .collect();
        df!("genero" => column).unwrap()
    }

    fn sample() -> Vec<GenreSlice> {
        genre_counts(&frame(&[
            ("Acción", 400),
            ("Misc", 300),
            ("RPG", 290),
            ("Puzzle", 5),
            ("MMO", 3),
            ("Novela Visual", 2),
        ]))
        .unwrap()
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let all = sample();
        let sum: f64 = all.iter().map(|s| s.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
        assert_eq!(all[0].genre, "Acción");
        assert_eq!(all[0].percentage, 40.0);
    }

    #[test]
    fn test_missing_genres_are_not_counted() {
        let frame = df!("genero" => [None, Some("Lucha"), Some("Lucha")]).unwrap();
        let all = genre_counts(&frame).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].percentage, 100.0);
    }

    #[test]
    fn test_roll_up_merges_small_genres() {
        let share = roll_up(&sample(), 1.0, &[]);
        let names: Vec<&str> = share.slices.iter().map(|s| s.genre.as_str()).collect();
        assert_eq!(names, vec!["Acción", "Misc", "RPG"]);
        assert_eq!(share.rolled_up.genres, vec!["MMO", "Novela Visual", "Puzzle"]);
        assert_eq!(share.rolled_up.count, 10);
        assert_eq!(share.total, 1000);
    }

    #[test]
    fn test_roll_up_conserves_counts_and_order() {
        let all = sample();
        let share = roll_up(&all, 1.0, &[]);
        let small: usize = all.iter().filter(|s| s.percentage < 1.0).map(|s| s.count).sum();
        assert_eq!(share.rolled_up.count, small);
        let kept: usize = share.slices.iter().map(|s| s.count).sum();
        assert_eq!(kept + share.rolled_up.count, share.total);
        let survivors: Vec<&GenreSlice> = all.iter().filter(|s| s.percentage >= 1.0).collect();
        assert_eq!(share.slices.iter().collect::<Vec<_>>(), survivors);
    }

    #[test]
    fn test_threshold_is_strict() {
        let all = genre_counts(&frame(&[("Acción", 99), ("Lucha", 1)])).unwrap();
        let share = roll_up(&all, 1.0, &[]);
        assert_eq!(share.slices.len(), 2);
        assert!(share.rolled_up.genres.is_empty());
    }

    #[test]
    fn test_excluded_genre_is_hard_dropped() {
        let share = roll_up(&sample(), 1.0, &["Misc"]);
        assert!(share.slices.iter().all(|s| s.genre != "Misc"));
        assert!(!share.rolled_up.genres.contains(&"Misc".to_string()));
        assert_eq!(share.excluded, vec!["Misc"]);
        // percentages keep the full set as their base
        assert_eq!(share.slices[0].percentage, 40.0);
    }
}
