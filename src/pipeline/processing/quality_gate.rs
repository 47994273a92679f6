use chrono::{Datelike, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::constants::{MIN_PLAUSIBLE_YEAR, TARGET_GENRES, YEAR_CORRECTION_LOOKUP};
use crate::error::{ReportError, Result};
use crate::types::GameRecord;

/// Quality Gate decision for a cleaned dataset
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QualityDecision {
    /// Every record is within the expected shape
    Accept,
    /// Records have quality concerns but the run proceeds
    AcceptWithWarnings,
    /// A strict rule failed; the run stops
    Reject,
}

/// Findings of the post-cleaning checks.
#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub decision: QualityDecision,
    pub checked: usize,
    pub plausible_years: (i32, i32),
    /// Release years outside the plausible range, with their row counts
    pub out_of_range_years: BTreeMap<i32, usize>,
    /// Rows with no genre at all
    pub missing_genre: usize,
    /// Genre labels outside the translated vocabulary, with their row counts
    pub unexpected_genres: BTreeMap<String, usize>,
}

/// Checks cleaned records against the dataset's expected shape.
#[derive(Debug, Clone)]
pub struct QualityGate {
    pub min_year: i32,
    pub max_year: i32,
    /// Treat an implausible release year as fatal
    pub strict_year_range: bool,
}

impl Default for QualityGate {
    fn default() -> Self {
        Self::new(false)
    }
}

impl QualityGate {
    /// Gate accepting years from 1970 up to the current calendar year.
    pub fn new(strict_year_range: bool) -> Self {
        Self {
            min_year: MIN_PLAUSIBLE_YEAR,
            max_year: Utc::now().year(),
            strict_year_range,
        }
    }

    pub fn assess(&self, records: &[GameRecord]) -> Result<QualityReport> {
        let mut out_of_range_years: BTreeMap<i32, usize> = BTreeMap::new();
        let mut unexpected_genres: BTreeMap<String, usize> = BTreeMap::new();
        let mut missing_genre = 0;

        for record in records {
            let year = record.release_year;
            if year < self.min_year || year > self.max_year {
                *out_of_range_years.entry(year).or_default() += 1;
            }
            match record.genre.as_deref() {
                None => missing_genre += 1,
                Some(genre) if !TARGET_GENRES.contains(&genre) => {
                    *unexpected_genres.entry(genre.to_string()).or_default() += 1;
                }
                Some(_) => {}
            }
        }

        // The date corrector must have removed these already
        if let Some(year) = out_of_range_years
            .keys()
            .find(|y| YEAR_CORRECTION_LOOKUP.contains_key(&i64::from(**y)))
        {
            return Err(ReportError::Quality(format!(
                "corrupted release year {year} survived correction"
            )));
        }

        let clean = out_of_range_years.is_empty() && missing_genre == 0 && unexpected_genres.is_empty();
        let decision = if clean {
            QualityDecision::Accept
        } else if self.strict_year_range && !out_of_range_years.is_empty() {
            QualityDecision::Reject
        } else {
            QualityDecision::AcceptWithWarnings
        };

        for (year, count) in &out_of_range_years {
            warn!(
                "{} rows released in {} outside {}-{}",
                count, year, self.min_year, self.max_year
            );
        }
        if missing_genre > 0 {
            warn!("{} rows have no genre and are left out of genre aggregates", missing_genre);
        }
        for (genre, count) in &unexpected_genres {
            warn!("{} rows carry untranslated genre '{}'", count, genre);
        }

        let report = QualityReport {
            decision,
            checked: records.len(),
            plausible_years: (self.min_year, self.max_year),
            out_of_range_years,
            missing_genre,
            unexpected_genres,
        };

        if decision == QualityDecision::Reject {
            return Err(ReportError::Quality(format!(
                "{} release years outside {}-{}",
                report.out_of_range_years.len(),
                self.min_year,
                self.max_year
            )));
        }

        info!("🔍 Quality gate: {:?} over {} records", decision, records.len());
        Ok(report)
    }
}
