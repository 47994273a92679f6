use crate::constants::{
    DEFAULT_CONFIG_FILE, DEFAULT_INPUT_FILE, DEFAULT_SHARE_THRESHOLD, MISC_GENRE,
};
use crate::error::{ReportError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// CSV file to analyze
    pub input: PathBuf,
    /// Directory receiving charts and the run summary
    pub output_dir: PathBuf,
    /// Genres whose share (percent) falls strictly below this are rolled up
    pub share_threshold: f64,
    /// Catch-all genre hard-dropped for the second pie chart
    pub excluded_genre: String,
    /// Draw the rolled-up bucket as its own pie slice
    pub show_rolled_up_slice: bool,
    /// Fail the run when a release year falls outside the plausible range
    pub strict_year_range: bool,
    /// Persist a JSON summary next to the charts
    pub write_summary: bool,
    pub chart: ChartConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT_FILE),
            output_dir: PathBuf::from("output"),
            share_threshold: DEFAULT_SHARE_THRESHOLD,
            excluded_genre: MISC_GENRE.to_string(),
            show_rolled_up_slice: false,
            strict_year_range: false,
            write_summary: true,
            chart: ChartConfig::default(),
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        // 10x7 inches at 100 dpi
        Self {
            width: 1000,
            height: 700,
        }
    }
}

impl ReportConfig {
    /// Load configuration from an explicit file, else from `vgsales_report.toml`
    /// in the working directory when present, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(p) => Self::from_file(p)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ReportError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        debug!("Loaded config from {}", path.display());
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: ReportConfig = toml::from_str(content)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.share_threshold.is_finite() || !(0.0..=100.0).contains(&self.share_threshold) {
            return Err(ReportError::Config(format!(
                "share_threshold must be within 0..=100, got {}",
                self.share_threshold
            )));
        }
        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(ReportError::Config("chart dimensions must be non-zero".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_dataset_conventions() {
        let config = ReportConfig::default();
        assert_eq!(config.input, PathBuf::from("ventas_vj_completo.csv"));
        assert_eq!(config.share_threshold, 1.0);
        assert_eq!(config.excluded_genre, "Misc");
        assert!(!config.show_rolled_up_slice);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ReportConfig::from_toml(
            r#"
            output_dir = "charts"
            show_rolled_up_slice = true

            [chart]
            width = 1280
            "#,
        )
        .unwrap();
        assert_eq!(config.output_dir, PathBuf::from("charts"));
        assert!(config.show_rolled_up_slice);
        assert_eq!(config.chart.width, 1280);
        assert_eq!(config.chart.height, 700);
        assert_eq!(config.share_threshold, 1.0);
    }

    #[test]
    fn test_load_from_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "share_threshold = 2.5").unwrap();
        let config = ReportConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.share_threshold, 2.5);
    }

    #[test]
    fn test_missing_explicit_file_is_config_error() {
        let err = ReportConfig::load(Some(Path::new("/nonexistent/vgsales.toml"))).unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let config = ReportConfig::from_toml("share_threshold = 150.0").unwrap();
        assert!(config.validate().is_err());
    }
}
