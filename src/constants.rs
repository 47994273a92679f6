//! Fixed facts about the `ventas_vj_completo.csv` dataset: column names, the
//! genre translation table and the known corrupted release years.

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const DEFAULT_INPUT_FILE: &str = "ventas_vj_completo.csv";
pub const DEFAULT_CONFIG_FILE: &str = "vgsales_report.toml";

// Source schema. The first two columns are identifiers and are dropped by position.
pub const LEADING_ID_COLUMNS: usize = 2;
pub const PLATFORM_COLUMN: &str = "plataforma";
pub const RELEASE_DATE_COLUMN: &str = "fecha_salida";
pub const GENRE_COLUMN: &str = "genero";
pub const SALES_NA_COLUMN: &str = "ventas_na";
pub const SALES_EU_COLUMN: &str = "ventas_eu";
pub const SALES_JP_COLUMN: &str = "ventas_jp";
pub const SALES_OTHER_COLUMN: &str = "ventas_otras";
pub const SALES_REPORTED_TOTAL_COLUMN: &str = "ventas_tot";
pub const SALES_SUM_COLUMN: &str = "ventas_suma";

/// Sales columns whose missing values are filled with zero.
pub const SALES_COLUMNS: [&str; 5] = [
    SALES_NA_COLUMN,
    SALES_EU_COLUMN,
    SALES_JP_COLUMN,
    SALES_OTHER_COLUMN,
    SALES_REPORTED_TOTAL_COLUMN,
];

/// Regional sales columns summed into `ventas_suma`.
pub const REGIONAL_SALES_COLUMNS: [&str; 4] = [
    SALES_NA_COLUMN,
    SALES_EU_COLUMN,
    SALES_JP_COLUMN,
    SALES_OTHER_COLUMN,
];

/// Platform values that aggregate several games rather than describe one release.
pub const AGGREGATE_PLATFORMS: [&str; 2] = ["Series", "All"];

/// Cell contents treated as a missing value when loading.
pub const MISSING_MARKERS: [&str; 10] = [
    "", "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None", "#N/A",
];

pub const GENRE_TRANSLATIONS: [(&str, &str); 16] = [
    ("Action", "Acción"),
    ("Action-Adventure", "Acción-Aventura"),
    ("Adventure", "Aventura"),
    ("Board Game", "Juego de mesa"),
    ("Education", "Educación"),
    ("Fighting", "Lucha"),
    ("Music", "Música"),
    ("Party", "Fiesta"),
    ("Platform", "Plataformas"),
    ("Racing", "Carreras"),
    ("Role-Playing", "RPG"),
    ("Sandbox", "Mundo abierto"),
    ("Simulation", "Simulación"),
    ("Sports", "Deportes"),
    ("Strategy", "Estrategia"),
    ("Visual Novel", "Novela Visual"),
];

/// Genre labels expected after translation, in sorted order.
pub const TARGET_GENRES: [&str; 20] = [
    "Acción",
    "Acción-Aventura",
    "Aventura",
    "Carreras",
    "Deportes",
    "Educación",
    "Estrategia",
    "Fiesta",
    "Juego de mesa",
    "Lucha",
    "MMO",
    "Misc",
    "Mundo abierto",
    "Música",
    "Novela Visual",
    "Plataformas",
    "Puzzle",
    "RPG",
    "Shooter",
    "Simulación",
];

/// Off-by-a-century release years present in the scraped source.
pub const YEAR_CORRECTIONS: [(i64, i64); 6] = [
    (2070, 1970),
    (2073, 1973),
    (2075, 1975),
    (2077, 1977),
    (2078, 1978),
    (2079, 1979),
];

pub const MIN_PLAUSIBLE_YEAR: i32 = 1970;

pub const MISC_GENRE: &str = "Misc";
pub const ROLLED_UP_LABEL: &str = "resto de géneros";
pub const DEFAULT_SHARE_THRESHOLD: f64 = 1.0;

pub static GENRE_LOOKUP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| GENRE_TRANSLATIONS.iter().copied().collect());

pub static YEAR_CORRECTION_LOOKUP: Lazy<HashMap<i64, i64>> =
    Lazy::new(|| YEAR_CORRECTIONS.iter().copied().collect());

/// Translate a source genre label; unknown labels pass through unchanged.
pub fn translate_genre(genre: &str) -> &str {
    GENRE_LOOKUP.get(genre).copied().unwrap_or(genre)
}

/// Map a corrupted release year to its intended value.
pub fn correct_year(year: i64) -> i64 {
    YEAR_CORRECTION_LOOKUP.get(&year).copied().unwrap_or(year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_lookup_tables_have_unique_keys() {
        assert_eq!(GENRE_LOOKUP.len(), GENRE_TRANSLATIONS.len());
        assert_eq!(YEAR_CORRECTION_LOOKUP.len(), YEAR_CORRECTIONS.len());
    }

    #[test]
    fn test_translations_land_in_target_vocabulary() {
        let targets: HashSet<&str> = TARGET_GENRES.iter().copied().collect();
        for (_, translated) in GENRE_TRANSLATIONS {
            assert!(targets.contains(translated), "{translated} not a target label");
        }
        for passthrough in ["MMO", "Misc", "Puzzle", "Shooter"] {
            assert_eq!(translate_genre(passthrough), passthrough);
            assert!(targets.contains(passthrough));
        }
    }

    #[test]
    fn test_translation_is_idempotent() {
        for (source, _) in GENRE_TRANSLATIONS {
            let once = translate_genre(source);
            assert_eq!(translate_genre(once), once);
        }
        for label in TARGET_GENRES {
            assert_eq!(translate_genre(label), label);
        }
    }

    #[test]
    fn test_translation_is_exact_match_only() {
        assert_eq!(translate_genre("action"), "action");
        assert_eq!(translate_genre("Action "), "Action ");
        assert_eq!(translate_genre("Role-Playing"), "RPG");
    }

    #[test]
    fn test_year_corrections() {
        assert_eq!(correct_year(2070), 1970);
        assert_eq!(correct_year(2079), 1979);
        assert_eq!(correct_year(2071), 2071);
        assert_eq!(correct_year(1998), 1998);
    }
}
