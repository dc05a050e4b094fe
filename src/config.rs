//! Startup settings.
//!
//! Resolution order, later wins: built-in defaults, `listing_lens.json` (or
//! the file named by `LISTING_LENS_CONFIG`), the `LISTING_LENS_DATA`
//! variable, then the first command-line argument as the data path.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const CONFIG_ENV: &str = "LISTING_LENS_CONFIG";
pub const DATA_ENV: &str = "LISTING_LENS_DATA";
const DEFAULT_CONFIG_FILE: &str = "listing_lens.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Dataset opened at startup.
    pub data_path: PathBuf,
    /// Rows in the top property type / top host tables.
    pub top_n: usize,
    /// Rows in the highest priced listings table.
    pub top_priced: usize,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("Airbnb_data.csv"),
            top_n: 10,
            top_priced: 10,
            window_width: 1280.0,
            window_height: 860.0,
        }
    }
}

impl Settings {
    /// Parse a JSON settings file. Absent fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing settings {}", path.display()))
    }

    /// Resolve settings from the environment and arguments.
    /// A missing or malformed settings file falls back to defaults.
    pub fn resolve(config_env: Option<String>, data_env: Option<String>, arg: Option<String>) -> Self {
        let explicit = config_env.is_some();
        let path = config_env
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut settings = if path.exists() {
            match Settings::from_file(&path) {
                Ok(s) => s,
                Err(e) => {
                    log::warn!("Ignoring settings file: {e:#}");
                    Settings::default()
                }
            }
        } else {
            if explicit {
                log::warn!("Settings file {} not found, using defaults", path.display());
            }
            Settings::default()
        };

        if let Some(data) = data_env.filter(|s| !s.is_empty()) {
            settings.data_path = PathBuf::from(data);
        }
        if let Some(data) = arg {
            settings.data_path = PathBuf::from(data);
        }
        settings
    }

    pub fn from_env() -> Self {
        Self::resolve(
            std::env::var(CONFIG_ENV).ok(),
            std::env::var(DATA_ENV).ok(),
            std::env::args().nth(1),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "top_n": 5, "data_path": "listings.parquet" }}"#).unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.top_n, 5);
        assert_eq!(settings.data_path, PathBuf::from("listings.parquet"));
        assert_eq!(settings.top_priced, 10);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "top_n = 5").unwrap();

        let path = file.path().to_string_lossy().into_owned();
        assert!(Settings::from_file(file.path()).is_err());
        assert_eq!(Settings::resolve(Some(path), None, None), Settings::default());
    }

    #[test]
    fn argument_overrides_environment() {
        let missing = Some("/no/such/listing_lens.json".to_string());
        let from_env = Settings::resolve(missing.clone(), Some("env.csv".into()), None);
        assert_eq!(from_env.data_path, PathBuf::from("env.csv"));

        let from_arg = Settings::resolve(missing, Some("env.csv".into()), Some("arg.json".into()));
        assert_eq!(from_arg.data_path, PathBuf::from("arg.json"));
    }
}
