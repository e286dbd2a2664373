//! Scorer settings loaded from an optional JSON file.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use archery_game::SciezkaParams;
use serde::{Deserialize, Serialize};

use crate::reports::ReportFormat;

/// Values offered on the ścieżka setup form when flags are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SciezkaDefaults {
    pub markers: Vec<String>,
    pub arrows_number: u32,
    pub max_scoring_per_arrow: u32,
}

impl Default for SciezkaDefaults {
    fn default() -> Self {
        Self {
            markers: Vec::new(),
            arrows_number: 2,
            max_scoring_per_arrow: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    pub sciezka: SciezkaDefaults,
    pub report: ReportFormat,
    pub session_dir: PathBuf,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            sciezka: SciezkaDefaults::default(),
            report: ReportFormat::Console,
            session_dir: PathBuf::from(".archery-sessions"),
        }
    }
}

impl ScorerConfig {
    /// # Errors
    ///
    /// Returns an error if `json` is not a valid config document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read `path` if given, otherwise use built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let body = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_json(&body)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Merge command-line choices over the configured defaults.
    pub fn sciezka_params(
        &self,
        markers: &[String],
        arrows_number: Option<u32>,
        max_scoring_per_arrow: Option<u32>,
    ) -> SciezkaParams {
        let markers = if markers.is_empty() {
            self.sciezka.markers.as_slice()
        } else {
            markers
        };
        SciezkaParams::new(
            markers.iter().cloned(),
            arrows_number.unwrap_or(self.sciezka.arrows_number),
            max_scoring_per_arrow.unwrap_or(self.sciezka.max_scoring_per_arrow),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let config = ScorerConfig::from_json(
            r#"{ "sciezka": { "markers": ["czerwony"] }, "report": "markdown" }"#,
        )
        .unwrap();
        assert_eq!(config.report, ReportFormat::Markdown);
        assert_eq!(config.sciezka.markers, vec!["czerwony".to_string()]);
        assert_eq!(config.sciezka.arrows_number, 2);
        assert_eq!(config.session_dir, PathBuf::from(".archery-sessions"));
    }

    #[test]
    fn flags_override_config() {
        let mut config = ScorerConfig::default();
        config.sciezka.markers = vec!["biały".to_string()];

        let from_config = config.sciezka_params(&[], None, Some(5));
        assert_eq!(from_config.markers.as_slice(), ["biały".to_string()]);
        assert_eq!(from_config.max_scoring_per_arrow, 5);

        let flags = vec!["żółty".to_string(), "czerwony".to_string()];
        let from_flags = config.sciezka_params(&flags, Some(3), None);
        assert_eq!(from_flags.markers.len(), 2);
        assert_eq!(from_flags.arrows_number, 3);
        assert_eq!(from_flags.max_scoring_per_arrow, 10);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = ScorerConfig::load(Some(Path::new("/nonexistent/archery.json"))).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read config"));
        assert_eq!(ScorerConfig::load(None).unwrap(), ScorerConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(ScorerConfig::from_json(r#"{ "report": "pdf" }"#).is_err());

        let path = std::env::temp_dir().join(format!("archery-config-{}.json", std::process::id()));
        fs::write(&path, "{ not json").unwrap();
        let err = ScorerConfig::load(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse config"));
        let _ = fs::remove_file(path);
    }
}
