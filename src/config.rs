use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::color::BarColors;
use crate::data::aggregate::RatingPolicy;
use crate::data::schema::{LoadParams, SchemaDescriptor, SheetWindow};

/// Looked up in the working directory at startup.
pub const CONFIG_FILE: &str = "sales_dashboard.json";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// User-tunable settings.  Every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Transaction table to load at startup.
    pub source: PathBuf,
    /// Worksheet name (spreadsheets only); first sheet when absent.
    pub sheet: Option<String>,
    /// 0-based index of the header row (spreadsheets only).
    pub header_row: u32,
    /// Column window, A1 letters (spreadsheets only).
    pub columns: String,
    pub rating_min: f64,
    pub rating_max: f64,
    /// Bar fill, `#RRGGBB`.
    pub bar_color: String,
    pub preview_rows: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            source: PathBuf::from("supermarkt_sales.xlsx"),
            sheet: None,
            header_row: 3,
            columns: "B:R".to_string(),
            rating_min: 1.0,
            rating_max: 10.0,
            bar_color: "#0083B8".to_string(),
            preview_rows: 10,
        }
    }
}

impl DashboardConfig {
    /// Read [`CONFIG_FILE`] from the working directory, or use defaults
    /// when it does not exist.
    pub fn load() -> Result<Self> {
        let path = Path::new(CONFIG_FILE);
        if !path.exists() {
            log::debug!("No {CONFIG_FILE}, using default settings");
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        config.validate()?;
        log::info!("Loaded settings from {}", path.display());
        Ok(config)
    }

    /// Catch bad values at startup rather than on first use.
    pub fn validate(&self) -> Result<()> {
        self.load_params()?;
        self.bar_colors()?;
        anyhow::ensure!(
            self.rating_min <= self.rating_max,
            "rating_min ({}) is greater than rating_max ({})",
            self.rating_min,
            self.rating_max
        );
        Ok(())
    }

    pub fn load_params(&self) -> Result<LoadParams> {
        let window = SheetWindow::new(self.header_row, &self.columns)
            .context("invalid `columns` setting")?;
        Ok(LoadParams {
            sheet: self.sheet.clone(),
            window,
            schema: SchemaDescriptor::default(),
        })
    }

    pub fn rating_policy(&self) -> RatingPolicy {
        RatingPolicy {
            min: self.rating_min,
            max: self.rating_max,
        }
    }

    pub fn bar_colors(&self) -> Result<BarColors> {
        BarColors::from_hex(&self.bar_color).context("invalid `bar_color` setting")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{ "source": "sales.csv", "rating_max": 5 }"#).unwrap();

        let config = DashboardConfig::from_file(&path).unwrap();
        assert_eq!(config.source, PathBuf::from("sales.csv"));
        assert_eq!(config.rating_max, 5.0);
        assert_eq!(config.columns, "B:R");
        assert_eq!(config.preview_rows, 10);
        assert_eq!(config.load_params().unwrap(), LoadParams::default());
    }

    #[test]
    fn bad_settings_are_rejected() {
        let bad_window = DashboardConfig {
            columns: "R:B".into(),
            ..DashboardConfig::default()
        };
        assert!(bad_window.validate().is_err());

        let bad_color = DashboardConfig {
            bar_color: "blue-ish".into(),
            ..DashboardConfig::default()
        };
        assert!(bad_color.validate().is_err());

        let bad_range = DashboardConfig {
            rating_min: 8.0,
            rating_max: 2.0,
            ..DashboardConfig::default()
        };
        assert!(bad_range.validate().is_err());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{ not json").unwrap();
        let err = DashboardConfig::from_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parsing"));
    }
}
