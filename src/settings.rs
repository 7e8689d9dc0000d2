use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::chart::prepare::MAX_BINS;
use crate::chart::ChartKind;
use crate::data::aggregate::AggregateOptions;
use crate::data::stats::DEFAULT_PERCENTILES;

/// Environment variable naming an explicit settings file.
pub const CONFIG_ENV: &str = "RUSTY_CHART_CONFIG";

/// Settings file looked up in the working directory.
pub const CONFIG_FILE: &str = "rusty-chart.json";

/// Named histogram binning rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinRule {
    /// Smaller bin width of `sturges` and `fd`.
    Auto,
    Sturges,
    /// Freedman–Diaconis.
    Fd,
}

/// `"auto"` / `"sturges"` / `"fd"`, or a fixed bin count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HistogramBins {
    Fixed(usize),
    Rule(BinRule),
}

impl Default for HistogramBins {
    fn default() -> Self {
        HistogramBins::Rule(BinRule::Auto)
    }
}

/// User-tunable defaults, read once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Groups shown by pie and grouped polar charts before "Other".
    pub top_n: usize,
    /// Drop non-positive values before building a pie.
    pub pie_positive_only: bool,
    pub histogram_bins: HistogramBins,
    /// Percentile ranks (0..=100) listed in the statistics text.
    pub percentiles: Vec<f64>,
    /// Appended to the source file stem for the default export name.
    pub export_suffix: String,
    /// Remove columns without a single value while loading.
    pub drop_empty_columns: bool,
    /// Rows shown in the data preview table.
    pub preview_rows: usize,
    /// Chart kind preselected at startup.
    pub default_chart: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            top_n: 8,
            pie_positive_only: true,
            histogram_bins: HistogramBins::default(),
            percentiles: DEFAULT_PERCENTILES.to_vec(),
            export_suffix: "_plot".to_string(),
            drop_empty_columns: true,
            preview_rows: 100,
            default_chart: None,
        }
    }
}

impl Settings {
    /// Load from `$RUSTY_CHART_CONFIG` or `./rusty-chart.json`.
    ///
    /// Never fails: problems are logged and defaults are used.
    pub fn load() -> Self {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

        match Self::from_file(&path) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Ok(None) => {
                log::debug!("No settings file at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring settings file {}: {e:#}", path.display());
                Self::default()
            }
        }
    }

    /// `Ok(None)` when the file does not exist.
    pub fn from_file(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_json(&text).map(Some)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(text).context("parsing settings JSON")?;
        settings.check()?;
        Ok(settings)
    }

    fn check(&self) -> Result<()> {
        if let Some(p) = self.percentiles.iter().find(|p| !(0.0..=100.0).contains(*p)) {
            bail!("percentile {p} is outside 0..=100");
        }
        if let HistogramBins::Fixed(n) = self.histogram_bins {
            if !(1..=MAX_BINS).contains(&n) {
                bail!("histogram_bins must be between 1 and {MAX_BINS}, got {n}");
            }
        }
        Ok(())
    }

    /// Startup chart kind; unknown names are logged and ignored.
    pub fn default_chart_kind(&self) -> Option<ChartKind> {
        let name = self.default_chart.as_deref()?;
        match name.parse() {
            Ok(kind) => Some(kind),
            Err(e) => {
                log::warn!("default_chart: {e}");
                None
            }
        }
    }

    pub fn pie_options(&self) -> AggregateOptions {
        AggregateOptions {
            top_n: self.top_n,
            positive_only: self.pie_positive_only,
        }
    }

    pub fn polar_options(&self) -> AggregateOptions {
        AggregateOptions {
            top_n: self.top_n,
            positive_only: false,
        }
    }
}
