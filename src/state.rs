use std::path::{Path, PathBuf};

use anyhow::anyhow;
use eframe::egui::{ColorImage, Rect};

use crate::chart::prepare::{prepare, ChartData};
use crate::chart::summary::{dataset_overview, plot_summary, status_line};
use crate::chart::validate::{validate, Rejection, Selection};
use crate::data::classify::{classify, ColumnInfo};
use crate::data::loader::{load_file, LoadOptions};
use crate::data::model::Dataset;
use crate::error::AppError;
use crate::export::{crop, default_export_name, with_png_extension, write_png};
use crate::settings::Settings;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Outcome of the last user action, shown in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub settings: Settings,

    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<Dataset>,

    /// Classification of the loaded dataset.
    pub info: Option<ColumnInfo>,

    /// Chart form contents.
    pub selection: Selection,

    /// Last successfully prepared chart.
    pub chart: Option<ChartData>,

    /// Overview or plot statistics text.
    pub details: String,

    pub status: Option<Status>,

    /// Destination of a requested PNG export, waiting for the screenshot.
    pub pending_export: Option<PathBuf>,

    /// Screen area of the chart in points, updated every frame.
    pub plot_rect: Option<Rect>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let selection = Selection {
            kind: settings.default_chart_kind(),
            ..Selection::default()
        };
        Self {
            settings,
            dataset: None,
            info: None,
            selection,
            chart: None,
            details: String::new(),
            status: None,
            pending_export: None,
            plot_rect: None,
        }
    }

    /// Load a file; on failure the previous dataset stays in place.
    pub fn load_path(&mut self, path: &Path) {
        let options = LoadOptions {
            drop_empty_columns: self.settings.drop_empty_columns,
        };
        match load_file(path, options) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} ({} rows x {} columns)",
                    path.display(),
                    dataset.height(),
                    dataset.width()
                );
                self.set_dataset(dataset);
            }
            Err(e) => self.report(AppError::Load(e)),
        }
    }

    /// Ingest a newly loaded dataset and reset the chart.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        let info = classify(&dataset);
        self.selection.retain_columns(&info);
        self.details = dataset_overview(&dataset, &info);
        self.status = Some(Status::Info(format!(
            "Loaded {} rows, {} columns",
            dataset.height(),
            dataset.width()
        )));
        self.chart = None;
        self.info = Some(info);
        self.dataset = Some(dataset);
    }

    /// Why the current selection cannot be plotted, if anything.
    pub fn validation(&self) -> Result<(), Rejection> {
        validate(self.info.as_ref(), &self.selection)
    }

    /// Prepare the selected chart; a failure keeps the previous chart.
    pub fn plot(&mut self) {
        let Some(dataset) = &self.dataset else {
            self.report(Rejection::NoData.into());
            return;
        };
        match prepare(dataset, &self.selection, &self.settings) {
            Ok(chart) => {
                let line = status_line(&chart);
                log::info!("Plotted {line}");
                self.details = plot_summary(&chart, &self.settings.percentiles);
                self.status = Some(Status::Info(line));
                self.chart = Some(chart);
            }
            Err(e) => self.report(e),
        }
    }

    /// File name offered by the save dialog.
    pub fn export_name(&self) -> String {
        default_export_name(
            self.dataset.as_ref().and_then(Dataset::source),
            &self.settings.export_suffix,
        )
    }

    /// Remember where to save; the image is written once the screenshot
    /// arrives. Returns `false` when there is nothing to save.
    pub fn request_export(&mut self, path: PathBuf) -> bool {
        if self.chart.is_none() {
            self.report(AppError::Export(anyhow!("no chart has been drawn yet")));
            return false;
        }
        self.pending_export = Some(with_png_extension(path));
        true
    }

    /// Write the pending export from a viewport screenshot.
    pub fn finish_export(&mut self, screenshot: &ColorImage, pixels_per_point: f32) {
        let Some(path) = self.pending_export.take() else {
            return;
        };
        let image = crop(screenshot, self.plot_rect, pixels_per_point);
        match write_png(&image, &path) {
            Ok(()) => {
                log::info!("Saved chart to {}", path.display());
                self.status = Some(Status::Info(format!("Saved {}", path.display())));
            }
            Err(e) => self.report(AppError::Export(e)),
        }
    }

    /// Record a failed action in the status bar and the log.
    pub fn report(&mut self, err: AppError) {
        log::error!("{}", err.user_message());
        self.status = Some(Status::Error(err.user_message()));
    }
}
