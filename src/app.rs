use eframe::egui;

use crate::settings::Settings;
use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RustyChartApp {
    pub state: AppState,
}

impl RustyChartApp {
    pub fn new(settings: Settings) -> Self {
        Self {
            state: AppState::new(settings),
        }
    }
}

impl Default for RustyChartApp {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl eframe::App for RustyChartApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // A requested export arrives as a screenshot event one frame later.
        let screenshot = ctx.input(|i| {
            i.events.iter().rev().find_map(|e| match e {
                egui::Event::Screenshot { image, .. } => Some(image.clone()),
                _ => None,
            })
        });
        if let Some(image) = screenshot {
            self.state.finish_export(&image, ctx.pixels_per_point());
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Bottom panel: status line and data preview ----
        egui::TopBottomPanel::bottom("status_bar")
            .resizable(true)
            .show(ctx, |ui| {
                panels::status_line(ui, &self.state);
                if let Some(dataset) = &self.state.dataset {
                    egui::CollapsingHeader::new("Data preview")
                        .default_open(false)
                        .show(ui, |ui| {
                            table::preview_table(ui, dataset, self.state.settings.preview_rows);
                        });
                }
            });

        // ---- Left side panel: chart form and details ----
        egui::SidePanel::left("chart_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::chart_plot(ui, &mut self.state);
        });
    }
}
