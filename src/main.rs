mod app;
mod chart;
mod color;
mod data;
mod error;
mod export;
mod settings;
mod state;
mod ui;

use app::RustyChartApp;
use eframe::egui;
use settings::Settings;

fn main() -> eframe::Result {
    env_logger::init();

    let settings = Settings::load();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Chart – CSV Plotter",
        options,
        Box::new(|_cc| Ok(Box::new(RustyChartApp::new(settings)))),
    )
}
