use eframe::egui::{self, Color32, RichText, ScrollArea, Ui, UserData, ViewportCommand};

use crate::chart::ChartKind;
use crate::state::{AppState, Status};

// ---------------------------------------------------------------------------
// Left side panel – chart form
// ---------------------------------------------------------------------------

/// Render the chart form and the details pane.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Chart");
    ui.separator();

    ui.strong("Type");
    for kind in ChartKind::ALL {
        ui.radio_value(&mut state.selection.kind, Some(kind), kind.label());
    }
    ui.separator();

    // Clone what we need so we can mutate the selection below.
    let columns: Vec<(String, bool)> = match (&state.dataset, &state.info) {
        (Some(ds), Some(info)) => ds
            .column_names()
            .into_iter()
            .map(|c| {
                let numeric = info.is_numeric(&c);
                (c, numeric)
            })
            .collect(),
        _ => Vec::new(),
    };

    if columns.is_empty() {
        ui.label("No dataset loaded.");
    } else {
        column_pickers(ui, state, &columns);
    }
    ui.separator();

    let verdict = state.validation();
    let button = ui.add_enabled(
        verdict.is_ok(),
        egui::Button::new("Plot").min_size(egui::vec2(80.0, 0.0)),
    );
    match verdict {
        Ok(()) => {
            if button.clicked() {
                state.plot();
            }
        }
        Err(reason) => {
            let reason = reason.to_string();
            button.on_disabled_hover_text(reason.as_str());
            ui.label(RichText::new(reason).small().weak());
        }
    }

    ui.separator();
    ui.strong("Details");
    ScrollArea::vertical()
        .id_salt("details")
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.add(
                egui::Label::new(RichText::new(&state.details).monospace())
                    .wrap_mode(egui::TextWrapMode::Extend),
            );
        });
}

/// X combo box and Y checkboxes.
fn column_pickers(ui: &mut Ui, state: &mut AppState, columns: &[(String, bool)]) {
    let caption = state.selection.kind.map_or("X", ChartKind::x_caption);
    ui.strong(caption);

    let current = state.selection.x.clone();
    egui::ComboBox::from_id_salt("x_column")
        .selected_text(current.as_deref().unwrap_or("(none)"))
        .width(ui.available_width() - 8.0)
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut state.selection.x, None, "(none)");
            for (col, _) in columns {
                ui.selectable_value(&mut state.selection.x, Some(col.clone()), col.as_str());
            }
        });

    ui.add_space(6.0);
    ui.strong("Y");
    ScrollArea::vertical()
        .id_salt("y_columns")
        .max_height(200.0)
        .show(ui, |ui: &mut Ui| {
            for (col, numeric) in columns {
                let mut checked = state.selection.ys.contains(col);
                let text = if *numeric {
                    RichText::new(format!("{col}  #"))
                } else {
                    RichText::new(col.as_str()).weak()
                };
                let response = ui.checkbox(&mut checked, text);
                let response = if *numeric {
                    response
                } else {
                    response.on_hover_text("not numeric")
                };
                if response.changed() {
                    state.selection.toggle_y(col);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Save PNG…").clicked() {
                save_file_dialog(ui.ctx(), state);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Quit").clicked() {
                ui.ctx().send_viewport_cmd(ViewportCommand::Close);
            }
        });

        ui.separator();

        match state.dataset.as_ref() {
            Some(ds) => {
                let name = ds
                    .source()
                    .and_then(|p| p.file_name())
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                ui.label(format!("{name}  {} rows × {} columns", ds.height(), ds.width()));
            }
            None => {
                ui.label("No file");
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Bottom status line
// ---------------------------------------------------------------------------

pub fn status_line(ui: &mut Ui, state: &AppState) {
    match &state.status {
        Some(Status::Info(msg)) => {
            ui.label(msg.as_str());
        }
        Some(Status::Error(msg)) => {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
        None => {
            ui.label(RichText::new("Ready").weak());
        }
    }
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open data")
        .add_filter("Supported files", &["csv", "tsv", "txt", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv", "tsv", "txt"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

/// Ask for a destination, then request a screenshot of the viewport.
pub fn save_file_dialog(ctx: &egui::Context, state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Save chart")
        .set_file_name(state.export_name())
        .add_filter("PNG", &["png"])
        .save_file();

    if let Some(path) = file {
        if state.request_export(path) {
            ctx.send_viewport_cmd(ViewportCommand::Screenshot(UserData::default()));
        }
    }
}
