use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::Dataset;

const ROW_HEIGHT: f32 = 18.0;

/// First `max_rows` rows of the dataset, one column per dataset column.
pub fn preview_table(ui: &mut Ui, dataset: &Dataset, max_rows: usize) {
    let shown = dataset.height().min(max_rows);
    ui.label(
        RichText::new(format!("Showing {shown} of {} rows", dataset.height()))
            .small()
            .weak(),
    );

    egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::initial(40.0).resizable(false))
            .columns(
                Column::initial(100.0).resizable(true).clip(true),
                dataset.width(),
            )
            .max_scroll_height(180.0)
            .header(22.0, |mut header| {
                header.col(|ui| {
                    ui.strong("#");
                });
                for column in dataset.columns() {
                    header.col(|ui| {
                        ui.strong(column.name.as_str())
                            .on_hover_text(column.dtype.to_string());
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, shown, |mut row| {
                    let idx = row.index();
                    row.col(|ui| {
                        ui.label(RichText::new((idx + 1).to_string()).weak());
                    });
                    for column in dataset.columns() {
                        row.col(|ui| {
                            match column.cells.get(idx) {
                                Some(cell) if !cell.is_null() => ui.label(cell.to_string()),
                                _ => ui.label(RichText::new("NA").weak()),
                            };
                        });
                    }
                });
            });
    });
}
