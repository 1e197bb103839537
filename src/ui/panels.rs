use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::filter::{preview_rows, Dimension};
use crate::format;
use crate::state::{AppState, Interaction};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the sidebar multi-selects.  Returns the interactions triggered
/// this frame; the caller applies them after rendering.
pub fn side_panel(ui: &mut Ui, state: &AppState) -> Vec<Interaction> {
    let mut actions = Vec::new();

    ui.heading("Filter");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for dim in Dimension::ALL {
                let options = dim.options(&state.table);
                let selected = state.selection.selected(dim);

                // Show count of selected / total in the header
                let header_text = format!("{} :  ({}/{})", dim.label(), selected.len(), options.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(dim.label())
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                actions.push(Interaction::SelectAll(dim));
                            }
                            if ui.small_button("None").clicked() {
                                actions.push(Interaction::SelectNone(dim));
                            }
                        });

                        for value in options {
                            let mut checked = selected.contains(value);
                            if ui.checkbox(&mut checked, value.as_str()).changed() {
                                actions.push(Interaction::Toggle(dim, value.clone()));
                            }
                        }
                    });
            }
        });

    actions
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &AppState) -> Vec<Interaction> {
    let mut actions = Vec::new();

    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                actions.extend(open_file_dialog().map(Interaction::OpenSource));
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                actions.push(Interaction::Reload);
                ui.close_menu();
            }
            if ui.button("Reload from disk").clicked() {
                actions.push(Interaction::ForceReload);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} transactions loaded, {} shown",
            state.table.len(),
            state.view.indices.len()
        ));

        ui.separator();
        ui.weak(state.source.display().to_string());
        if state.table.is_empty() {
            ui.label(RichText::new("source has no transactions").color(Color32::YELLOW));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });

    actions
}

// ---------------------------------------------------------------------------
// Main area
// ---------------------------------------------------------------------------

/// Three KPI columns.
pub fn kpi_row(ui: &mut Ui, state: &AppState) {
    let kpis = &state.view.kpis;
    ui.columns(3, |cols: &mut [Ui]| {
        cols[0].heading("Total sales :");
        cols[0].heading(format::total_sales_label(kpis));
        if kpis.is_empty() {
            cols[0].weak("no matching transactions");
        }

        cols[1].heading("Average rating :");
        cols[1].heading(format::rating_label(kpis));
        if !kpis.has_rating() {
            cols[1].weak("no data");
        }

        cols[2].heading("Average sales per transaction :");
        cols[2].heading(format::average_sale_label(kpis));
    });
}

/// First rows of the filtered view, every column of the load window.
pub fn preview_table(ui: &mut Ui, state: &AppState) {
    let table = &state.table;
    let rows = preview_rows(table, &state.view.indices, state.preview_rows);
    if rows.is_empty() {
        ui.weak("No rows match the current filters.");
        return;
    }

    ScrollArea::horizontal()
        .id_salt("preview_scroll")
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .columns(Column::auto().at_least(60.0), table.headers.len())
                .header(20.0, |mut header| {
                    for name in &table.headers {
                        header.col(|ui: &mut Ui| {
                            ui.strong(name.as_str());
                        });
                    }
                })
                .body(|mut body| {
                    for cells in &rows {
                        body.row(18.0, |mut row| {
                            for cell in cells.iter() {
                                row.col(|ui: &mut Ui| {
                                    ui.label(cell.to_string());
                                });
                            }
                        });
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog() -> Option<std::path::PathBuf> {
    rfd::FileDialog::new()
        .set_title("Open sales data")
        .add_filter("Supported files", &["xlsx", "xlsm", "xlsb", "xls", "ods", "csv", "parquet", "pq"])
        .add_filter("Spreadsheets", &["xlsx", "xlsm", "xlsb", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file()
}
