use eframe::egui;

use crate::state::{AppState, Interaction};
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SalesDashboardApp {
    pub state: AppState,
}

impl SalesDashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for SalesDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Widgets only record interactions; they are applied after the frame
        // is drawn, one recompute each, in the order they happened.
        let mut pending: Vec<Interaction> = Vec::new();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            pending.extend(panels::top_bar(ui, &self.state));
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                pending.extend(panels::side_panel(ui, &self.state));
            });

        // ---- Central panel: KPIs, preview, charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.heading(egui::RichText::new("📊 Sales Dashboard").size(28.0));
                    ui.add_space(12.0);

                    panels::kpi_row(ui, &self.state);
                    ui.separator();

                    panels::preview_table(ui, &self.state);
                    ui.separator();

                    ui.columns(2, |cols| {
                        plot::hour_chart(&mut cols[0], &self.state);
                        plot::product_line_chart(&mut cols[1], &self.state);
                    });
                });
        });

        if !pending.is_empty() {
            for interaction in pending {
                self.state.apply(interaction);
            }
            ctx.request_repaint();
        }
    }
}
