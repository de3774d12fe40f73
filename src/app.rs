use std::time::Duration;

use eframe::egui::{self, ScrollArea};

use crate::config::DashboardConfig;
use crate::state::AppState;
use crate::ui::{panels, plot, table};

/// How often to check on an outstanding geocoder lookup.
const LOOKUP_POLL: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    /// Build the app and load the configured data file.
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = AppState::new(config);
        let path = state.data_path.clone();
        state.load(&path);
        Self { state }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.state.poll_location() {
            ctx.request_repaint_after(LOOKUP_POLL);
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: region selector ----
        egui::SidePanel::left("region_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: raw data ----
        if self.state.dataset.is_some() {
            egui::TopBottomPanel::bottom("raw_data")
                .resizable(true)
                .default_height(220.0)
                .show(ctx, |ui| {
                    table::raw_data_table(ui, &self.state);
                });
        }

        // ---- Central panel: metrics, charts, map ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    panels::metrics_strip(ui, &self.state);
                    plot::trend_plot(ui, &self.state);
                    plot::growth_plot(ui, &self.state);
                    plot::map_plot(ui, &self.state);
                });
        });
    }
}
