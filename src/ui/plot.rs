use eframe::egui::{RichText, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

use crate::data::model::decimal_year;
use crate::state::AppState;

const PLOT_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Trend plot
// ---------------------------------------------------------------------------

/// Region value over time, optionally against its state's average.
pub fn trend_plot(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view home values  (File → Open…)");
        });
        return;
    }

    let series = state.selected_series();
    let region = state.selected_region.as_deref().unwrap_or_default();

    // Imputed months are left out so gaps don't plunge to zero.
    let region_points: PlotPoints = series
        .iter()
        .filter(|o| !o.imputed)
        .map(|o| [decimal_year(o.date), o.value as f64])
        .collect();

    let state_line = if state.show_state_average {
        state.selected_state().map(|name| {
            // Means dragged down by coalesced zeros are left out too.
            let points: PlotPoints = state
                .selected_state_series()
                .iter()
                .filter(|a| a.is_complete())
                .map(|a| [decimal_year(a.date), a.mean_value])
                .collect();
            Line::new(points)
                .name(format!("{name} average"))
                .color(state.colors.state_average)
                .width(1.5)
        })
    } else {
        None
    };

    Plot::new("trend_plot")
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Home value ($)")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(region_points)
                    .name(region)
                    .color(state.colors.region)
                    .width(2.0),
            );
            if let Some(line) = state_line {
                plot_ui.line(line);
            }
        });
}

// ---------------------------------------------------------------------------
// Growth plot
// ---------------------------------------------------------------------------

/// Year-over-year percent change for the region (and state average).
pub fn growth_plot(ui: &mut Ui, state: &AppState) {
    if !state.show_growth || state.dataset.is_none() {
        return;
    }

    let region_points: PlotPoints = state
        .selected_series()
        .iter()
        .filter_map(|o| Some([decimal_year(o.date), o.growth_rate?]))
        .collect();

    let state_points: Option<PlotPoints> = state.show_state_average.then(|| {
        state
            .selected_state_series()
            .iter()
            .filter_map(|a| Some([decimal_year(a.date), a.growth_rate?]))
            .collect()
    });

    ui.strong("Year-over-year growth");
    Plot::new("growth_plot")
        .height(PLOT_HEIGHT * 0.7)
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Growth (%)")
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(region_points)
                    .name("Region")
                    .color(state.colors.growth)
                    .width(1.5),
            );
            if let Some(points) = state_points {
                plot_ui.line(
                    Line::new(points)
                        .name("State average")
                        .color(state.colors.state_average)
                        .width(1.0),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Map
// ---------------------------------------------------------------------------

/// Marker for the selected region on a lon/lat grid.
pub fn map_plot(ui: &mut Ui, state: &AppState) {
    if !state.show_map || state.dataset.is_none() {
        return;
    }

    ui.strong("Location");
    if state.is_locating() {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Looking up location…");
        });
        return;
    }
    let Some(coords) = state.location else {
        ui.label(RichText::new("Coordinates unknown for this region.").italics());
        return;
    };

    let region = state.selected_region.as_deref().unwrap_or_default();
    let marker = Points::new(PlotPoints::from(vec![[coords.longitude, coords.latitude]]))
        .radius(6.0)
        .color(state.colors.marker)
        .name(region);

    Plot::new("map_plot")
        .height(PLOT_HEIGHT)
        .data_aspect(1.0)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        // Contiguous United States
        .include_x(-125.0)
        .include_x(-66.0)
        .include_y(24.0)
        .include_y(50.0)
        .show(ui, |plot_ui| {
            plot_ui.points(marker);
        });
}
