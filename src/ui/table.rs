use eframe::egui::{Align, Layout, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::MonthLabel;
use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

/// Raw long-form rows for the selected region, newest first.
pub fn raw_data_table(ui: &mut Ui, state: &AppState) {
    let mut series = state.selected_series();
    if series.is_empty() {
        ui.label("No rows to show.");
        return;
    }
    series.reverse();

    ui.strong("Raw Data");
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(Layout::left_to_right(Align::Center))
        .column(Column::auto().at_least(70.0))
        .column(Column::auto().at_least(160.0))
        .column(Column::auto().at_least(90.0))
        .column(Column::auto().at_least(90.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in ["Date", "Region", "State", "Home Value", "YoY growth"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, series.len(), |mut row| {
                let obs = series[row.index()];
                row.col(|ui| {
                    ui.label(MonthLabel(obs.date).to_string());
                });
                row.col(|ui| {
                    ui.label(&obs.region_name);
                });
                row.col(|ui| {
                    ui.label(&obs.state_name);
                });
                row.col(|ui| {
                    if obs.imputed {
                        ui.weak("missing");
                    } else {
                        ui.label(obs.formatted_value());
                    }
                });
                row.col(|ui| {
                    match obs.growth_rate {
                        Some(g) => ui.label(format!("{g:+.2}%")),
                        None => ui.weak("–"),
                    };
                });
            });
        });
}
