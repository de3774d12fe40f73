use eframe::egui::{self, Color32, RichText, ScrollArea, TextStyle, Ui};

use crate::data::model::{format_currency, MonthLabel};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – region selector and view toggles
// ---------------------------------------------------------------------------

/// Render the left selector panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Region");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    let search = egui::TextEdit::singleline(&mut state.region_query)
        .hint_text("Search regions…");
    ui.add(search);
    ui.add_space(4.0);

    ui.strong("Show");
    ui.checkbox(&mut state.show_state_average, "State average");
    if state.config.options.include_growth_rate {
        ui.checkbox(&mut state.show_growth, "Growth rate");
    }
    if state.geocoding_available()
        && ui.checkbox(&mut state.show_map, "Map").changed()
        && state.show_map
    {
        state.locate_selected();
    }
    ui.separator();

    // Clone what we need so we can mutate state inside the loop.
    let regions: Vec<String> = state
        .visible_regions()
        .into_iter()
        .map(str::to_string)
        .collect();
    let current = state.selected_region.clone();
    let row_height = ui.text_style_height(&TextStyle::Body);
    let mut clicked: Option<String> = None;

    ui.label(RichText::new(format!("{} regions", regions.len())).weak());
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show_rows(ui, row_height, regions.len(), |ui: &mut Ui, range| {
            for region in &regions[range] {
                let selected = current.as_deref() == Some(region.as_str());
                if ui.selectable_label(selected, region).clicked() {
                    clicked = Some(region.clone());
                }
            }
        });

    if let Some(region) = clicked {
        state.select_region(&region);
    }
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
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} regions, {} observations since {}",
                ds.regions.len(),
                ds.len(),
                MonthLabel(ds.source.window_start)
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Metric strip
// ---------------------------------------------------------------------------

/// Headline numbers for the selected region.
pub fn metrics_strip(ui: &mut Ui, state: &AppState) {
    let Some(region) = state.selected_region.as_deref() else {
        return;
    };
    let summary = state.summary();

    ui.heading(format!("Home Value Trends for {region}"));
    ui.horizontal(|ui: &mut Ui| {
        metric(
            ui,
            "Latest",
            summary.latest_value.map(format_currency),
            summary.latest_date.map(|d| MonthLabel(d).to_string()),
        );
        metric(ui, "Low", summary.min_value.map(format_currency), None);
        metric(ui, "High", summary.max_value.map(format_currency), None);
        if state.config.options.include_growth_rate {
            metric(
                ui,
                "YoY growth",
                summary.latest_growth.map(|g| format!("{g:+.1}%")),
                None,
            );
        }
        if summary.imputed > 0 {
            metric(
                ui,
                "Missing months",
                Some(summary.imputed.to_string()),
                Some(format!("of {}", summary.observations)),
            );
        }
    });
}

fn metric(ui: &mut Ui, label: &str, value: Option<String>, caption: Option<String>) {
    ui.group(|ui: &mut Ui| {
        ui.vertical(|ui: &mut Ui| {
            ui.label(RichText::new(label).weak());
            ui.label(RichText::new(value.unwrap_or_else(|| "–".into())).heading());
            if let Some(caption) = caption {
                ui.label(RichText::new(caption).small());
            }
        });
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open home value CSV")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.load(&path);
    }
}
