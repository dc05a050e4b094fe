use std::collections::BTreeSet;
use std::path::PathBuf;

use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};

use crate::data::model::{Facet, Measure};
use crate::data::table::TableData;
use crate::state::{AppState, Page};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel and adopt whatever selection it produces.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Listing Lens");
    ui.separator();

    ui.strong("Menu");
    ui.radio_value(&mut state.page, Page::Home, "Home");
    ui.radio_value(&mut state.page, Page::Overview, "Overview");
    ui.radio_value(&mut state.page, Page::Insights, "Insights");
    ui.separator();

    ui.heading("Filters");

    // Clone what we need so we can hand a new spec to `state` afterwards.
    let (Some(dataset), Some(spec)) = (&state.dataset, state.spec()) else {
        ui.label("No dataset loaded.");
        return;
    };
    let (lo, hi) = dataset.bounds(Measure::Price).unwrap_or((0.0, 0.0));
    let options: Vec<(Facet, BTreeSet<String>)> = Facet::ALL
        .iter()
        .map(|&f| (f, dataset.distinct_values(f).clone()))
        .collect();
    let mut next = spec.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Price range ----
            ui.strong("Price");
            let mut min = next.price().min();
            let mut max = next.price().max();
            let min_changed = ui.add(Slider::new(&mut min, lo..=hi).text("min")).changed();
            let max_changed = ui.add(Slider::new(&mut max, lo..=hi).text("max")).changed();
            if min_changed || max_changed {
                next = next.clone().with_price_range(min, max.max(min));
            }
            ui.separator();

            // ---- Facet multi-selects (collapsible) ----
            for (facet, all_values) in &options {
                let selected = next.selected(*facet);
                let header_text = format!("{}  ({}/{})", facet.label(), selected.len(), all_values.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(facet.column_name())
                    .default_open(*facet == Facet::RoomType)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                next = next.clone().with_selection(*facet, all_values.iter().cloned());
                            }
                            if ui.small_button("None").clicked() {
                                next = next.clone().with_selection(*facet, Vec::<String>::new());
                            }
                        });

                        for value in all_values {
                            let mut checked = next.selected(*facet).contains(value);
                            let mut text = RichText::new(value.as_str());
                            if *facet == Facet::RoomType {
                                text = text.color(state.palettes.room_types.color_for(value));
                            }
                            if ui.checkbox(&mut checked, text).changed() {
                                next = next.toggled(*facet, value);
                            }
                        }
                    });
            }
        });

    // Recompute only if something changed.
    state.apply_spec(next);
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
            let has_data = state.dataset.is_some();
            if ui
                .add_enabled(has_data, egui::Button::new("Export filtered rows…"))
                .clicked()
            {
                let table = state.visible_table().clone();
                save_table_dialog(state, &table, "filtered_listings.csv");
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} listings loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open listings data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}

/// Ask for a destination and write `table` there as CSV.
pub fn save_table_dialog(state: &mut AppState, table: &TableData, default_name: &str) {
    let file: Option<PathBuf> = rfd::FileDialog::new()
        .set_title("Export CSV")
        .set_file_name(default_name)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match crate::export::write_csv(table, &path) {
            Ok(()) => state.status_message = None,
            Err(e) => {
                log::error!("Export failed: {e:#}");
                state.status_message = Some(format!("Export failed: {e:#}"));
            }
        }
    }
}
