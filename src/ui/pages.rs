use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::color;
use crate::data::insights::{AggregateKind, Insights};
use crate::data::model::columns;
use crate::data::table::TableData;
use crate::state::{AppState, InsightTab, Page};
use crate::ui::charts::{self, ScatterPoint};
use crate::ui::panels::save_table_dialog;

const SIDE_TABLE_HEIGHT: f32 = 280.0;

/// Render the page selected in the side panel.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    match state.page {
        Page::Home => home(ui),
        Page::Overview => overview(ui, state),
        Page::Insights => insights(ui, state),
    }
}

// ---------------------------------------------------------------------------
// Home
// ---------------------------------------------------------------------------

fn home(ui: &mut Ui) {
    ScrollArea::vertical().show(ui, |ui: &mut Ui| {
        ui.columns(2, |cols| {
            let ui = &mut cols[0];
            ui.heading("Exploring Rental Listings");
            ui.label(
                "Filter short-term rental listings by price, country, property type and \
                 room type, then explore the raw rows or the aggregate insights.",
            );
            ui.add_space(6.0);
            for line in [
                "Top 10 property types and hosts by number of listings.",
                "Listings across room types and countries.",
                "Average prices by country and by room type.",
                "The highest priced listings and their review scores.",
                "Average availability by country, and its spread across room and property types.",
            ] {
                ui.label(format!("• {line}"));
            }

            let ui = &mut cols[1];
            ui.heading("Getting started");
            ui.label("Use File → Open… to load a CSV, JSON or Parquet file of listings.");
            ui.label(
                "The filters on the left start with everything selected. Clearing every \
                 value of a facet hides all listings.",
            );
        });
    });
}

// ---------------------------------------------------------------------------
// Overview – raw filtered rows
// ---------------------------------------------------------------------------

fn overview(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Raw Data");
    if state.dataset.is_none() {
        ui.label("Open a file to view listings  (File → Open…)");
        return;
    }
    let height = ui.available_height() - 40.0;
    if charts::data_table(ui, "overview", state.visible_table(), height) {
        let table = state.visible_table().clone();
        save_table_dialog(state, &table, "filtered_listings.csv");
    }
}

// ---------------------------------------------------------------------------
// Insights – three tabs of charts
// ---------------------------------------------------------------------------

fn insights(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Explore more about the listings");
    if state.dataset.is_none() {
        ui.label("Open a file to view insights  (File → Open…)");
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        ui.selectable_value(&mut state.tab, InsightTab::Top, "Top Insights");
        ui.selectable_value(&mut state.tab, InsightTab::Price, "Price Analysis");
        ui.selectable_value(&mut state.tab, InsightTab::Availability, "Availability Analysis");
    });
    ui.separator();

    // Widgets only record requests; acting on them needs `&mut state`.
    let mut export: Option<AggregateKind> = None;
    let mut breakdown: Option<Option<String>> = None;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if state.insights.row_count == 0 {
                charts::empty_hint(ui);
                return;
            }
            match state.tab {
                InsightTab::Top => {
                    top_tab(ui, state, &mut export);
                    breakdown_section(ui, state, &mut breakdown);
                }
                InsightTab::Price => price_tab(ui, state, &mut export),
                InsightTab::Availability => availability_tab(ui, state, &mut export),
            }
        });

    if let Some(column) = breakdown {
        state.set_breakdown_column(column);
    }
    if let Some(kind) = export {
        let table = state.insights.table(kind);
        let file_name = format!("{}.csv", kind.title().to_lowercase().replace(' ', "_"));
        save_table_dialog(state, &table, &file_name);
    }
}

fn as_f64(pairs: &[(String, usize)]) -> Vec<(String, f64)> {
    pairs.iter().map(|(k, v)| (k.clone(), *v as f64)).collect()
}

fn value_range(pairs: &[(String, f64)]) -> (f64, f64) {
    pairs
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, v)| (lo.min(*v), hi.max(*v)))
}

/// Chart on the left, its table on the right.
fn chart_with_table(
    ui: &mut Ui,
    insights: &Insights,
    kind: AggregateKind,
    export: &mut Option<AggregateKind>,
    chart: impl FnOnce(&mut Ui),
) {
    ui.columns(2, |cols| {
        chart(&mut cols[0]);
        let table: TableData = insights.table(kind);
        if charts::data_table(&mut cols[1], kind.title(), &table, SIDE_TABLE_HEIGHT) {
            *export = Some(kind);
        }
    });
}

fn top_tab(ui: &mut Ui, state: &AppState, export: &mut Option<AggregateKind>) {
    let ins = &state.insights;
    let pal = &state.palettes;

    let n = state.settings.top_n;
    charts::heading(ui, &format!("Top {n} Property Types"), Some("based on no. of listings"));
    chart_with_table(ui, ins, AggregateKind::TopPropertyTypes, export, |ui| {
        charts::bar_chart(ui, "top_property_types", &as_f64(&ins.top_property_types), true, "Listings", |k, _| {
            pal.property_types.color_for(k)
        });
    });

    charts::heading(ui, &format!("Top {n} Hosts"), Some("based on no. of listings"));
    let hosts = as_f64(&ins.top_hosts);
    let (lo, hi) = value_range(&hosts);
    chart_with_table(ui, ins, AggregateKind::TopHosts, export, |ui| {
        charts::bar_chart(ui, "top_hosts", &hosts, false, "Listings", |_, v| color::scaled(v, lo, hi));
    });

    charts::heading(ui, "Total number of Listings based on Room Types", None);
    chart_with_table(ui, ins, AggregateKind::RoomTypeShare, export, |ui| {
        charts::pie_chart(ui, &as_f64(&ins.room_type_share), |k| pal.room_types.color_for(k));
    });

    charts::heading(ui, "Total number of Listings Country wise", None);
    let by_country = as_f64(&ins.listings_by_country);
    chart_with_table(ui, ins, AggregateKind::ListingsByCountry, export, |ui| {
        charts::line_chart(ui, "listings_by_country", &by_country, "Number of Listings");
    });

    // Country bars stand in for the geographic view.
    let (lo, hi) = value_range(&by_country);
    charts::bar_chart(ui, "listings_by_country_bars", &by_country, true, "Total Listings", |_, v| {
        color::scaled(v, lo, hi)
    });

    charts::heading(ui, "Analysis of review scores based on Room types", None);
    ui.columns(2, |cols| {
        cols[0].strong(AggregateKind::ReviewMeanByRoomType.title());
        let (lo, hi) = value_range(&ins.review_mean_by_room_type);
        charts::bar_chart(&mut cols[0], "review_mean", &ins.review_mean_by_room_type, false, "Review score", |_, v| {
            color::scaled(v, lo, hi)
        });
        cols[1].strong(AggregateKind::ReviewSumByRoomType.title());
        let (lo, hi) = value_range(&ins.review_sum_by_room_type);
        charts::bar_chart(&mut cols[1], "review_sum", &ins.review_sum_by_room_type, false, "Review score", |_, v| {
            color::scaled(v, lo, hi)
        });
    });
}

/// Top groups of any column the user picks, including extra source columns.
fn breakdown_section(ui: &mut Ui, state: &AppState, request: &mut Option<Option<String>>) {
    let Some(dataset) = &state.dataset else {
        return;
    };
    charts::heading(ui, "Breakdown by column", Some("top groups by no. of listings"));

    let current = state.breakdown_column();
    let candidates = [columns::HOST_NAME, columns::NAME]
        .into_iter()
        .map(str::to_string)
        .chain(dataset.extra_columns().iter().cloned());
    egui::ComboBox::from_id_salt("breakdown_column")
        .selected_text(current.unwrap_or("(none)"))
        .show_ui(ui, |ui: &mut Ui| {
            if ui.selectable_label(current.is_none(), "(none)").clicked() {
                *request = Some(None);
            }
            for col in candidates {
                if ui.selectable_label(current == Some(col.as_str()), &col).clicked() {
                    *request = Some(Some(col));
                }
            }
        });

    if current.is_some() && !state.breakdown.is_empty() {
        let data = as_f64(&state.breakdown);
        let (lo, hi) = value_range(&data);
        charts::bar_chart(ui, "breakdown", &data, true, "Listings", |_, v| color::scaled(v, lo, hi));
    }
}

fn price_tab(ui: &mut Ui, state: &AppState, export: &mut Option<AggregateKind>) {
    let ins = &state.insights;
    let pal = &state.palettes;

    charts::heading(ui, "Average Price Country wise", None);
    let (lo, hi) = value_range(&ins.price_by_country);
    ui.columns(2, |cols| {
        charts::bar_chart(&mut cols[0], "price_by_country", &ins.price_by_country, true, "Average Price", |_, v| {
            color::scaled(v, lo, hi)
        });
        charts::pie_chart(&mut cols[1], &ins.price_by_country, |k| pal.countries.color_for(k));
    });
    if charts::data_table(ui, "price_by_country_table", &ins.table(AggregateKind::PriceByCountry), SIDE_TABLE_HEIGHT) {
        *export = Some(AggregateKind::PriceByCountry);
    }

    charts::heading(ui, "Average Price based on Room Type", None);
    let (lo, hi) = value_range(&ins.price_by_room_type);
    chart_with_table(ui, ins, AggregateKind::PriceByRoomType, export, |ui| {
        charts::bar_chart(ui, "price_by_room_type", &ins.price_by_room_type, false, "Price", |_, v| {
            color::scaled(v, lo, hi)
        });
    });

    charts::heading(ui, "Highest Priced Listings and Their Review Scores", None);
    let (lo, hi) = ins
        .top_priced
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), l| (lo.min(l.price), hi.max(l.price)));
    let points: Vec<ScatterPoint> = ins
        .top_priced
        .iter()
        .filter_map(|l| {
            let score = l.review_score?;
            Some(ScatterPoint {
                x: score,
                y: l.price,
                radius: (score / 10.0).clamp(2.0, 12.0) as f32,
                color: color::scaled(l.price, lo, hi),
                name: format!("{} · {} · {}", l.name, l.property_type, l.host_name),
            })
        })
        .collect();
    charts::scatter_chart(ui, "top_priced", &points, "Review Scores", "Price");
    if points.len() < ins.top_priced.len() {
        ui.label(RichText::new("Listings without a review score are not plotted.").weak());
    }
    if charts::data_table(ui, "top_priced_table", &ins.table(AggregateKind::TopPricedListings), SIDE_TABLE_HEIGHT) {
        *export = Some(AggregateKind::TopPricedListings);
    }
}

/// Group raw `(key, availability)` rows into per-key value lists, keyed in
/// ascending order.
fn distribution(rows: &[(String, u16)]) -> Vec<(String, Vec<f64>)> {
    let mut groups: std::collections::BTreeMap<&str, Vec<f64>> = std::collections::BTreeMap::new();
    for (key, days) in rows {
        groups.entry(key.as_str()).or_default().push(f64::from(*days));
    }
    groups.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn availability_tab(ui: &mut Ui, state: &AppState, export: &mut Option<AggregateKind>) {
    let ins = &state.insights;
    let pal = &state.palettes;

    charts::heading(ui, "Availability by Country", Some("mean days available over the next year"));
    let by_country: Vec<(String, f64)> = ins
        .availability_by_country
        .iter()
        .map(|(k, v)| (k.clone(), *v as f64))
        .collect();
    let (lo, hi) = value_range(&by_country);
    chart_with_table(ui, ins, AggregateKind::AvailabilityByCountry, export, |ui| {
        charts::bar_chart(ui, "availability_by_country", &by_country, true, "Availability (days)", |_, v| {
            color::scaled(v, lo, hi)
        });
    });

    charts::heading(ui, "Availability by Room Type", None);
    charts::box_chart(
        ui,
        "availability_by_room_type",
        &distribution(&ins.availability_by_room_type),
        "Availability (days)",
        false,
        |k| pal.room_types.color_for(k),
    );

    charts::heading(ui, "Availability by Property Type", None);
    charts::box_chart(
        ui,
        "availability_by_property_type",
        &distribution(&ins.availability_by_property_type),
        "Availability (days)",
        true,
        |k| pal.property_types.color_for(k),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distribution_groups_by_key() {
        let rows = vec![
            ("Private room".to_string(), 20),
            ("Entire home".to_string(), 10),
            ("Entire home".to_string(), 5),
        ];
        assert_eq!(
            distribution(&rows),
            [
                ("Entire home".to_string(), vec![10.0, 5.0]),
                ("Private room".to_string(), vec![20.0]),
            ]
        );
    }

    #[test]
    fn value_range_of_pairs() {
        let pairs = vec![("a".to_string(), 3.0), ("b".to_string(), -1.0)];
        assert_eq!(value_range(&pairs), (-1.0, 3.0));
    }
}
