use std::path::Path;

use crate::color::CategoryColors;
use crate::config::Settings;
use crate::data::aggregate::top_n;
use crate::data::filter::{apply_filter, FilterSpec};
use crate::data::insights::Insights;
use crate::data::loader::load_file;
use crate::data::model::{Dataset, Facet};
use crate::data::table::TableData;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Home,
    Overview,
    Insights,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsightTab {
    #[default]
    Top,
    Price,
    Availability,
}

/// Colours shared by every chart, keyed by facet value.
#[derive(Debug, Clone, Default)]
pub struct Palettes {
    pub property_types: CategoryColors,
    pub room_types: CategoryColors,
    pub countries: CategoryColors,
}

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    pub settings: Settings,

    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<Dataset>,

    /// Current selection. Replaced wholesale, never edited in place.
    spec: Option<FilterSpec>,

    /// Indices of listings passing `spec`.
    pub visible_indices: Vec<usize>,

    /// Aggregates over the visible listings.
    pub insights: Insights,

    /// The visible listings as text rows.
    overview: TableData,

    /// Column chosen for the free breakdown chart, and its top groups.
    breakdown_column: Option<String>,
    pub breakdown: Vec<(String, usize)>,

    pub palettes: Palettes,

    pub page: Page,
    pub tab: InsightTab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn spec(&self) -> Option<&FilterSpec> {
        self.spec.as_ref()
    }

    /// Load a file and ingest it; on failure the previous dataset stays.
    pub fn open(&mut self, path: &Path) {
        match load_file(path) {
            Ok(dataset) => {
                log::info!(
                    "{} countries, {} property types, {} room types",
                    dataset.distinct_values(Facet::Country).len(),
                    dataset.distinct_values(Facet::PropertyType).len(),
                    dataset.distinct_values(Facet::RoomType).len()
                );
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error loading {}: {e}", path.display()));
            }
        }
    }

    /// Ingest a newly loaded dataset with everything selected.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.palettes = Palettes {
            property_types: CategoryColors::new(dataset.distinct_values(Facet::PropertyType)),
            room_types: CategoryColors::new(dataset.distinct_values(Facet::RoomType)),
            countries: CategoryColors::new(dataset.distinct_values(Facet::Country)),
        };
        let spec = FilterSpec::full(&dataset);
        self.dataset = Some(dataset);
        self.spec = None;
        self.breakdown_column = None;
        self.status_message = None;
        self.apply_spec(spec);
    }

    /// Adopt a new selection, recomputing the view and insights if it
    /// differs from the current one.
    pub fn apply_spec(&mut self, spec: FilterSpec) {
        if self.spec.as_ref() == Some(&spec) {
            return;
        }
        let Some(dataset) = &self.dataset else {
            return;
        };

        let view = apply_filter(dataset, &spec);
        log::debug!("Filter matched {} of {} listings", view.len(), dataset.len());
        match Insights::compute(&view, self.settings.top_n, self.settings.top_priced) {
            Ok(insights) => self.insights = insights,
            Err(e) => {
                log::error!("Aggregation failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
                self.insights = Insights::default();
            }
        }
        self.overview = TableData::from_view(&view);
        self.visible_indices = view.indices().to_vec();
        self.spec = Some(spec);
        self.refresh_breakdown();
    }

    pub fn breakdown_column(&self) -> Option<&str> {
        self.breakdown_column.as_deref()
    }

    /// Choose the column for the breakdown chart; `None` hides it.
    pub fn set_breakdown_column(&mut self, column: Option<String>) {
        self.breakdown_column = column;
        self.refresh_breakdown();
    }

    fn refresh_breakdown(&mut self) {
        self.breakdown.clear();
        let (Some(dataset), Some(spec), Some(column)) = (&self.dataset, &self.spec, &self.breakdown_column)
        else {
            return;
        };
        let result = dataset
            .dimension(column)
            .and_then(|dim| top_n(&apply_filter(dataset, spec), &dim, self.settings.top_n));
        match result {
            Ok(groups) => self.breakdown = groups,
            Err(e) => {
                log::error!("Breakdown failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
                self.breakdown_column = None;
            }
        }
    }

    /// The visible listings as a table, for the overview page and export.
    pub fn visible_table(&self) -> &TableData {
        &self.overview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::three_rows;

    #[test]
    fn new_dataset_selects_everything() {
        let mut state = AppState::default();
        state.settings.top_n = 10;
        state.set_dataset(three_rows());

        assert_eq!(state.visible_indices, [0, 1, 2]);
        assert_eq!(state.insights.row_count, 3);
        assert_eq!(state.visible_table().len(), 3);
    }

    #[test]
    fn applying_spec_recomputes_insights() {
        let mut state = AppState::default();
        state.set_dataset(three_rows());

        let spec = state.spec().unwrap().toggled(Facet::Country, "US");
        state.apply_spec(spec);
        assert_eq!(state.visible_indices, [2]);
        assert_eq!(state.insights.listings_by_country, [("FR".to_string(), 1)]);

        let spec = state.spec().unwrap().clone().with_price_range(0.0, 50.0);
        state.apply_spec(spec);
        assert!(state.visible_indices.is_empty());
        assert!(state.insights.top_hosts.is_empty());
    }

    #[test]
    fn breakdown_follows_filters() {
        let mut state = AppState::default();
        state.set_dataset(three_rows());
        state.set_breakdown_column(Some("Host_name".into()));
        assert_eq!(
            state.breakdown,
            [("host-US".to_string(), 2), ("host-FR".to_string(), 1)]
        );

        let spec = state.spec().unwrap().toggled(Facet::Country, "US");
        state.apply_spec(spec);
        assert_eq!(state.breakdown, [("host-FR".to_string(), 1)]);
    }

    #[test]
    fn unknown_breakdown_column_reports_schema_error() {
        let mut state = AppState::default();
        state.set_dataset(three_rows());
        state.set_breakdown_column(Some("Neighbourhood".into()));

        assert!(state.breakdown.is_empty());
        assert_eq!(state.breakdown_column(), None);
        assert!(state
            .status_message
            .as_deref()
            .is_some_and(|m| m.contains("Neighbourhood")));
    }

    #[test]
    fn failed_open_keeps_previous_dataset() {
        let mut state = AppState::default();
        state.set_dataset(three_rows());
        state.open(Path::new("/no/such/listings.csv"));

        assert!(state.status_message.is_some());
        assert_eq!(state.dataset.as_ref().map(Dataset::len), Some(3));
        assert_eq!(state.visible_indices.len(), 3);
    }
}
