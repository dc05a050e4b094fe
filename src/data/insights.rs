use super::aggregate::{country_aggregate, group_count, group_mean, group_sum, nlargest, top_n, Reducer};
use super::error::SchemaError;
use super::filter::FilteredView;
use super::model::{columns, Dimension, Listing, Measure};
use super::table::TableData;

/// The fixed catalog of aggregate tables behind the dashboard's charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateKind {
    TopPropertyTypes,
    TopHosts,
    RoomTypeShare,
    ListingsByCountry,
    ReviewMeanByRoomType,
    ReviewSumByRoomType,
    PriceByCountry,
    PriceByRoomType,
    TopPricedListings,
    AvailabilityByCountry,
    AvailabilityByRoomType,
    AvailabilityByPropertyType,
}

impl AggregateKind {
    pub const ALL: [AggregateKind; 12] = [
        AggregateKind::TopPropertyTypes,
        AggregateKind::TopHosts,
        AggregateKind::RoomTypeShare,
        AggregateKind::ListingsByCountry,
        AggregateKind::ReviewMeanByRoomType,
        AggregateKind::ReviewSumByRoomType,
        AggregateKind::PriceByCountry,
        AggregateKind::PriceByRoomType,
        AggregateKind::TopPricedListings,
        AggregateKind::AvailabilityByCountry,
        AggregateKind::AvailabilityByRoomType,
        AggregateKind::AvailabilityByPropertyType,
    ];

    pub fn title(self) -> &'static str {
        match self {
            AggregateKind::TopPropertyTypes => "Top Property Types",
            AggregateKind::TopHosts => "Top Hosts",
            AggregateKind::RoomTypeShare => "Listings by Room Type",
            AggregateKind::ListingsByCountry => "Listings by Country",
            AggregateKind::ReviewMeanByRoomType => "Mean Review Scores",
            AggregateKind::ReviewSumByRoomType => "Sum Review Scores",
            AggregateKind::PriceByCountry => "Average Price by Country",
            AggregateKind::PriceByRoomType => "Average Price by Room Type",
            AggregateKind::TopPricedListings => "Highest Priced Listings",
            AggregateKind::AvailabilityByCountry => "Availability by Country",
            AggregateKind::AvailabilityByRoomType => "Availability by Room Type",
            AggregateKind::AvailabilityByPropertyType => "Availability by Property Type",
        }
    }

    /// Column names of a two-column aggregate table. `None` for the top
    /// priced listings, which carry every dataset column.
    pub fn columns(self) -> Option<[&'static str; 2]> {
        let cols = match self {
            AggregateKind::TopPropertyTypes => ["property_type", "listing_count"],
            AggregateKind::TopHosts => ["host_name", "listing_count"],
            AggregateKind::RoomTypeShare => ["room_type", "count"],
            AggregateKind::ListingsByCountry => ["country", "total_listings"],
            AggregateKind::ReviewMeanByRoomType => ["room_type", "mean_review_score"],
            AggregateKind::ReviewSumByRoomType => ["room_type", "sum_review_score"],
            AggregateKind::PriceByCountry => ["country", "mean_price"],
            AggregateKind::PriceByRoomType => ["room_type", "mean_price"],
            AggregateKind::TopPricedListings => return None,
            AggregateKind::AvailabilityByCountry => ["country", "mean_availability"],
            AggregateKind::AvailabilityByRoomType => ["room_type", "availability"],
            AggregateKind::AvailabilityByPropertyType => ["property_type", "availability"],
        };
        Some(cols)
    }
}

/// Every aggregate of the catalog, computed from one filtered view.
#[derive(Debug, Clone, Default)]
pub struct Insights {
    pub row_count: usize,
    pub extra_columns: Vec<String>,
    pub top_property_types: Vec<(String, usize)>,
    pub top_hosts: Vec<(String, usize)>,
    pub room_type_share: Vec<(String, usize)>,
    pub listings_by_country: Vec<(String, usize)>,
    pub review_mean_by_room_type: Vec<(String, f64)>,
    pub review_sum_by_room_type: Vec<(String, f64)>,
    pub price_by_country: Vec<(String, f64)>,
    pub price_by_room_type: Vec<(String, f64)>,
    pub top_priced: Vec<Listing>,
    pub availability_by_country: Vec<(String, i64)>,
    pub availability_by_room_type: Vec<(String, u16)>,
    pub availability_by_property_type: Vec<(String, u16)>,
}

/// Ascending by value; equal values by key.
fn sort_by_value(mut pairs: Vec<(String, f64)>) -> Vec<(String, f64)> {
    pairs.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    pairs
}

impl Insights {
    /// Compute the catalog. `top_groups` bounds the top property type and host
    /// tables, `top_priced` the number of highest priced listings.
    pub fn compute(view: &FilteredView<'_>, top_groups: usize, top_priced: usize) -> Result<Self, SchemaError> {
        let availability_rows = |dim: &Dimension| -> Vec<(String, u16)> {
            view.rows()
                .filter_map(|l| dim.key(l).map(|k| (k.into_owned(), l.availability_365)))
                .collect()
        };

        let insights = Insights {
            row_count: view.len(),
            extra_columns: view.dataset().extra_columns().to_vec(),
            top_property_types: top_n(view, &Dimension::PropertyType, top_groups)?,
            top_hosts: top_n(view, &Dimension::HostName, top_groups)?,
            room_type_share: group_count(view, &Dimension::RoomType)?,
            listings_by_country: group_count(view, &Dimension::Country)?,
            review_mean_by_room_type: sort_by_value(group_mean(
                view,
                &Dimension::RoomType,
                Measure::ReviewScore,
            )?),
            review_sum_by_room_type: sort_by_value(group_sum(
                view,
                &Dimension::RoomType,
                Measure::ReviewScore,
            )?),
            // Price and availability are never blank, so every country keeps a mean.
            price_by_country: country_aggregate(view, Measure::Price, Reducer::Mean)
                .into_iter()
                .filter_map(|(country, mean)| mean.map(|m| (country, m)))
                .collect(),
            price_by_room_type: sort_by_value(group_mean(view, &Dimension::RoomType, Measure::Price)?),
            top_priced: nlargest(view, Measure::Price, top_priced)
                .into_iter()
                .cloned()
                .collect(),
            availability_by_country: country_aggregate(view, Measure::Availability, Reducer::Mean)
                .into_iter()
                .filter_map(|(country, mean)| mean.map(|m| (country, m.trunc() as i64)))
                .collect(),
            availability_by_room_type: availability_rows(&Dimension::RoomType),
            availability_by_property_type: availability_rows(&Dimension::PropertyType),
        };

        log::debug!(
            "Computed insights over {} rows ({} countries, {} room types)",
            insights.row_count,
            insights.listings_by_country.len(),
            insights.room_type_share.len()
        );
        Ok(insights)
    }

    /// Render one aggregate as a text table.
    pub fn table(&self, kind: AggregateKind) -> TableData {
        let count = |v: &usize| v.to_string();
        let mean = |v: &f64| format!("{v:.2}");
        let Some(cols) = kind.columns() else {
            return self.top_priced_table();
        };
        match kind {
            AggregateKind::TopPropertyTypes => TableData::from_pairs(cols, &self.top_property_types, count),
            AggregateKind::TopHosts => TableData::from_pairs(cols, &self.top_hosts, count),
            AggregateKind::RoomTypeShare => TableData::from_pairs(cols, &self.room_type_share, count),
            AggregateKind::ListingsByCountry => TableData::from_pairs(cols, &self.listings_by_country, count),
            AggregateKind::ReviewMeanByRoomType => TableData::from_pairs(cols, &self.review_mean_by_room_type, mean),
            AggregateKind::ReviewSumByRoomType => TableData::from_pairs(cols, &self.review_sum_by_room_type, mean),
            AggregateKind::PriceByCountry => TableData::from_pairs(cols, &self.price_by_country, mean),
            AggregateKind::PriceByRoomType => TableData::from_pairs(cols, &self.price_by_room_type, mean),
            AggregateKind::AvailabilityByCountry => {
                TableData::from_pairs(cols, &self.availability_by_country, |v| v.to_string())
            }
            AggregateKind::AvailabilityByRoomType => {
                TableData::from_pairs(cols, &self.availability_by_room_type, |v| v.to_string())
            }
            AggregateKind::AvailabilityByPropertyType => {
                TableData::from_pairs(cols, &self.availability_by_property_type, |v| v.to_string())
            }
            AggregateKind::TopPricedListings => self.top_priced_table(),
        }
    }

    /// Highest priced listings with every dataset column.
    fn top_priced_table(&self) -> TableData {
        let mut table = TableData::new(
            columns::ALL
                .iter()
                .map(|c| c.to_string())
                .chain(self.extra_columns.iter().cloned()),
        );
        table.rows = self
            .top_priced
            .iter()
            .map(|l| table.columns.iter().map(|c| l.cell_text(c)).collect())
            .collect();
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply_filter, FilterSpec};
    use crate::data::model::tests::{listing, three_rows};
    use crate::data::model::{Dataset, Facet};

    #[test]
    fn catalog_over_three_rows() {
        let ds = three_rows();
        let view = apply_filter(&ds, &FilterSpec::full(&ds));
        let insights = Insights::compute(&view, 10, 10).unwrap();

        assert_eq!(insights.row_count, 3);
        assert_eq!(
            insights.top_property_types,
            [("Apartment".to_string(), 2), ("House".to_string(), 1)]
        );
        assert_eq!(
            insights.listings_by_country,
            [("FR".to_string(), 1), ("US".to_string(), 2)]
        );
        assert_eq!(
            insights.price_by_room_type,
            [("Entire home".to_string(), 125.0), ("Private room".to_string(), 200.0)]
        );
        assert_eq!(
            insights.availability_by_country,
            [("FR".to_string(), 5), ("US".to_string(), 15)]
        );
        assert_eq!(
            insights.availability_by_room_type,
            [
                ("Entire home".to_string(), 10),
                ("Private room".to_string(), 20),
                ("Entire home".to_string(), 5)
            ]
        );
        let prices: Vec<f64> = insights.top_priced.iter().map(|l| l.price).collect();
        assert_eq!(prices, [200.0, 150.0, 100.0]);
    }

    #[test]
    fn room_type_means_sort_by_value() {
        let mut cheap = listing("US", "Flat", "Suite", 10.0, 0);
        cheap.review_score = Some(99.0);
        let mut pricey = listing("US", "Flat", "Dorm", 10.0, 0);
        pricey.review_score = Some(40.0);
        let ds = Dataset::from_listings(vec![cheap, pricey], Vec::new());
        let view = apply_filter(&ds, &FilterSpec::full(&ds));
        let insights = Insights::compute(&view, 10, 10).unwrap();

        let keys: Vec<_> = insights
            .review_mean_by_room_type
            .iter()
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(keys, ["Dorm", "Suite"]);
    }

    #[test]
    fn blank_hosts_are_not_ranked() {
        let mut listings: Vec<_> = (0..2)
            .map(|_| {
                let mut l = listing("ES", "Flat", "Room", 10.0, 0);
                l.host_name = String::new();
                l
            })
            .collect();
        let mut ana = listing("ES", "Flat", "Room", 10.0, 0);
        ana.host_name = "Ana".into();
        listings.push(ana);
        let ds = Dataset::from_listings(listings, Vec::new());
        let view = apply_filter(&ds, &FilterSpec::full(&ds));
        let insights = Insights::compute(&view, 10, 10).unwrap();

        assert_eq!(insights.top_hosts, [("Ana".to_string(), 1)]);
        assert_eq!(insights.row_count, 3);
    }

    #[test]
    fn availability_mean_truncates() {
        let ds = Dataset::from_listings(
            vec![
                listing("ES", "Flat", "Room", 10.0, 10),
                listing("ES", "Flat", "Room", 10.0, 11),
            ],
            Vec::new(),
        );
        let view = apply_filter(&ds, &FilterSpec::full(&ds));
        let insights = Insights::compute(&view, 10, 10).unwrap();
        assert_eq!(insights.availability_by_country, [("ES".to_string(), 10)]);
    }

    #[test]
    fn empty_view_gives_empty_catalog() {
        let ds = three_rows();
        let spec = FilterSpec::full(&ds).with_selection(Facet::PropertyType, Vec::<String>::new());
        let view = apply_filter(&ds, &spec);
        let insights = Insights::compute(&view, 10, 10).unwrap();
        for kind in AggregateKind::ALL {
            assert!(insights.table(kind).is_empty(), "{kind:?}");
        }
    }

    #[test]
    fn tables_use_catalog_column_names() {
        let ds = three_rows();
        let view = apply_filter(&ds, &FilterSpec::full(&ds));
        let insights = Insights::compute(&view, 1, 2).unwrap();

        let hosts = insights.table(AggregateKind::TopHosts);
        assert_eq!(hosts.columns, ["host_name", "listing_count"]);
        assert_eq!(hosts.rows, [["host-US", "2"]]);

        assert_eq!(AggregateKind::TopPricedListings.columns(), None);
        let priced = insights.table(AggregateKind::TopPricedListings);
        assert_eq!(priced.len(), 2);
        assert!(priced.columns.iter().all(|c| !c.is_empty()));
        for col in ["Review_scores", "Property_type", "Host_name"] {
            assert!(priced.columns.iter().any(|c| c == col));
        }
    }
}
