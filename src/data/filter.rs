use std::collections::BTreeSet;

use super::model::{Dataset, Facet, Listing, Measure};

// ---------------------------------------------------------------------------
// Filter specification: price range plus selected values per facet
// ---------------------------------------------------------------------------

/// Inclusive price interval. Always `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    min: f64,
    max: f64,
}

impl PriceRange {
    /// Build a range; endpoints given in the wrong order are swapped.
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            PriceRange { min: a, max: b }
        } else {
            PriceRange { min: b, max: a }
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn contains(&self, price: f64) -> bool {
        self.min <= price && price <= self.max
    }
}

/// The user's current selection, as an immutable value.
///
/// Every widget change produces a new `FilterSpec`; the query engine only
/// ever reads one. An empty selection for a facet matches no rows.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    price: PriceRange,
    countries: BTreeSet<String>,
    property_types: BTreeSet<String>,
    room_types: BTreeSet<String>,
}

impl FilterSpec {
    pub fn new(
        price: PriceRange,
        countries: BTreeSet<String>,
        property_types: BTreeSet<String>,
        room_types: BTreeSet<String>,
    ) -> Self {
        FilterSpec {
            price,
            countries,
            property_types,
            room_types,
        }
    }

    /// Everything selected: full price bounds and every distinct facet value.
    pub fn full(dataset: &Dataset) -> Self {
        let (min, max) = dataset.bounds(Measure::Price).unwrap_or((0.0, 0.0));
        FilterSpec {
            price: PriceRange::new(min, max),
            countries: dataset.distinct_values(Facet::Country).clone(),
            property_types: dataset.distinct_values(Facet::PropertyType).clone(),
            room_types: dataset.distinct_values(Facet::RoomType).clone(),
        }
    }

    pub fn price(&self) -> PriceRange {
        self.price
    }

    pub fn selected(&self, facet: Facet) -> &BTreeSet<String> {
        match facet {
            Facet::Country => &self.countries,
            Facet::PropertyType => &self.property_types,
            Facet::RoomType => &self.room_types,
        }
    }

    pub fn with_price_range(mut self, a: f64, b: f64) -> Self {
        self.price = PriceRange::new(a, b);
        self
    }

    /// Replace the selection of one facet.
    pub fn with_selection<I, S>(mut self, facet: Facet, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set = values.into_iter().map(Into::into).collect();
        match facet {
            Facet::Country => self.countries = set,
            Facet::PropertyType => self.property_types = set,
            Facet::RoomType => self.room_types = set,
        }
        self
    }

    /// Copy with `value` added to or removed from a facet's selection.
    pub fn toggled(&self, facet: Facet, value: &str) -> Self {
        let mut selection = self.selected(facet).clone();
        if !selection.remove(value) {
            selection.insert(value.to_string());
        }
        self.clone().with_selection(facet, selection)
    }

    /// The four-way conjunction applied to one listing.
    pub fn matches(&self, listing: &Listing) -> bool {
        self.price.contains(listing.price)
            && Facet::ALL
                .iter()
                .all(|&facet| self.selected(facet).contains(facet.value(listing)))
    }
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// Rows of a dataset that pass a [`FilterSpec`], in dataset order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// Row indices into the dataset.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a Listing> + '_ {
        let listings = self.dataset.listings();
        self.indices.iter().map(move |&i| &listings[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Select the listings that satisfy `spec`.
pub fn apply_filter<'a>(dataset: &'a Dataset, spec: &FilterSpec) -> FilteredView<'a> {
    let indices = dataset
        .listings()
        .iter()
        .enumerate()
        .filter(|(_, listing)| spec.matches(listing))
        .map(|(i, _)| i)
        .collect();
    FilteredView { dataset, indices }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::data::model::tests::{listing, three_rows};

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn full_spec_keeps_every_row_in_order() {
        let ds = three_rows();
        let view = apply_filter(&ds, &FilterSpec::full(&ds));
        assert_eq!(view.indices(), [0, 1, 2]);
    }

    #[test]
    fn explicit_scenario_spec_keeps_all_three() {
        let ds = three_rows();
        let spec = FilterSpec::new(
            PriceRange::new(0.0, 500.0),
            set(&["US", "FR"]),
            set(&["Apartment", "House"]),
            set(&["Entire home", "Private room"]),
        );
        assert_eq!(apply_filter(&ds, &spec).len(), 3);
    }

    #[test]
    fn country_selection_narrows_view() {
        let ds = three_rows();
        let spec = FilterSpec::full(&ds).with_selection(Facet::Country, ["US"]);
        let view = apply_filter(&ds, &spec);
        assert_eq!(view.indices(), [0, 1]);
        assert!(view.rows().all(|l| l.country == "US"));
    }

    #[test]
    fn price_range_is_inclusive() {
        let ds = three_rows();
        let spec = FilterSpec::full(&ds).with_price_range(100.0, 150.0);
        assert_eq!(apply_filter(&ds, &spec).indices(), [0, 2]);
    }

    #[test]
    fn price_range_below_every_listing_is_empty() {
        let ds = three_rows();
        let spec = FilterSpec::full(&ds).with_price_range(0.0, 50.0);
        assert!(apply_filter(&ds, &spec).is_empty());
    }

    #[test]
    fn reversed_range_is_normalised() {
        let range = PriceRange::new(300.0, 10.0);
        assert_eq!((range.min(), range.max()), (10.0, 300.0));
    }

    #[test]
    fn empty_selection_matches_nothing() {
        let ds = three_rows();
        for facet in Facet::ALL {
            let spec = FilterSpec::full(&ds).with_selection(facet, Vec::<String>::new());
            assert!(apply_filter(&ds, &spec).is_empty(), "{facet:?}");
        }
    }

    #[test]
    fn toggling_twice_restores_spec() {
        let ds = three_rows();
        let spec = FilterSpec::full(&ds);
        let off = spec.toggled(Facet::RoomType, "Private room");
        assert!(!off.selected(Facet::RoomType).contains("Private room"));
        assert_eq!(apply_filter(&ds, &off).indices(), [0, 2]);
        assert_eq!(off.toggled(Facet::RoomType, "Private room"), spec);
    }

    const COUNTRIES: [&str; 3] = ["DE", "FR", "US"];
    const PROPERTIES: [&str; 3] = ["Apartment", "House", "Loft"];
    const ROOMS: [&str; 2] = ["Entire home", "Private room"];

    fn arb_dataset() -> impl Strategy<Value = Dataset> {
        prop::collection::vec((0..3usize, 0..3usize, 0..2usize, 0u32..1000, 0u16..=365), 1..40)
            .prop_map(|rows| {
                let listings = rows
                    .into_iter()
                    .map(|(c, p, r, price, avail)| {
                        listing(COUNTRIES[c], PROPERTIES[p], ROOMS[r], f64::from(price), avail)
                    })
                    .collect();
                Dataset::from_listings(listings, Vec::new())
            })
    }

    fn arb_subset(universe: &'static [&'static str]) -> impl Strategy<Value = BTreeSet<String>> {
        prop::sample::subsequence(universe, 0..=universe.len())
            .prop_map(|vals| vals.into_iter().map(str::to_string).collect())
    }

    fn arb_spec() -> impl Strategy<Value = FilterSpec> {
        (
            0u32..1000,
            0u32..1000,
            arb_subset(&COUNTRIES),
            arb_subset(&PROPERTIES),
            arb_subset(&ROOMS),
        )
            .prop_map(|(a, b, countries, properties, rooms)| {
                FilterSpec::new(
                    PriceRange::new(f64::from(a), f64::from(b)),
                    countries,
                    properties,
                    rooms,
                )
            })
    }

    proptest! {
        #[test]
        fn every_emitted_row_satisfies_all_predicates(ds in arb_dataset(), spec in arb_spec()) {
            let view = apply_filter(&ds, &spec);
            for listing in view.rows() {
                prop_assert!(spec.price().contains(listing.price));
                prop_assert!(spec.selected(Facet::Country).contains(&listing.country));
                prop_assert!(spec.selected(Facet::PropertyType).contains(&listing.property_type));
                prop_assert!(spec.selected(Facet::RoomType).contains(&listing.room_type));
            }
            // Nothing that matches is left out, and order is preserved.
            let expected: Vec<usize> = ds
                .listings()
                .iter()
                .enumerate()
                .filter(|(_, l)| spec.matches(l))
                .map(|(i, _)| i)
                .collect();
            prop_assert_eq!(view.indices(), expected.as_slice());
        }

        #[test]
        fn full_spec_reproduces_dataset(ds in arb_dataset()) {
            let view = apply_filter(&ds, &FilterSpec::full(&ds));
            let all: Vec<usize> = (0..ds.len()).collect();
            prop_assert_eq!(view.indices(), all.as_slice());
        }

        #[test]
        fn one_empty_facet_empties_the_view(ds in arb_dataset(), spec in arb_spec(), which in 0..3usize) {
            let spec = spec.with_selection(Facet::ALL[which], Vec::<String>::new());
            prop_assert!(apply_filter(&ds, &spec).is_empty());
        }
    }
}
