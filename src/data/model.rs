use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use super::error::SchemaError;

// ---------------------------------------------------------------------------
// Canonical column names
// ---------------------------------------------------------------------------

/// Header names of the listing schema, as written in the source file.
pub mod columns {
    pub const COUNTRY: &str = "Country";
    pub const PROPERTY_TYPE: &str = "Property_type";
    pub const ROOM_TYPE: &str = "Room_type";
    pub const HOST_NAME: &str = "Host_name";
    pub const NAME: &str = "Name";
    pub const PRICE: &str = "Price";
    pub const REVIEW_SCORES: &str = "Review_scores";
    pub const AVAILABILITY: &str = "Availability_365";

    /// Every schema column in display order.
    pub const ALL: [&str; 8] = [
        NAME,
        HOST_NAME,
        COUNTRY,
        PROPERTY_TYPE,
        ROOM_TYPE,
        PRICE,
        REVIEW_SCORES,
        AVAILABILITY,
    ];
}

// ---------------------------------------------------------------------------
// CellValue – a single cell of a non-schema column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell for source columns outside the listing schema.
/// Kept `Ord` so it can live in `BTreeSet`s and act as a group key.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn rank(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
            }
        }
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Infer the narrowest type for a raw text cell.
    pub fn infer(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        match s {
            "true" | "True" => CellValue::Bool(true),
            "false" | "False" => CellValue::Bool(false),
            _ => CellValue::Text(s.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Facets, measures and group dimensions
// ---------------------------------------------------------------------------

/// A categorical column the user can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Facet {
    Country,
    PropertyType,
    RoomType,
}

impl Facet {
    pub const ALL: [Facet; 3] = [Facet::Country, Facet::PropertyType, Facet::RoomType];

    pub fn column_name(self) -> &'static str {
        match self {
            Facet::Country => columns::COUNTRY,
            Facet::PropertyType => columns::PROPERTY_TYPE,
            Facet::RoomType => columns::ROOM_TYPE,
        }
    }

    /// Human-readable label for widgets.
    pub fn label(self) -> &'static str {
        match self {
            Facet::Country => "Country",
            Facet::PropertyType => "Property type",
            Facet::RoomType => "Room type",
        }
    }

    pub fn value(self, listing: &Listing) -> &str {
        match self {
            Facet::Country => &listing.country,
            Facet::PropertyType => &listing.property_type,
            Facet::RoomType => &listing.room_type,
        }
    }
}

/// A numeric column subject to aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measure {
    Price,
    ReviewScore,
    Availability,
}

impl Measure {
    pub fn column_name(self) -> &'static str {
        match self {
            Measure::Price => columns::PRICE,
            Measure::ReviewScore => columns::REVIEW_SCORES,
            Measure::Availability => columns::AVAILABILITY,
        }
    }

    /// The measure's value for a row; `None` when the cell was blank.
    pub fn value(self, listing: &Listing) -> Option<f64> {
        match self {
            Measure::Price => Some(listing.price),
            Measure::ReviewScore => listing.review_score,
            Measure::Availability => Some(f64::from(listing.availability_365)),
        }
    }
}

impl FromStr for Measure {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Measure::Price, Measure::ReviewScore, Measure::Availability]
            .into_iter()
            .find(|m| m.column_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SchemaError::UnknownMeasure(s.to_string()))
    }
}

/// A column rows can be grouped on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Dimension {
    Country,
    PropertyType,
    RoomType,
    HostName,
    Name,
    /// A non-schema source column, resolved against the loaded dataset.
    Other(String),
}

impl Dimension {
    pub fn column_name(&self) -> &str {
        match self {
            Dimension::Country => columns::COUNTRY,
            Dimension::PropertyType => columns::PROPERTY_TYPE,
            Dimension::RoomType => columns::ROOM_TYPE,
            Dimension::HostName => columns::HOST_NAME,
            Dimension::Name => columns::NAME,
            Dimension::Other(name) => name,
        }
    }

    /// Group key of a row. `None` drops the row from the grouping.
    pub fn key<'a>(&self, listing: &'a Listing) -> Option<Cow<'a, str>> {
        match self {
            Dimension::Country => Some(Cow::Borrowed(&listing.country)),
            Dimension::PropertyType => Some(Cow::Borrowed(&listing.property_type)),
            Dimension::RoomType => Some(Cow::Borrowed(&listing.room_type)),
            Dimension::HostName => non_blank(&listing.host_name),
            Dimension::Name => non_blank(&listing.name),
            Dimension::Other(col) => match listing.extra.get(col) {
                Some(CellValue::Text(s)) => Some(Cow::Borrowed(s)),
                Some(v) if !v.is_null() => Some(Cow::Owned(v.to_string())),
                _ => None,
            },
        }
    }
}

fn non_blank(s: &str) -> Option<Cow<'_, str>> {
    (!s.trim().is_empty()).then_some(Cow::Borrowed(s))
}

impl From<Facet> for Dimension {
    fn from(facet: Facet) -> Self {
        match facet {
            Facet::Country => Dimension::Country,
            Facet::PropertyType => Dimension::PropertyType,
            Facet::RoomType => Dimension::RoomType,
        }
    }
}

// ---------------------------------------------------------------------------
// Listing – one row of the dataset
// ---------------------------------------------------------------------------

/// A single rental listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub name: String,
    pub host_name: String,
    pub country: String,
    pub property_type: String,
    pub room_type: String,
    /// Nightly price, never negative.
    pub price: f64,
    pub review_score: Option<f64>,
    /// Days available over the next 365.
    pub availability_365: u16,
    /// Source columns outside the schema: column_name → value.
    pub extra: BTreeMap<String, CellValue>,
}

impl Listing {
    /// Text form of a schema or extra column, for tables and export.
    pub fn cell_text(&self, column: &str) -> String {
        match column {
            columns::NAME => self.name.clone(),
            columns::HOST_NAME => self.host_name.clone(),
            columns::COUNTRY => self.country.clone(),
            columns::PROPERTY_TYPE => self.property_type.clone(),
            columns::ROOM_TYPE => self.room_type.clone(),
            columns::PRICE => self.price.to_string(),
            columns::REVIEW_SCORES => self
                .review_score
                .map(|v| v.to_string())
                .unwrap_or_default(),
            columns::AVAILABILITY => self.availability_365.to_string(),
            other => self
                .extra
                .get(other)
                .map(|v| v.to_string())
                .unwrap_or_default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed facet indices. Read-only after
/// construction.
#[derive(Debug, Clone)]
pub struct Dataset {
    listings: Vec<Listing>,
    /// Non-schema columns in source order.
    extra_columns: Vec<String>,
    /// For each facet the sorted set of distinct values.
    distinct: BTreeMap<Facet, BTreeSet<String>>,
}

impl Dataset {
    /// Build facet indices from loaded listings.
    pub fn from_listings(listings: Vec<Listing>, extra_columns: Vec<String>) -> Self {
        let mut distinct: BTreeMap<Facet, BTreeSet<String>> =
            Facet::ALL.into_iter().map(|f| (f, BTreeSet::new())).collect();

        for listing in &listings {
            for facet in Facet::ALL {
                distinct
                    .entry(facet)
                    .or_default()
                    .insert(facet.value(listing).to_string());
            }
        }

        Dataset {
            listings,
            extra_columns,
            distinct,
        }
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    /// Schema columns followed by extra columns.
    pub fn column_names(&self) -> Vec<String> {
        columns::ALL
            .iter()
            .map(|c| c.to_string())
            .chain(self.extra_columns.iter().cloned())
            .collect()
    }

    /// Sorted distinct values observed for a facet.
    pub fn distinct_values(&self, facet: Facet) -> &BTreeSet<String> {
        // Every facet is seeded in `from_listings`.
        static EMPTY: BTreeSet<String> = BTreeSet::new();
        self.distinct.get(&facet).unwrap_or(&EMPTY)
    }

    /// `(min, max)` of a measure over the whole dataset, ignoring blanks.
    pub fn bounds(&self, measure: Measure) -> Option<(f64, f64)> {
        self.listings
            .iter()
            .filter_map(|l| measure.value(l))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Resolve a column name to a group dimension. Names match
    /// case-insensitively; extra columns resolve to their source spelling.
    pub fn dimension(&self, name: &str) -> Result<Dimension, SchemaError> {
        let builtin = [
            Dimension::Country,
            Dimension::PropertyType,
            Dimension::RoomType,
            Dimension::HostName,
            Dimension::Name,
        ]
        .into_iter()
        .find(|d| d.column_name().eq_ignore_ascii_case(name));
        if let Some(dim) = builtin {
            return Ok(dim);
        }
        if name.parse::<Measure>().is_ok() {
            return Err(SchemaError::NotGroupable(name.to_string()));
        }
        self.extra_columns
            .iter()
            .find(|c| c.eq_ignore_ascii_case(name))
            .map(|c| Dimension::Other(c.clone()))
            .ok_or_else(|| SchemaError::UnknownColumn(name.to_string()))
    }

    /// Fail with [`SchemaError`] when `dim` names a column this dataset lacks.
    pub fn check_dimension(&self, dim: &Dimension) -> Result<(), SchemaError> {
        match dim {
            Dimension::Other(col) if !self.extra_columns.iter().any(|c| c == col) => {
                Err(SchemaError::UnknownColumn(col.clone()))
            }
            _ => Ok(()),
        }
    }

    /// Number of listings.
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}
