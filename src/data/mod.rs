/// Data layer: listing types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset  │  Vec<Listing>, distinct facet values, bounds
///   └──────────┘
///        │   FilterSpec
///        ▼
///   ┌──────────┐
///   │  filter  │  price range ∧ facet membership → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  group counts / means / sums, top-n, nlargest
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ insights │  named tables behind every chart
///   └──────────┘
/// ```

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod insights;
pub mod loader;
pub mod model;
pub mod table;
