/// Data layer: core types, loading, filtering, and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Observation>, station index, time span
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  inclusive date range → &[&Observation]
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  temporal / station means, correlation, categories
///   └───────────┘
/// ```

pub mod aggregate;
pub mod category;
pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
