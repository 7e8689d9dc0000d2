/// Data layer: core types, loading, classification and the numeric helpers.
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
///   │ classify  │  Dataset → ColumnInfo (numeric / categorical)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐     ┌───────────┐     ┌─────────┐
///   │  coerce   │ ──► │ aggregate │     │  stats  │
///   └──────────┘     └───────────┘     └─────────┘
/// ```

pub mod aggregate;
pub mod classify;
pub mod coerce;
pub mod loader;
pub mod model;
pub mod stats;
