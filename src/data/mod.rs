/// Data layer: canonical rows, loading, caching, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → Vec<Row> (normalised once)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  store   │  one-shot async cache, shared Arc<[Row]>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  FilterState + predicate → filtered rows per view
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod store;
