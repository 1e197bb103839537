/// Data layer: schema, loading, caching, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .parquet
///        │
///        ▼
///   ┌──────────┐   ┌─────────┐
///   │  loader   │◄──│  cache   │  memoized per (file identity, LoadParams)
///   └──────────┘   └─────────┘
///        │  raw grid → schema check → SalesTable (Hour derived)
///        ▼
///   ┌──────────┐
///   │  filter   │  City ∧ Customer_type ∧ Gender → filtered indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  KPIs, sales by product line, sales by hour
///   └───────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;
