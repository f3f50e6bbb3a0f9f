/// Data layer: core types, loading, filtering, and ranking.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  rename + coerce → FigureDataset + Diagnostics
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ FigureDataset │  Vec<FigureRecord>, category index, range bounds
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐     ┌──────────┐
///   │  filter   │ ──▶ │   rank    │  range predicates → indices → top-10
///   └──────────┘     └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod rank;
