/// Data layer: core types, loading, reshaping and selection.
///
/// Architecture:
/// ```text
///  Metro_zhvi_*.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse CSV → WideTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ prepare   │  melt, dates, state, coalesce, growth, window
///   └──────────┘   (reshape, dates, aggregate)
///        │
///        ▼
///   ┌───────────────┐
///   │PreparedDataset│  observations + state averages, memoized by cache
///   └───────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  region / state series, search, metrics
///   └──────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod dates;
pub mod filter;
pub mod loader;
pub mod metrics;
pub mod model;
pub mod prepare;
pub mod reshape;
