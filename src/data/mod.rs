/// Data layer: core types, loading, and the queries over a loaded snapshot.
///
/// Architecture:
/// ```text
///  URL / local .csv  (UTF-8 + BOM, or TIS-620)
///        │
///        ▼
///   ┌──────────┐
///   │  source   │  fetch bytes → decode with fallback
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  banner/header rows, positional columns,
///   └──────────┘  row filter, coercion, classify → Dataset
///        │
///        ▼
///   ┌──────────────┐
///   │   Dataset     │  Vec<Record>, present columns
///   └──────────────┘
///        │
///        ▼
///   ┌──────────────────────────────┐
///   │ filter / aggregate / series   │  pure queries
///   │ table                         │
///   └──────────────────────────────┘
/// ```

pub mod aggregate;
pub mod classify;
pub mod filter;
pub mod loader;
pub mod model;
pub mod series;
pub mod source;
pub mod table;
