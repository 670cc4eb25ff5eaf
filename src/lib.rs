//! Normalization and reporting core for a construction-contractor registry
//! export: load and clean the spreadsheet once, then answer every dashboard
//! view from the resulting immutable snapshot.

pub mod cache;
pub mod config;
pub mod context;
pub mod data;
pub mod error;
pub mod lookup;
pub mod state;

pub use cache::SnapshotCache;
pub use config::{AppConfig, RegistryConfig, SourceConfig};
pub use data::filter::SearchFilter;
pub use data::loader::{load, parse_registry};
pub use data::model::{Dataset, EntityType, Field, Record};
pub use error::{ConfigError, LoadError};
