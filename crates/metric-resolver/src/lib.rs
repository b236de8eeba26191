//! Metric resolution
//!
//! Locates a fixed vocabulary of financial metrics inside loosely structured
//! tables (spreadsheet exports, OCR output, pasted peer comparisons) using an
//! alias catalog of label patterns.

pub mod catalog;
pub mod defs;
pub mod resolver;
pub mod text;


pub use catalog::{normalize_label, AliasCatalog, AliasEntry, AliasEntryDef, CatalogError};
pub use resolver::{merge_first_wins, MetricResolver, Resolution, ResolverOptions};
pub use text::{split_text, split_text_blob};
