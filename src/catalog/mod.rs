//! Reference catalog and spelling normalization.
//!
//! * [`CatalogLookup`] — lookup contract consumed by the matcher and the
//!   catalog-gated filter mode.
//! * [`GroceryCatalog`] — JSON-backed catalog with built-in default entries.
//! * [`FuzzyCatalogMatcher`] — exact → fuzzy → pass-through spelling
//!   normalization; never rejects an item.

pub mod matcher;
pub mod store;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use matcher::FuzzyCatalogMatcher;
pub use store::{CatalogEntry, CatalogLookup, GroceryCatalog};
