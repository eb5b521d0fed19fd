//! Fuzzy catalog matcher — normalizes an item name's spelling for display
//! and exact-match deduplication.
//!
//! Resolution order: exact case-insensitive canonical/alias match, then the
//! catalog's fuzzy lookup, then the cleaned name verbatim with only its
//! first letter capitalized.  The matcher never rejects an item.

use std::sync::Arc;

use super::store::CatalogLookup;

// ---------------------------------------------------------------------------
// FuzzyCatalogMatcher
// ---------------------------------------------------------------------------

/// Spelling normalizer backed by an optional reference catalog.
///
/// ```rust
/// use voice_list::catalog::FuzzyCatalogMatcher;
///
/// // Without a catalog the matcher only fixes capitalization.
/// let matcher = FuzzyCatalogMatcher::without_catalog();
/// assert_eq!(matcher.normalize("peanut butter"), "Peanut butter");
/// ```
#[derive(Clone)]
pub struct FuzzyCatalogMatcher {
    catalog: Option<Arc<dyn CatalogLookup>>,
}

impl FuzzyCatalogMatcher {
    pub fn new(catalog: Arc<dyn CatalogLookup>) -> Self {
        Self {
            catalog: Some(catalog),
        }
    }

    /// Catalog-optional mode: names pass through with first-letter
    /// capitalization only.
    pub fn without_catalog() -> Self {
        Self { catalog: None }
    }

    /// Resolve `name` to its canonical catalog spelling, or pass it through
    /// capitalized when nothing matches.
    pub fn normalize(&self, name: &str) -> String {
        let name = name.trim();

        if let Some(catalog) = &self.catalog {
            if let Some(canonical) = catalog.exact(name) {
                return canonical;
            }
            if let Some(canonical) = catalog.fuzzy(name) {
                log::debug!("matcher: fuzzy-resolved {name:?} -> {canonical:?}");
                return canonical;
            }
        }

        capitalize_first(name)
    }
}

impl std::fmt::Debug for FuzzyCatalogMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FuzzyCatalogMatcher")
            .field("has_catalog", &self.catalog.is_some())
            .finish()
    }
}

/// Uppercase the first letter, leave the rest untouched.
fn capitalize_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::GroceryCatalog;

    fn matcher() -> FuzzyCatalogMatcher {
        FuzzyCatalogMatcher::new(Arc::new(GroceryCatalog::builtin()))
    }

    #[test]
    fn exact_match_uses_canonical_spelling() {
        assert_eq!(matcher().normalize("milk"), "Milk");
        assert_eq!(matcher().normalize("MILK"), "Milk");
    }

    #[test]
    fn alias_resolves_to_canonical() {
        assert_eq!(matcher().normalize("oj"), "Orange Juice");
    }

    #[test]
    fn fuzzy_match_corrects_spelling() {
        assert_eq!(matcher().normalize("bannanas"), "Bananas");
    }

    #[test]
    fn unknown_name_passes_through_capitalized() {
        assert_eq!(matcher().normalize("dragonfruit smoothie"), "Dragonfruit smoothie");
    }

    #[test]
    fn never_rejects() {
        assert!(!matcher().normalize("zzzzqqq").is_empty());
    }

    #[test]
    fn without_catalog_only_capitalizes() {
        let m = FuzzyCatalogMatcher::without_catalog();
        assert_eq!(m.normalize("milk"), "Milk");
        assert_eq!(m.normalize("peanut butter"), "Peanut butter");
    }

    #[test]
    fn empty_name_stays_empty() {
        assert_eq!(FuzzyCatalogMatcher::without_catalog().normalize(""), "");
    }
}
