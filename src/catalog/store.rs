//! Reference grocery catalog — canonical item names, categories and aliases.
//!
//! The catalog is reference data owned outside this core: we only load it
//! (JSON) and answer lookups.  A built-in entry set keeps the application
//! useful when no catalog file has been installed.
//!
//! | Platform | Path |
//! |----------|------|
//! | Windows  | `%APPDATA%\voice-list\catalog.json` |
//! | macOS    | `~/Library/Application Support/voice-list/catalog.json` |
//! | Linux    | `~/.config/voice-list/catalog.json` |

use std::path::Path;

use serde::{Deserialize, Serialize};
use strsim::levenshtein;

use crate::config::AppPaths;

// ---------------------------------------------------------------------------
// CatalogEntry
// ---------------------------------------------------------------------------

/// One canonical catalog item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Display spelling used for matched items.
    pub canonical_name: String,
    /// Category label ("Dairy", "Produce", …).
    pub category: String,
    /// Alternative spoken/typed spellings that resolve to this entry.
    #[serde(default)]
    pub aliases: Vec<String>,
}

// ---------------------------------------------------------------------------
// CatalogLookup
// ---------------------------------------------------------------------------

/// Lookup contract the matcher and pipeline depend on.
///
/// Object-safe and `Send + Sync` so it can be shared as an
/// `Arc<dyn CatalogLookup>` across the pipeline and any future UI thread.
pub trait CatalogLookup: Send + Sync {
    /// Membership check used by the catalog-gated filter mode.
    fn contains(&self, name: &str) -> bool;

    /// Exact case-insensitive canonical or alias match.
    fn exact(&self, name: &str) -> Option<String>;

    /// Best-effort fuzzy match (prefix, then bounded edit distance).
    fn fuzzy(&self, name: &str) -> Option<String>;
}

const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn CatalogLookup>) {}
};

// ---------------------------------------------------------------------------
// GroceryCatalog
// ---------------------------------------------------------------------------

/// In-memory catalog backed by an optional JSON file.
pub struct GroceryCatalog {
    entries: Vec<CatalogEntry>,
}

/// Edit-distance budget: 1 for short names, 2 otherwise.
fn max_distance(name: &str) -> usize {
    if name.chars().count() < 5 {
        1
    } else {
        2
    }
}

impl GroceryCatalog {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Load the catalog from the platform config directory, falling back to
    /// the built-in entries when no file exists or it cannot be parsed.
    pub fn load_or_builtin() -> Self {
        Self::load_from(&AppPaths::new().catalog_file)
    }

    /// Load from an explicit path (useful for tests); built-in entries are
    /// the fallback for a missing or malformed file.
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(data) => match serde_json::from_str::<Vec<CatalogEntry>>(&data) {
                    Ok(entries) => return Self { entries },
                    Err(e) => log::warn!(
                        "catalog: {} is not valid catalog JSON ({e}); using built-in entries",
                        path.display()
                    ),
                },
                Err(e) => log::warn!(
                    "catalog: failed to read {} ({e}); using built-in entries",
                    path.display()
                ),
            }
        }
        Self::builtin()
    }

    /// The built-in reference entries.
    pub fn builtin() -> Self {
        Self {
            entries: builtin_entries(),
        }
    }

    /// Build a catalog from explicit entries.
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CatalogLookup for GroceryCatalog {
    fn contains(&self, name: &str) -> bool {
        self.exact(name).is_some() || self.fuzzy(name).is_some()
    }

    fn exact(&self, name: &str) -> Option<String> {
        let lower = name.to_lowercase();
        self.entries
            .iter()
            .find(|e| {
                e.canonical_name.to_lowercase() == lower
                    || e.aliases.iter().any(|a| a.to_lowercase() == lower)
            })
            .map(|e| e.canonical_name.clone())
    }

    fn fuzzy(&self, name: &str) -> Option<String> {
        let lower = name.to_lowercase();
        if lower.len() < 3 {
            return None;
        }

        // Prefix match first — "chick" resolves to "Chicken Breast".
        if let Some(entry) = self
            .entries
            .iter()
            .find(|e| e.canonical_name.to_lowercase().starts_with(&lower))
        {
            return Some(entry.canonical_name.clone());
        }

        // Bounded edit distance over canonical names and aliases, with a
        // cheap length pre-filter.
        let budget = max_distance(&lower);
        let mut best: Option<(usize, &CatalogEntry)> = None;

        for entry in &self.entries {
            let candidates = std::iter::once(entry.canonical_name.as_str())
                .chain(entry.aliases.iter().map(|a| a.as_str()));

            for candidate in candidates {
                let cand_lower = candidate.to_lowercase();
                let len_diff = (cand_lower.len() as i64 - lower.len() as i64).unsigned_abs();
                if len_diff as usize > budget {
                    continue;
                }

                let dist = levenshtein(&lower, &cand_lower);
                if dist <= budget && best.map_or(true, |(d, _)| dist < d) {
                    best = Some((dist, entry));
                }
            }
        }

        best.map(|(_, entry)| entry.canonical_name.clone())
    }
}

// ---------------------------------------------------------------------------
// Built-in entries
// ---------------------------------------------------------------------------

fn builtin_entries() -> Vec<CatalogEntry> {
    fn entry(name: &str, category: &str, aliases: &[&str]) -> CatalogEntry {
        CatalogEntry {
            canonical_name: name.to_string(),
            category: category.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    vec![
        entry("Milk", "Dairy", &["whole milk", "skim milk"]),
        entry("Eggs", "Dairy", &["egg"]),
        entry("Butter", "Dairy", &[]),
        entry("Cheese", "Dairy", &["cheddar"]),
        entry("Yogurt", "Dairy", &["yoghurt"]),
        entry("Sour Cream", "Dairy", &[]),
        entry("Cream Cheese", "Dairy", &[]),
        entry("Bread", "Bakery", &["loaf"]),
        entry("Bagels", "Bakery", &["bagel"]),
        entry("Tortillas", "Bakery", &["tortilla", "wraps"]),
        entry("Apples", "Produce", &["apple"]),
        entry("Bananas", "Produce", &["banana"]),
        entry("Oranges", "Produce", &["orange"]),
        entry("Lemons", "Produce", &["lemon"]),
        entry("Tomatoes", "Produce", &["tomato"]),
        entry("Potatoes", "Produce", &["potato"]),
        entry("Onions", "Produce", &["onion"]),
        entry("Garlic", "Produce", &[]),
        entry("Carrots", "Produce", &["carrot"]),
        entry("Lettuce", "Produce", &[]),
        entry("Spinach", "Produce", &[]),
        entry("Green Beans", "Produce", &[]),
        entry("Bell Pepper", "Produce", &["peppers"]),
        entry("Avocados", "Produce", &["avocado"]),
        entry("Chicken Breast", "Meat", &["chicken"]),
        entry("Ground Beef", "Meat", &["beef", "hamburger meat"]),
        entry("Bacon", "Meat", &[]),
        entry("Ham", "Meat", &[]),
        entry("Salmon", "Seafood", &[]),
        entry("Shrimp", "Seafood", &[]),
        entry("Rice", "Pantry", &[]),
        entry("Pasta", "Pantry", &["spaghetti", "noodles"]),
        entry("Cereal", "Pantry", &[]),
        entry("Flour", "Pantry", &[]),
        entry("Sugar", "Pantry", &[]),
        entry("Salt", "Pantry", &[]),
        entry("Olive Oil", "Pantry", &[]),
        entry("Peanut Butter", "Pantry", &[]),
        entry("Jelly", "Pantry", &["jam"]),
        entry("Maple Syrup", "Pantry", &["syrup"]),
        entry("Baking Soda", "Pantry", &[]),
        entry("Orange Juice", "Beverages", &["oj"]),
        entry("Apple Juice", "Beverages", &[]),
        entry("Coffee", "Beverages", &[]),
        entry("Tea", "Beverages", &[]),
        entry("Soda", "Beverages", &["pop"]),
        entry("Ice Cream", "Frozen", &[]),
        entry("Frozen Pizza", "Frozen", &["pizza"]),
        entry("Toilet Paper", "Household", &["tp"]),
        entry("Paper Towels", "Household", &[]),
        entry("Dish Soap", "Household", &[]),
        entry("Laundry Detergent", "Household", &["detergent"]),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn builtin_is_non_empty() {
        assert!(!GroceryCatalog::builtin().is_empty());
    }

    // ---- exact ---

    #[test]
    fn exact_match_is_case_insensitive() {
        let cat = GroceryCatalog::builtin();
        assert_eq!(cat.exact("milk").as_deref(), Some("Milk"));
        assert_eq!(cat.exact("MILK").as_deref(), Some("Milk"));
    }

    #[test]
    fn alias_resolves_to_canonical() {
        let cat = GroceryCatalog::builtin();
        assert_eq!(cat.exact("oj").as_deref(), Some("Orange Juice"));
        assert_eq!(cat.exact("noodles").as_deref(), Some("Pasta"));
    }

    #[test]
    fn exact_miss_returns_none() {
        assert_eq!(GroceryCatalog::builtin().exact("quinoa"), None);
    }

    // ---- fuzzy ---

    #[test]
    fn fuzzy_prefix_match() {
        let cat = GroceryCatalog::builtin();
        assert_eq!(cat.fuzzy("chick").as_deref(), Some("Chicken Breast"));
    }

    #[test]
    fn fuzzy_edit_distance_match() {
        let cat = GroceryCatalog::builtin();
        assert_eq!(cat.fuzzy("bannanas").as_deref(), Some("Bananas"));
        assert_eq!(cat.fuzzy("yogert").as_deref(), Some("Yogurt"));
    }

    #[test]
    fn fuzzy_rejects_very_short_input() {
        assert_eq!(GroceryCatalog::builtin().fuzzy("mi"), None);
    }

    #[test]
    fn fuzzy_rejects_distant_input() {
        assert_eq!(GroceryCatalog::builtin().fuzzy("motorcycle"), None);
    }

    // ---- contains ---

    #[test]
    fn contains_covers_exact_and_fuzzy() {
        let cat = GroceryCatalog::builtin();
        assert!(cat.contains("milk"));
        assert!(cat.contains("bannanas"));
        assert!(!cat.contains("motorcycle"));
    }

    // ---- persistence ---

    #[test]
    fn load_from_json_file() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("catalog.json");

        let entries = vec![CatalogEntry {
            canonical_name: "Durian".into(),
            category: "Produce".into(),
            aliases: vec!["stinky fruit".into()],
        }];
        std::fs::write(&path, serde_json::to_string_pretty(&entries).unwrap()).unwrap();

        let cat = GroceryCatalog::load_from(&path);
        assert_eq!(cat.len(), 1);
        assert_eq!(cat.exact("stinky fruit").as_deref(), Some("Durian"));
    }

    #[test]
    fn load_missing_file_falls_back_to_builtin() {
        let dir = tempdir().expect("temp dir");
        let cat = GroceryCatalog::load_from(&dir.path().join("nope.json"));
        assert!(!cat.is_empty());
        assert!(cat.contains("milk"));
    }

    #[test]
    fn load_malformed_file_falls_back_to_builtin() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json at all").unwrap();

        let cat = GroceryCatalog::load_from(&path);
        assert!(cat.contains("milk"));
    }
}
