//! Shopping-item data model and pipeline outcome types.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ItemId
// ---------------------------------------------------------------------------

/// Opaque item identifier, unique within one list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ShoppingItem
// ---------------------------------------------------------------------------

/// One entry on the shopping list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub id: ItemId,
    /// Normalized display name (catalog spelling when matched).
    pub name: String,
    pub completed: bool,
    /// Positive quantity, when one was spoken ("2 apples").
    pub quantity: Option<f64>,
    /// Short unit string ("lb", "pounds"), only meaningful with a quantity.
    pub unit: Option<String>,
}

impl ShoppingItem {
    /// Render as a short list line: `2 lb Chicken Breast`.
    pub fn display_line(&self) -> String {
        let mut line = String::new();
        if let Some(q) = self.quantity {
            // Trim a trailing ".0" on whole quantities.
            if q.fract() == 0.0 {
                line.push_str(&format!("{} ", q as i64));
            } else {
                line.push_str(&format!("{q} "));
            }
        }
        if let Some(unit) = &self.unit {
            line.push_str(unit);
            line.push(' ');
        }
        line.push_str(&self.name);
        line
    }
}

// ---------------------------------------------------------------------------
// PipelineOutcome
// ---------------------------------------------------------------------------

/// Structured result of parsing one utterance.
///
/// Never an error: malformed input at worst yields `recognized_none = true`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineOutcome {
    /// New items, disjoint from the live list.
    pub added: Vec<ShoppingItem>,
    /// Survivors dropped because they were already on the list (or repeated
    /// within the utterance).
    pub duplicate_count: usize,
    /// True when the utterance produced zero survivors at all — the caller
    /// should prompt the user to rephrase.
    pub recognized_none: bool,
}

impl PipelineOutcome {
    /// True when the utterance parsed fine but everything was already listed.
    pub fn all_duplicates(&self) -> bool {
        self.added.is_empty() && self.duplicate_count > 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, quantity: Option<f64>, unit: Option<&str>) -> ShoppingItem {
        ShoppingItem {
            id: ItemId(1),
            name: name.into(),
            completed: false,
            quantity,
            unit: unit.map(|u| u.to_string()),
        }
    }

    #[test]
    fn display_line_name_only() {
        assert_eq!(item("Milk", None, None).display_line(), "Milk");
    }

    #[test]
    fn display_line_whole_quantity() {
        assert_eq!(item("Apples", Some(2.0), None).display_line(), "2 Apples");
    }

    #[test]
    fn display_line_fractional_quantity_with_unit() {
        assert_eq!(
            item("Chicken Breast", Some(1.5), Some("lb")).display_line(),
            "1.5 lb Chicken Breast"
        );
    }

    #[test]
    fn outcome_all_duplicates() {
        let outcome = PipelineOutcome {
            added: vec![],
            duplicate_count: 2,
            recognized_none: false,
        };
        assert!(outcome.all_duplicates());
        assert!(!PipelineOutcome::default().all_duplicates());
    }

    #[test]
    fn item_serde_round_trip() {
        let original = item("Eggs", Some(12.0), None);
        let json = serde_json::to_string(&original).unwrap();
        let back: ShoppingItem = serde_json::from_str(&json).unwrap();
        assert_eq!(original, back);
    }
}
