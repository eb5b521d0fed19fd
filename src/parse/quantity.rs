//! Quantity and unit extraction from candidate item phrases.
//!
//! Patterns are tried in priority order, first match wins:
//!
//! 1. numeric-leading — `"2 apples"`, `"1.5lb chicken"`
//! 2. word quantity   — `"two pounds of chicken"`
//! 3. special phrase  — `"a dozen eggs"`, `"a pair of gloves"`
//! 4. no match        — the whole segment is the item name
//!
//! Extraction is idempotent on names without a quantity prefix: feeding an
//! extracted name back through yields the same name and no quantity.

// ---------------------------------------------------------------------------
// QuantityTables
// ---------------------------------------------------------------------------

/// Immutable lookup tables consumed by [`QuantityExtractor`].
#[derive(Debug, Clone)]
pub struct QuantityTables {
    /// Spelled-out quantities ("one" … "ten").
    pub word_quantities: Vec<(String, f64)>,
    /// Fixed quantity phrases ("a dozen" → 12).
    pub special_phrases: Vec<(String, f64)>,
    /// Words accepted as a unit when they follow a quantity.
    pub units: Vec<String>,
}

const WORD_QUANTITIES: &[(&str, f64)] = &[
    ("one", 1.0),
    ("two", 2.0),
    ("three", 3.0),
    ("four", 4.0),
    ("five", 5.0),
    ("six", 6.0),
    ("seven", 7.0),
    ("eight", 8.0),
    ("nine", 9.0),
    ("ten", 10.0),
];

const SPECIAL_PHRASES: &[(&str, f64)] = &[("a dozen", 12.0), ("a pair", 2.0), ("a few", 3.0)];

const UNITS: &[&str] = &[
    "lb", "lbs", "pound", "pounds", "kg", "kilo", "kilos", "g", "gram", "grams", "oz", "ounce",
    "ounces", "gallon", "gallons", "liter", "liters", "litre", "litres", "l", "ml", "cup",
    "cups", "bottle", "bottles", "can", "cans", "box", "boxes", "bag", "bags", "pack", "packs",
    "loaf", "loaves", "stick", "sticks", "bunch", "bunches", "carton", "cartons", "jar", "jars",
];

impl Default for QuantityTables {
    fn default() -> Self {
        Self {
            word_quantities: WORD_QUANTITIES
                .iter()
                .map(|(w, n)| (w.to_string(), *n))
                .collect(),
            special_phrases: SPECIAL_PHRASES
                .iter()
                .map(|(w, n)| (w.to_string(), *n))
                .collect(),
            units: UNITS.iter().map(|u| u.to_string()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// ExtractedItem
// ---------------------------------------------------------------------------

/// Result of quantity extraction on one segment.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedItem {
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    /// The remaining item name (never empty for non-empty input).
    pub name: String,
}

// ---------------------------------------------------------------------------
// QuantityExtractor
// ---------------------------------------------------------------------------

/// Parses a leading quantity and optional unit off an item phrase.
///
/// ```rust
/// use voice_list::parse::QuantityExtractor;
///
/// let q = QuantityExtractor::default();
/// let item = q.extract("2 apples");
/// assert_eq!(item.quantity, Some(2.0));
/// assert_eq!(item.name, "apples");
/// ```
#[derive(Debug, Clone, Default)]
pub struct QuantityExtractor {
    tables: QuantityTables,
}

impl QuantityExtractor {
    pub fn new(tables: QuantityTables) -> Self {
        Self { tables }
    }

    /// Extract a quantity/unit prefix; the whole segment becomes the name
    /// when nothing matches.
    pub fn extract(&self, segment: &str) -> ExtractedItem {
        let segment = segment.trim();

        if let Some(item) = self.try_numeric(segment) {
            return item;
        }
        if let Some(item) = self.try_word_quantity(segment) {
            return item;
        }
        if let Some(item) = self.try_special_phrase(segment) {
            return item;
        }

        ExtractedItem {
            quantity: None,
            unit: None,
            name: segment.to_string(),
        }
    }

    /// `<number>[unit]<rest>` — unit is either letters glued to the number
    /// ("1.5lb") or a following known-unit word ("2 pounds").
    fn try_numeric(&self, segment: &str) -> Option<ExtractedItem> {
        if !segment.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            return None;
        }

        let number_len = segment
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(segment.len());
        let quantity: f64 = segment[..number_len].parse().ok()?;
        let rest = &segment[number_len..];

        // Letters glued to the number are always the unit.
        let (attached_unit, rest) = if rest.starts_with(|c: char| c.is_alphabetic()) {
            let unit_len = rest
                .find(|c: char| !c.is_alphabetic())
                .unwrap_or(rest.len());
            (Some(rest[..unit_len].to_string()), &rest[unit_len..])
        } else {
            (None, rest)
        };

        let (unit, name) = match attached_unit {
            Some(u) => (Some(u), strip_leading_of(rest.trim())),
            None => self.take_unit_word(rest.trim()),
        };

        if name.is_empty() {
            // "2" or "2lb" with no item name — not a usable match.
            return None;
        }

        Some(ExtractedItem {
            quantity: Some(quantity),
            unit,
            name,
        })
    }

    /// `one … ten <rest>`.
    fn try_word_quantity(&self, segment: &str) -> Option<ExtractedItem> {
        let (first, rest) = split_first_word(segment)?;
        let first_lower = first.to_lowercase();
        let (_, quantity) = self
            .tables
            .word_quantities
            .iter()
            .find(|(w, _)| *w == first_lower)?;

        let (unit, name) = self.take_unit_word(rest);
        if name.is_empty() {
            return None;
        }

        Some(ExtractedItem {
            quantity: Some(*quantity),
            unit,
            name,
        })
    }

    /// `"a dozen" / "a pair" / "a few" <rest>`.
    fn try_special_phrase(&self, segment: &str) -> Option<ExtractedItem> {
        let lower = segment.to_lowercase();
        for (phrase, quantity) in &self.tables.special_phrases {
            if let Some(rest) = lower.strip_prefix(phrase.as_str()) {
                if !rest.is_empty() && !rest.starts_with(' ') {
                    continue; // "a pairing knife" must not match "a pair"
                }
                let rest = segment[phrase.len()..].trim();
                let (unit, name) = self.take_unit_word(rest);
                if name.is_empty() {
                    return None;
                }
                return Some(ExtractedItem {
                    quantity: Some(*quantity),
                    unit,
                    name,
                });
            }
        }
        None
    }

    /// Consume a leading known-unit word, then a dangling "of".
    fn take_unit_word(&self, rest: &str) -> (Option<String>, String) {
        if let Some((first, tail)) = split_first_word(rest) {
            let first_lower = first.to_lowercase();
            if self.tables.units.iter().any(|u| *u == first_lower) {
                return (Some(first.to_string()), strip_leading_of(tail));
            }
        }
        (None, strip_leading_of(rest))
    }
}

fn split_first_word(text: &str) -> Option<(&str, &str)> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    match text.split_once(char::is_whitespace) {
        Some((first, rest)) => Some((first, rest.trim_start())),
        None => Some((text, "")),
    }
}

/// "2 pounds of chicken" → name "chicken", not "of chicken".
fn strip_leading_of(text: &str) -> String {
    let text = text.trim();
    if let Some(rest) = text.strip_prefix("of ") {
        return rest.trim_start().to_string();
    }
    if let Some(rest) = text.strip_prefix("Of ") {
        return rest.trim_start().to_string();
    }
    text.to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn q() -> QuantityExtractor {
        QuantityExtractor::default()
    }

    // ---- numeric-leading ---

    #[test]
    fn integer_quantity_no_unit() {
        let item = q().extract("2 apples");
        assert_eq!(item.quantity, Some(2.0));
        assert_eq!(item.unit, None);
        assert_eq!(item.name, "apples");
    }

    #[test]
    fn decimal_quantity_with_attached_unit() {
        let item = q().extract("1.5lb chicken");
        assert_eq!(item.quantity, Some(1.5));
        assert_eq!(item.unit.as_deref(), Some("lb"));
        assert_eq!(item.name, "chicken");
    }

    #[test]
    fn unit_as_separate_known_word() {
        let item = q().extract("2 pounds of chicken breast");
        assert_eq!(item.quantity, Some(2.0));
        assert_eq!(item.unit.as_deref(), Some("pounds"));
        assert_eq!(item.name, "chicken breast");
    }

    #[test]
    fn unknown_word_after_number_is_the_name() {
        let item = q().extract("3 avocados");
        assert_eq!(item.quantity, Some(3.0));
        assert_eq!(item.unit, None);
        assert_eq!(item.name, "avocados");
    }

    #[test]
    fn bare_number_is_not_a_match() {
        let item = q().extract("2");
        assert_eq!(item.quantity, None);
        assert_eq!(item.name, "2");
    }

    // ---- word quantities ---

    #[test]
    fn word_quantity() {
        let item = q().extract("two bananas");
        assert_eq!(item.quantity, Some(2.0));
        assert_eq!(item.name, "bananas");
    }

    #[test]
    fn word_quantity_with_unit() {
        let item = q().extract("two pounds of chicken");
        assert_eq!(item.quantity, Some(2.0));
        assert_eq!(item.unit.as_deref(), Some("pounds"));
        assert_eq!(item.name, "chicken");
    }

    #[test]
    fn bare_word_quantity_is_not_a_match() {
        let item = q().extract("two");
        assert_eq!(item.quantity, None);
        assert_eq!(item.name, "two");
    }

    // ---- special phrases ---

    #[test]
    fn a_dozen() {
        let item = q().extract("a dozen eggs");
        assert_eq!(item.quantity, Some(12.0));
        assert_eq!(item.name, "eggs");
    }

    #[test]
    fn a_pair_and_a_few() {
        assert_eq!(q().extract("a pair of gloves").quantity, Some(2.0));
        assert_eq!(q().extract("a few lemons").quantity, Some(3.0));
        assert_eq!(q().extract("a few lemons").name, "lemons");
    }

    #[test]
    fn special_phrase_requires_word_boundary() {
        let item = q().extract("a pairing knife");
        assert_eq!(item.quantity, None);
        assert_eq!(item.name, "a pairing knife");
    }

    // ---- no match / idempotence ---

    #[test]
    fn plain_name_passes_through() {
        let item = q().extract("milk");
        assert_eq!(item.quantity, None);
        assert_eq!(item.unit, None);
        assert_eq!(item.name, "milk");
    }

    #[test]
    fn extraction_is_idempotent_on_extracted_names() {
        for input in ["2 apples", "a dozen eggs", "1.5lb chicken", "peanut butter"] {
            let once = q().extract(input);
            let twice = q().extract(&once.name);
            assert_eq!(twice.quantity, None, "{input:?} name re-extracted");
            assert_eq!(twice.name, once.name);
        }
    }
}
