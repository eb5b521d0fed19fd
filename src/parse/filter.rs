//! Non-item filtering — decides which raw segments survive as candidate
//! items.
//!
//! Each segment is normalized (article stripping, trailing punctuation,
//! whitespace collapse) and then discarded when it is too short or exactly
//! matches the non-item vocabulary (function words, speech verbs, standalone
//! quantity words, closing phrases).
//!
//! The vocabulary lives in [`FilterRules`] so it can be swapped per locale
//! without touching the algorithm.

// ---------------------------------------------------------------------------
// FilterRules
// ---------------------------------------------------------------------------

/// Immutable word tables consumed by [`ItemFilter`].
#[derive(Debug, Clone)]
pub struct FilterRules {
    /// Articles stripped from the front of a segment.
    pub articles: Vec<String>,
    /// Tokens that mark a word quantity — a leading article followed by one
    /// of these is left alone ("a dozen eggs").
    pub quantity_tokens: Vec<String>,
    /// Lowercased strings that are never items (exact whole-segment match).
    pub non_items: Vec<String>,
}

const ARTICLES: &[&str] = &["a", "an", "the"];

const QUANTITY_TOKENS: &[&str] = &[
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "dozen",
    "pair", "few", "couple", "half",
];

const NON_ITEMS: &[&str] = &[
    // articles / conjunctions / prepositions
    "a", "an", "the", "and", "or", "but", "also", "plus", "with", "of", "for", "to", "in", "on",
    "at", "from", "by",
    // pronouns
    "i", "me", "my", "we", "us", "our", "you", "your", "it", "this", "that", "these", "those",
    "they", "them",
    // auxiliary / speech verbs
    "is", "am", "are", "was", "were", "be", "been", "do", "does", "did", "have", "has", "had",
    "can", "could", "will", "would", "should", "need", "needs", "want", "wants", "get", "got",
    "buy", "add", "put", "say", "said", "think",
    // filler interjections
    "um", "uh", "er", "hmm", "oh", "okay", "ok", "yeah", "yes", "no", "well", "like", "just",
    "really", "actually", "maybe", "please", "thanks", "thank",
    // standalone quantity words
    "some", "few", "couple", "several", "many", "much", "more", "lot", "lots", "one", "two",
    "three", "four", "five", "six", "seven", "eight", "nine", "ten", "dozen", "pair", "half",
    // temporal words
    "today", "tomorrow", "now", "later", "soon", "tonight",
    // closing phrases
    "that's all", "that's it", "that is it", "that is all", "i'm done", "im done", "done",
    "finished", "stop", "all",
];

fn to_owned_vec(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            articles: to_owned_vec(ARTICLES),
            quantity_tokens: to_owned_vec(QUANTITY_TOKENS),
            non_items: to_owned_vec(NON_ITEMS),
        }
    }
}

// ---------------------------------------------------------------------------
// ItemFilter
// ---------------------------------------------------------------------------

/// Cleans raw segments and rejects the ones that cannot be items.
///
/// ```rust
/// use voice_list::parse::ItemFilter;
///
/// let filter = ItemFilter::default();
/// assert_eq!(filter.clean("the milk"), Some("milk".to_string()));
/// assert_eq!(filter.clean("um"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    rules: FilterRules,
}

/// Minimum surviving length in characters.
const MIN_ITEM_LEN: usize = 2;

impl ItemFilter {
    pub fn new(rules: FilterRules) -> Self {
        Self { rules }
    }

    /// Clean one segment; `None` means the segment is not an item.
    pub fn clean(&self, segment: &str) -> Option<String> {
        let mut text = segment.trim().to_string();
        if text.is_empty() {
            return None;
        }

        text = self.strip_leading_article(&text);
        text = text
            .trim_end_matches(['.', ',', ';', '!', '?'])
            .trim()
            .to_string();
        text = collapse_whitespace(&text);

        if text.chars().count() < MIN_ITEM_LEN {
            return None;
        }

        let lower = text.to_lowercase();
        if self.rules.non_items.iter().any(|w| *w == lower) {
            return None;
        }

        Some(text)
    }

    /// Strip one leading article, unless it introduces a quantity
    /// ("a dozen eggs", "a 2 liter bottle").
    fn strip_leading_article(&self, text: &str) -> String {
        let mut words = text.split_whitespace();
        let Some(first) = words.next() else {
            return text.to_string();
        };
        let Some(second) = words.next() else {
            return text.to_string();
        };

        let first_lower = first.to_lowercase();
        if !self.rules.articles.iter().any(|a| *a == first_lower) {
            return text.to_string();
        }

        let second_lower = second.to_lowercase();
        let introduces_quantity = second.chars().next().is_some_and(|c| c.is_ascii_digit())
            || self.rules.quantity_tokens.iter().any(|q| *q == second_lower);
        if introduces_quantity {
            return text.to_string();
        }

        text[first.len()..].trim_start().to_string()
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
