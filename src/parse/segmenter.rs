//! Utterance segmentation — turns one accumulated utterance into candidate
//! item phrases.
//!
//! The splitting is deliberately layered: filler phrases are stripped first,
//! then each separator family is applied in a fixed order to all current
//! fragments.  One combined pattern would be shorter but the ordering would
//! be implicit and individual rules untestable.  A compound-phrase table
//! keeps known two-word grocery names ("peanut butter", "ice cream") intact
//! when the word-level fallback kicks in.
//!
//! All word tables live in [`SegmenterRules`] so a locale swap never touches
//! the algorithm.

// ---------------------------------------------------------------------------
// SegmenterRules
// ---------------------------------------------------------------------------

/// Immutable word tables consumed by [`UtteranceSegmenter`].
///
/// `Default` provides the English tables; construct your own for another
/// locale.
#[derive(Debug, Clone)]
pub struct SegmenterRules {
    /// Command/filler phrases stripped wherever they occur ("i need",
    /// "get me", "put on the list", …).
    pub fillers: Vec<String>,
    /// Conjunction separators ("and", "also", "plus", …).
    pub conjunctions: Vec<String>,
    /// Sequence-word separators ("then", "next", "after that").
    pub sequence_words: Vec<String>,
    /// Quantity-transition separators ("some", "a few", "couple of").
    pub quantity_transitions: Vec<String>,
    /// Two-word phrases that must survive word-level splitting.
    pub compounds: Vec<String>,
}

const FILLERS: &[&str] = &[
    "i need",
    "i want",
    "we need",
    "can you add",
    "please add",
    "get me",
    "pick up",
    "put on the list",
    "on the list",
    "don't forget",
    "buy",
    "grab",
];

const CONJUNCTIONS: &[&str] = &["and", "also", "plus", "as well as", "along with"];

const SEQUENCE_WORDS: &[&str] = &["then", "next", "after that"];

const QUANTITY_TRANSITIONS: &[&str] = &["some", "a few", "couple of"];

const COMPOUNDS: &[&str] = &[
    "ice cream",
    "peanut butter",
    "orange juice",
    "apple juice",
    "olive oil",
    "sour cream",
    "cream cheese",
    "cottage cheese",
    "toilet paper",
    "paper towels",
    "hot dogs",
    "green beans",
    "bell pepper",
    "maple syrup",
    "baking soda",
    "chicken breast",
    "ground beef",
    "trail mix",
];

fn to_owned_vec(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for SegmenterRules {
    fn default() -> Self {
        Self {
            fillers: to_owned_vec(FILLERS),
            conjunctions: to_owned_vec(CONJUNCTIONS),
            sequence_words: to_owned_vec(SEQUENCE_WORDS),
            quantity_transitions: to_owned_vec(QUANTITY_TRANSITIONS),
            compounds: to_owned_vec(COMPOUNDS),
        }
    }
}

// ---------------------------------------------------------------------------
// UtteranceSegmenter
// ---------------------------------------------------------------------------

/// Splits a raw utterance into ordered candidate item phrases.
///
/// Output fragments are raw — cleanup and non-item filtering happen in
/// [`ItemFilter`](crate::parse::ItemFilter).
///
/// ```rust
/// use voice_list::parse::UtteranceSegmenter;
///
/// let seg = UtteranceSegmenter::default();
/// assert_eq!(seg.segment("apples and bananas"), vec!["apples", "bananas"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct UtteranceSegmenter {
    rules: SegmenterRules,
}

impl UtteranceSegmenter {
    pub fn new(rules: SegmenterRules) -> Self {
        Self { rules }
    }

    /// Segment `utterance` into candidate item phrases, in utterance order.
    pub fn segment(&self, utterance: &str) -> Vec<String> {
        let text = utterance.to_lowercase();
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }

        // 1. Strip filler phrases (leading and embedded).
        let mut words = tokenize(text);
        for filler in &self.rules.fillers {
            words = remove_phrase(words, filler);
        }

        // 2. Separator families, in order: conjunctions, sequence words,
        //    quantity transitions.
        let mut fragments = vec![words];
        for family in [
            &self.rules.conjunctions,
            &self.rules.sequence_words,
            &self.rules.quantity_transitions,
        ] {
            for sep in family {
                fragments = split_all_on_phrase(fragments, sep);
            }
        }

        // 3. Punctuation (commas, semicolons, period runs) — token-internal.
        fragments = fragments
            .into_iter()
            .flat_map(split_on_punctuation)
            .collect();

        // 4. Lookahead split before a token that starts a new numeric quantity.
        fragments = fragments.into_iter().flat_map(split_before_digit).collect();

        fragments.retain(|f| !f.is_empty());

        // 5. Single multi-word fragment left: fall back to word-level
        //    tokenization, preserving known compounds.  A fragment that opens
        //    with a quantity ("2 pounds of chicken", "a dozen eggs") is kept
        //    whole — quantity extraction needs the phrase intact.
        if fragments.len() == 1 && fragments[0].len() > 1 && !starts_with_quantity(&fragments[0]) {
            let only = fragments.remove(0);
            fragments = self.split_words_with_compounds(&only);
        }

        fragments
            .into_iter()
            .map(|words| words.join(" "))
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Word-level split with greedy left-to-right compound preservation.
    fn split_words_with_compounds(&self, words: &[String]) -> Vec<Vec<String>> {
        let mut out = Vec::new();
        let mut i = 0;
        while i < words.len() {
            if i + 1 < words.len() {
                let pair = format!("{} {}", clean_token(&words[i]), clean_token(&words[i + 1]));
                if self.rules.compounds.iter().any(|c| *c == pair) {
                    out.push(vec![words[i].clone(), words[i + 1].clone()]);
                    i += 2;
                    continue;
                }
            }
            out.push(vec![words[i].clone()]);
            i += 1;
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Token helpers
// ---------------------------------------------------------------------------

fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(|w| w.to_string()).collect()
}

/// A token stripped of surrounding punctuation, for table comparisons only.
fn clean_token(token: &str) -> String {
    token
        .trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
        .to_string()
}

/// Remove every occurrence of the (possibly multi-word) `phrase` from `words`.
fn remove_phrase(words: Vec<String>, phrase: &str) -> Vec<String> {
    let phrase_words: Vec<&str> = phrase.split_whitespace().collect();
    if phrase_words.is_empty() {
        return words;
    }

    let mut out = Vec::with_capacity(words.len());
    let mut i = 0;
    while i < words.len() {
        if matches_at(&words, i, &phrase_words) {
            i += phrase_words.len();
        } else {
            out.push(words[i].clone());
            i += 1;
        }
    }
    out
}

/// Split every fragment at each occurrence of `phrase`, dropping the phrase.
fn split_all_on_phrase(fragments: Vec<Vec<String>>, phrase: &str) -> Vec<Vec<String>> {
    let phrase_words: Vec<&str> = phrase.split_whitespace().collect();
    if phrase_words.is_empty() {
        return fragments;
    }

    let mut out = Vec::with_capacity(fragments.len());
    for fragment in fragments {
        let mut current = Vec::new();
        let mut i = 0;
        while i < fragment.len() {
            if matches_at(&fragment, i, &phrase_words) {
                out.push(std::mem::take(&mut current));
                i += phrase_words.len();
            } else {
                current.push(fragment[i].clone());
                i += 1;
            }
        }
        out.push(current);
    }
    out.into_iter().filter(|f| !f.is_empty()).collect()
}

fn matches_at(words: &[String], at: usize, phrase_words: &[&str]) -> bool {
    if at + phrase_words.len() > words.len() {
        return false;
    }
    phrase_words
        .iter()
        .enumerate()
        .all(|(k, pw)| clean_token(&words[at + k]) == *pw)
}

/// Split a fragment on commas, semicolons, and period runs carried inside
/// tokens ("milk," / "eggs..").
fn split_on_punctuation(fragment: Vec<String>) -> Vec<Vec<String>> {
    let mut out = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for token in fragment {
        let mut piece = String::new();
        for ch in token.chars() {
            if ch == ',' || ch == ';' || ch == '.' {
                if !piece.is_empty() {
                    current.push(std::mem::take(&mut piece));
                }
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            } else {
                piece.push(ch);
            }
        }
        if !piece.is_empty() {
            current.push(piece);
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

const WORD_QUANTITY_LEADS: &[&str] = &[
    "a", "an", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
];

/// True when a fragment opens with a numeric digit, a word quantity, or an
/// article that commonly precedes one ("a dozen …").
fn starts_with_quantity(fragment: &[String]) -> bool {
    let Some(first) = fragment.first() else {
        return false;
    };
    if first.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return true;
    }
    WORD_QUANTITY_LEADS.contains(&clean_token(first).as_str())
}

/// Start a new fragment before any token that begins a numeric quantity.
fn split_before_digit(fragment: Vec<String>) -> Vec<Vec<String>> {
    let mut out = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for token in fragment {
        let starts_numeric = token.chars().next().is_some_and(|c| c.is_ascii_digit());
        if starts_numeric && !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
        current.push(token);
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn seg() -> UtteranceSegmenter {
        UtteranceSegmenter::default()
    }

    // ---- conjunctions / sequence words ---

    #[test]
    fn splits_on_and() {
        assert_eq!(seg().segment("apples and bananas"), vec!["apples", "bananas"]);
    }

    #[test]
    fn splits_on_also_and_plus() {
        assert_eq!(
            seg().segment("milk also bread plus butter"),
            vec!["milk", "bread", "butter"]
        );
    }

    #[test]
    fn splits_on_multiword_separator() {
        assert_eq!(
            seg().segment("rice as well as noodles"),
            vec!["rice", "noodles"]
        );
    }

    #[test]
    fn splits_on_sequence_words() {
        assert_eq!(
            seg().segment("milk then eggs after that cheese"),
            vec!["milk", "eggs", "cheese"]
        );
    }

    // ---- quantity transitions ---

    #[test]
    fn some_acts_as_separator() {
        assert_eq!(seg().segment("milk some bread"), vec!["milk", "bread"]);
    }

    // ---- punctuation ---

    #[test]
    fn splits_on_commas_and_semicolons() {
        assert_eq!(
            seg().segment("milk, eggs; cheese"),
            vec!["milk", "eggs", "cheese"]
        );
    }

    #[test]
    fn splits_on_period_runs() {
        assert_eq!(seg().segment("milk... eggs"), vec!["milk", "eggs"]);
    }

    // ---- digit lookahead ---

    #[test]
    fn splits_before_new_numeric_quantity() {
        assert_eq!(
            seg().segment("2 apples 3 bananas"),
            vec!["2 apples", "3 bananas"]
        );
    }

    #[test]
    fn leading_digit_does_not_split() {
        assert_eq!(seg().segment("2 apples"), vec!["2 apples"]);
    }

    // ---- fillers ---

    #[test]
    fn strips_leading_filler() {
        assert_eq!(seg().segment("i need milk and eggs"), vec!["milk", "eggs"]);
    }

    #[test]
    fn strips_embedded_filler() {
        assert_eq!(
            seg().segment("milk and can you add eggs"),
            vec!["milk", "eggs"]
        );
    }

    // ---- compound fallback ---

    #[test]
    fn word_fallback_preserves_compounds() {
        assert_eq!(
            seg().segment("peanut butter jelly"),
            vec!["peanut butter", "jelly"]
        );
    }

    #[test]
    fn compound_survives_separator_splitting() {
        assert_eq!(
            seg().segment("2 apples, a dozen eggs and peanut butter"),
            vec!["2 apples", "a dozen eggs", "peanut butter"]
        );
    }

    #[test]
    fn quantity_leading_fragment_is_kept_whole() {
        assert_eq!(
            seg().segment("2 pounds of chicken"),
            vec!["2 pounds of chicken"]
        );
        assert_eq!(seg().segment("a dozen eggs"), vec!["a dozen eggs"]);
    }

    #[test]
    fn single_word_is_left_alone() {
        assert_eq!(seg().segment("milk"), vec!["milk"]);
    }

    // ---- normalization / degenerate input ---

    #[test]
    fn lowercases_input() {
        assert_eq!(seg().segment("Apples AND Bananas"), vec!["apples", "bananas"]);
    }

    #[test]
    fn empty_input_yields_no_segments() {
        assert!(seg().segment("").is_empty());
        assert!(seg().segment("   ").is_empty());
    }

    #[test]
    fn separator_only_input_yields_no_segments() {
        assert!(seg().segment("and also then").is_empty());
    }
}
