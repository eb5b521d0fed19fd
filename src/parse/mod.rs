//! Utterance parsing — from one freeform utterance to quantity-tagged
//! candidate items.
//!
//! # Architecture
//!
//! ```text
//! "i need 2 apples, a dozen eggs and peanut butter"
//!        │
//!        ▼
//! UtteranceSegmenter  — filler strip, layered separator splits, compounds
//!        │    ["2 apples", "a dozen eggs", "peanut butter"]
//!        ▼
//! ItemFilter          — article/punctuation cleanup, non-item vocabulary
//!        │
//!        ▼
//! QuantityExtractor   — {2, apples} {12, eggs} {-, peanut butter}
//! ```
//!
//! All word tables ([`SegmenterRules`], [`FilterRules`], [`QuantityTables`])
//! are immutable data passed in at construction, so a locale swap never
//! touches the algorithms.

pub mod filter;
pub mod quantity;
pub mod segmenter;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use filter::{FilterRules, ItemFilter};
pub use quantity::{ExtractedItem, QuantityExtractor, QuantityTables};
pub use segmenter::{SegmenterRules, UtteranceSegmenter};
