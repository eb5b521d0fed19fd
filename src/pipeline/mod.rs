//! Item pipeline module — utterance in, deduplicated shopping items out.
//!
//! # Architecture
//!
//! ```text
//! utterance (from TranscriptAccumulator or typed entry)
//!        │
//!        ▼
//! ItemPipeline::parse_utterance(utterance, existing_list)
//!        │
//!        ├─ segment → filter → extract quantity → normalize spelling
//!        └─ dedup against the live list and within the batch
//!        │
//!        ▼
//! PipelineOutcome { added, duplicate_count, recognized_none }
//! ```
//!
//! The outcome is always structural — the caller decides whether to show a
//! success notification, an "already on your list" note, or a corrective
//! "didn't catch any items" prompt.

pub mod item;
pub mod runner;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use item::{ItemId, PipelineOutcome, ShoppingItem};
pub use runner::ItemPipeline;
