//! Voice List — speech-driven shopping list building.
//!
//! Turns spoken (or typed) natural language into structured shopping list
//! items:
//!
//! ```text
//! "2 apples, a dozen eggs and some milk"
//!         │
//!         ▼
//! RecognitionSession ──▶ TranscriptAccumulator ──▶ ItemPipeline
//!  (state machine)          (debounce)              │
//!                                                   ▼
//!                               segment → filter → quantity → catalog
//!                                                   │
//!                                                   ▼
//!                       [2× Apples]  [12× Eggs]  [Milk]
//! ```
//!
//! # Modules
//!
//! - [`config`] — settings structs, TOML persistence, platform paths.
//! - [`recognition`] — backend abstraction, session state machine, debounce.
//! - [`parse`] — utterance segmentation, noise filtering, quantity parsing.
//! - [`catalog`] — grocery catalog with exact and fuzzy name lookup.
//! - [`pipeline`] — end-to-end utterance-to-items orchestration.

pub mod catalog;
pub mod config;
pub mod parse;
pub mod pipeline;
pub mod recognition;
