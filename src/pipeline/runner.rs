//! Item pipeline — drives the full utterance → items flow.
//!
//! # Pipeline flow
//!
//! ```text
//! utterance
//!   └─▶ UtteranceSegmenter::segment        raw segments
//!         └─▶ ItemFilter::clean            survivors
//!               └─▶ [catalog gate]         (optional, config-driven)
//!                     └─▶ QuantityExtractor::extract
//!                           └─▶ FuzzyCatalogMatcher::normalize
//!                                 └─▶ dedup vs live list + within batch
//! ```
//!
//! Parsing never fails: malformed input yields a [`PipelineOutcome`] with
//! `recognized_none` set, which the caller turns into a corrective prompt.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::catalog::{CatalogLookup, FuzzyCatalogMatcher};
use crate::parse::{ItemFilter, QuantityExtractor, UtteranceSegmenter};

use super::item::{ItemId, PipelineOutcome, ShoppingItem};

// ---------------------------------------------------------------------------
// ItemPipeline
// ---------------------------------------------------------------------------

/// Converts accumulated utterances into deduplicated [`ShoppingItem`]s.
///
/// ```rust
/// use voice_list::pipeline::ItemPipeline;
///
/// let pipeline = ItemPipeline::without_catalog();
/// let outcome = pipeline.parse_utterance("i need milk and eggs", &[]);
/// assert_eq!(outcome.added.len(), 2);
/// ```
pub struct ItemPipeline {
    segmenter: UtteranceSegmenter,
    filter: ItemFilter,
    quantities: QuantityExtractor,
    matcher: FuzzyCatalogMatcher,
    catalog: Option<Arc<dyn CatalogLookup>>,
    /// When set, segments that fail the catalog membership check are dropped.
    require_catalog_match: bool,
    next_id: AtomicU64,
}

impl ItemPipeline {
    /// Catalog-backed pipeline with default English rule tables.
    pub fn new(catalog: Arc<dyn CatalogLookup>, require_catalog_match: bool) -> Self {
        Self {
            segmenter: UtteranceSegmenter::default(),
            filter: ItemFilter::default(),
            quantities: QuantityExtractor::default(),
            matcher: FuzzyCatalogMatcher::new(Arc::clone(&catalog)),
            catalog: Some(catalog),
            require_catalog_match,
            next_id: AtomicU64::new(1),
        }
    }

    /// Catalog-optional pipeline: all survivors pass through, spelling is
    /// only capitalized.
    pub fn without_catalog() -> Self {
        Self {
            segmenter: UtteranceSegmenter::default(),
            filter: ItemFilter::default(),
            quantities: QuantityExtractor::default(),
            matcher: FuzzyCatalogMatcher::without_catalog(),
            catalog: None,
            require_catalog_match: false,
            next_id: AtomicU64::new(1),
        }
    }

    /// Parse one utterance and return the items that are new relative to
    /// `existing`.
    pub fn parse_utterance(&self, utterance: &str, existing: &[ShoppingItem]) -> PipelineOutcome {
        let segments = self.segmenter.segment(utterance);
        log::debug!("pipeline: {utterance:?} -> {} raw segments", segments.len());

        // Clean + filter, optional catalog gating.
        let mut survivors = Vec::new();
        for segment in segments {
            let Some(cleaned) = self.filter.clean(&segment) else {
                continue;
            };
            if self.require_catalog_match {
                let gate = self
                    .catalog
                    .as_ref()
                    .is_some_and(|c| c.contains(&self.quantities.extract(&cleaned).name));
                if !gate {
                    log::debug!("pipeline: {cleaned:?} rejected by catalog gate");
                    continue;
                }
            }
            survivors.push(cleaned);
        }

        if survivors.is_empty() {
            log::debug!("pipeline: no items recognized in {utterance:?}");
            return PipelineOutcome {
                added: Vec::new(),
                duplicate_count: 0,
                recognized_none: true,
            };
        }

        // Quantity extraction + spelling normalization + dedup.
        let mut seen: HashSet<String> = existing
            .iter()
            .map(|item| item.name.to_lowercase())
            .collect();

        let mut added = Vec::new();
        let mut duplicate_count = 0usize;

        for survivor in survivors {
            let extracted = self.quantities.extract(&survivor);
            let name = self.matcher.normalize(&extracted.name);
            if name.is_empty() {
                continue;
            }

            if !seen.insert(name.to_lowercase()) {
                duplicate_count += 1;
                continue;
            }

            added.push(ShoppingItem {
                id: ItemId(self.next_id.fetch_add(1, Ordering::Relaxed)),
                name,
                completed: false,
                quantity: extracted.quantity,
                unit: extracted.unit,
            });
        }

        log::debug!(
            "pipeline: {} added, {} duplicates",
            added.len(),
            duplicate_count
        );

        PipelineOutcome {
            added,
            duplicate_count,
            recognized_none: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
