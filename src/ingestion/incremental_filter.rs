// src/ingestion/incremental_filter.rs - Ingestion-time duplicate check
use std::collections::HashMap;

use crate::matching::similarity::{PreparedRecord, SimilarityMatcher};
use crate::matching::spatial::SpatialIndex;
use crate::models::core::{RecordDraft, SpringRecord};
use crate::models::matching::{ClassifiedBatch, DuplicateCandidate};
use crate::utils::progress_bars::logging::{DedupLogger, DedupPhase};

/// Lookup structures over an existing corpus, built once per batch.
pub struct IncrementalFilter<'a> {
    existing: &'a [SpringRecord],
    prepared: Vec<PreparedRecord>,
    exact_index: HashMap<(String, String), usize>,
    spatial_index: SpatialIndex,
    matcher: SimilarityMatcher,
}

impl<'a> IncrementalFilter<'a> {
    pub fn new(existing: &'a [SpringRecord], matcher: SimilarityMatcher) -> Self {
        let prepared: Vec<PreparedRecord> =
            existing.iter().map(PreparedRecord::from_matchable).collect();

        let mut exact_index = HashMap::new();
        for (i, p) in prepared.iter().enumerate() {
            if let Some(key) = p.exact_key() {
                // earliest record wins on collisions
                exact_index.entry(key).or_insert(i);
            }
        }

        let spatial_index = SpatialIndex::from_points(
            prepared.iter().enumerate().map(|(i, p)| (i, p.coordinates)),
            matcher.threshold_deg,
        );

        Self {
            existing,
            prepared,
            exact_index,
            spatial_index,
            matcher,
        }
    }

    /// Id of the existing record this draft duplicates, if any.
    ///
    /// Only the draft's own grid cell is searched after the exact lookup
    /// misses, so a duplicate just across a cell edge is accepted as new.
    pub fn find_existing_match(&self, draft: &RecordDraft) -> Option<&'a str> {
        let existing: &'a [SpringRecord] = self.existing;
        let candidate = PreparedRecord::from_matchable(draft);

        if let Some(key) = candidate.exact_key() {
            if let Some(&idx) = self.exact_index.get(&key) {
                return Some(existing[idx].id.as_str());
            }
        }

        let (lat, lng) = candidate.coordinates?;
        self.spatial_index
            .same_cell(lat, lng)
            .iter()
            .find(|&&idx| self.matcher.match_prepared(&candidate, &self.prepared[idx]).is_some())
            .map(|&idx| existing[idx].id.as_str())
    }
}

/// Splits `candidates` into new drafts and drafts that duplicate an existing
/// record. Candidates are not compared with each other.
pub fn classify_candidates(
    candidates: Vec<RecordDraft>,
    existing: &[SpringRecord],
    matcher: &SimilarityMatcher,
) -> ClassifiedBatch {
    let logger = DedupLogger::new(DedupPhase::Classify);
    logger.log_phase(
        "Building lookup indexes",
        Some(&format!("{} existing records", existing.len())),
    );
    let filter = IncrementalFilter::new(existing, *matcher);

    let mut batch = ClassifiedBatch::default();
    for draft in candidates {
        match filter.find_existing_match(&draft) {
            Some(existing_id) => {
                logger.log_rejection(&draft.name, &draft.state, existing_id);
                batch.duplicates.push(DuplicateCandidate {
                    existing_id: existing_id.to_string(),
                    draft,
                });
            }
            None => batch.new.push(draft),
        }
    }

    logger.log_classification(batch.new.len(), batch.duplicates.len());
    batch
}
