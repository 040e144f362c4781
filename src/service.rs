// src/service.rs - Entry points used by the ingestion and cleanup runs
use chrono::Utc;
use std::time::Instant;
use uuid::Uuid;

use crate::clustering::{exceeds_spread_limit, resolve_duplicate_groups};
use crate::ingestion::classify_candidates;
use crate::matching::SimilarityMatcher;
use crate::merge::merge_duplicate_groups;
use crate::models::core::RecordDraft;
use crate::models::matching::{ClassifiedBatch, DuplicateGroup};
use crate::models::stats_models::{CleanupStats, IngestionStats, MergeOutcome};
use crate::repository::{RecordRepository, RepositoryError};
use crate::snapshot::RecordSnapshot;
use crate::utils::dedup_config::DedupConfig;
use crate::utils::progress_bars::logging::{DedupLogger, DedupPhase};

/// Ties a record store to the dedup engine for one run. Owns the snapshot
/// of all records; every write made through the service invalidates it.
/// Writes made behind its back need [`DedupService::invalidate_snapshot_cache`].
pub struct DedupService<R: RecordRepository> {
    repository: R,
    snapshot: RecordSnapshot,
    matcher: SimilarityMatcher,
    delete_batch_size: usize,
}

impl<R: RecordRepository> DedupService<R> {
    pub fn new(repository: R, config: &DedupConfig) -> Self {
        Self {
            repository,
            snapshot: RecordSnapshot::new(),
            matcher: SimilarityMatcher::new(config.proximity_threshold_deg),
            delete_batch_size: config.delete_batch_size,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn snapshot(&self) -> &RecordSnapshot {
        &self.snapshot
    }

    /// Splits drafts into new ones and ones that duplicate a stored record.
    pub async fn classify(
        &mut self,
        candidates: Vec<RecordDraft>,
    ) -> Result<ClassifiedBatch, RepositoryError> {
        let existing = self.snapshot.get_or_fetch(&self.repository).await?;
        Ok(classify_candidates(candidates, &existing, &self.matcher))
    }

    pub async fn find_duplicate_groups(&mut self) -> Result<Vec<DuplicateGroup>, RepositoryError> {
        let records = self.snapshot.get_or_fetch(&self.repository).await?;
        Ok(resolve_duplicate_groups(&records, &self.matcher))
    }

    /// Deletes the losers of each group. The snapshot is dropped afterwards
    /// even if the store failed partway, since some deletes may have landed.
    pub async fn merge(&mut self, groups: &[DuplicateGroup]) -> Result<MergeOutcome, RepositoryError> {
        let result = merge_duplicate_groups(&self.repository, groups, self.delete_batch_size).await;
        self.snapshot.invalidate();
        result
    }

    pub fn invalidate_snapshot_cache(&mut self) {
        self.snapshot.invalidate();
    }

    /// Classifies drafts and inserts the new ones unless `dry_run`.
    pub async fn ingest(
        &mut self,
        candidates: Vec<RecordDraft>,
        dry_run: bool,
    ) -> Result<IngestionStats, RepositoryError> {
        let run_id = Uuid::new_v4().to_string();
        let run_timestamp = Utc::now().naive_utc();
        let logger = DedupLogger::new(DedupPhase::Ingest);
        logger.log_start(&run_id, dry_run);

        let candidate_count = candidates.len();
        let classify_start = Instant::now();
        let batch = self.classify(candidates).await?;
        let classification_time = classify_start.elapsed().as_secs_f64();

        let inserted_ids = if dry_run || batch.new.is_empty() {
            Vec::new()
        } else {
            logger.log_phase("Inserting", Some(&format!("{} new records", batch.new.len())));
            let result = self.repository.insert_drafts(&batch.new).await;
            self.snapshot.invalidate();
            result?
        };

        let stats = IngestionStats {
            run_id,
            run_timestamp,
            dry_run,
            candidates: candidate_count,
            accepted_new: batch.new.len(),
            rejected_duplicates: batch.duplicates.len(),
            inserted: inserted_ids.len(),
            inserted_ids,
            classification_time,
            rejections: batch.duplicates,
        };
        logger.log_completion(&format!(
            "{} candidates, {} new, {} duplicates, {} inserted",
            stats.candidates, stats.accepted_new, stats.rejected_duplicates, stats.inserted
        ));
        Ok(stats)
    }

    /// Finds duplicate groups across the whole store and merges them unless
    /// `dry_run`.
    pub async fn cleanup(&mut self, dry_run: bool) -> Result<CleanupStats, RepositoryError> {
        let run_id = Uuid::new_v4().to_string();
        let run_timestamp = Utc::now().naive_utc();
        let logger = DedupLogger::new(DedupPhase::Resolve);
        logger.log_start(&run_id, dry_run);

        let resolve_start = Instant::now();
        let records = self.snapshot.get_or_fetch(&self.repository).await?;
        logger.log_data_loaded(records.len(), "listing");
        let groups = resolve_duplicate_groups(&records, &self.matcher);
        let resolution_time = resolve_start.elapsed().as_secs_f64();
        let records_slated_for_deletion: usize = groups.iter().map(|g| g.delete.len()).sum();
        let wide_groups = groups
            .iter()
            .filter(|g| exceeds_spread_limit(g, &self.matcher))
            .count();

        let merge_start = Instant::now();
        let outcome = if dry_run {
            logger.log_phase("Dry run", Some("skipping deletions"));
            MergeOutcome::default()
        } else {
            self.merge(&groups).await?
        };
        let merge_time = merge_start.elapsed().as_secs_f64();

        let stats = CleanupStats {
            run_id,
            run_timestamp,
            dry_run,
            total_records: records.len(),
            groups_found: groups.len(),
            wide_groups,
            records_slated_for_deletion,
            records_deleted: outcome.deleted,
            groups_skipped: outcome.skipped.len(),
            resolution_time,
            merge_time,
            groups,
            skipped: outcome.skipped,
        };
        logger.log_completion(&format!(
            "{} groups, {} slated for deletion, {} deleted, {} groups skipped",
            stats.groups_found,
            stats.records_slated_for_deletion,
            stats.records_deleted,
            stats.groups_skipped
        ));
        Ok(stats)
    }
}
