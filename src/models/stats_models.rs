// src/models/stats_models.rs
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::models::matching::{DuplicateCandidate, DuplicateGroup};

/// Why a duplicate group was left untouched by the merge step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    MalformedId(String),
    KeepListedForDeletion(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MalformedId(id) => write!(f, "malformed id '{}'", id),
            SkipReason::KeepListedForDeletion(id) => {
                write!(f, "keep id '{}' is also listed for deletion", id)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedGroup {
    pub keep: String,
    pub delete: Vec<String>,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MergeOutcome {
    pub deleted: usize,
    pub groups_merged: usize,
    pub skipped: Vec<SkippedGroup>,
}

/// Summary of a cleanup run, written out as the audit report.
#[derive(Debug, Clone, Serialize)]
pub struct CleanupStats {
    pub run_id: String,
    pub run_timestamp: NaiveDateTime,
    pub dry_run: bool,
    pub total_records: usize,
    pub groups_found: usize,
    /// Groups spread wider than proximity matching alone allows.
    pub wide_groups: usize,
    pub records_slated_for_deletion: usize,
    pub records_deleted: usize,
    pub groups_skipped: usize,
    pub resolution_time: f64,
    pub merge_time: f64,
    pub groups: Vec<DuplicateGroup>,
    pub skipped: Vec<SkippedGroup>,
}

/// Summary of an ingestion run: every rejection carries the id it matched.
#[derive(Debug, Clone, Serialize)]
pub struct IngestionStats {
    pub run_id: String,
    pub run_timestamp: NaiveDateTime,
    pub dry_run: bool,
    pub candidates: usize,
    pub accepted_new: usize,
    pub rejected_duplicates: usize,
    pub inserted: usize,
    pub inserted_ids: Vec<String>,
    pub classification_time: f64,
    pub rejections: Vec<DuplicateCandidate>,
}
