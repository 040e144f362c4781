// src/models/matching.rs
use serde::Serialize;

use crate::models::core::{RecordDraft, SpringRecord};

/// One member of a duplicate group along with its richness score.
#[derive(Debug, Clone, Serialize)]
pub struct GroupMember {
    pub record: SpringRecord,
    pub score: u32,
}

/// Records believed to describe the same physical spring. Members are sorted
/// by score (descending, stable on first-seen order); the first is kept.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup {
    pub members: Vec<GroupMember>,
    pub keep: String,
    pub delete: Vec<String>,
    /// Largest pairwise distance between members with coordinates.
    pub max_spread_meters: Option<f64>,
}

impl DuplicateGroup {
    pub fn keep_record(&self) -> Option<&SpringRecord> {
        self.members
            .iter()
            .map(|m| &m.record)
            .find(|r| r.id == self.keep)
    }
}

/// A draft withheld from insertion because it matches an existing record.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateCandidate {
    pub draft: RecordDraft,
    pub existing_id: String,
}

/// Result of classifying a batch of drafts against the current corpus.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClassifiedBatch {
    pub new: Vec<RecordDraft>,
    pub duplicates: Vec<DuplicateCandidate>,
}
