// src/merge/merge_executor.rs - Deletes the losing members of duplicate groups
use std::collections::HashSet;

use uuid::Uuid;

use crate::models::matching::DuplicateGroup;
use crate::models::stats_models::{MergeOutcome, SkipReason, SkippedGroup};
use crate::repository::{RecordRepository, RepositoryError};
use crate::utils::progress_bars::logging::{DedupLogger, DedupPhase};

const HYPHENATED_UUID_LEN: usize = 36;

/// Persisted ids are hyphenated UUIDs; anything else is rejected.
pub fn parse_record_id(id: &str) -> Option<Uuid> {
    if id.len() != HYPHENATED_UUID_LEN {
        return None;
    }
    Uuid::try_parse(id).ok()
}

/// Checks every id a group wants deleted. One bad id rejects the whole group.
fn validate_group(
    group: &DuplicateGroup,
    protected: &HashSet<Uuid>,
) -> Result<Vec<Uuid>, SkipReason> {
    let mut targets = Vec::with_capacity(group.delete.len());
    for id in &group.delete {
        let parsed = parse_record_id(id).ok_or_else(|| SkipReason::MalformedId(id.clone()))?;
        if id.eq_ignore_ascii_case(&group.keep) || protected.contains(&parsed) {
            return Err(SkipReason::KeepListedForDeletion(id.clone()));
        }
        if !targets.contains(&parsed) {
            targets.push(parsed);
        }
    }
    Ok(targets)
}

/// Deletes every `delete` id of each valid group. Groups failing validation
/// are reported and left untouched. A store error is returned immediately;
/// groups merged before it stay merged.
pub async fn merge_duplicate_groups<R: RecordRepository>(
    repository: &R,
    groups: &[DuplicateGroup],
    batch_size: usize,
) -> Result<MergeOutcome, RepositoryError> {
    let logger = DedupLogger::new(DedupPhase::Merge);
    let batch_size = batch_size.max(1);

    // no group may delete a record another group keeps
    let protected: HashSet<Uuid> = groups
        .iter()
        .filter_map(|g| parse_record_id(&g.keep))
        .collect();

    let mut outcome = MergeOutcome::default();
    for group in groups {
        let targets = match validate_group(group, &protected) {
            Ok(targets) => targets,
            Err(reason) => {
                logger.log_group_skipped(&group.keep, &reason.to_string());
                outcome.skipped.push(SkippedGroup {
                    keep: group.keep.clone(),
                    delete: group.delete.clone(),
                    reason,
                });
                continue;
            }
        };

        let mut deleted_in_group = 0;
        for chunk in targets.chunks(batch_size) {
            deleted_in_group += repository.delete_by_ids(chunk).await?;
        }
        if deleted_in_group < targets.len() {
            logger.log_warning(&format!(
                "Group kept by {}: {} of {} records were already gone",
                group.keep,
                targets.len() - deleted_in_group,
                targets.len()
            ));
        }
        logger.log_debug(&format!(
            "Merged group kept by {}: deleted {}",
            group.keep, deleted_in_group
        ));
        outcome.deleted += deleted_in_group;
        outcome.groups_merged += 1;
    }

    logger.log_completion(&format!(
        "{} records deleted across {} groups, {} groups skipped",
        outcome.deleted,
        outcome.groups_merged,
        outcome.skipped.len()
    ));
    Ok(outcome)
}
