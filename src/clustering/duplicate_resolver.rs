// src/clustering/duplicate_resolver.rs - Full-corpus duplicate grouping
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use petgraph::unionfind::UnionFind;

use crate::clustering::richness::richness_score;
use crate::matching::similarity::{PreparedRecord, SimilarityMatcher};
use crate::matching::spatial::{max_spread_meters, SpatialIndex};
use crate::models::core::SpringRecord;
use crate::models::matching::{DuplicateGroup, GroupMember};
use crate::utils::progress_bars::logging::{DedupLogger, DedupPhase};

const METERS_PER_DEGREE: f64 = 111_320.0;

/// Spread beyond which a group cannot have been built from proximity links
/// alone: twice the threshold, in meters.
pub fn spread_limit_meters(matcher: &SimilarityMatcher) -> f64 {
    2.0 * matcher.threshold_deg * METERS_PER_DEGREE
}

/// True for groups whose members lie further apart than proximity matching
/// allows, i.e. groups joined by identical name and state across a distance.
pub fn exceeds_spread_limit(group: &DuplicateGroup, matcher: &SimilarityMatcher) -> bool {
    group
        .max_spread_meters
        .map_or(false, |spread| spread > spread_limit_meters(matcher))
}

/// Partitions `records` into duplicate groups. Singletons are dropped.
///
/// Pairs are discovered two ways: an exact `(key, state)` index links
/// identity-equivalent records wherever they are, and a 3x3 grid scan links
/// nearby records with similar names. Discovered pairs are merged with a
/// disjoint set, so chains A~B~C end up in one group even when A and C do
/// not match directly.
///
/// Groups come back in the input order of their first member, and members
/// are ranked by richness with ties kept in input order.
pub fn resolve_duplicate_groups(
    records: &[SpringRecord],
    matcher: &SimilarityMatcher,
) -> Vec<DuplicateGroup> {
    let logger = DedupLogger::new(DedupPhase::Resolve);
    let prepared: Vec<PreparedRecord> = records.iter().map(PreparedRecord::from_matchable).collect();

    let index = SpatialIndex::from_points(
        prepared.iter().enumerate().map(|(i, p)| (i, p.coordinates)),
        matcher.threshold_deg,
    );
    logger.log_index_built(index.len(), index.cell_count(), records.len() - index.len());

    let mut sets = UnionFind::<usize>::new(records.len());

    let mut first_by_key: HashMap<(String, String), usize> = HashMap::new();
    let mut exact_links = 0usize;
    for (i, p) in prepared.iter().enumerate() {
        if let Some(key) = p.exact_key() {
            match first_by_key.entry(key) {
                Entry::Occupied(first) => {
                    if sets.union(*first.get(), i) {
                        exact_links += 1;
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(i);
                }
            }
        }
    }

    let mut proximity_links = 0usize;
    for (i, p) in prepared.iter().enumerate() {
        let Some((lat, lng)) = p.coordinates else {
            continue;
        };
        for j in index.neighbors(lat, lng) {
            // neighbourhoods are symmetric, so each pair is visited from its lower index
            if j <= i || sets.equiv(i, j) {
                continue;
            }
            if matcher.match_prepared(p, &prepared[j]).is_some() && sets.union(i, j) {
                proximity_links += 1;
            }
        }
    }
    logger.log_debug(&format!(
        "Linked {} pairs by exact key and {} by proximity",
        exact_links, proximity_links
    ));

    let mut component_of_root: HashMap<usize, usize> = HashMap::new();
    let mut components: Vec<Vec<usize>> = Vec::new();
    for i in 0..records.len() {
        let root = sets.find_mut(i);
        let slot = *component_of_root.entry(root).or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        components[slot].push(i);
    }

    let groups: Vec<DuplicateGroup> = components
        .into_iter()
        .filter(|members| members.len() >= 2)
        .map(|members| build_group(records, &members))
        .collect();

    for group in groups.iter().filter(|g| exceeds_spread_limit(g, matcher)) {
        logger.log_warning(&format!(
            "Group kept by {} spans {:.0} m across {} records; review before merging",
            group.keep,
            group.max_spread_meters.unwrap_or_default(),
            group.members.len()
        ));
    }

    let slated: usize = groups.iter().map(|g| g.delete.len()).sum();
    logger.log_groups_found(groups.len(), slated);
    groups
}

/// Scores members, keeps the richest (first seen wins ties) and marks the rest.
fn build_group(records: &[SpringRecord], member_indices: &[usize]) -> DuplicateGroup {
    let mut members: Vec<GroupMember> = member_indices
        .iter()
        .map(|&i| GroupMember {
            record: records[i].clone(),
            score: richness_score(&records[i].details),
        })
        .collect();
    // sort_by is stable, which preserves first-seen order among equal scores
    members.sort_by(|a, b| b.score.cmp(&a.score));

    let keep = members[0].record.id.clone();
    let delete = members[1..].iter().map(|m| m.record.id.clone()).collect();

    let points: Vec<(f64, f64)> = member_indices
        .iter()
        .filter_map(|&i| PreparedRecord::from_matchable(&records[i]).coordinates)
        .collect();

    DuplicateGroup {
        members,
        keep,
        delete,
        max_spread_meters: max_spread_meters(&points),
    }
}
