// src/matching/similarity.rs
use crate::matching::name::{are_names_similar, normalize_name};
use crate::models::core::Matchable;
use crate::utils::constants::PROXIMITY_THRESHOLD_DEG;

/// Which rule linked two records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchReason {
    ExactKey,
    ProximityName,
}

/// Matching view of a record with its key computed once.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRecord {
    pub key: String,
    pub state: String,
    pub coordinates: Option<(f64, f64)>,
}

impl PreparedRecord {
    pub fn from_matchable<M: Matchable + ?Sized>(record: &M) -> Self {
        Self {
            key: normalize_name(record.name()),
            state: normalize_state(record.state()),
            coordinates: record.coordinates(),
        }
    }

    /// Key for the exact-match index. Empty names never get one.
    pub fn exact_key(&self) -> Option<(String, String)> {
        if self.key.is_empty() {
            None
        } else {
            Some((self.key.clone(), self.state.clone()))
        }
    }
}

pub fn normalize_state(state: &str) -> String {
    state.trim().to_uppercase()
}

/// Decides whether two listings describe the same spring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityMatcher {
    pub threshold_deg: f64,
}

impl Default for SimilarityMatcher {
    fn default() -> Self {
        Self {
            threshold_deg: PROXIMITY_THRESHOLD_DEG,
        }
    }
}

impl SimilarityMatcher {
    pub fn new(threshold_deg: f64) -> Self {
        Self { threshold_deg }
    }

    pub fn are_likely_duplicates<A, B>(&self, a: &A, b: &B) -> bool
    where
        A: Matchable + ?Sized,
        B: Matchable + ?Sized,
    {
        self.match_prepared(
            &PreparedRecord::from_matchable(a),
            &PreparedRecord::from_matchable(b),
        )
        .is_some()
    }

    /// Rules are tried in order and the first one that holds is returned.
    pub fn match_prepared(&self, a: &PreparedRecord, b: &PreparedRecord) -> Option<MatchReason> {
        if !a.key.is_empty() && a.state == b.state && a.key == b.key {
            return Some(MatchReason::ExactKey);
        }
        if self.within_threshold(a.coordinates, b.coordinates) && are_names_similar(&a.key, &b.key) {
            return Some(MatchReason::ProximityName);
        }
        None
    }

    /// Both points present and closer than the threshold on each axis.
    pub fn within_threshold(&self, a: Option<(f64, f64)>, b: Option<(f64, f64)>) -> bool {
        match (a, b) {
            (Some((lat_a, lng_a)), Some((lat_b, lng_b))) => {
                (lat_a - lat_b).abs() < self.threshold_deg
                    && (lng_a - lng_b).abs() < self.threshold_deg
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::core::RecordDraft;

    fn draft(name: &str, state: &str, lat: Option<f64>, lng: Option<f64>) -> RecordDraft {
        RecordDraft::new(name, state, lat, lng)
    }

    #[test]
    fn test_exact_key_match_ignores_distance() {
        let matcher = SimilarityMatcher::default();
        let a = draft("Baumgartner Hot Springs", "ID", Some(45.10), Some(-115.20));
        let b = draft("Baumgartner Spring", "ID", Some(45.1003), Some(-115.2001));
        let far = draft("Baumgartner Springs", "id", Some(47.0), Some(-116.0));
        assert!(matcher.are_likely_duplicates(&a, &b));
        assert!(matcher.are_likely_duplicates(&a, &far));
    }

    #[test]
    fn test_exact_key_match_without_coordinates() {
        let matcher = SimilarityMatcher::default();
        let a = draft("Goldbug Hot Springs", "ID", None, None);
        let b = draft("Goldbug Spring", "ID", Some(45.83), Some(-114.75));
        let prepared_a = PreparedRecord::from_matchable(&a);
        let prepared_b = PreparedRecord::from_matchable(&b);
        assert_eq!(matcher.match_prepared(&prepared_a, &prepared_b), Some(MatchReason::ExactKey));
    }

    #[test]
    fn test_state_isolation() {
        let matcher = SimilarityMatcher::default();
        let a = draft("Warm Springs", "ID", Some(44.0), Some(-115.0));
        let b = draft("Warm Springs", "MT", Some(46.0), Some(-112.0));
        assert!(!matcher.are_likely_duplicates(&a, &b));
    }

    #[test]
    fn test_nearby_distinct_springs_do_not_match() {
        let matcher = SimilarityMatcher::default();
        let a = draft("Jerry Johnson Hot Springs", "ID", Some(46.30), Some(-114.90));
        let b = draft("Stanley Hot Springs", "ID", Some(46.301), Some(-114.901));
        assert!(!matcher.are_likely_duplicates(&a, &b));
    }

    #[test]
    fn test_proximity_and_fuzzy_name_match() {
        let matcher = SimilarityMatcher::default();
        let a = draft("Upper Loftus Pools", "ID", Some(44.50), Some(-115.30));
        let b = draft("Loftus Pools", "ID", Some(44.5020), Some(-115.3030));
        let prepared_a = PreparedRecord::from_matchable(&a);
        let prepared_b = PreparedRecord::from_matchable(&b);
        assert_eq!(
            matcher.match_prepared(&prepared_a, &prepared_b),
            Some(MatchReason::ProximityName)
        );

        let too_far = draft("Loftus Pools", "ID", Some(44.5060), Some(-115.30));
        assert!(!matcher.are_likely_duplicates(&a, &too_far));
    }

    #[test]
    fn test_empty_names_never_match() {
        let matcher = SimilarityMatcher::default();
        let a = draft("Hot Springs", "NM", Some(33.0), Some(-107.0));
        let b = draft("Springs", "NM", Some(33.0001), Some(-107.0001));
        assert!(!matcher.are_likely_duplicates(&a, &b));
    }

    #[test]
    fn test_matcher_is_symmetric() {
        let matcher = SimilarityMatcher::default();
        let records = vec![
            draft("Baumgartner Hot Springs", "ID", Some(45.10), Some(-115.20)),
            draft("Baumgartner Spring", "ID", Some(45.1003), Some(-115.2001)),
            draft("Upper Loftus Pools", "ID", Some(44.50), Some(-115.30)),
            draft("Loftus Pools", "ID", Some(44.502), Some(-115.303)),
            draft("Goldbug", "ID", None, None),
            draft("Hot Springs", "ID", Some(44.5), Some(-115.3)),
        ];
        for a in &records {
            for b in &records {
                assert_eq!(matcher.are_likely_duplicates(a, b), matcher.are_likely_duplicates(b, a));
            }
        }
    }
}
