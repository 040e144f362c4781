// src/clustering/richness.rs - Completeness score used to pick a survivor
use crate::models::core::{EnrichmentStatus, RecordDraft};
use crate::utils::constants::AUTHORITATIVE_SOURCE;

const DESCRIPTION_MIN_CHARS: usize = 50;
const DIRECTIONS_MIN_CHARS: usize = 20;
const SAFETY_NOTES_MIN_CHARS: usize = 10;

const DESCRIPTION_POINTS: u32 = 2;
const TEMPERATURE_POINTS: u32 = 2;
const PHOTO_POINTS: u32 = 3;
const ATTRIBUTE_POINTS: u32 = 1;
const DIRECTIONS_POINTS: u32 = 1;
const SAFETY_NOTES_POINTS: u32 = 1;
const AUTHORITATIVE_SOURCE_POINTS: u32 = 1;
const ENRICHMENT_COMPLETE_POINTS: u32 = 2;

/// Additive score of how much verified information a listing carries. Only
/// meaningful for ranking members of the same duplicate group.
pub fn richness_score(record: &RecordDraft) -> u32 {
    let mut score = 0;

    if longer_than(record.description.as_deref(), DESCRIPTION_MIN_CHARS) {
        score += DESCRIPTION_POINTS;
    }
    if record.temp_f.map_or(false, f64::is_finite) {
        score += TEMPERATURE_POINTS;
    }
    if has_text(record.photo_url.as_deref()) {
        score += PHOTO_POINTS;
    }

    let attributes = [
        &record.access_difficulty,
        &record.parking,
        &record.fee_type,
        &record.clothing_optional,
        &record.cell_service,
        &record.crowd_level,
        &record.best_season,
    ];
    score += attributes
        .iter()
        .filter(|value| is_known(value.as_deref()))
        .count() as u32
        * ATTRIBUTE_POINTS;

    if longer_than(record.directions.as_deref(), DIRECTIONS_MIN_CHARS) {
        score += DIRECTIONS_POINTS;
    }
    if longer_than(record.safety_notes.as_deref(), SAFETY_NOTES_MIN_CHARS) {
        score += SAFETY_NOTES_POINTS;
    }
    if record
        .source
        .as_deref()
        .map_or(false, |s| s.trim().eq_ignore_ascii_case(AUTHORITATIVE_SOURCE))
    {
        score += AUTHORITATIVE_SOURCE_POINTS;
    }
    if record.enrichment_status == Some(EnrichmentStatus::Complete) {
        score += ENRICHMENT_COMPLETE_POINTS;
    }

    score
}

fn has_text(value: Option<&str>) -> bool {
    value.map_or(false, |v| !v.trim().is_empty())
}

fn longer_than(value: Option<&str>, min_chars: usize) -> bool {
    value.map_or(false, |v| v.trim().chars().count() > min_chars)
}

fn is_known(value: Option<&str>) -> bool {
    value.map_or(false, |v| {
        let v = v.trim();
        !v.is_empty() && !v.eq_ignore_ascii_case("unknown")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare() -> RecordDraft {
        RecordDraft::new("Sunbeam Hot Springs", "ID", Some(44.27), Some(-114.75))
    }

    fn full() -> RecordDraft {
        RecordDraft {
            description: Some("A riverside soaking spot where hot water mixes with the Salmon River.".into()),
            temp_f: Some(160.0),
            photo_url: Some("https://img.example/sunbeam.jpg".into()),
            access_difficulty: Some("easy".into()),
            parking: Some("lot".into()),
            fee_type: Some("free".into()),
            clothing_optional: Some("no".into()),
            cell_service: Some("none".into()),
            crowd_level: Some("busy".into()),
            best_season: Some("fall".into()),
            directions: Some("Pull off Highway 75 at the stone bathhouse.".into()),
            safety_notes: Some("Source water is scalding.".into()),
            source: Some("NOAA".into()),
            enrichment_status: Some(EnrichmentStatus::Complete),
            ..bare()
        }
    }

    #[test]
    fn test_bare_record_scores_zero() {
        assert_eq!(richness_score(&bare()), 0);
    }

    #[test]
    fn test_fully_enriched_record() {
        // 2 + 2 + 3 + 7 + 1 + 1 + 1 + 2
        assert_eq!(richness_score(&full()), 19);
    }

    #[test]
    fn test_unknown_and_short_values_do_not_count() {
        let record = RecordDraft {
            description: Some("Short blurb.".into()),
            access_difficulty: Some("Unknown".into()),
            parking: Some("  ".into()),
            directions: Some("Turn left.".into()),
            safety_notes: Some("Hot!".into()),
            photo_url: Some("".into()),
            source: Some("swimmingholes.org".into()),
            enrichment_status: Some(EnrichmentStatus::Partial),
            ..bare()
        };
        assert_eq!(richness_score(&record), 0);
    }

    #[test]
    fn test_adding_any_attribute_never_decreases_score() {
        let base = bare();
        let base_score = richness_score(&base);
        let full = full();
        let variants: Vec<RecordDraft> = vec![
            RecordDraft { description: full.description.clone(), ..base.clone() },
            RecordDraft { temp_f: full.temp_f, ..base.clone() },
            RecordDraft { photo_url: full.photo_url.clone(), ..base.clone() },
            RecordDraft { access_difficulty: full.access_difficulty.clone(), ..base.clone() },
            RecordDraft { parking: full.parking.clone(), ..base.clone() },
            RecordDraft { fee_type: full.fee_type.clone(), ..base.clone() },
            RecordDraft { clothing_optional: full.clothing_optional.clone(), ..base.clone() },
            RecordDraft { cell_service: full.cell_service.clone(), ..base.clone() },
            RecordDraft { crowd_level: full.crowd_level.clone(), ..base.clone() },
            RecordDraft { best_season: full.best_season.clone(), ..base.clone() },
            RecordDraft { directions: full.directions.clone(), ..base.clone() },
            RecordDraft { safety_notes: full.safety_notes.clone(), ..base.clone() },
            RecordDraft { source: full.source.clone(), ..base.clone() },
            RecordDraft { enrichment_status: full.enrichment_status.clone(), ..base.clone() },
        ];
        for variant in &variants {
            assert!(richness_score(variant) > base_score);
        }

        // removing any one attribute from a full record never raises the score
        let full_score = richness_score(&full);
        for variant in &variants {
            assert!(richness_score(variant) <= full_score);
        }
    }
}
