// src/models/core.rs
use serde::{Deserialize, Serialize};

/// Enrichment pipeline state for a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentStatus {
    Pending,
    Partial,
    Complete,
    Failed,
    #[serde(other)]
    Other,
}

impl EnrichmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrichmentStatus::Pending => "pending",
            EnrichmentStatus::Partial => "partial",
            EnrichmentStatus::Complete => "complete",
            EnrichmentStatus::Failed => "failed",
            EnrichmentStatus::Other => "other",
        }
    }

    pub fn from_db(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "pending" => EnrichmentStatus::Pending,
            "partial" => EnrichmentStatus::Partial,
            "complete" | "completed" => EnrichmentStatus::Complete,
            "failed" => EnrichmentStatus::Failed,
            _ => EnrichmentStatus::Other,
        }
    }
}

/// Descriptive fields of a spring listing. Scrapers produce these before
/// the store has assigned an id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordDraft {
    pub name: String,
    pub state: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub description: Option<String>,
    pub temp_f: Option<f64>,
    pub access_difficulty: Option<String>,
    pub parking: Option<String>,
    pub fee_type: Option<String>,
    pub clothing_optional: Option<String>,
    pub cell_service: Option<String>,
    pub crowd_level: Option<String>,
    pub best_season: Option<String>,
    pub directions: Option<String>,
    pub safety_notes: Option<String>,
    pub photo_url: Option<String>,
    pub enrichment_status: Option<EnrichmentStatus>,
    pub source: Option<String>,
}

impl RecordDraft {
    pub fn new(name: &str, state: &str, lat: Option<f64>, lng: Option<f64>) -> Self {
        Self {
            name: name.to_string(),
            state: state.to_string(),
            lat,
            lng,
            ..Default::default()
        }
    }
}

/// A persisted listing. `id` is assigned once by the store and never reused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpringRecord {
    pub id: String,
    #[serde(flatten)]
    pub details: RecordDraft,
}

impl SpringRecord {
    pub fn new(id: &str, details: RecordDraft) -> Self {
        Self {
            id: id.to_string(),
            details,
        }
    }
}

/// Read-only view shared by persisted records and drafts so the matcher can
/// compare either kind.
pub trait Matchable {
    fn name(&self) -> &str;
    fn state(&self) -> &str;
    fn lat(&self) -> Option<f64>;
    fn lng(&self) -> Option<f64>;

    /// Both coordinates, if present and on the globe. Out-of-range values
    /// are treated as missing.
    fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lat(), self.lng()) {
            (Some(lat), Some(lng))
                if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng) =>
            {
                Some((lat, lng))
            }
            _ => None,
        }
    }
}

impl Matchable for RecordDraft {
    fn name(&self) -> &str {
        &self.name
    }
    fn state(&self) -> &str {
        &self.state
    }
    fn lat(&self) -> Option<f64> {
        self.lat
    }
    fn lng(&self) -> Option<f64> {
        self.lng
    }
}

impl Matchable for SpringRecord {
    fn name(&self) -> &str {
        &self.details.name
    }
    fn state(&self) -> &str {
        &self.details.state
    }
    fn lat(&self) -> Option<f64> {
        self.details.lat
    }
    fn lng(&self) -> Option<f64> {
        self.details.lng
    }
}
