// src/utils/constants.rs

/// Proximity threshold in degrees (roughly 500 m). Also the grid cell size.
pub const PROXIMITY_THRESHOLD_DEG: f64 = 0.005;

/// Smallest configurable threshold (roughly 1 cm), keeping grid cell keys
/// well inside the i64 range.
pub const MIN_PROXIMITY_THRESHOLD_DEG: f64 = 1e-7;

/// Source tag of the government gazetteer treated as authoritative.
pub const AUTHORITATIVE_SOURCE: &str = "noaa";

pub const DEFAULT_SPRINGS_SCHEMA: &str = "public";
pub const DEFAULT_SPRINGS_TABLE: &str = "springs";
pub const DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_DELETE_BATCH_SIZE: usize = 500;
pub const DEFAULT_READ_PAGE_SIZE: usize = 1000;
