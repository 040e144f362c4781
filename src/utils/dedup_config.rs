//! Run configuration for the dedup engine, read from environment variables.

use log::{debug, info, warn};
use std::env;

use crate::utils::constants::{
    DEFAULT_DELETE_BATCH_SIZE, DEFAULT_READ_PAGE_SIZE, DEFAULT_SPRINGS_SCHEMA,
    DEFAULT_SPRINGS_TABLE, DEFAULT_STATEMENT_TIMEOUT_SECS, MIN_PROXIMITY_THRESHOLD_DEG, PROXIMITY_THRESHOLD_DEG,
};

#[derive(Debug, Clone, PartialEq)]
pub struct DedupConfig {
    /// Schema holding the listing table.
    pub schema: String,
    pub table: String,
    /// Proximity threshold in degrees, also used as the grid cell size.
    pub proximity_threshold_deg: f64,
    pub delete_batch_size: usize,
    pub read_page_size: usize,
    /// Server-side cap on any single statement, 0 disables it.
    pub statement_timeout_secs: u64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            schema: DEFAULT_SPRINGS_SCHEMA.to_string(),
            table: DEFAULT_SPRINGS_TABLE.to_string(),
            proximity_threshold_deg: PROXIMITY_THRESHOLD_DEG,
            delete_batch_size: DEFAULT_DELETE_BATCH_SIZE,
            read_page_size: DEFAULT_READ_PAGE_SIZE,
            statement_timeout_secs: DEFAULT_STATEMENT_TIMEOUT_SECS,
        }
    }
}

/// Lowercase SQL identifier safe to splice into statements unquoted.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

impl DedupConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let schema = env::var("SPRINGS_SCHEMA")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.schema);

        let table = env::var("SPRINGS_TABLE")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.table);

        let proximity_threshold_deg = match env::var("DEDUP_PROXIMITY_THRESHOLD_DEG") {
            Ok(raw) => match raw.trim().parse::<f64>() {
                Ok(value) if value.is_finite() && value >= MIN_PROXIMITY_THRESHOLD_DEG => value,
                _ => {
                    warn!(
                        "Ignoring invalid DEDUP_PROXIMITY_THRESHOLD_DEG '{}', using {}",
                        raw, defaults.proximity_threshold_deg
                    );
                    defaults.proximity_threshold_deg
                }
            },
            Err(_) => defaults.proximity_threshold_deg,
        };

        let delete_batch_size = env::var("DEDUP_DELETE_BATCH_SIZE")
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(defaults.delete_batch_size);

        let read_page_size = env::var("DEDUP_READ_PAGE_SIZE")
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(defaults.read_page_size);

        let statement_timeout_secs = env::var("DEDUP_STATEMENT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(defaults.statement_timeout_secs);

        let config = Self {
            schema,
            table,
            proximity_threshold_deg,
            delete_batch_size,
            read_page_size,
            statement_timeout_secs,
        };
        debug!("Dedup config: {:?}", config);
        config
    }

    /// Log the current configuration
    pub fn log_config(&self) {
        info!("⚙️  Dedup configuration:");
        info!("   Table: {}.{}", self.schema, self.table);
        info!(
            "   Proximity threshold: {}° (~{:.0} m)",
            self.proximity_threshold_deg,
            self.proximity_threshold_deg * 111_000.0
        );
        info!("   Delete batch size: {}", self.delete_batch_size);
        info!("   Read page size: {}", self.read_page_size);
        if self.statement_timeout_secs > 0 {
            info!("   Statement timeout: {}s", self.statement_timeout_secs);
        } else {
            info!("   Statement timeout: disabled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    const VARS: [&str; 6] = [
        "SPRINGS_SCHEMA",
        "SPRINGS_TABLE",
        "DEDUP_PROXIMITY_THRESHOLD_DEG",
        "DEDUP_DELETE_BATCH_SIZE",
        "DEDUP_READ_PAGE_SIZE",
        "DEDUP_STATEMENT_TIMEOUT_SECS",
    ];

    #[test]
    fn test_identifier_validation() {
        assert!(is_valid_identifier("springs"));
        assert!(is_valid_identifier("_springs_v2"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("2springs"));
        assert!(!is_valid_identifier("springs; drop table x"));
        assert!(!is_valid_identifier("Springs"));
    }

    // Env vars are process-wide, so both cases live in one test.
    #[test]
    fn test_config_from_env() {
        for var in VARS {
            env::remove_var(var);
        }
        assert_eq!(DedupConfig::from_env(), DedupConfig::default());

        env::set_var("SPRINGS_TABLE", "swimming_holes");
        env::set_var("DEDUP_PROXIMITY_THRESHOLD_DEG", "0.01");
        env::set_var("DEDUP_DELETE_BATCH_SIZE", "50");
        env::set_var("DEDUP_READ_PAGE_SIZE", "0");
        env::set_var("SPRINGS_SCHEMA", "listings");
        env::set_var("DEDUP_STATEMENT_TIMEOUT_SECS", "0");
        let config = DedupConfig::from_env();
        assert_eq!(config.schema, "listings");
        assert_eq!(config.statement_timeout_secs, 0);
        assert_eq!(config.table, "swimming_holes");
        assert_eq!(config.proximity_threshold_deg, 0.01);
        assert_eq!(config.delete_batch_size, 50);
        assert_eq!(config.read_page_size, DEFAULT_READ_PAGE_SIZE);

        env::set_var("DEDUP_PROXIMITY_THRESHOLD_DEG", "-1");
        assert_eq!(
            DedupConfig::from_env().proximity_threshold_deg,
            PROXIMITY_THRESHOLD_DEG
        );
        env::set_var("DEDUP_PROXIMITY_THRESHOLD_DEG", "1e-18");
        assert_eq!(
            DedupConfig::from_env().proximity_threshold_deg,
            PROXIMITY_THRESHOLD_DEG
        );

        // Cleanup
        for var in VARS {
            env::remove_var(var);
        }
    }
}
