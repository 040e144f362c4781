// src/utils/progress_bars/logging.rs - Logging helpers for dedup phases
use log::{debug, info, warn};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupPhase {
    Resolve,
    Classify,
    Merge,
    Ingest,
}

impl DedupPhase {
    fn label(self) -> (&'static str, &'static str) {
        match self {
            DedupPhase::Resolve => ("RESOLVE", "🧭"),
            DedupPhase::Classify => ("CLASSIFY", "🔎"),
            DedupPhase::Merge => ("MERGE", "🧹"),
            DedupPhase::Ingest => ("INGEST", "📥"),
        }
    }
}

#[derive(Clone)]
pub struct DedupLogger {
    method_name: &'static str,
    method_emoji: &'static str,
    start_time: Instant,
}

impl DedupLogger {
    pub fn new(phase: DedupPhase) -> Self {
        let (method_name, method_emoji) = phase.label();
        Self {
            method_name,
            method_emoji,
            start_time: Instant::now(),
        }
    }

    pub fn log_start(&self, run_id: &str, dry_run: bool) {
        info!(
            "[{}] {} 🚀 Starting {} (run ID: {}){}",
            self.method_name,
            self.method_emoji,
            self.method_name.to_lowercase(),
            run_id,
            if dry_run { " in dry-run mode" } else { "" }
        );
    }

    pub fn log_phase(&self, phase: &str, details: Option<&str>) {
        let elapsed = self.start_time.elapsed();
        match details {
            Some(details) => info!(
                "[{}] {} 🔄 Phase: {} - {} [+{:.1}s]",
                self.method_name, self.method_emoji, phase, details, elapsed.as_secs_f32()
            ),
            None => info!(
                "[{}] {} 🔄 Phase: {} [+{:.1}s]",
                self.method_name, self.method_emoji, phase, elapsed.as_secs_f32()
            ),
        }
    }

    pub fn log_data_loaded(&self, count: usize, data_type: &str) {
        info!(
            "[{}] {} 📊 Loaded {} {} records",
            self.method_name, self.method_emoji, count, data_type
        );
    }

    pub fn log_index_built(&self, indexed: usize, cells: usize, without_coordinates: usize) {
        info!(
            "[{}] {} 🗺️  Spatial index: {} records in {} cells ({} without coordinates)",
            self.method_name, self.method_emoji, indexed, cells, without_coordinates
        );
    }

    pub fn log_groups_found(&self, groups: usize, slated_for_deletion: usize) {
        info!(
            "[{}] {} 📈 Found {} duplicate groups, {} records slated for deletion",
            self.method_name, self.method_emoji, groups, slated_for_deletion
        );
    }

    pub fn log_group_skipped(&self, keep: &str, reason: &str) {
        warn!(
            "[{}] {} ⏭️  Skipping group kept by {}: {}",
            self.method_name, self.method_emoji, keep, reason
        );
    }

    pub fn log_rejection(&self, name: &str, state: &str, existing_id: &str) {
        info!(
            "[{}] {} 🚫 Rejected '{}' ({}) as duplicate of {}",
            self.method_name, self.method_emoji, name, state, existing_id
        );
    }

    pub fn log_classification(&self, accepted: usize, rejected: usize) {
        info!(
            "[{}] {} ✅ Classification: {} accepted as new, {} rejected as duplicates",
            self.method_name, self.method_emoji, accepted, rejected
        );
    }

    pub fn log_completion(&self, summary: &str) {
        info!(
            "[{}] {} 🎉 COMPLETED in {:.2?}: {}",
            self.method_name,
            self.method_emoji,
            self.start_time.elapsed(),
            summary
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!("[{}] {} ⚠️  {}", self.method_name, self.method_emoji, message);
    }

    pub fn log_debug(&self, message: &str) {
        debug!("[{}] {} {}", self.method_name, self.method_emoji, message);
    }
}
