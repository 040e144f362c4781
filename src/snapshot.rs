// src/snapshot.rs - Caller-owned cache of the full listing table
use log::{debug, info};
use std::sync::Arc;

use crate::models::core::SpringRecord;
use crate::repository::{RecordRepository, RepositoryError};

/// In-memory copy of every record, fetched on first use and kept until
/// [`RecordSnapshot::invalidate`] is called. There is no TTL: anything that
/// writes to the store must invalidate, or the copy silently goes stale.
/// Scoped to a single run.
#[derive(Debug, Default)]
pub struct RecordSnapshot {
    records: Option<Arc<Vec<SpringRecord>>>,
    fetches: usize,
}

impl RecordSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.records.is_some()
    }

    /// Number of times the snapshot has gone to the store.
    pub fn fetch_count(&self) -> usize {
        self.fetches
    }

    /// Cached records, reading the whole store on a miss.
    pub async fn get_or_fetch<R: RecordRepository>(
        &mut self,
        repository: &R,
    ) -> Result<Arc<Vec<SpringRecord>>, RepositoryError> {
        if let Some(records) = &self.records {
            debug!("Record snapshot hit ({} records)", records.len());
            return Ok(Arc::clone(records));
        }
        self.refresh(repository).await
    }

    /// Re-reads the store unconditionally.
    pub async fn refresh<R: RecordRepository>(
        &mut self,
        repository: &R,
    ) -> Result<Arc<Vec<SpringRecord>>, RepositoryError> {
        let records = Arc::new(repository.read_all().await?);
        self.fetches += 1;
        info!("Record snapshot loaded with {} records", records.len());
        self.records = Some(Arc::clone(&records));
        Ok(records)
    }

    pub fn invalidate(&mut self) {
        if self.records.take().is_some() {
            debug!("Record snapshot invalidated");
        }
    }
}
