// src/repository/memory.rs - Process-local store for offline runs and tests
use anyhow::{Context, Result};
use log::info;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::core::{RecordDraft, SpringRecord};
use crate::repository::{RecordRepository, RepositoryError};

#[derive(Default)]
pub struct InMemoryRepository {
    records: Mutex<Vec<SpringRecord>>,
    deleted_ids: Mutex<Vec<String>>,
    read_calls: AtomicUsize,
    fail_deletes: AtomicBool,
}

impl InMemoryRepository {
    pub fn new(records: Vec<SpringRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Default::default()
        }
    }

    /// Loads a JSON array of records, e.g. an export of the listings table.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read records file {}", path.display()))?;
        let records: Vec<SpringRecord> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse records file {}", path.display()))?;
        info!("Loaded {} records from {}", records.len(), path.display());
        Ok(Self::new(records))
    }

    pub async fn records(&self) -> Vec<SpringRecord> {
        self.records.lock().await.clone()
    }

    pub async fn deleted_ids(&self) -> Vec<String> {
        self.deleted_ids.lock().await.clone()
    }

    /// How many times `read_all` has hit this store.
    pub fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    /// Makes every later delete fail, for exercising error propagation.
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

impl RecordRepository for InMemoryRepository {
    async fn read_all(&self) -> Result<Vec<SpringRecord>, RepositoryError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.lock().await.clone())
    }

    async fn delete_by_ids(&self, ids: &[Uuid]) -> Result<usize, RepositoryError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Backend("delete rejected".to_string()));
        }
        let targets: Vec<String> = ids.iter().map(|id| id.hyphenated().to_string()).collect();
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|r| !targets.iter().any(|t| t.eq_ignore_ascii_case(&r.id)));
        let removed = before - records.len();

        self.deleted_ids.lock().await.extend(targets);
        Ok(removed)
    }

    async fn insert_drafts(&self, drafts: &[RecordDraft]) -> Result<Vec<String>, RepositoryError> {
        let mut records = self.records.lock().await;
        let ids: Vec<String> = drafts
            .iter()
            .map(|draft| {
                let id = Uuid::new_v4().to_string();
                records.push(SpringRecord::new(&id, draft.clone()));
                id
            })
            .collect();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_then_delete() {
        let repo = InMemoryRepository::default();
        let ids = repo
            .insert_drafts(&[
                RecordDraft::new("Sunbeam Hot Springs", "ID", Some(44.27), Some(-114.75)),
                RecordDraft::new("Goldbug Hot Springs", "ID", Some(45.83), Some(-114.75)),
            ])
            .await
            .unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(repo.read_all().await.unwrap().len(), 2);

        let target = Uuid::parse_str(&ids[0]).unwrap();
        assert_eq!(repo.delete_by_ids(&[target]).await.unwrap(), 1);
        // deleting again is a no-op
        assert_eq!(repo.delete_by_ids(&[target]).await.unwrap(), 0);

        let remaining = repo.records().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, ids[1]);
        assert_eq!(repo.read_calls(), 1);
    }

    #[tokio::test]
    async fn test_failing_deletes() {
        let repo = InMemoryRepository::default();
        repo.fail_deletes(true);
        let result = repo.delete_by_ids(&[Uuid::new_v4()]).await;
        assert!(matches!(result, Err(RepositoryError::Backend(_))));
    }
}
