// src/repository/mod.rs - Record store interface consumed by the engine
pub mod memory;
pub mod postgres;

use thiserror::Error;
use uuid::Uuid;

use crate::models::core::{RecordDraft, SpringRecord};

pub use memory::InMemoryRepository;
pub use postgres::PgRecordRepository;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] bb8::RunError<tokio_postgres::Error>),

    #[error("Record store error: {0}")]
    Backend(String),
}

/// Bulk operations the dedup engine needs from the listing store. Failures
/// are returned as-is; retrying is the implementation's business.
#[allow(async_fn_in_trait)]
pub trait RecordRepository {
    /// Full scan of every listing.
    async fn read_all(&self) -> Result<Vec<SpringRecord>, RepositoryError>;

    /// Deletes the given ids and returns how many rows were removed. Ids are
    /// parsed UUIDs so nothing unvalidated can reach the store.
    async fn delete_by_ids(&self, ids: &[Uuid]) -> Result<usize, RepositoryError>;

    /// Inserts drafts and returns the ids the store assigned, in input order.
    async fn insert_drafts(&self, drafts: &[RecordDraft]) -> Result<Vec<String>, RepositoryError>;
}
