pub mod clustering;
pub mod ingestion;
pub mod matching;
pub mod merge;
pub mod models;
pub mod repository;
pub mod service;
pub mod snapshot;
pub mod utils;

pub use service::DedupService;
pub use snapshot::RecordSnapshot;
