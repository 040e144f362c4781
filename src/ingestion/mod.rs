pub mod incremental_filter;

pub use incremental_filter::{classify_candidates, IncrementalFilter};
