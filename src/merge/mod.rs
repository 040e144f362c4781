pub mod merge_executor;

pub use merge_executor::{merge_duplicate_groups, parse_record_id};
