pub mod duplicate_resolver;
pub mod richness;

pub use duplicate_resolver::{exceeds_spread_limit, resolve_duplicate_groups, spread_limit_meters};
pub use richness::richness_score;
