pub mod name;
pub mod similarity;
pub mod spatial;

pub use name::{are_names_similar, normalize_name};
pub use similarity::{MatchReason, SimilarityMatcher};
pub use spatial::SpatialIndex;
