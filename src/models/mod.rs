pub mod core;
pub mod matching;
pub mod stats_models;

pub use core::{EntityRecord, QueryRecord, ShingleType, SynonymRule};
pub use matching::{MatchedShingle, ShingleEntry, SynonymFlag, UnmatchedShingle};
pub use stats_models::{AggregationStats, MatchingStats, PipelineStats};
