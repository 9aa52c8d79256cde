// src/models/stats_models.rs - Per-phase and whole-run statistics
use chrono::NaiveDateTime;

/// Run-level statistics collected by the pipeline binary and logged
/// as the end-of-run summary.
#[derive(Debug, Clone)]
pub struct PipelineStats {
    pub run_id: String,
    pub run_timestamp: NaiveDateTime,
    pub description: Option<String>,
    pub total_entities: usize,
    pub total_shingle_keys: usize,
    pub total_shingle_entries: usize,
    pub total_queries_raw: usize,
    pub total_queries_aggregated: usize,
    pub total_matched_rows: usize,
    pub total_unmatched_rows: usize,
    pub index_build_time: f64,
    pub aggregation_time: f64,
    pub matching_time: f64,
    pub total_processing_time: f64,
}

impl PipelineStats {
    pub fn new(run_id: &str, run_timestamp: NaiveDateTime, description: Option<&str>) -> Self {
        Self {
            run_id: run_id.to_string(),
            run_timestamp,
            description: description.map(|s| s.to_string()),
            total_entities: 0,
            total_shingle_keys: 0,
            total_shingle_entries: 0,
            total_queries_raw: 0,
            total_queries_aggregated: 0,
            total_matched_rows: 0,
            total_unmatched_rows: 0,
            index_build_time: 0.0,
            aggregation_time: 0.0,
            matching_time: 0.0,
            total_processing_time: 0.0,
        }
    }
}

/// Counters for one aggregation run.
#[derive(Debug, Clone)]
pub struct AggregationStats {
    pub rows_read: usize,
    pub distinct_queries: usize,
    pub duplicates_merged: usize,
    pub rows_emitted: usize,
    /// Normalization calls avoided because the raw query text was
    /// already in the cache. The second pass never calls the service
    /// at all; it reads the cache built in pass 1.
    pub normalizer_cache_hits: usize,
}

impl Default for AggregationStats {
    fn default() -> Self {
        Self {
            rows_read: 0,
            distinct_queries: 0,
            duplicates_merged: 0,
            rows_emitted: 0,
            normalizer_cache_hits: 0,
        }
    }
}

/// Counters for one match-resolution run.
#[derive(Debug, Clone)]
pub struct MatchingStats {
    pub queries_processed: usize,
    pub shingles_generated: usize,
    pub matched_rows: usize,
    pub unmatched_rows: usize,
    /// Shingles that hit more than one index entry.
    pub ambiguous_shingles: usize,
}

impl Default for MatchingStats {
    fn default() -> Self {
        Self {
            queries_processed: 0,
            shingles_generated: 0,
            matched_rows: 0,
            unmatched_rows: 0,
            ambiguous_shingles: 0,
        }
    }
}
