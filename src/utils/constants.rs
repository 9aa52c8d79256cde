// src/utils/constants.rs

/// Positional columns of the raw query log. This schema is an
/// externally-defined contract: query text at 0, visit count at 4,
/// revenue at 8, whatever the intervening columns hold.
pub const QUERY_COL: usize = 0;
pub const VISITS_COL: usize = 4;
pub const REVENUE_COL: usize = 8;

/// Minimum column count a query log row must carry.
pub const MIN_QUERY_LOG_COLS: usize = REVENUE_COL + 1;

/// Documents per add request on the ingestion path.
pub const INGEST_BATCH_SIZE: usize = 500;

/// How often the aggregator reports row-level progress.
pub const PROGRESS_LOG_INTERVAL: usize = 1000;
