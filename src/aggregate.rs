// src/aggregate.rs - Query normalization and aggregation
//
// Two passes over the raw query log. Pass 1 normalizes every query
// through the injected Normalizer and accumulates visit and revenue
// totals per normalized key. Pass 2 re-scans the rows in original
// order and emits exactly one output row per distinct key: the first
// raw row seen for a key supplies the template columns, with the
// query, visit and revenue columns overwritten by the normalized key
// and the accumulated sums. Normalization results are cached in pass
// 1 keyed by raw query text, so pass 2 makes no service calls.

use anyhow::{anyhow, bail, Context, Result};
use indicatif::ProgressBar;
use log::{debug, info};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

use crate::models::stats_models::AggregationStats;
use crate::normalize::Normalizer;
use crate::utils::constants::{
    MIN_QUERY_LOG_COLS, PROGRESS_LOG_INTERVAL, QUERY_COL, REVENUE_COL, VISITS_COL,
};
use crate::utils::currency::{format_currency, parse_currency};

/// Aggregate a raw query log by normalized query text. `rows` are the
/// data rows only (header excluded). Any normalization failure or
/// malformed numeric field aborts the whole aggregation; there is no
/// partial-result policy.
pub async fn normalize_and_aggregate(
    rows: &[Vec<String>],
    normalizer: &dyn Normalizer,
    pb: Option<&ProgressBar>,
) -> Result<(Vec<Vec<String>>, AggregationStats)> {
    let mut stats = AggregationStats::default();
    let mut normalized_cache: HashMap<String, String> = HashMap::new();
    let mut totals: HashMap<String, (u64, Decimal)> = HashMap::new();

    // Pass 1: normalize and accumulate.
    for (i, row) in rows.iter().enumerate() {
        let row_number = i + 1;
        if row.len() < MIN_QUERY_LOG_COLS {
            bail!(
                "Query log row {} has {} columns, expected at least {}",
                row_number,
                row.len(),
                MIN_QUERY_LOG_COLS
            );
        }

        let raw_query = &row[QUERY_COL];
        let key = match normalized_cache.get(raw_query) {
            Some(key) => {
                stats.normalizer_cache_hits += 1;
                key.clone()
            }
            None => {
                let key = normalizer
                    .normalize(raw_query)
                    .await
                    .with_context(|| format!("Failed to normalize query log row {}", row_number))?;
                normalized_cache.insert(raw_query.clone(), key.clone());
                key
            }
        };

        let visits: u64 = row[VISITS_COL].trim().parse().with_context(|| {
            format!(
                "Invalid visit count '{}' in query log row {}",
                row[VISITS_COL], row_number
            )
        })?;
        let revenue = parse_currency(&row[REVENUE_COL]).with_context(|| {
            format!(
                "Invalid revenue '{}' in query log row {}",
                row[REVENUE_COL], row_number
            )
        })?;

        let entry = totals.entry(key).or_insert((0, Decimal::ZERO));
        entry.0 += visits;
        entry.1 += revenue;
        stats.rows_read += 1;

        if row_number % PROGRESS_LOG_INTERVAL == 0 {
            debug!(
                "Aggregation pass 1: {} rows, {} distinct queries, {} cache hits",
                row_number,
                totals.len(),
                stats.normalizer_cache_hits
            );
        }
        if let Some(pb) = pb {
            pb.inc(1);
        }
    }

    stats.distinct_queries = totals.len();
    stats.duplicates_merged = stats.rows_read - totals.len();

    // Pass 2: re-emit in original order, one row per distinct key,
    // first raw row as the template.
    let mut emitted: HashSet<String> = HashSet::new();
    let mut output: Vec<Vec<String>> = Vec::with_capacity(totals.len());
    for row in rows {
        let key = normalized_cache
            .get(&row[QUERY_COL])
            .ok_or_else(|| anyhow!("Missing cached normalization for '{}'", row[QUERY_COL]))?;
        if emitted.contains(key) {
            continue;
        }
        let (visits, revenue) = totals
            .get(key)
            .copied()
            .ok_or_else(|| anyhow!("Missing accumulated totals for '{}'", key))?;

        let mut out = row.clone();
        out[QUERY_COL] = key.clone();
        out[VISITS_COL] = visits.to_string();
        out[REVENUE_COL] = format_currency(revenue);
        output.push(out);
        emitted.insert(key.clone());
    }
    stats.rows_emitted = output.len();

    info!(
        "Aggregation complete: {} rows -> {} distinct normalized queries ({} duplicates merged, {} cache hits)",
        stats.rows_read, stats.distinct_queries, stats.duplicates_merged, stats.normalizer_cache_hits
    );
    Ok((output, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Deterministic offline stand-in for the Solr normalizer:
    /// lowercases, collapses whitespace, and applies an optional
    /// synonym mapping on the whole phrase.
    struct StubNormalizer {
        mapping: HashMap<String, String>,
        calls: AtomicUsize,
    }

    impl StubNormalizer {
        fn new() -> Self {
            Self {
                mapping: HashMap::new(),
                calls: AtomicUsize::new(0),
            }
        }

        fn with_mapping(pairs: &[(&str, &str)]) -> Self {
            let mut stub = Self::new();
            for (from, to) in pairs {
                stub.mapping.insert(from.to_string(), to.to_string());
            }
            stub
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Normalizer for StubNormalizer {
        async fn normalize(&self, text: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
            let lowered = collapsed.to_lowercase();
            Ok(self.mapping.get(&lowered).cloned().unwrap_or(lowered))
        }
    }

    /// Normalizer that always fails, for abort-path tests.
    struct FailingNormalizer;

    #[async_trait]
    impl Normalizer for FailingNormalizer {
        async fn normalize(&self, _text: &str) -> Result<String> {
            Err(anyhow!("analysis endpoint unreachable"))
        }
    }

    fn row(query: &str, other: &str, visits: &str, revenue: &str) -> Vec<String> {
        // Column 1 stands in for the template columns the aggregator
        // must copy from the first-seen row.
        let mut r = vec![String::new(); MIN_QUERY_LOG_COLS];
        r[QUERY_COL] = query.to_string();
        r[1] = other.to_string();
        r[VISITS_COL] = visits.to_string();
        r[REVENUE_COL] = revenue.to_string();
        r
    }

    #[tokio::test]
    async fn test_duplicate_queries_are_merged() {
        let rows = vec![
            row("Red Dress", "first", "10", "$5.00"),
            row("red  dress", "second", "20", "$7.50"),
        ];
        let stub = StubNormalizer::new();
        let (out, stats) = normalize_and_aggregate(&rows, &stub, None).await.unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0][QUERY_COL], "red dress");
        assert_eq!(out[0][VISITS_COL], "30");
        assert_eq!(out[0][REVENUE_COL], "$12.50");
        // Template columns come from the first raw row.
        assert_eq!(out[0][1], "first");

        assert_eq!(stats.rows_read, 2);
        assert_eq!(stats.distinct_queries, 1);
        assert_eq!(stats.duplicates_merged, 1);
        assert_eq!(stats.rows_emitted, 1);
    }

    #[tokio::test]
    async fn test_distinct_queries_pass_through() {
        let rows = vec![
            row("red dress", "a", "10", "$5.00"),
            row("blue shirt", "b", "3", "$1,200.00"),
        ];
        let stub = StubNormalizer::new();
        let (out, stats) = normalize_and_aggregate(&rows, &stub, None).await.unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0][VISITS_COL], "10");
        assert_eq!(out[0][REVENUE_COL], "$5.00");
        assert_eq!(out[1][VISITS_COL], "3");
        assert_eq!(out[1][REVENUE_COL], "$1,200.00");
        assert_eq!(stats.duplicates_merged, 0);
    }

    #[tokio::test]
    async fn test_synonym_mapping_merges_different_raw_texts() {
        let rows = vec![
            row("couch", "a", "5", "$10.00"),
            row("sofa", "b", "7", "$2.00"),
        ];
        let stub = StubNormalizer::with_mapping(&[("couch", "sofa")]);
        let (out, _) = normalize_and_aggregate(&rows, &stub, None).await.unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0][QUERY_COL], "sofa");
        assert_eq!(out[0][VISITS_COL], "12");
        assert_eq!(out[0][REVENUE_COL], "$12.00");
        assert_eq!(out[0][1], "a");
    }

    #[tokio::test]
    async fn test_output_preserves_first_seen_order() {
        let rows = vec![
            row("zebra print", "", "1", "$1.00"),
            row("apple red", "", "1", "$1.00"),
            row("zebra print", "", "1", "$1.00"),
        ];
        let stub = StubNormalizer::new();
        let (out, _) = normalize_and_aggregate(&rows, &stub, None).await.unwrap();
        assert_eq!(out[0][QUERY_COL], "zebra print");
        assert_eq!(out[1][QUERY_COL], "apple red");
    }

    #[tokio::test]
    async fn test_repeated_raw_text_hits_cache() {
        let rows = vec![
            row("red dress", "", "1", "$1.00"),
            row("red dress", "", "1", "$1.00"),
            row("red dress", "", "1", "$1.00"),
        ];
        let stub = StubNormalizer::new();
        let (_, stats) = normalize_and_aggregate(&rows, &stub, None).await.unwrap();
        assert_eq!(stub.call_count(), 1);
        assert_eq!(stats.normalizer_cache_hits, 2);
    }

    #[tokio::test]
    async fn test_normalizer_failure_aborts() {
        let rows = vec![row("red dress", "", "1", "$1.00")];
        let err = normalize_and_aggregate(&rows, &FailingNormalizer, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[tokio::test]
    async fn test_malformed_revenue_aborts() {
        let rows = vec![
            row("red dress", "", "1", "$1.00"),
            row("blue shirt", "", "2", "not money"),
        ];
        let err = normalize_and_aggregate(&rows, &StubNormalizer::new(), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("row 2"));
    }

    #[tokio::test]
    async fn test_short_row_aborts() {
        let rows = vec![vec!["red dress".to_string()]];
        assert!(normalize_and_aggregate(&rows, &StubNormalizer::new(), None)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_empty_log_yields_empty_output() {
        let (out, stats) = normalize_and_aggregate(&[], &StubNormalizer::new(), None)
            .await
            .unwrap();
        assert!(out.is_empty());
        assert_eq!(stats.rows_read, 0);
        assert_eq!(stats.rows_emitted, 0);
    }
}
