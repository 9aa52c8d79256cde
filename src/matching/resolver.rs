// src/matching/resolver.rs - Shingle match resolution
//
// Every shingle of a query lands in exactly one of the two output
// streams: one matched row per index entry when the shingle is a
// known key (ambiguous shingles fan out to several rows), exactly one
// unmatched row otherwise. No shingle is ever dropped silently.

use anyhow::{bail, Result};
use indicatif::ProgressBar;
use log::{debug, info};

use crate::index::EntityIndex;
use crate::models::matching::{MatchedShingle, UnmatchedShingle};
use crate::models::stats_models::MatchingStats;
use crate::shingles::generate_shingles;
use crate::tables::MatchTableWriters;
use crate::utils::constants::{MIN_QUERY_LOG_COLS, QUERY_COL, REVENUE_COL, VISITS_COL};

/// Resolve one query's shingles against the entity index. `visits`
/// and `revenue` are carried through verbatim from the aggregated
/// log; the resolver never reinterprets them.
pub fn resolve(
    query: &str,
    visits: &str,
    revenue: &str,
    index: &EntityIndex,
) -> (Vec<MatchedShingle>, Vec<UnmatchedShingle>) {
    let mut matched = Vec::new();
    let mut unmatched = Vec::new();

    for shingle in generate_shingles(query) {
        match index.get(&shingle) {
            Some(entries) => {
                for entry in entries {
                    matched.push(MatchedShingle {
                        shingle: shingle.clone(),
                        entity: entry.entity.clone(),
                        shingle_type: entry.shingle_type,
                        category: entry.category.clone(),
                        query: query.to_string(),
                        visits: visits.to_string(),
                        revenue: revenue.to_string(),
                    });
                }
            }
            None => {
                unmatched.push(UnmatchedShingle {
                    shingle,
                    query: query.to_string(),
                    visits: visits.to_string(),
                    revenue: revenue.to_string(),
                });
            }
        }
    }

    (matched, unmatched)
}

/// Stream the aggregated query log against the index, appending every
/// result to the already-truncated matched/unmatched tables.
pub fn run_match_resolution(
    rows: &[Vec<String>],
    index: &EntityIndex,
    writers: &mut MatchTableWriters,
    pb: Option<&ProgressBar>,
) -> Result<MatchingStats> {
    let mut stats = MatchingStats::default();

    for (i, row) in rows.iter().enumerate() {
        if row.len() < MIN_QUERY_LOG_COLS {
            bail!(
                "Aggregated log row {} has {} columns, expected at least {}",
                i + 1,
                row.len(),
                MIN_QUERY_LOG_COLS
            );
        }
        let query = &row[QUERY_COL];
        let (matched, unmatched) = resolve(query, &row[VISITS_COL], &row[REVENUE_COL], index);

        for result in &matched {
            writers.write_matched(result)?;
        }
        for result in &unmatched {
            writers.write_unmatched(result)?;
        }

        let shingles = generate_shingles(query);
        stats.ambiguous_shingles += shingles
            .iter()
            .filter(|s| index.get(s).map_or(0, |entries| entries.len()) > 1)
            .count();
        stats.queries_processed += 1;
        stats.shingles_generated += shingles.len();
        stats.matched_rows += matched.len();
        stats.unmatched_rows += unmatched.len();

        debug!(
            "Resolved '{}': {} matched rows, {} unmatched shingles",
            query,
            matched.len(),
            unmatched.len()
        );
        if let Some(pb) = pb {
            pb.inc(1);
        }
    }

    writers.flush()?;
    info!(
        "Match resolution complete: {} queries, {} shingles -> {} matched rows ({} ambiguous shingles), {} unmatched",
        stats.queries_processed,
        stats.shingles_generated,
        stats.matched_rows,
        stats.ambiguous_shingles,
        stats.unmatched_rows
    );
    Ok(stats)
}
