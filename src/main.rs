use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use matcher_lib::aggregate::normalize_and_aggregate;
use matcher_lib::index::EntityIndex;
use matcher_lib::matching::resolver::run_match_resolution;
use matcher_lib::models::stats_models::PipelineStats;
use matcher_lib::normalize::{SolrConfig, SolrNormalizer};
use matcher_lib::tables::{
    read_query_log, read_table, write_aggregated_log, write_dictionary_dump, MatchTableWriters,
};
use matcher_lib::utils::env::load_env;
use matcher_lib::utils::get_memory_usage;
use matcher_lib::utils::progress_bars::ProgressConfig;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(
    name = "matcher",
    about = "Build the entity shingle index, aggregate the query log, and resolve matches"
)]
struct Args {
    /// Entity catalog CSV (header row = category names)
    #[arg(long, default_value = "inputs.csv")]
    catalog: PathBuf,

    /// Raw query log CSV (query at column 0, visits at 4, revenue at 8)
    #[arg(long, default_value = "search_queries.csv")]
    queries: PathBuf,

    /// Aggregated query log output
    #[arg(long, default_value = "AggregatedQueries.csv")]
    aggregated_out: PathBuf,

    /// Matched results output
    #[arg(long, default_value = "MatchedTable.csv")]
    matched_out: PathBuf,

    /// Unmatched results output
    #[arg(long, default_value = "UnmatchedTable.csv")]
    unmatched_out: PathBuf,

    /// Diagnostic dump of the shingle dictionary
    #[arg(long, default_value = "populated_dict.txt")]
    dictionary_dump: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging and environment
    env_logger::init();
    info!("Starting search-query entity matching pipeline");
    load_env();

    let args = Args::parse();

    let solr_config = SolrConfig::from_env();
    solr_config.log_config();

    // Load progress configuration from environment
    let progress_config = Arc::new(ProgressConfig::from_env());
    info!(
        "Progress tracking: enabled={}, detailed={}",
        progress_config.enabled, progress_config.detailed
    );
    let multi_progress = progress_config.create_multi_progress();

    // Create main pipeline progress bar
    let main_pb = if let Some(mp) = &multi_progress {
        let pb = mp.add(ProgressBar::new(3));
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}",
                )
                .unwrap()
                .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        pb.set_message("Initializing pipeline...");
        Some(pb)
    } else {
        None
    };

    info!("Instantiating variables for run");
    let mut phase_times = HashMap::new();
    let run_id = Uuid::new_v4().to_string();
    let run_timestamp = Utc::now().naive_utc();
    let mut stats = PipelineStats::new(&run_id, run_timestamp, Some("Full matching pipeline run"));
    info!("Pipeline run ID: {}", run_id);

    // Phase 1: Entity Index construction
    if let Some(pb) = &main_pb {
        pb.set_message("Phase 1: Building entity index");
    }
    let phase1_start = Instant::now();
    info!("Phase 1: Entity index construction starting...");

    let catalog = read_table(&args.catalog)
        .with_context(|| format!("Failed to load entity catalog {}", args.catalog.display()))?;
    let index = EntityIndex::build(&catalog);
    stats.total_entities = index.entity_count();
    stats.total_shingle_keys = index.len();
    stats.total_shingle_entries = index.entry_count();

    write_dictionary_dump(&args.dictionary_dump, &index)
        .context("Failed to write dictionary dump")?;

    let phase1_duration = phase1_start.elapsed();
    phase_times.insert("index_build".to_string(), phase1_duration);
    stats.index_build_time = phase1_duration.as_secs_f64();
    info!(
        "Phase 1 completed: {} entities -> {} shingle keys in {:.2?}",
        stats.total_entities, stats.total_shingle_keys, phase1_duration
    );

    // Phase 2: Query normalization and aggregation
    if let Some(pb) = &main_pb {
        pb.inc(1);
        pb.set_message("Phase 2: Aggregating query log");
    }
    let phase2_start = Instant::now();
    info!("Phase 2: Query normalization and aggregation starting...");

    let (query_header, query_rows) = read_query_log(&args.queries)
        .with_context(|| format!("Failed to load query log {}", args.queries.display()))?;
    stats.total_queries_raw = query_rows.len();

    let row_pb = if progress_config.should_show_detailed() {
        multi_progress.as_ref().map(|mp| {
            let pb = mp.add(ProgressBar::new(query_rows.len() as u64));
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("    {bar:40.green/dim} {pos}/{len} queries normalized")
                    .unwrap(),
            );
            pb
        })
    } else {
        None
    };

    let normalizer = SolrNormalizer::new(solr_config);
    let (aggregated_rows, aggregation_stats) =
        normalize_and_aggregate(&query_rows, &normalizer, row_pb.as_ref())
            .await
            .context("Query aggregation failed")?;
    if let Some(pb) = &row_pb {
        pb.finish_and_clear();
    }

    write_aggregated_log(&args.aggregated_out, &query_header, &aggregated_rows)
        .context("Failed to write aggregated query log")?;
    stats.total_queries_aggregated = aggregated_rows.len();

    let phase2_duration = phase2_start.elapsed();
    phase_times.insert("aggregation".to_string(), phase2_duration);
    stats.aggregation_time = phase2_duration.as_secs_f64();
    info!(
        "Phase 2 completed: {} raw rows -> {} aggregated rows in {:.2?}",
        stats.total_queries_raw, stats.total_queries_aggregated, phase2_duration
    );

    // Phase 3: Match resolution
    if let Some(pb) = &main_pb {
        pb.inc(1);
        pb.set_message("Phase 3: Resolving matches");
    }
    let phase3_start = Instant::now();
    info!("Phase 3: Match resolution starting...");

    let mut writers = MatchTableWriters::create(&args.matched_out, &args.unmatched_out)
        .context("Failed to create match result tables")?;
    let query_pb = if progress_config.should_show_detailed() {
        multi_progress.as_ref().map(|mp| {
            let pb = mp.add(ProgressBar::new(aggregated_rows.len() as u64));
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("    {bar:40.green/dim} {pos}/{len} queries resolved")
                    .unwrap(),
            );
            pb
        })
    } else {
        None
    };

    let matching_stats =
        run_match_resolution(&aggregated_rows, &index, &mut writers, query_pb.as_ref())
            .context("Match resolution failed")?;
    if let Some(pb) = &query_pb {
        pb.finish_and_clear();
    }
    stats.total_matched_rows = matching_stats.matched_rows;
    stats.total_unmatched_rows = matching_stats.unmatched_rows;

    let phase3_duration = phase3_start.elapsed();
    phase_times.insert("matching".to_string(), phase3_duration);
    stats.matching_time = phase3_duration.as_secs_f64();

    if let Some(pb) = &main_pb {
        pb.inc(1);
        pb.set_message(format!(
            "Pipeline complete: {} matched rows",
            stats.total_matched_rows
        ));
        pb.finish();
    }

    // Print comprehensive summary
    let total_time = phase1_duration + phase2_duration + phase3_duration;
    stats.total_processing_time = total_time.as_secs_f64();

    info!("=== Pipeline Summary ===");
    info!("Run ID: {}", run_id);
    info!("Total entities: {}", stats.total_entities);
    info!(
        "Shingle dictionary: {} keys, {} entries",
        stats.total_shingle_keys, stats.total_shingle_entries
    );
    info!(
        "Queries: {} raw -> {} aggregated ({} duplicates merged)",
        stats.total_queries_raw,
        stats.total_queries_aggregated,
        aggregation_stats.duplicates_merged
    );
    info!(
        "Matches: {} matched rows ({} ambiguous shingles), {} unmatched",
        stats.total_matched_rows, matching_stats.ambiguous_shingles, stats.total_unmatched_rows
    );
    info!("=== Timing Breakdown ===");
    info!("Phase 1 (Index Build): {:.2?}", phase1_duration);
    info!("Phase 2 (Aggregation): {:.2?}", phase2_duration);
    info!("Phase 3 (Match Resolution): {:.2?}", phase3_duration);
    info!("Total execution time: {:.2?}", total_time);

    if progress_config.should_show_memory() {
        let final_memory_mb = get_memory_usage().await;
        info!("Final memory usage: {} MB", final_memory_mb);
    }
    if progress_config.should_show_cache_stats() {
        info!(
            "Normalization cache: {} hits over {} rows",
            aggregation_stats.normalizer_cache_hits, aggregation_stats.rows_read
        );
    }

    info!("Pipeline completed successfully!");
    Ok(())
}
