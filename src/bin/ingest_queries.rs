// src/bin/ingest_queries.rs - Query log ingestion into the document index
//
// Clears the Solr collection, then ingests the raw query log as
// {query, visits, revenue} documents in batches. Independent of the
// matching pipeline.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use matcher_lib::ingest::{QueryDocument, SolrIngestClient};
use matcher_lib::models::core::QueryRecord;
use matcher_lib::normalize::SolrConfig;
use matcher_lib::tables::read_query_log;
use matcher_lib::utils::constants::INGEST_BATCH_SIZE;
use matcher_lib::utils::env::load_env;
use matcher_lib::utils::progress_bars::ProgressConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "ingest_queries",
    about = "Clear the document index and ingest the raw query log"
)]
struct Args {
    /// Raw query log CSV (query at column 0, visits at 4, revenue at 8)
    #[arg(long, default_value = "search_queries.csv")]
    queries: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    info!("Starting query log ingestion");
    load_env();

    let args = Args::parse();
    let solr_config = SolrConfig::from_env();
    solr_config.log_config();
    let progress_config = ProgressConfig::from_env();

    let (_, rows) = read_query_log(&args.queries)
        .with_context(|| format!("Failed to load query log {}", args.queries.display()))?;

    let mut documents = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let record = QueryRecord::from_row(row, i + 1)?;
        documents.push(QueryDocument::from_record(&record)?);
    }
    info!("Parsed {} query documents", documents.len());

    let client = SolrIngestClient::new(solr_config);
    client
        .clear_all()
        .await
        .context("Failed to clear the document index")?;

    let pb = if progress_config.enabled {
        let pb = ProgressBar::new(documents.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} documents ingested")
                .unwrap(),
        );
        Some(pb)
    } else {
        None
    };

    for batch in documents.chunks(INGEST_BATCH_SIZE) {
        client
            .ingest(batch)
            .await
            .context("Failed to ingest a document batch")?;
        if let Some(pb) = &pb {
            pb.inc(batch.len() as u64);
        }
    }
    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }

    info!("Data ingested successfully: {} documents", documents.len());
    Ok(())
}
