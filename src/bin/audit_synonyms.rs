// src/bin/audit_synonyms.rs - Standalone synonym rule audit
//
// Independent of the matching pipeline: builds the entity index from
// the catalog, checks every synonym rule against it, and writes the
// flagged rules with suggested rewrites.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use matcher_lib::index::EntityIndex;
use matcher_lib::synonyms::audit;
use matcher_lib::tables::{read_lines, read_table, write_audit_report};
use matcher_lib::utils::env::load_env;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "audit_synonyms",
    about = "Flag synonym rules whose left term is a known entity shingle missing from its own expansion"
)]
struct Args {
    /// Entity catalog CSV (header row = category names)
    #[arg(long, default_value = "inputs.csv")]
    catalog: PathBuf,

    /// Synonym rules file (lines of the form `left => right1, right2`)
    #[arg(long, default_value = "synonyms.txt")]
    synonyms: PathBuf,

    /// Audit report output
    #[arg(long, default_value = "SynonymAudit.csv")]
    report: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    info!("Starting synonym rule audit");
    load_env();

    let args = Args::parse();

    let catalog = read_table(&args.catalog)
        .with_context(|| format!("Failed to load entity catalog {}", args.catalog.display()))?;
    let index = EntityIndex::build(&catalog);

    let lines = read_lines(&args.synonyms)
        .with_context(|| format!("Failed to load synonym rules {}", args.synonyms.display()))?;
    let flags = audit(&lines, &index);

    write_audit_report(&args.report, &flags).context("Failed to write synonym audit report")?;
    info!(
        "Synonym audit complete: {} rules flagged, report written to {}",
        flags.len(),
        args.report.display()
    );
    Ok(())
}
