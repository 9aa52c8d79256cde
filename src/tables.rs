// src/tables.rs - CSV input/output and diagnostic dumps
//
// All tabular I/O lives here: the entity catalog, the raw and
// aggregated query logs, the matched/unmatched result tables, the
// synonym audit report, and the dictionary dump. The matched and
// unmatched tables are truncated and re-headered at the start of
// every run before any writes (clear and rebuild, never append
// across runs).

use anyhow::{Context, Result};
use csv::{ReaderBuilder, Writer, WriterBuilder};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write as IoWrite};
use std::path::Path;

use crate::index::EntityIndex;
use crate::models::matching::{MatchedShingle, SynonymFlag, UnmatchedShingle};

pub const MATCHED_HEADER: [&str; 7] = [
    "Matched Shingle",
    "Entity",
    "Shingle Type",
    "Category",
    "Search Query",
    "Visits",
    "Revenue",
];
pub const UNMATCHED_HEADER: [&str; 4] =
    ["Unmatched Shingle", "Search Query", "Visits", "Revenue"];
pub const AUDIT_HEADER: [&str; 4] = ["Term", "Category", "Original Rule", "Suggested Rule"];

/// Read a whole CSV file as rows of strings, header included. Rows
/// may have ragged widths (catalog rows with trailing blanks are
/// common).
pub fn read_table(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.with_context(|| format!("Failed to read a row from {}", path.display()))?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }
    Ok(rows)
}

/// Read a query log: header row separated from data rows. The header
/// is structurally unused but re-emitted on the aggregated output.
pub fn read_query_log(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut rows = read_table(path)?;
    if rows.is_empty() {
        anyhow::bail!("Query log {} is empty, expected a header row", path.display());
    }
    let header = rows.remove(0);
    Ok((header, rows))
}

/// Write the aggregated query log: original header, then one row per
/// distinct normalized query.
pub fn write_aggregated_log(
    path: &Path,
    header: &[String],
    rows: &[Vec<String>],
) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer
        .write_record(header)
        .context("Failed to write aggregated log header")?;
    for row in rows {
        writer
            .write_record(row)
            .context("Failed to write aggregated log row")?;
    }
    writer.flush().context("Failed to flush aggregated log")?;
    Ok(())
}

/// Open, truncated, matched and unmatched result writers with their
/// headers already written.
pub struct MatchTableWriters {
    matched: Writer<File>,
    unmatched: Writer<File>,
}

impl MatchTableWriters {
    pub fn create(matched_path: &Path, unmatched_path: &Path) -> Result<Self> {
        let mut matched = Writer::from_path(matched_path)
            .with_context(|| format!("Failed to create {}", matched_path.display()))?;
        let mut unmatched = Writer::from_path(unmatched_path)
            .with_context(|| format!("Failed to create {}", unmatched_path.display()))?;
        matched
            .write_record(MATCHED_HEADER)
            .context("Failed to write matched table header")?;
        unmatched
            .write_record(UNMATCHED_HEADER)
            .context("Failed to write unmatched table header")?;
        Ok(Self { matched, unmatched })
    }

    pub fn write_matched(&mut self, result: &MatchedShingle) -> Result<()> {
        self.matched
            .write_record([
                result.shingle.as_str(),
                result.entity.as_str(),
                result.shingle_type.as_str(),
                result.category.as_str(),
                result.query.as_str(),
                result.visits.as_str(),
                result.revenue.as_str(),
            ])
            .context("Failed to write matched table row")
    }

    pub fn write_unmatched(&mut self, result: &UnmatchedShingle) -> Result<()> {
        self.unmatched
            .write_record([
                result.shingle.as_str(),
                result.query.as_str(),
                result.visits.as_str(),
                result.revenue.as_str(),
            ])
            .context("Failed to write unmatched table row")
    }

    pub fn flush(&mut self) -> Result<()> {
        self.matched.flush().context("Failed to flush matched table")?;
        self.unmatched
            .flush()
            .context("Failed to flush unmatched table")?;
        Ok(())
    }
}

/// Dump the entity index for diagnostics: one line per entry, keys in
/// lexicographic order, entries in first-seen order within a key.
pub fn write_dictionary_dump(path: &Path, index: &EntityIndex) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for (key, entries) in index.iter() {
        for entry in entries {
            writeln!(
                out,
                "{}: {} ({}, {})",
                key, entry.entity, entry.shingle_type, entry.category
            )
            .context("Failed to write dictionary dump line")?;
        }
    }
    out.flush().context("Failed to flush dictionary dump")?;
    Ok(())
}

/// Read a line-oriented text file (the synonym rules input).
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut lines = Vec::new();
    for line in reader.lines() {
        lines.push(line.with_context(|| format!("Failed to read from {}", path.display()))?);
    }
    Ok(lines)
}

/// Write the synonym audit report.
pub fn write_audit_report(path: &Path, flags: &[SynonymFlag]) -> Result<()> {
    let mut writer = Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer
        .write_record(AUDIT_HEADER)
        .context("Failed to write audit report header")?;
    for flag in flags {
        writer
            .write_record([
                flag.term.as_str(),
                flag.category.as_str(),
                flag.original_line.as_str(),
                flag.suggested_line.as_str(),
            ])
            .context("Failed to write audit report row")?;
    }
    writer.flush().context("Failed to flush audit report")?;
    Ok(())
}
