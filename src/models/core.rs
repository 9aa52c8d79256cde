// src/models/core.rs - Core domain types shared across the pipeline
use anyhow::{anyhow, Context, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

use crate::utils::constants::{QUERY_COL, REVENUE_COL, VISITS_COL};
use crate::utils::currency::parse_currency;

/// Whether a shingle covers its source entity's entire text or only a
/// contiguous fragment of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShingleType {
    Full,
    Partial,
}

impl ShingleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShingleType::Full => "full",
            ShingleType::Partial => "partial",
        }
    }
}

impl fmt::Display for ShingleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One catalog value and the category column it was loaded from.
/// Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRecord {
    pub text: String,
    pub category: String,
}

/// One parsed row of the raw query log. Used by the ingestion path;
/// the aggregator works on whole rows so it can re-emit template
/// columns verbatim.
#[derive(Debug, Clone, Serialize)]
pub struct QueryRecord {
    pub query: String,
    pub visits: u64,
    pub revenue: Decimal,
}

impl QueryRecord {
    /// Parse the positional columns of a query log row. `row_number`
    /// is 1-based (data rows, header excluded) and only used for
    /// error reporting. Malformed numeric fields fail loudly rather
    /// than coercing to zero.
    pub fn from_row(row: &[String], row_number: usize) -> Result<Self> {
        if row.len() <= REVENUE_COL {
            return Err(anyhow!(
                "Query log row {} has {} columns, expected at least {}",
                row_number,
                row.len(),
                REVENUE_COL + 1
            ));
        }

        let query = row[QUERY_COL].clone();
        let visits: u64 = row[VISITS_COL]
            .trim()
            .parse()
            .with_context(|| {
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

        Ok(Self {
            query,
            visits,
            revenue,
        })
    }
}

/// One synonym rule from the rules file: `left => right1, right2, ...`.
/// Read once per run, audited against the entity index, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymRule {
    pub left: String,
    pub rights: Vec<String>,
}
