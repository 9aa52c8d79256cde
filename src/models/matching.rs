// src/models/matching.rs - Match result and index entry types
use crate::models::core::ShingleType;

/// One index entry behind a shingle key. A single key can carry
/// entries from multiple distinct entities and categories; ambiguous
/// matches are preserved, not deduplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShingleEntry {
    /// Lowercased shingle text (same as the key it is stored under).
    pub shingle: String,
    /// Original entity text, case preserved.
    pub entity: String,
    pub shingle_type: ShingleType,
    /// Header of the catalog column the entity came from.
    pub category: String,
}

/// A shingle that hit the entity index, with full provenance. One
/// matched shingle produces one of these per index entry.
#[derive(Debug, Clone)]
pub struct MatchedShingle {
    /// Shingle text as generated from the query, case preserved.
    pub shingle: String,
    pub entity: String,
    pub shingle_type: ShingleType,
    pub category: String,
    pub query: String,
    pub visits: String,
    pub revenue: String,
}

/// A shingle with no entry in the entity index.
#[derive(Debug, Clone)]
pub struct UnmatchedShingle {
    pub shingle: String,
    pub query: String,
    pub visits: String,
    pub revenue: String,
}

/// A synonym rule whose left term is a known entity shingle but does
/// not appear in its own right-hand expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymFlag {
    pub term: String,
    /// Category of the first index entry for the term. When a shingle
    /// is shared across categories, first insertion order wins.
    pub category: String,
    pub original_line: String,
    pub suggested_line: String,
}
