//! Search-query entity matching pipeline.
//!
//! Builds a shingle dictionary from an entity catalog, aggregates a
//! raw search-query log by externally-normalized query text, resolves
//! every query shingle against the dictionary, and audits synonym
//! rules against the same dictionary.

pub mod aggregate;
pub mod index;
pub mod ingest;
pub mod matching;
pub mod models;
pub mod normalize;
pub mod shingles;
pub mod synonyms;
pub mod tables;
pub mod utils;

pub use index::EntityIndex;
