// src/index.rs - The entity shingle index
//
// Maps every lowercased shingle of every catalog entity to the
// entities it came from. Built once from the catalog, immutable
// afterwards, and passed by reference to the match resolver and the
// synonym auditor.

use log::{debug, info};
use std::collections::BTreeMap;

use crate::models::core::{EntityRecord, ShingleType};
use crate::models::matching::ShingleEntry;
use crate::shingles::generate_shingles;

/// Ordered mapping from lowercased shingle text to the index entries
/// behind it. BTreeMap gives lexicographic iteration, which the
/// diagnostic dictionary dump relies on; matching correctness does
/// not depend on order.
#[derive(Debug, Clone, Default)]
pub struct EntityIndex {
    entries: BTreeMap<String, Vec<ShingleEntry>>,
    entity_count: usize,
}

impl EntityIndex {
    /// Build the index from a catalog table. The first row holds the
    /// category headers; every subsequent row holds entity values
    /// aligned by column position. Blank cells are skipped entirely.
    pub fn build(table: &[Vec<String>]) -> Self {
        let records = flatten_catalog(table);
        Self::from_records(&records)
    }

    /// Build the index from already-flattened entity records.
    pub fn from_records(records: &[EntityRecord]) -> Self {
        let mut entries: BTreeMap<String, Vec<ShingleEntry>> = BTreeMap::new();

        for record in records {
            let full_text = record.text.split_whitespace().collect::<Vec<_>>().join(" ");
            let full_key = full_text.to_lowercase();

            for shingle in generate_shingles(&record.text) {
                let key = shingle.to_lowercase();
                let shingle_type = if key == full_key {
                    ShingleType::Full
                } else {
                    ShingleType::Partial
                };
                // Append, never overwrite: one key can map to entries
                // from multiple entities and categories.
                entries.entry(key.clone()).or_default().push(ShingleEntry {
                    shingle: key,
                    entity: record.text.clone(),
                    shingle_type,
                    category: record.category.clone(),
                });
            }
        }

        let index = Self {
            entries,
            entity_count: records.len(),
        };
        info!(
            "Entity index built: {} entities, {} shingle keys, {} entries",
            index.entity_count,
            index.len(),
            index.entry_count()
        );
        index
    }

    /// Case-insensitive lookup. Returns all entries behind the
    /// candidate shingle, in first-seen insertion order.
    pub fn get(&self, shingle: &str) -> Option<&[ShingleEntry]> {
        self.entries
            .get(&shingle.to_lowercase())
            .map(|v| v.as_slice())
    }

    /// Number of distinct shingle keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of entries across all keys.
    pub fn entry_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Number of entities the index was built from.
    pub fn entity_count(&self) -> usize {
        self.entity_count
    }

    /// Lexicographic iteration over (key, entries).
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<ShingleEntry>)> {
        self.entries.iter()
    }
}

/// Flatten a catalog table into entity records. Blank cells (empty
/// after trimming) never become records. Rows wider than the header
/// are truncated to the known categories.
pub fn flatten_catalog(table: &[Vec<String>]) -> Vec<EntityRecord> {
    let Some((headers, rows)) = table.split_first() else {
        return Vec::new();
    };

    let mut records = Vec::new();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(headers.len()) {
            let text = cell.trim();
            if text.is_empty() {
                continue;
            }
            records.push(EntityRecord {
                text: text.to_string(),
                category: headers[i].trim().to_string(),
            });
        }
    }
    debug!(
        "Flattened catalog: {} data rows, {} non-blank entities",
        rows.len(),
        records.len()
    );
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Vec<String>> {
        vec![
            vec!["brand".to_string(), "color".to_string()],
            vec!["Acme Widgets".to_string(), "Red".to_string()],
            vec!["Lulu".to_string(), String::new()],
        ]
    }

    #[test]
    fn test_blank_cells_are_skipped() {
        let records = flatten_catalog(&catalog());
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| !r.text.is_empty()));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let index = EntityIndex::build(&catalog());
        assert!(index.get("red").is_some());
        assert!(index.get("RED").is_some());
        assert!(index.get("Red").is_some());
        assert!(index.get("blue").is_none());
    }

    #[test]
    fn test_full_vs_partial_shingles() {
        let index = EntityIndex::build(&catalog());

        let full = &index.get("acme widgets").unwrap()[0];
        assert_eq!(full.shingle_type, ShingleType::Full);
        assert_eq!(full.entity, "Acme Widgets");
        assert_eq!(full.category, "brand");

        let partial = &index.get("acme").unwrap()[0];
        assert_eq!(partial.shingle_type, ShingleType::Partial);
        assert_eq!(partial.entity, "Acme Widgets");
    }

    #[test]
    fn test_shared_shingle_preserves_all_entries() {
        let table = vec![
            vec!["brand".to_string(), "style".to_string()],
            vec!["Summer Co".to_string(), "Summer".to_string()],
        ];
        let index = EntityIndex::build(&table);

        let entries = index.get("summer").unwrap();
        assert_eq!(entries.len(), 2);
        // First-seen insertion order: the brand column comes first.
        assert_eq!(entries[0].category, "brand");
        assert_eq!(entries[0].shingle_type, ShingleType::Partial);
        assert_eq!(entries[1].category, "style");
        assert_eq!(entries[1].shingle_type, ShingleType::Full);
    }

    #[test]
    fn test_build_is_deterministic() {
        let a = EntityIndex::build(&catalog());
        let b = EntityIndex::build(&catalog());
        assert_eq!(a.len(), b.len());
        for (key, entries) in a.iter() {
            assert_eq!(b.get(key), Some(entries.as_slice()));
        }
    }

    #[test]
    fn test_empty_table() {
        let index = EntityIndex::build(&[]);
        assert!(index.is_empty());
        assert_eq!(index.entity_count(), 0);
    }

    #[test]
    fn test_entry_count_counts_every_shingle() {
        // "Acme Widgets" -> 3 shingles, "Red" -> 1, "Lulu" -> 1.
        let index = EntityIndex::build(&catalog());
        assert_eq!(index.entry_count(), 5);
        assert_eq!(index.entity_count(), 3);
    }
}
