// src/synonyms.rs - Synonym rule parsing and auditing
//
// A synonym rule file is line-oriented: `left => right1, right2, ...`.
// The audit flags rules whose left term is a known entity shingle but
// is missing from its own right-hand expansion, and suggests the
// corrected line with the left term prepended.

use log::info;

use crate::index::EntityIndex;
use crate::models::core::SynonymRule;
use crate::models::matching::SynonymFlag;

/// Parse one line into a rule. Only the first `=>` delimits; any
/// later `=>` is part of the right-hand text. Lines without `=>` are
/// not rules and yield None.
pub fn parse_rule(line: &str) -> Option<SynonymRule> {
    let (left, right) = line.split_once("=>")?;
    let rights: Vec<String> = right
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    Some(SynonymRule {
        left: left.trim().to_string(),
        rights,
    })
}

/// Audit synonym rules against the entity index. A rule is flagged
/// iff its lowercased left term is an index key and the left term (in
/// its original form, verbatim) is absent from the right-hand list.
pub fn audit(lines: &[String], index: &EntityIndex) -> Vec<SynonymFlag> {
    let mut flags = Vec::new();
    let mut rules_seen = 0usize;

    for line in lines {
        let Some(rule) = parse_rule(line) else {
            continue;
        };
        rules_seen += 1;

        let Some(entries) = index.get(&rule.left) else {
            continue;
        };
        if rule.rights.iter().any(|r| r == &rule.left) {
            continue;
        }
        let Some(first) = entries.first() else {
            continue;
        };

        let suggested_line = if rule.rights.is_empty() {
            format!("{} => {}", rule.left, rule.left)
        } else {
            format!("{} => {}, {}", rule.left, rule.left, rule.rights.join(", "))
        };
        flags.push(SynonymFlag {
            term: rule.left.clone(),
            // Shared shingles collapse to the first-inserted entry's
            // category here; the index itself keeps every entry.
            category: first.category.clone(),
            original_line: line.clone(),
            suggested_line,
        });
    }

    info!(
        "Synonym audit: {} lines, {} rules, {} flagged",
        lines.len(),
        rules_seen,
        flags.len()
    );
    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> EntityIndex {
        EntityIndex::build(&[
            vec!["category".to_string(), "brand".to_string()],
            vec!["widget".to_string(), "Acme".to_string()],
        ])
    }

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_splits_on_first_arrow_only() {
        let rule = parse_rule("a => b => c, d").unwrap();
        assert_eq!(rule.left, "a");
        assert_eq!(rule.rights, vec!["b => c", "d"]);
    }

    #[test]
    fn test_parse_trims_terms() {
        let rule = parse_rule("  widget  =>  gadget ,  gizmo ").unwrap();
        assert_eq!(rule.left, "widget");
        assert_eq!(rule.rights, vec!["gadget", "gizmo"]);
    }

    #[test]
    fn test_lines_without_arrow_are_not_rules() {
        assert!(parse_rule("just a comment line").is_none());
        assert!(parse_rule("").is_none());
    }

    #[test]
    fn test_known_term_missing_from_expansion_is_flagged() {
        let flags = audit(&lines(&["widget => gadget"]), &index());
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].term, "widget");
        assert_eq!(flags[0].category, "category");
        assert_eq!(flags[0].original_line, "widget => gadget");
        assert_eq!(flags[0].suggested_line, "widget => widget, gadget");
    }

    #[test]
    fn test_term_already_in_expansion_is_not_flagged() {
        let flags = audit(&lines(&["widget => widget, gadget"]), &index());
        assert!(flags.is_empty());
    }

    #[test]
    fn test_unknown_term_is_not_flagged() {
        let flags = audit(&lines(&["doohickey => gadget"]), &index());
        assert!(flags.is_empty());
    }

    #[test]
    fn test_right_side_comparison_is_case_sensitive() {
        // "Widget" is a key case-insensitively, but the right-hand
        // check wants the original form verbatim.
        let flags = audit(&lines(&["Widget => widget, gadget"]), &index());
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].suggested_line, "Widget => Widget, widget, gadget");
    }

    #[test]
    fn test_shared_shingle_takes_first_entry_category() {
        let idx = EntityIndex::build(&[
            vec!["brand".to_string(), "style".to_string()],
            vec!["Summer Co".to_string(), "Summer".to_string()],
        ]);
        let flags = audit(&lines(&["summer => beach"]), &idx);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].category, "brand");
    }

    #[test]
    fn test_non_rule_lines_are_skipped_among_rules() {
        let flags = audit(
            &lines(&["# synonyms", "widget => gadget", "", "plain line"]),
            &index(),
        );
        assert_eq!(flags.len(), 1);
    }
}
