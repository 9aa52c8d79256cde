// src/shingles.rs - Contiguous word-subsequence generation
//
// A shingle is a contiguous run of whitespace-delimited words from a
// phrase, joined by single spaces. For n words the generator yields
// n(n+1)/2 shingles, grouped by start index then increasing length.

/// Generate every contiguous word span of `phrase`.
///
/// Whitespace splitting follows the standard semantics: consecutive
/// whitespace collapses and leading/trailing whitespace is ignored, so
/// `"  a   b "` produces the same shingles as `"a b"`. An empty or
/// all-whitespace phrase yields an empty vec.
pub fn generate_shingles(phrase: &str) -> Vec<String> {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    let mut shingles = Vec::with_capacity(words.len() * (words.len() + 1) / 2);
    for i in 0..words.len() {
        for j in i..words.len() {
            shingles.push(words[i..=j].join(" "));
        }
    }
    shingles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_word_phrase_order() {
        assert_eq!(
            generate_shingles("a b c"),
            vec!["a", "a b", "a b c", "b", "b c", "c"]
        );
    }

    #[test]
    fn test_count_is_triangular() {
        for phrase in ["one", "one two", "red summer maxi dress", "a b c d e f"] {
            let n = phrase.split_whitespace().count();
            assert_eq!(generate_shingles(phrase).len(), n * (n + 1) / 2);
        }
    }

    #[test]
    fn test_empty_and_blank_phrases() {
        assert!(generate_shingles("").is_empty());
        assert!(generate_shingles("   \t ").is_empty());
    }

    #[test]
    fn test_whitespace_collapses() {
        assert_eq!(generate_shingles("  a   b "), generate_shingles("a b"));
    }

    #[test]
    fn test_single_word() {
        assert_eq!(generate_shingles("dress"), vec!["dress"]);
    }

    #[test]
    fn test_case_preserved() {
        assert_eq!(
            generate_shingles("Red Dress"),
            vec!["Red", "Red Dress", "Dress"]
        );
    }
}
