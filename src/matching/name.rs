// src/matching/name.rs - Name normalization and word-overlap similarity
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Tokens shorter than this many characters do not count toward overlap.
pub const MIN_TOKEN_CHARS: usize = 3;

static SPRING_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\b(?:hot\s+)?springs?\s*$").unwrap());
static AREA_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\barea\s*$").unwrap());
static QUOTE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"['`\x{2019}]").unwrap());
static NON_ALPHANUMERIC_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\p{L}\p{N}]+").unwrap());

/// Canonical matching key for a listing name. Lossy: "Foo Hot
/// Springs", "Foo Springs" and "Foo Spring" all become "foo".
pub fn normalize_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let without_spring = SPRING_SUFFIX.replace(&lowered, "");
    let without_area = AREA_SUFFIX.replace(&without_spring, "");
    let without_quotes = QUOTE_CHARS.replace_all(&without_area, "");
    NON_ALPHANUMERIC_RUN
        .replace_all(&without_quotes, " ")
        .trim()
        .to_string()
}

/// Distinct tokens of a normalized key that are long enough to be meaningful.
pub fn tokenize_name(normalized_name: &str) -> HashSet<&str> {
    normalized_name
        .split_whitespace()
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .collect()
}

/// Word-overlap test between two normalized keys.
///
/// With at least two tokens on each side a majority of the smaller side must
/// be shared, so one common word cannot link two multi-word names. A
/// single-token side only matches when that token appears on the other side;
/// for two single-token names that means exact equality.
pub fn are_names_similar(normalized_a: &str, normalized_b: &str) -> bool {
    let tokens_a = tokenize_name(normalized_a);
    let tokens_b = tokenize_name(normalized_b);
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return false;
    }

    let min_tokens = tokens_a.len().min(tokens_b.len());
    let shared = tokens_a.intersection(&tokens_b).count();

    if min_tokens >= 2 {
        shared >= (min_tokens + 1) / 2
    } else {
        shared >= 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_spring_suffixes() {
        assert_eq!(normalize_name("Baumgartner Hot Springs"), "baumgartner");
        assert_eq!(normalize_name("Baumgartner Spring"), "baumgartner");
        assert_eq!(normalize_name("Baumgartner Springs"), "baumgartner");
        assert_eq!(normalize_name("  Goldbug Hot Spring  "), "goldbug");
    }

    #[test]
    fn test_normalize_strips_area_and_punctuation() {
        assert_eq!(normalize_name("Deer Creek Area"), "deer creek");
        assert_eq!(normalize_name("Jerry's `Pool`"), "jerrys pool");
        assert_eq!(normalize_name("Kirkham/Warm--Pools (Upper)"), "kirkham warm pools upper");
        assert_eq!(normalize_name("Frenchman’s Bend Hot Springs"), "frenchmans bend");
    }

    #[test]
    fn test_normalize_only_strips_whole_words() {
        assert_eq!(normalize_name("Wellspring"), "wellspring");
        assert_eq!(normalize_name("Bigarea"), "bigarea");
    }

    #[test]
    fn test_normalize_degenerate_names() {
        assert_eq!(normalize_name(""), "");
        assert_eq!(normalize_name("Hot Springs"), "");
        assert_eq!(normalize_name("!!!"), "");
    }

    #[test]
    fn test_normalize_keeps_non_ascii_letters() {
        assert_eq!(normalize_name("Agua Caliente de Peñasco"), "agua caliente de peñasco");
    }

    #[test]
    fn test_tokenize_drops_short_words() {
        let tokens = tokenize_name("big mo of the rio");
        assert!(tokens.contains("big"));
        assert!(tokens.contains("the"));
        assert!(tokens.contains("rio"));
        assert!(!tokens.contains("mo"));
        assert!(!tokens.contains("of"));
    }

    #[test]
    fn test_multi_word_names_need_majority_overlap() {
        assert!(are_names_similar("upper goldbug pools", "goldbug pools"));
        assert!(are_names_similar("lower burgdorf", "burgdorf lower pool"));
        assert!(!are_names_similar("jerry johnson", "stanley"));
        assert!(!are_names_similar("warm river pools", "cold lake camp"));
        // 1 shared of min 3 -> needs 2
        assert!(!are_names_similar("sunbeam warm creek", "boat box creek"));
    }

    #[test]
    fn test_single_token_names() {
        assert!(are_names_similar("goldbug", "goldbug"));
        assert!(!are_names_similar("goldbug", "sunbeam"));
        assert!(are_names_similar("goldbug", "goldbug creek"));
        assert!(!are_names_similar("goldbug", "sunbeam creek"));
    }

    #[test]
    fn test_empty_tokens_never_similar() {
        assert!(!are_names_similar("", ""));
        assert!(!are_names_similar("", "goldbug"));
        assert!(!are_names_similar("ab", "ab"));
    }

    #[test]
    fn test_similarity_is_symmetric() {
        let names = ["upper goldbug pools", "goldbug", "goldbug creek", "", "stanley", "jerry johnson"];
        for a in names {
            for b in names {
                assert_eq!(are_names_similar(a, b), are_names_similar(b, a), "{} / {}", a, b);
            }
        }
    }
}
