use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

// Same class as C `ispunct`: ASCII punctuation and symbols.
static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[[:punct:]]").expect("punctuation class is a valid pattern"));

/// Normalizes raw text into lowercase tokens.
///
/// Punctuation is replaced with whitespace rather than removed, so word
/// boundaries survive: `"don't"` becomes `["don", "t"]`. No stemming and no
/// stop-word removal is applied.
pub fn normalize(text: &str) -> Vec<String> {
    let spaced = PUNCTUATION.replace_all(text, " ");
    spaced
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// The distinct token set of a message. Only presence matters to the model,
/// so a token appearing twice is kept once.
pub fn document(text: &str) -> BTreeSet<String> {
    normalize(text).into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_punctuation_preserves_word_boundaries() {
        assert_eq!(normalize("don't stop"), vec!["don", "t", "stop"]);
        assert_eq!(normalize("win$$$money!!now"), vec!["win", "money", "now"]);
    }

    #[test]
    fn test_lowercases_and_splits_whitespace_runs() {
        assert_eq!(
            normalize("  FREE\tEntry \n\n in 2 a WKLY comp "),
            vec!["free", "entry", "in", "2", "a", "wkly", "comp"]
        );
    }

    #[test]
    fn test_empty_and_punctuation_only_input() {
        assert!(normalize("").is_empty());
        assert!(normalize("   ").is_empty());
        assert!(normalize("?!...,;").is_empty());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "Hello, World!",
            "URGENT!! You've WON a £1000 prize... call 09061701461",
            "e-mail me @ foo_bar.baz",
            "",
        ];
        for input in inputs {
            let once = normalize(input);
            let twice = normalize(&once.join(" "));
            assert_eq!(once, twice, "normalize not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_document_deduplicates() {
        let doc = document("Money money MONEY, now!");
        assert_eq!(doc.len(), 2);
        assert!(doc.contains("money"));
        assert!(doc.contains("now"));
    }

    #[test]
    fn test_non_ascii_letters_are_kept() {
        assert_eq!(normalize("Café Größe"), vec!["café", "größe"]);
    }
}
