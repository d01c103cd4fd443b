//! Query tokenization.

/// The literal query meaning "everything"
pub const MATCH_ALL: &str = "*";

/// Lowercase, split on whitespace, drop empties.
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .trim()
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// True when the query selects every document.
pub fn is_match_all(query: &str) -> bool {
    let query = query.trim();
    query.is_empty() || query == MATCH_ALL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("  Hair   CUT\tQuito "), vec!["hair", "cut", "quito"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_match_all() {
        assert!(is_match_all("*"));
        assert!(is_match_all(" "));
        assert!(!is_match_all("hair"));
    }
}
