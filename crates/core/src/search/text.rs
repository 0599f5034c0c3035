//! Query text normalization and tokenization.
//!
//! The tokenizer is shared between the write path (maintaining the token
//! index and full-text rows) and the query path, so both sides agree on
//! what a token is.

/// Split text into lowercase alphanumeric tokens of at least two
/// characters, deduplicated in first-seen order.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for token in text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= 2)
    {
        if !tokens.iter().any(|t| t == token) {
            tokens.push(token.to_string());
        }
    }
    tokens
}

/// A normalized search query, computed once per search.
#[derive(Debug, Clone)]
pub struct SearchText {
    /// Trimmed, lowercased raw query.
    pub lower: String,
    /// Tokenized terms.
    pub terms: Vec<String>,
}

impl SearchText {
    pub fn new(raw: &str) -> Self {
        let lower = raw.trim().to_lowercase();
        let terms = tokenize(&lower);
        Self { lower, terms }
    }

    /// LIKE pattern matching names starting with the query.
    pub fn prefix_pattern(&self) -> String {
        format!("{}%", self.lower)
    }

    /// LIKE pattern matching fields containing the query.
    pub fn contains_pattern(&self) -> String {
        format!("%{}%", self.lower)
    }

    /// FTS5 match expression: every term as a quoted prefix query.
    pub fn fts_match_expr(&self) -> String {
        self.terms
            .iter()
            .map(|t| format!("\"{}\"*", t.replace('"', "\"\"")))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_basic() {
        assert_eq!(tokenize("Llanowar Elves"), vec!["llanowar", "elves"]);
    }

    #[test]
    fn test_tokenize_strips_punctuation_and_short_tokens() {
        assert_eq!(
            tokenize("Ajani, Strength of the Pride!"),
            vec!["ajani", "strength", "of", "the", "pride"]
        );
        assert_eq!(tokenize("x y"), Vec::<String>::new());
    }

    #[test]
    fn test_tokenize_dedupes() {
        assert_eq!(tokenize("wolf Wolf WOLF"), vec!["wolf"]);
    }

    #[test]
    fn test_search_text_patterns() {
        let text = SearchText::new("  Llanowar ");
        assert_eq!(text.lower, "llanowar");
        assert_eq!(text.prefix_pattern(), "llanowar%");
        assert_eq!(text.contains_pattern(), "%llanowar%");
        assert_eq!(text.fts_match_expr(), "\"llanowar\"*");
    }

    #[test]
    fn test_fts_match_expr_joins_terms() {
        let text = SearchText::new("serra angel");
        assert_eq!(text.fts_match_expr(), "\"serra\"* \"angel\"*");
    }
}
