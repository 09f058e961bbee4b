//! Read/write classification of Cypher text.
//!
//! The keyword check is deliberately coarse: a mutation keyword anywhere in
//! the text, including inside a string literal or comment, marks the query
//! as a write. Such reads are refused rather than risk letting a write
//! through.

use std::sync::OnceLock;

use regex::Regex;

/// Clauses that mutate the graph.
pub const WRITE_KEYWORDS: &[&str] = &["MERGE", "CREATE", "SET", "DELETE", "REMOVE", "ADD"];

/// Decides whether query text would mutate the database.
///
/// Implementations must be pure and total. A false positive only blocks a
/// read; a false negative lets a write reach the database.
pub trait QueryClassifier: Send + Sync {
    fn is_write_query(&self, query: &str) -> bool;
}

/// Case-insensitive whole-word match on [`WRITE_KEYWORDS`].
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    pattern: Regex,
}

impl KeywordClassifier {
    pub fn new() -> Self {
        let pattern = Regex::new(&format!(r"(?i)\b({})\b", WRITE_KEYWORDS.join("|")))
            .expect("Invalid regex pattern");
        Self { pattern }
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryClassifier for KeywordClassifier {
    fn is_write_query(&self, query: &str) -> bool {
        self.pattern.is_match(query)
    }
}

/// Classify with the process-wide [`KeywordClassifier`].
pub fn is_write_query(query: &str) -> bool {
    static DEFAULT: OnceLock<KeywordClassifier> = OnceLock::new();
    DEFAULT.get_or_init(KeywordClassifier::new).is_write_query(query)
}
