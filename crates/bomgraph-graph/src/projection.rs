//! Column names of a query's final projection.
//!
//! The Bolt driver hands rows back as hash maps, so the RETURN order is
//! recovered from the query text: the last top-level `RETURN` (or, for a
//! bare procedure call, the last `YIELD`) is split into its items and each
//! item is named by its alias, or by its expression text when unaliased.

use bomgraph_core::Row;

/// Clauses that end a RETURN projection.
const RETURN_TERMINATORS: &[&str] = &["ORDER", "SKIP", "LIMIT", "UNION"];

/// Clauses that end a YIELD projection.
const YIELD_TERMINATORS: &[&str] = &["WHERE", "RETURN", "WITH", "MATCH", "CALL", "UNWIND"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lex {
    Code,
    Single,
    Double,
    Backtick,
    LineComment,
    BlockComment,
}

/// Marks every byte that is code outside brackets, literals, and comments.
fn top_level_mask(query: &str) -> Vec<bool> {
    let mut mask = vec![false; query.len()];
    let mut state = Lex::Code;
    let mut depth = 0usize;
    let mut chars = query.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let next = chars.peek().map(|&(_, n)| n);
        match state {
            Lex::Code => match c {
                '\'' => state = Lex::Single,
                '"' => state = Lex::Double,
                '`' => state = Lex::Backtick,
                '/' if next == Some('/') => state = Lex::LineComment,
                '/' if next == Some('*') => {
                    chars.next();
                    state = Lex::BlockComment;
                }
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth = depth.saturating_sub(1),
                _ if depth == 0 => mask[i..i + c.len_utf8()].fill(true),
                _ => {}
            },
            Lex::Single | Lex::Double => {
                if c == '\\' {
                    chars.next();
                } else if (c == '\'' && state == Lex::Single) || (c == '"' && state == Lex::Double) {
                    state = Lex::Code;
                }
            }
            Lex::Backtick => {
                if c == '`' {
                    state = Lex::Code;
                }
            }
            Lex::LineComment => {
                if c == '\n' {
                    state = Lex::Code;
                }
            }
            Lex::BlockComment => {
                if c == '*' && next == Some('/') {
                    chars.next();
                    state = Lex::Code;
                }
            }
        }
    }

    mask
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Top-level words in `query[range]` with their byte offsets.
fn top_level_words<'q>(
    query: &'q str,
    mask: &[bool],
    range: std::ops::Range<usize>,
) -> Vec<(usize, &'q str)> {
    let mut words = Vec::new();
    let mut start: Option<usize> = None;

    for (i, c) in query[range.clone()].char_indices() {
        let i = i + range.start;
        let in_word = mask[i] && is_word_char(c);
        match (in_word, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                words.push((s, &query[s..i]));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        words.push((s, &query[s..range.end]));
    }

    // `n.return` is a property, not a clause.
    words
        .into_iter()
        .filter(|&(s, _)| !query[..s].ends_with('.'))
        .collect()
}

/// Names of the columns the query returns, in declaration order.
///
/// `*` items and queries without a projection contribute nothing; the
/// caller orders any remaining columns itself.
pub fn return_columns(query: &str) -> Vec<String> {
    let mask = top_level_mask(query);
    let words = top_level_words(query, &mask, 0..query.len());

    let find_last = |keyword: &str| {
        words
            .iter()
            .rposition(|(_, w)| w.eq_ignore_ascii_case(keyword))
    };
    let (clause, terminators) = match find_last("RETURN") {
        Some(idx) => (idx, RETURN_TERMINATORS),
        None => match find_last("YIELD") {
            Some(idx) => (idx, YIELD_TERMINATORS),
            None => return Vec::new(),
        },
    };

    let (clause_start, clause_word) = words[clause];
    let start = clause_start + clause_word.len();
    let end = words[clause + 1..]
        .iter()
        .find(|(_, w)| terminators.iter().any(|t| w.eq_ignore_ascii_case(t)))
        .map(|&(offset, _)| offset)
        .unwrap_or(query.len());
    let end = (start..end)
        .find(|&i| mask[i] && query.as_bytes()[i] == b';')
        .unwrap_or(end);

    let mut items = Vec::new();
    let mut item_start = start;
    for i in start..end {
        if mask[i] && query.as_bytes()[i] == b',' {
            items.push(item_start..i);
            item_start = i + 1;
        }
    }
    items.push(item_start..end);

    items
        .into_iter()
        .enumerate()
        .filter_map(|(n, range)| item_name(query, &mask, range, n == 0))
        .collect()
}

fn item_name(
    query: &str,
    mask: &[bool],
    range: std::ops::Range<usize>,
    first: bool,
) -> Option<String> {
    let words = top_level_words(query, mask, range.clone());
    let mut start = range.start;

    if first {
        if let Some(&(offset, word)) = words.first() {
            if word.eq_ignore_ascii_case("DISTINCT") {
                start = offset + word.len();
            }
        }
    }

    let name = match words.iter().rev().find(|(_, w)| w.eq_ignore_ascii_case("AS")) {
        Some(&(offset, word)) if offset >= start => {
            let alias = query[offset + word.len()..range.end].trim();
            alias.trim_matches('`').to_string()
        }
        _ => query[start..range.end].trim().to_string(),
    };

    if name.is_empty() || name == "*" {
        None
    } else {
        Some(name)
    }
}

/// Reorder a row to `columns`; columns the query text did not name follow
/// in alphabetical order, matching how Neo4j orders `RETURN *`.
pub fn order_columns(mut row: Row, columns: &[String]) -> Row {
    let mut ordered = Row::new();
    for column in columns {
        if let Some(value) = row.remove(column) {
            ordered.insert(column.clone(), value);
        }
    }

    let mut rest: Vec<_> = row.into_iter().collect();
    rest.sort_by(|a, b| a.0.cmp(&b.0));
    ordered.extend(rest);
    ordered
}
