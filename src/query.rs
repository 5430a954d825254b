use crate::error::{Result, SearchError};
use crate::tokenizer::{is_valid_word, split_into_words};
use std::collections::BTreeSet;

/// A parsed query: deduplicated plus- and minus-word sets.
///
/// Ordered sets, so iteration over plus words is in ascending lexical order.
/// The same literal may sit in both sets; exclusion runs after accumulation,
/// so the minus reading wins when the two collide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub plus_words: BTreeSet<String>,
    pub minus_words: BTreeSet<String>,
}

impl Query {
    pub fn is_empty(&self) -> bool {
        self.plus_words.is_empty() && self.minus_words.is_empty()
    }
}

struct QueryWord {
    word: String,
    is_minus: bool,
    is_stop: bool,
}

/// Classify one raw query token: strip a leading minus, then reject empty
/// remainders, control characters, double minus, and trailing minus.
fn parse_query_word(raw_word: &str, stop_words: &BTreeSet<String>) -> Result<QueryWord> {
    let (word, is_minus) = match raw_word.strip_prefix('-') {
        Some(stripped) => (stripped, true),
        None => (raw_word, false),
    };

    if is_minus && word.is_empty() {
        return Err(SearchError::invalid("minus sign with no following word"));
    }
    if !is_valid_word(word) {
        return Err(SearchError::invalid(format!(
            "query word {word:?} contains control characters"
        )));
    }
    if word.starts_with('-') {
        return Err(SearchError::invalid("double minus is not allowed"));
    }
    if word.ends_with('-') {
        return Err(SearchError::invalid("trailing minus is not allowed"));
    }

    Ok(QueryWord {
        is_stop: stop_words.contains(word),
        word: word.to_string(),
        is_minus,
    })
}

/// Parse a raw query string into plus- and minus-word sets.
///
/// Any malformed token aborts the whole query. Stop words (matched after
/// minus-stripping) contribute to neither set.
pub fn parse_query(text: &str, stop_words: &BTreeSet<String>) -> Result<Query> {
    let mut query = Query::default();
    for raw_word in split_into_words(text) {
        let parsed = parse_query_word(&raw_word, stop_words)?;
        if parsed.is_stop {
            continue;
        }
        if parsed.is_minus {
            query.minus_words.insert(parsed.word);
        } else {
            query.plus_words.insert(parsed.word);
        }
    }
    Ok(query)
}
