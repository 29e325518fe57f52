//! Query tokenizer
//!
//! Turns a free-form query such as `branch: main type:merge "unit test"`
//! into an ordered key/value mapping. Tokenizing never fails: malformed
//! input only ever produces fewer entries.

use gitonto_core::limits::{clamp_query_limit, DEFAULT_QUERY_LIMIT};
use serde::Serialize;

/// Key that receives free text and keeps double quotes as a phrase marker
pub const MSG_KEY: &str = "msg";
pub const LIMIT_KEY: &str = "limit";

/// Tokenized query: ordered key/value pairs plus the effective limit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tokens {
    entries: Vec<(String, String)>,
    limit: usize,
}

impl Default for Tokens {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            limit: DEFAULT_QUERY_LIMIT,
        }
    }
}

impl Tokens {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Result limit (defaults to 50)
    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Set a key; a repeated key keeps its first position and takes the later value
    fn set(&mut self, key: String, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }
}

/// True if the word opens a double-quoted run without closing it: the quote
/// must start the word or directly follow its first `:`.
fn opens_quote(word: &str) -> bool {
    let unclosed = |value: &str| value.starts_with('"') && !value[1..].contains('"');
    unclosed(word) || word.split_once(':').is_some_and(|(_, value)| unclosed(value))
}

/// Split on whitespace, keeping double-quoted runs inside one term.
///
/// Quotes elsewhere in a word are literal. A run that is never closed is
/// not joined; the rest of the input splits on whitespace.
fn split_terms(input: &str) -> Vec<String> {
    let words: Vec<&str> = input.split_whitespace().collect();
    let mut terms = Vec::with_capacity(words.len());
    let mut i = 0;

    while i < words.len() {
        let word = words[i];
        i += 1;
        if opens_quote(word) {
            if let Some(end) = words[i..].iter().position(|w| w.contains('"')) {
                terms.push(words[i - 1..=i + end].join(" "));
                i += end + 1;
                continue;
            }
            tracing::debug!(term = %word, "Unterminated quote, splitting on whitespace");
        }
        terms.push(word.to_string());
    }
    terms
}

fn strip_pair(value: &str, quote: char) -> Option<&str> {
    if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
        Some(&value[1..value.len() - 1])
    } else {
        None
    }
}

/// Strip one pair of surrounding quotes. For `msg`, double quotes are kept:
/// they mark a phrase and are removed by the compiler.
fn dequote(key: &str, value: &str) -> String {
    let value = value.trim();
    if let Some(inner) = strip_pair(value, '\'') {
        return inner.to_string();
    }
    if key != MSG_KEY {
        if let Some(inner) = strip_pair(value, '"') {
            return inner.to_string();
        }
    }
    value.to_string()
}

/// Tokenize a raw query string
pub fn tokenize(input: &str) -> Tokens {
    let terms = split_terms(input);
    let mut tokens = Tokens::default();
    let mut free_text: Option<String> = None;
    let mut i = 0;

    while i < terms.len() {
        let term = &terms[i];
        i += 1;

        let Some((raw_key, raw_value)) = term.split_once(':') else {
            if free_text.is_none() {
                free_text = Some(term.clone());
            } else {
                tracing::debug!(term = %term, "Ignoring extra free-text term");
            }
            continue;
        };

        let key = raw_key.trim().to_lowercase();
        let mut value = dequote(&key, raw_value);

        // `branch: main` arrives as two terms
        if value.is_empty() {
            if let Some(next) = terms.get(i).filter(|t| !t.contains(':')) {
                value = dequote(&key, next);
                i += 1;
            }
        }

        if value.is_empty() || key.is_empty() {
            continue;
        }

        if key == LIMIT_KEY {
            match value.parse::<usize>() {
                Ok(n) => tokens.limit = clamp_query_limit(n),
                Err(_) => tracing::warn!(value = %value, "Ignoring unparsable limit"),
            }
        }
        tokens.set(key, value);
    }

    if let Some(text) = free_text {
        if !tokens.contains_key(MSG_KEY) {
            tokens.set(MSG_KEY.to_string(), dequote(MSG_KEY, &text));
        }
    }

    tracing::trace!(?tokens, "Tokenized query");
    tokens
}
