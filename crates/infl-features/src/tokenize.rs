//! Comment tokenizer shared by the word model and the comment scorer.

use std::sync::OnceLock;

use regex::Regex;

/// Runs of letters in any script, underscores, `#`, `@`, and the emoji
/// block `U+263A..=U+1F645`.
const TOKEN_PATTERN: &str = r"[@#\p{L}_\x{263A}-\x{1F645}]+";

/// Single-character tokens that carry no meaning on their own.
const IGNORED: &[&str] = &[
    ".", "!", "?", ",", ":", ";", "-", "+", "=", "/", "&", "@", "$", "_",
];

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TOKEN_PATTERN).expect("valid token regex"))
}

/// A comment split into tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokens {
    /// Lower-cased tokens that survive filtering, in order.
    pub retained: Vec<String>,
    /// Number of tokens before filtering. Mentions and hashtags count here.
    pub total: usize,
}

/// Splits `text` into lower-cased tokens and drops mentions, hashtags, and
/// punctuation markers.
#[must_use]
pub fn tokenize(text: &str) -> Tokens {
    let mut total = 0;
    let mut retained = Vec::new();
    for m in token_regex().find_iter(text) {
        total += 1;
        let token = m.as_str().to_lowercase();
        if is_retained(&token) {
            retained.push(token);
        }
    }
    Tokens { retained, total }
}

fn is_retained(token: &str) -> bool {
    !token.is_empty()
        && !token.starts_with('#')
        && !token.starts_with('@')
        && !IGNORED.contains(&token)
}
