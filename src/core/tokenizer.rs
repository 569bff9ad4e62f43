use serde::{Deserialize, Serialize};

/// Normalized view of a text: the token sequence plus the same tokens joined
/// by single spaces, which phrase search runs over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedText {
    pub tokens: Vec<String>,
    pub joined: String,
}

impl NormalizedText {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Byte offset in `joined` where each token starts
    pub fn token_offsets(&self) -> Vec<usize> {
        let mut offsets = Vec::with_capacity(self.tokens.len());
        let mut cursor = 0;
        for token in &self.tokens {
            offsets.push(cursor);
            cursor += token.len() + 1;
        }
        offsets
    }
}

/// Lowercase, split on anything that is not alphanumeric, drop empties.
///
/// A run of `+` or `#` directly after a word stays part of it when nothing
/// alphanumeric follows, so "C++" and "C#" remain distinct from "C" while
/// "a+b" still splits. Locale independent: only Unicode's default lowercase
/// mapping is used.
pub fn normalize(text: &str) -> NormalizedText {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens: Vec<String> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if !chars[i].is_alphanumeric() {
            i += 1;
            continue;
        }

        let start = i;
        while i < chars.len() && chars[i].is_alphanumeric() {
            i += 1;
        }

        let mut end = i;
        while end < chars.len() && is_suffix_symbol(chars[end]) {
            end += 1;
        }
        let joins_next_word = chars.get(end).map_or(false, |c| c.is_alphanumeric());
        if end > i && !joins_next_word {
            i = end;
        }

        let token: String = chars[start..i].iter().collect();
        tokens.push(token.to_lowercase());
    }

    let joined = tokens.join(" ");

    NormalizedText { tokens, joined }
}

fn is_suffix_symbol(c: char) -> bool {
    c == '+' || c == '#'
}

/// Token list only
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text).tokens
}
