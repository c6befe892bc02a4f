//! Text normalization shared by queries and documents.

/// Tokens shorter than this are dropped.
pub const MIN_TOKEN_CHARS: usize = 2;

/// Split text into lowercase word tokens.
///
/// Word characters are alphanumerics and `_`; everything else acts as a
/// separator. Tokens with fewer than [`MIN_TOKEN_CHARS`] characters are dropped.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .map(str::to_string)
        .collect()
}
