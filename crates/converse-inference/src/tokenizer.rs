//! Token counting for usage accounting.

use std::fmt;

use converse_core::{Error, Result};
use tiktoken_rs::CoreBPE;

/// Counts the tokens in a piece of text.
pub trait Tokenizer: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

/// The `cl100k_base` encoding, without special tokens.
pub struct Cl100kTokenizer {
    bpe: CoreBPE,
}

impl Cl100kTokenizer {
    /// Loads the encoding tables.
    pub fn new() -> Result<Self> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|error| {
            Error::configuration().with_message(format!("failed to load cl100k_base: {error}"))
        })?;
        Ok(Self { bpe })
    }
}

impl Tokenizer for Cl100kTokenizer {
    fn count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }
}

impl fmt::Debug for Cl100kTokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cl100kTokenizer").finish_non_exhaustive()
    }
}

/// Counts whitespace-separated words. Deterministic and table-free.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn count(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_counts_words() {
        assert_eq!(WhitespaceTokenizer.count("  hello   there world "), 3);
        assert_eq!(WhitespaceTokenizer.count(""), 0);
    }

    #[test]
    fn cl100k_counts_tokens() {
        let tokenizer = Cl100kTokenizer::new().unwrap();
        assert_eq!(tokenizer.count(""), 0);
        assert_eq!(tokenizer.count("hello world"), 2);
        assert!(tokenizer.count("No valid messages found (user or assistant).") > 5);
    }
}
