//! Utility functions for text editing

/// Character class used for word-wise movement and deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharType {
    Whitespace,
    Word,
    Punctuation,
}

/// Classify a character for word boundary detection
pub fn char_type(ch: char) -> CharType {
    if ch.is_whitespace() {
        CharType::Whitespace
    } else if ch.is_alphanumeric() || ch == '_' {
        CharType::Word
    } else {
        CharType::Punctuation
    }
}

/// Count whitespace-separated words, mirroring the status bar display
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
