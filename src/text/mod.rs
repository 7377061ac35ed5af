//! Text handling: token counting and token-budget segmentation

pub mod segmenter;
pub mod tokens;

use regex::Regex;
use std::sync::OnceLock;

pub use segmenter::Segmenter;
pub use tokens::{Encoding, TokenCounter, Tiktoken};

/// Blank-line paragraph boundary, shared by loading and segmentation
pub(crate) fn paragraph_break() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n").expect("valid regex"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_break_spans_whitespace_lines() {
        let parts: Vec<&str> = paragraph_break().split("a\n\nb\n  \t\nc\nd").collect();
        assert_eq!(parts, vec!["a", "b", "c\nd"]);
    }
}
