//! Token counting using tiktoken-rs BPE tables.
//!
//! The segmenter only needs a count, so everything downstream depends on the
//! `TokenCounter` trait rather than on a concrete tokenizer.

use crate::config::ConfigError;
use std::str::FromStr;
use tiktoken_rs::CoreBPE;

/// Anything that can count tokens in a piece of text
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

impl<T: TokenCounter + ?Sized> TokenCounter for &T {
    fn count(&self, text: &str) -> usize {
        (**self).count(text)
    }
}

/// Supported BPE encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// GPT-4 / GPT-3.5-turbo
    #[default]
    Cl100kBase,
    P50kBase,
    R50kBase,
}

impl Encoding {
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Cl100kBase => "cl100k_base",
            Encoding::P50kBase => "p50k_base",
            Encoding::R50kBase => "r50k_base",
        }
    }
}

impl FromStr for Encoding {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cl100k_base" | "cl100k" => Ok(Encoding::Cl100kBase),
            "p50k_base" | "p50k" => Ok(Encoding::P50kBase),
            "r50k_base" | "r50k" | "gpt2" => Ok(Encoding::R50kBase),
            _ => Err(ConfigError::invalid(
                "encoding",
                format!("unknown encoding '{s}' (expected cl100k_base, p50k_base or r50k_base)"),
            )),
        }
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// BPE token counter. Building the tables is expensive, so build once and share.
pub struct Tiktoken {
    encoding: Encoding,
    bpe: CoreBPE,
}

impl Tiktoken {
    pub fn new(encoding: Encoding) -> Result<Self, ConfigError> {
        let bpe = match encoding {
            Encoding::Cl100kBase => tiktoken_rs::cl100k_base(),
            Encoding::P50kBase => tiktoken_rs::p50k_base(),
            Encoding::R50kBase => tiktoken_rs::r50k_base(),
        }
        .map_err(|e| ConfigError::invalid("encoding", format!("failed to load {encoding}: {e}")))?;
        Ok(Self { encoding, bpe })
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }
}

impl TokenCounter for Tiktoken {
    fn count(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        self.bpe.encode_with_special_tokens(text).len()
    }
}

impl std::fmt::Debug for Tiktoken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tiktoken")
            .field("encoding", &self.encoding)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_tokens_empty() {
        let tok = Tiktoken::new(Encoding::Cl100kBase).unwrap();
        assert_eq!(tok.count(""), 0);
    }

    #[test]
    fn test_count_tokens_simple() {
        let tok = Tiktoken::new(Encoding::Cl100kBase).unwrap();
        let count = tok.count("Hello, world!");
        assert!(count > 0);
        assert!(count < 10);
    }

    #[test]
    fn test_count_is_deterministic() {
        let tok = Tiktoken::new(Encoding::default()).unwrap();
        let text = "This is a test sentence for counting.";
        assert_eq!(tok.count(text), tok.count(text));
    }

    #[test]
    fn test_encoding_parsing() {
        assert_eq!("cl100k_base".parse::<Encoding>().unwrap(), Encoding::Cl100kBase);
        assert_eq!("P50K_BASE".parse::<Encoding>().unwrap(), Encoding::P50kBase);
        assert_eq!("gpt2".parse::<Encoding>().unwrap(), Encoding::R50kBase);
        assert!("o999k".parse::<Encoding>().is_err());
    }
}
