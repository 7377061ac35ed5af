//! Token-budget segmentation of paragraph-ordered text
//!
//! Splits a document into ordered chunks that each fit a token budget:
//! 1. Text that already fits is returned as a single chunk
//! 2. Paragraphs (blank-line separated) are packed greedily
//! 3. A paragraph that alone overflows is packed sentence by sentence
//! 4. A single sentence that overflows is emitted whole, never truncated
//!
//! Packing keeps a running token estimate (unit counts plus separator counts)
//! and only tokenizes a joined candidate when the estimate overflows. Every
//! finished chunk is counted exactly once; if an estimated chunk turns out to
//! be over budget its units are repacked with exact counts.

use crate::config::ConfigError;
use crate::models::Chunk;
use crate::text::paragraph_break;
use crate::text::tokens::TokenCounter;
use tracing::debug;

/// Separator between whole paragraphs inside a chunk
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";
/// Separator between sentences of the same paragraph inside a chunk
pub const SENTENCE_SEPARATOR: &str = " ";
/// Boundary a paragraph is split on when it overflows the budget
const SENTENCE_BOUNDARY: &str = ". ";

/// Token-budget-aware text splitter
pub struct Segmenter<T: TokenCounter> {
    counter: T,
    budget: usize,
}

impl<T: TokenCounter> Segmenter<T> {
    /// Create a segmenter. A zero budget is rejected here, before any text is seen.
    pub fn new(counter: T, budget: usize) -> Result<Self, ConfigError> {
        if budget == 0 {
            return Err(ConfigError::InvalidBudget(budget));
        }
        Ok(Self { counter, budget })
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn counter(&self) -> &T {
        &self.counter
    }

    /// Split `text` into ordered, budget-respecting chunks
    pub fn segment(&self, text: &str) -> Vec<Chunk> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let total_tokens = self.counter.count(text);
        if total_tokens <= self.budget {
            return vec![Chunk {
                text: text.to_string(),
                token_count: total_tokens,
                index: 0,
                total: 1,
            }];
        }

        let mut packer = Packer::new(&self.counter, self.budget, false);
        for paragraph in paragraphs(text) {
            let tokens = self.counter.count(paragraph);
            if tokens > self.budget {
                debug!(
                    "Paragraph exceeds budget of {} tokens, splitting by sentences",
                    self.budget
                );
                packer.flush();
                for sentence in sentences(paragraph) {
                    let tokens = self.counter.count(sentence);
                    packer.push(sentence, tokens, Join::Sentence);
                }
            } else {
                packer.push(paragraph, tokens, Join::Paragraph);
            }
        }

        let pieces = packer.finish();
        let total = pieces.len();
        debug!(
            "Segmented {} tokens into {} chunks (budget {})",
            total_tokens, total, self.budget
        );

        pieces
            .into_iter()
            .enumerate()
            .map(|(index, (text, token_count))| Chunk {
                text,
                token_count,
                index,
                total,
            })
            .collect()
    }
}

/// Non-blank, trimmed paragraphs in document order
fn paragraphs(text: &str) -> impl Iterator<Item = &str> {
    paragraph_break()
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
}

/// Sentence units of one paragraph; each keeps the period that ends it
fn sentences(paragraph: &str) -> impl Iterator<Item = &str> {
    paragraph
        .split_inclusive(SENTENCE_BOUNDARY)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// How a unit attaches to the unit before it in the same chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Join {
    Paragraph,
    Sentence,
}

impl Join {
    fn separator(self) -> &'static str {
        match self {
            Join::Paragraph => PARAGRAPH_SEPARATOR,
            Join::Sentence => SENTENCE_SEPARATOR,
        }
    }
}

/// Greedy accumulator.
///
/// BPE counts are not additive across a join, so `tokens` is only an estimate
/// while `tokens_exact` is false. In `exact_only` mode every join is
/// tokenized, which is what the overflow repack uses.
struct Packer<'a, T: TokenCounter> {
    counter: &'a T,
    budget: usize,
    exact_only: bool,
    paragraph_gap: usize,
    sentence_gap: usize,
    buffer: String,
    tokens: usize,
    tokens_exact: bool,
    units: Vec<(&'a str, usize, Join)>,
    pieces: Vec<(String, usize)>,
}

impl<'a, T: TokenCounter> Packer<'a, T> {
    fn new(counter: &'a T, budget: usize, exact_only: bool) -> Self {
        Self {
            counter,
            budget,
            exact_only,
            paragraph_gap: counter.count(PARAGRAPH_SEPARATOR),
            sentence_gap: counter.count(SENTENCE_SEPARATOR),
            buffer: String::new(),
            tokens: 0,
            tokens_exact: true,
            units: Vec::new(),
            pieces: Vec::new(),
        }
    }

    fn gap(&self, join: Join) -> usize {
        match join {
            Join::Paragraph => self.paragraph_gap,
            Join::Sentence => self.sentence_gap,
        }
    }

    fn push(&mut self, unit: &'a str, unit_tokens: usize, join: Join) {
        if self.buffer.is_empty() {
            self.start(unit, unit_tokens, join);
            return;
        }

        // Landing exactly on the budget still fits
        let estimate = self.tokens + self.gap(join) + unit_tokens;
        if !self.exact_only && estimate <= self.budget {
            self.buffer.push_str(join.separator());
            self.buffer.push_str(unit);
            self.tokens = estimate;
            self.tokens_exact = false;
            self.units.push((unit, unit_tokens, join));
            return;
        }

        let candidate = format!("{}{}{}", self.buffer, join.separator(), unit);
        let exact = self.counter.count(&candidate);
        if exact <= self.budget {
            self.buffer = candidate;
            self.tokens = exact;
            self.tokens_exact = true;
            self.units.push((unit, unit_tokens, join));
        } else {
            self.flush();
            self.start(unit, unit_tokens, join);
        }
    }

    fn start(&mut self, unit: &'a str, unit_tokens: usize, join: Join) {
        self.buffer.push_str(unit);
        self.tokens = unit_tokens;
        self.tokens_exact = true;
        self.units.push((unit, unit_tokens, join));
    }

    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.buffer);
        let units = std::mem::take(&mut self.units);
        let tokens = if self.tokens_exact {
            self.tokens
        } else {
            self.counter.count(&text)
        };
        self.tokens = 0;
        self.tokens_exact = true;

        if tokens > self.budget && units.len() > 1 {
            debug!(
                "Estimated chunk came to {} tokens (budget {}), repacking",
                tokens, self.budget
            );
            let mut exact = Packer::new(self.counter, self.budget, true);
            for (unit, unit_tokens, join) in units {
                exact.push(unit, unit_tokens, join);
            }
            self.pieces.extend(exact.finish());
        } else {
            self.pieces.push((text, tokens));
        }
    }

    fn finish(mut self) -> Vec<(String, usize)> {
        self.flush();
        self.pieces
    }
}
