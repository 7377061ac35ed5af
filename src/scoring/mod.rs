//! Token-weighted score aggregation
//!
//! Combines the scores of every successfully evaluated chunk of a document
//! into one composite score. Longer chunks count for more.
//!
//! # Formula
//!
//! ```text
//! composite[d] = Σ(score_i[d] × tokens_i) / Σ(tokens_i)     for each dimension d
//! ```
//!
//! # Example
//!
//! Two chunks, one of 10 tokens scored 5 everywhere and one of 30 tokens
//! scored 0 everywhere:
//!
//! composite = (5 × 10 + 0 × 30) / 40 = 1.25 on every dimension

mod weighted;

pub use weighted::{aggregate, AggregateError};
