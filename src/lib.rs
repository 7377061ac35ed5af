//! doceval - score documents for LLM and RAG readiness
//!
//! Documents are split into token-bounded chunks, each chunk is scored by a
//! remote model on seven quality dimensions, and the chunk scores are combined
//! into one token-weighted verdict per document.

pub mod ai;
pub mod cli;
pub mod config;
pub mod documents;
pub mod models;
pub mod pipeline;
pub mod reporters;
pub mod scoring;
pub mod text;
