//! Remote scoring of document chunks
//!
//! This module provides the scoring client for Azure OpenAI chat completions,
//! the evaluation prompt, and the retry policy that wraps each call.
//!
//! # Failure classes
//!
//! Every failed call is classified so the retry layer can pick a backoff:
//!
//! - `RateLimited`: HTTP 429, back off exponentially
//! - `Transient`: timeouts, 5xx, unparseable or incomplete responses, back off briefly
//! - `Fatal`: authentication, bad deployment, bad request; never retried

mod client;
mod prompts;
mod retry;

pub use client::{
    classify_status, classify_transport, parse_score, AzureOpenAiScorer, Message, Role,
};
pub use prompts::{evaluation_messages, EVALUATION_PROMPT, SYSTEM_PROMPT};
pub use retry::{ChunkFailure, RetryPolicy, Sleeper, ThreadSleeper};

use crate::models::Score;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// A single scoring round trip for one chunk of text
pub trait Scorer: Send + Sync {
    fn score(&self, text: &str) -> Result<Score, ScoreError>;
}

impl<S: Scorer + ?Sized> Scorer for &S {
    fn score(&self, text: &str) -> Result<Score, ScoreError> {
        (**self).score(text)
    }
}

/// Class of a scoring failure, which decides the retry behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    RateLimited,
    Transient,
    Fatal,
}

impl std::fmt::Display for FailureClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureClass::RateLimited => write!(f, "rate limited"),
            FailureClass::Transient => write!(f, "transient error"),
            FailureClass::Fatal => write!(f, "fatal error"),
        }
    }
}

/// Errors that can occur while scoring one chunk
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Transient error: {0}")]
    Transient(String),

    #[error("Fatal error: {0}")]
    Fatal(String),
}

impl ScoreError {
    pub fn class(&self) -> FailureClass {
        match self {
            ScoreError::RateLimited(_) => FailureClass::RateLimited,
            ScoreError::Transient(_) => FailureClass::Transient,
            ScoreError::Fatal(_) => FailureClass::Fatal,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            ScoreError::RateLimited(d) | ScoreError::Transient(d) | ScoreError::Fatal(d) => d,
        }
    }
}

/// How strictly a model response is turned into a `Score`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreParseMode {
    /// Every dimension must be present, numeric and within 0-5
    #[default]
    Strict,
    /// Missing dimensions default to 0 and out-of-range values are clamped
    Lenient,
}

/// Connection and request settings for the scoring client
#[derive(Debug, Clone)]
pub struct ScorerSettings {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
    pub temperature: f32,
    pub max_response_tokens: u32,
    pub timeout: Duration,
    pub score_mode: ScoreParseMode,
}
