//! Document evaluation pipeline
//!
//! Drives the chunks of one document through the scorer:
//! 1. Check for cancellation at each chunk boundary
//! 2. Score the chunk, retrying per the failure class
//! 3. Record every chunk's result for diagnostics
//! 4. Aggregate the surviving scores, weighted by token count
//!
//! A chunk that exhausts its retries is skipped, not fatal. The document
//! only fails when no chunk could be scored.

use crate::ai::{ChunkFailure, RetryPolicy, Scorer, Sleeper, ThreadSleeper};
use crate::models::{Chunk, DocumentOutcome, Score, WeightedScore};
use crate::scoring::{aggregate, AggregateError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// Cooperative cancellation shared between a driver and its evaluations.
///
/// Checked between chunks only; an in-flight scoring call always finishes.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token that cancels itself once `timeout` has elapsed
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            flag: Arc::default(),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst) || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// What happened to one chunk
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkResult {
    Scored(Score),
    Failed(ChunkFailure),
    NotAttempted,
}

/// Per-chunk diagnostic, returned in chunk order
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkReport {
    pub index: usize,
    pub total: usize,
    pub token_count: usize,
    pub result: ChunkResult,
}

/// A failed chunk, as listed in `EvaluationError::AllChunksFailed`
#[derive(Debug, Clone, PartialEq)]
pub struct FailedChunk {
    pub index: usize,
    pub total: usize,
    pub failure: ChunkFailure,
}

impl std::fmt::Display for FailedChunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "chunk {}/{}: {}", self.index + 1, self.total, self.failure)
    }
}

/// Document-level evaluation failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("document contains no text")]
    EmptyDocument,

    #[error("evaluation cancelled before any chunk was scored")]
    Cancelled,

    #[error(
        "all {} chunks failed: {}",
        .failures.len(),
        .failures.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
    )]
    AllChunksFailed { failures: Vec<FailedChunk> },
}

/// Result of evaluating one document
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub outcome: DocumentOutcome,
    pub chunks: Vec<ChunkReport>,
}

impl Evaluation {
    pub fn failed_chunks(&self) -> impl Iterator<Item = (&ChunkReport, &ChunkFailure)> {
        self.chunks.iter().filter_map(|c| match &c.result {
            ChunkResult::Failed(failure) => Some((c, failure)),
            _ => None,
        })
    }
}

/// Scores documents chunk by chunk
pub struct Evaluator<S: Scorer, Z: Sleeper = ThreadSleeper> {
    scorer: S,
    policy: RetryPolicy,
    sleeper: Z,
}

impl<S: Scorer> Evaluator<S, ThreadSleeper> {
    pub fn new(scorer: S, policy: RetryPolicy) -> Self {
        Self::with_sleeper(scorer, policy, ThreadSleeper)
    }
}

impl<S: Scorer, Z: Sleeper> Evaluator<S, Z> {
    pub fn with_sleeper(scorer: S, policy: RetryPolicy, sleeper: Z) -> Self {
        Self {
            scorer,
            policy,
            sleeper,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Evaluate the chunks of one document, strictly in index order
    pub fn evaluate(
        &self,
        identifier: &str,
        chunks: Vec<Chunk>,
        cancel: &CancelToken,
    ) -> Evaluation {
        let chunks_total = chunks.len();
        let (reports, result) = self.score_chunks(identifier, chunks, cancel);

        let outcome = match result {
            Ok(score) => {
                let scored = reports
                    .iter()
                    .filter(|r| matches!(r.result, ChunkResult::Scored(_)))
                    .count();
                DocumentOutcome::success(identifier, score, chunks_total, scored)
            }
            Err(err) => {
                warn!("{}: {}", identifier, err);
                DocumentOutcome::failure(identifier, err.to_string(), chunks_total)
            }
        };

        Evaluation {
            outcome,
            chunks: reports,
        }
    }

    fn score_chunks(
        &self,
        identifier: &str,
        chunks: Vec<Chunk>,
        cancel: &CancelToken,
    ) -> (Vec<ChunkReport>, Result<Score, EvaluationError>) {
        if chunks.is_empty() {
            return (Vec::new(), Err(EvaluationError::EmptyDocument));
        }

        let mut reports = Vec::with_capacity(chunks.len());
        let mut samples = Vec::with_capacity(chunks.len());
        let mut failures = Vec::new();
        let mut cancelled = false;

        for chunk in chunks {
            let result = if cancelled || cancel.is_cancelled() {
                if !cancelled {
                    debug!(
                        "{}: cancelled before chunk {}/{}",
                        identifier,
                        chunk.index + 1,
                        chunk.total
                    );
                    cancelled = true;
                }
                ChunkResult::NotAttempted
            } else {
                self.score_chunk(identifier, &chunk)
            };

            match &result {
                ChunkResult::Scored(score) => samples.push(WeightedScore {
                    score: *score,
                    weight: chunk.token_count,
                }),
                ChunkResult::Failed(failure) => failures.push(FailedChunk {
                    index: chunk.index,
                    total: chunk.total,
                    failure: failure.clone(),
                }),
                ChunkResult::NotAttempted => {}
            }

            reports.push(ChunkReport {
                index: chunk.index,
                total: chunk.total,
                token_count: chunk.token_count,
                result,
            });
        }

        // Chunks skipped by cancellation count as absent
        let result = if samples.is_empty() {
            if failures.is_empty() {
                Err(EvaluationError::Cancelled)
            } else {
                Err(EvaluationError::AllChunksFailed { failures })
            }
        } else {
            aggregate(&samples).or_else(|AggregateError::EmptyInput| {
                // Every surviving chunk had zero tokens; no weight to go on
                Ok::<_, EvaluationError>(Score::from_fn(|d| {
                    samples.iter().map(|s| s.score.get(d)).sum::<f64>() / samples.len() as f64
                }))
            })
        };

        (reports, result)
    }

    fn score_chunk(&self, identifier: &str, chunk: &Chunk) -> ChunkResult {
        debug!(
            "{}: scoring chunk {}/{} ({} tokens)",
            identifier,
            chunk.index + 1,
            chunk.total,
            chunk.token_count
        );
        match self
            .policy
            .attempt(&self.sleeper, || self.scorer.score(&chunk.text))
        {
            Ok(score) => ChunkResult::Scored(score),
            Err(failure) => {
                warn!(
                    "{}: chunk {}/{} failed: {}",
                    identifier,
                    chunk.index + 1,
                    chunk.total,
                    failure
                );
                ChunkResult::Failed(failure)
            }
        }
    }
}
