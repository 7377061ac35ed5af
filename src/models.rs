//! Core data models for doceval
//!
//! These models are shared by the segmenter, the scoring pipeline and the
//! reporters: chunks of a document, per-chunk scores and the final
//! per-document outcome.

use serde::{Deserialize, Serialize};

/// The seven scored dimensions, in canonical (CSV column) order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Relevance,
    FactualAccuracy,
    Clarity,
    Hallucination,
    StyleMatch,
    RagUsability,
    CitationQuality,
}

impl Dimension {
    pub const ALL: [Dimension; 7] = [
        Dimension::Relevance,
        Dimension::FactualAccuracy,
        Dimension::Clarity,
        Dimension::Hallucination,
        Dimension::StyleMatch,
        Dimension::RagUsability,
        Dimension::CitationQuality,
    ];

    /// JSON / CSV key for this dimension
    pub fn key(&self) -> &'static str {
        match self {
            Dimension::Relevance => "relevance",
            Dimension::FactualAccuracy => "factual_accuracy",
            Dimension::Clarity => "clarity",
            Dimension::Hallucination => "hallucination",
            Dimension::StyleMatch => "style_match",
            Dimension::RagUsability => "rag_usability",
            Dimension::CitationQuality => "citation_quality",
        }
    }

    /// Human-readable label used by the console reporter
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Relevance => "Relevance",
            Dimension::FactualAccuracy => "Factual Accuracy",
            Dimension::Clarity => "Clarity",
            Dimension::Hallucination => "Hallucination",
            Dimension::StyleMatch => "Style Match",
            Dimension::RagUsability => "Rag Usability",
            Dimension::CitationQuality => "Citation Quality",
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A fully populated multi-dimensional score.
///
/// Every dimension is always present; a response that cannot fill all seven
/// never becomes a `Score`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    relevance: f64,
    factual_accuracy: f64,
    clarity: f64,
    hallucination: f64,
    style_match: f64,
    rag_usability: f64,
    citation_quality: f64,
}

impl Score {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 5.0;

    /// Build a score by computing each dimension
    pub fn from_fn(mut f: impl FnMut(Dimension) -> f64) -> Self {
        Self {
            relevance: f(Dimension::Relevance),
            factual_accuracy: f(Dimension::FactualAccuracy),
            clarity: f(Dimension::Clarity),
            hallucination: f(Dimension::Hallucination),
            style_match: f(Dimension::StyleMatch),
            rag_usability: f(Dimension::RagUsability),
            citation_quality: f(Dimension::CitationQuality),
        }
    }

    /// Build a score from values in `Dimension::ALL` order
    pub fn from_values(values: [f64; 7]) -> Self {
        let mut it = values.into_iter();
        Self::from_fn(|_| it.next().unwrap_or_default())
    }

    /// Same value on every dimension
    pub fn uniform(value: f64) -> Self {
        Self::from_fn(|_| value)
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Relevance => self.relevance,
            Dimension::FactualAccuracy => self.factual_accuracy,
            Dimension::Clarity => self.clarity,
            Dimension::Hallucination => self.hallucination,
            Dimension::StyleMatch => self.style_match,
            Dimension::RagUsability => self.rag_usability,
            Dimension::CitationQuality => self.citation_quality,
        }
    }

    /// (dimension, value) pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, f64)> + '_ {
        Dimension::ALL.iter().map(move |d| (*d, self.get(*d)))
    }

    /// Unweighted mean over all dimensions
    pub fn overall(&self) -> f64 {
        self.iter().map(|(_, v)| v).sum::<f64>() / Dimension::ALL.len() as f64
    }
}

/// A token-bounded piece of one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub token_count: usize,
    /// Zero-based position within the document
    pub index: usize,
    /// Number of chunks the document was split into
    pub total: usize,
}

/// A score paired with the token count of the chunk that produced it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedScore {
    pub score: Score,
    pub weight: usize,
}

/// Final status of a document evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Error,
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutcomeStatus::Success => write!(f, "success"),
            OutcomeStatus::Error => write!(f, "error"),
        }
    }
}

/// Result of evaluating one document. Built once, then only rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentOutcome {
    #[serde(rename = "filename")]
    pub identifier: String,
    pub status: OutcomeStatus,
    #[serde(
        rename = "evaluation",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub composite_score: Option<Score>,
    #[serde(default)]
    pub chunks_total: usize,
    #[serde(default)]
    pub chunks_scored: usize,
    #[serde(
        rename = "error_message",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub detail: Option<String>,
}

impl DocumentOutcome {
    pub fn success(
        identifier: impl Into<String>,
        score: Score,
        chunks_total: usize,
        chunks_scored: usize,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            status: OutcomeStatus::Success,
            composite_score: Some(score),
            chunks_total,
            chunks_scored,
            detail: None,
        }
    }

    pub fn failure(
        identifier: impl Into<String>,
        detail: impl Into<String>,
        chunks_total: usize,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            status: OutcomeStatus::Error,
            composite_score: None,
            chunks_total,
            chunks_scored: 0,
            detail: Some(detail.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

/// Success / failure counts over a batch of outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[DocumentOutcome]) -> Self {
        let successful = outcomes.iter().filter(|o| o.is_success()).count();
        Self {
            total: outcomes.len(),
            successful,
            failed: outcomes.len() - successful,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_order_matches_dimensions() {
        let score = Score::from_values([1.0, 2.0, 3.0, 4.0, 5.0, 0.5, 1.5]);
        let values: Vec<f64> = score.iter().map(|(_, v)| v).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 0.5, 1.5]);
        assert_eq!(score.get(Dimension::StyleMatch), 5.0);
    }

    #[test]
    fn test_score_serializes_flat() {
        let json = serde_json::to_value(Score::uniform(3.0)).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 7);
        for d in Dimension::ALL {
            assert_eq!(obj[d.key()], 3.0);
        }
    }

    #[test]
    fn test_outcome_json_shape() {
        let ok = DocumentOutcome::success("a.txt", Score::uniform(4.0), 2, 2);
        let v = serde_json::to_value(&ok).unwrap();
        assert_eq!(v["filename"], "a.txt");
        assert_eq!(v["status"], "success");
        assert!(v.get("error_message").is_none());
        assert_eq!(v["evaluation"]["clarity"], 4.0);

        let err = DocumentOutcome::failure("b.txt", "boom", 3);
        let v = serde_json::to_value(&err).unwrap();
        assert_eq!(v["status"], "error");
        assert!(v.get("evaluation").is_none());
        assert_eq!(v["error_message"], "boom");
    }

    #[test]
    fn test_batch_summary() {
        let outcomes = vec![
            DocumentOutcome::success("a", Score::uniform(1.0), 1, 1),
            DocumentOutcome::failure("b", "x", 1),
            DocumentOutcome::success("c", Score::uniform(2.0), 1, 1),
        ];
        let summary = BatchSummary::from_outcomes(&outcomes);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_overall_is_mean() {
        let score = Score::from_values([0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert!((score.overall() - 3.0).abs() < 1e-9);
    }
}
