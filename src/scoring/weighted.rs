use crate::models::{Score, WeightedScore};
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateError {
    /// No samples, or samples whose weights sum to zero
    #[error("nothing to aggregate")]
    EmptyInput,
}

/// Weighted mean of `samples`, computed per dimension.
///
/// Samples are summed in the order given; callers pass them in chunk order
/// so the floating-point result is reproducible.
pub fn aggregate(samples: &[WeightedScore]) -> Result<Score, AggregateError> {
    let total_weight: usize = samples.iter().map(|s| s.weight).sum();
    if total_weight == 0 {
        return Err(AggregateError::EmptyInput);
    }
    let total_weight = total_weight as f64;

    Ok(Score::from_fn(|dimension| {
        samples
            .iter()
            .map(|s| s.score.get(dimension) * s.weight as f64)
            .sum::<f64>()
            / total_weight
    }))
}
