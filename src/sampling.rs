//! # Weighted sampling with replacement
use std::fmt;

use rand::{distr::{Distribution, weighted::WeightedIndex}, Rng};

#[cfg(feature = "serde_support")]
use serde::{Serialize, Deserialize};

/// Possible errors of weighted sampling
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub enum SamplingErrors {
    /// population and weights have to be index aligned
    LengthMismatch{
        /// number of items in the population
        population: usize,
        /// number of weights
        weights: usize,
    },
    /// # No item can be drawn
    /// * every weight is zero or negative, a weight is NaN or there are no weights
    DegenerateWeights,
}

impl fmt::Display for SamplingErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplingErrors::LengthMismatch { population, weights } => write!(
                f,
                "population of {population} items but {weights} weights"
            ),
            SamplingErrors::DegenerateWeights => write!(
                f,
                "weights do not support sampling: none is positive or one is NaN"
            ),
        }
    }
}

impl std::error::Error for SamplingErrors {}

/// # Size of every resample
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub enum ResampleSize {
    /// draw exactly this many rows
    Count(usize),
    /// # fraction of the number of source rows
    /// * rounded to the nearest integer, negative or NaN fractions give 0
    Fraction(f64),
}

impl ResampleSize {
    /// number of rows to draw from a source with `source_len` rows
    pub fn resolve(&self, source_len: usize) -> usize
    {
        match *self {
            ResampleSize::Count(count) => count,
            ResampleSize::Fraction(frac) => {
                let count = (frac * source_len as f64).round();
                if count > 0.0 {
                    count as usize
                } else {
                    0
                }
            }
        }
    }
}

impl Default for ResampleSize {
    fn default() -> Self {
        ResampleSize::Fraction(1.0)
    }
}

/// # Draw `count` indices with replacement
/// * index `i` is drawn with probability proportional to `weights[i]`
/// * weights do not have to sum to 1
/// * negative weights are clipped to zero
/// * `Err(SamplingErrors::DegenerateWeights)` if no weight is positive or any weight is NaN
pub fn sample_indices_with_replacement<R>(
    rng: &mut R,
    weights: &[f64],
    count: usize
) -> Result<Vec<usize>, SamplingErrors>
where R: Rng + ?Sized
{
    let dist = weighted_index(weights)?;
    Ok(
        (0..count)
            .map(|_| dist.sample(rng))
            .collect()
    )
}

/// Distribution over the indices of `weights`, negative weights are clipped to zero
pub(crate) fn weighted_index(weights: &[f64]) -> Result<WeightedIndex<f64>, SamplingErrors>
{
    if weights.iter().any(|w| w.is_nan()) {
        return Err(SamplingErrors::DegenerateWeights);
    }
    WeightedIndex::new(
        weights.iter().map(|&w| w.max(0.0))
    ).map_err(|_| SamplingErrors::DegenerateWeights)
}

/// # Draw `count` items of `population` with replacement
/// * `population` and `weights` have to be of equal length
/// * see [`sample_indices_with_replacement`] for how weights are treated
pub fn sample_with_replacement<'a, R, T>(
    mut rng: R,
    population: &'a [T],
    weights: &[f64],
    count: usize
) -> Result<Vec<&'a T>, SamplingErrors>
where R: Rng
{
    if population.len() != weights.len() {
        return Err(
            SamplingErrors::LengthMismatch {
                population: population.len(),
                weights: weights.len()
            }
        );
    }
    let indices = sample_indices_with_replacement(&mut rng, weights, count)?;
    Ok(
        indices.into_iter()
            .map(|i| &population[i])
            .collect()
    )
}
