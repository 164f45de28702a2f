//! Log-space probability utilities.
//!
//! All distributions in the crate are held as natural-log probabilities.
//! Aggregation always goes through [`logsumexp`], which shifts by the maximum
//! before exponentiating so very negative entries never underflow the sum.

use rand::Rng;

/// Numerically stable `ln(sum(exp(v)))`.
///
/// Returns `-inf` for an empty slice or when every entry is `-inf`.
pub fn logsumexp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    if max == f64::INFINITY {
        return f64::INFINITY;
    }
    let sum: f64 = values.iter().map(|v| (v - max).exp()).sum();
    max + sum.ln()
}

/// Renormalise log-probabilities so they sum to one in probability space.
///
/// ```text
/// out[i] = v[i] - logsumexp(v)
/// ```
pub fn normalize_logprobs(values: &[f64]) -> Vec<f64> {
    let total = logsumexp(values);
    values.iter().map(|v| v - total).collect()
}

/// Log of the softmax of `values` (utilities in linear space).
pub fn log_softmax(values: &[f64]) -> Vec<f64> {
    normalize_logprobs(values)
}

/// Draw an index with probability `exp(logprobs[i])`.
///
/// Roulette wheel over the exponentiated entries. If floating-point rounding
/// leaves the cumulative mass just below the draw, the last index with
/// non-zero mass is returned.
///
/// # Panics
///
/// Panics if `logprobs` is empty.
pub fn sample_categorical_log<R: Rng + ?Sized>(logprobs: &[f64], rng: &mut R) -> usize {
    assert!(!logprobs.is_empty(), "cannot sample from an empty distribution");
    let draw: f64 = rng.random();
    let mut cumulative = 0.0;
    let mut last_live = logprobs.len() - 1;
    for (i, lp) in logprobs.iter().enumerate() {
        let p = lp.exp();
        if p > 0.0 {
            last_live = i;
        }
        cumulative += p;
        if draw < cumulative {
            return i;
        }
    }
    last_live
}
