//! Contexts and the speaker's mental state.
//!
//! A context assigns every object (meaning) a salience in [0, 1]. A speaker
//! with perspective `p` attends to object `m` in proportion to
//! `1 - |p - c_m|`, so objects whose salience sits close to the speaker's
//! perspective are the likely referents.

use crate::error::{ModelError, Result};
use crate::prob::normalize_logprobs;

/// Per-trial saliences, one per meaning, each in [0, 1].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Context {
    saliences: Vec<f64>,
}

impl Context {
    /// Validate and wrap a salience vector.
    ///
    /// Any salience outside [0, 1] (or NaN) is a
    /// [`ModelError::InvalidSalience`].
    pub fn new(saliences: Vec<f64>) -> Result<Self> {
        if let Some(&bad) = saliences.iter().find(|c| !(0.0..=1.0).contains(*c)) {
            return Err(ModelError::InvalidSalience(bad));
        }
        Ok(Self { saliences })
    }

    /// Wrap saliences already known to lie in [0, 1].
    pub(crate) fn from_valid(saliences: Vec<f64>) -> Self {
        debug_assert!(saliences.iter().all(|c| (0.0..=1.0).contains(c)));
        Self { saliences }
    }

    /// Salience values.
    pub fn saliences(&self) -> &[f64] {
        &self.saliences
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.saliences.len()
    }

    /// `true` if the context has no objects.
    pub fn is_empty(&self) -> bool {
        self.saliences.is_empty()
    }

    /// Fail with [`ModelError::ContextLength`] unless the context has
    /// `num_meanings` objects.
    pub fn expect_len(&self, num_meanings: usize) -> Result<()> {
        if self.saliences.len() != num_meanings {
            return Err(ModelError::ContextLength {
                expected: num_meanings,
                actual: self.saliences.len(),
            });
        }
        Ok(())
    }
}

impl TryFrom<&[f64]> for Context {
    type Error = ModelError;

    fn try_from(values: &[f64]) -> Result<Self> {
        Self::new(values.to_vec())
    }
}

/// Log-distribution over meanings for a speaker with `perspective` in `context`.
///
/// ```text
/// w_m = ln(1 - |perspective - c_m|),   mental_state = normalize(w)
/// ```
///
/// Fails with [`ModelError::DomainViolation`] when `|perspective - c_m| >= 1`
/// for some object, since the weight would have no real logarithm.
pub fn mental_state(perspective: f64, context: &Context) -> Result<Vec<f64>> {
    let weights = context
        .saliences
        .iter()
        .map(|&c| {
            let closeness = 1.0 - (perspective - c).abs();
            if closeness > 0.0 && closeness.is_finite() {
                Ok(closeness.ln())
            } else {
                Err(ModelError::DomainViolation { perspective, salience: c })
            }
        })
        .collect::<Result<Vec<f64>>>()?;
    Ok(normalize_logprobs(&weights))
}
