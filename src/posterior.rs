//! The learner's belief state over the hypothesis space.
//!
//! A [`Posterior`] is an ordered list of [`Belief`] records, each pairing a
//! borrowed hypothesis with its log-probability. Updates are log-additive
//! Bayesian folds followed by a renormalisation, so after every update the
//! log-probabilities satisfy `logsumexp == 0`.

use crate::config::ModelConfig;
use crate::error::{ModelError, Result};
use crate::hypothesis::{Hypothesis, HypothesisSpace};
use crate::lexicon::Signal;
use crate::mental_state::{mental_state, Context};
use crate::prob::normalize_logprobs;

/// One hypothesis and the learner's current log-probability for it.
#[derive(Clone, Copy, Debug)]
pub struct Belief<'a> {
    /// The hypothesis.
    pub hypothesis: &'a Hypothesis,
    /// Natural-log posterior probability.
    pub log_prob: f64,
}

/// Evidence `ln P(signal | hypothesis, context)`.
///
/// The level-appropriate listener's joint log-probabilities are marginalised
/// over meanings.
pub fn log_likelihood(
    config: &ModelConfig,
    hypothesis: &Hypothesis,
    signal: Signal,
    context: &Context,
) -> Result<f64> {
    let lexicon = &hypothesis.lexicon;
    config.expect_num_signals(lexicon.num_signals())?;
    if signal >= lexicon.num_signals() {
        return Err(ModelError::SignalOutOfRange { signal, num_signals: lexicon.num_signals() });
    }
    context.expect_len(lexicon.num_meanings())?;
    let ref_distribution = mental_state(hypothesis.perspective, context)?;
    Ok(hypothesis
        .level
        .listener()
        .marginal(config, signal, lexicon, &ref_distribution))
}

/// Log-space posterior over a [`HypothesisSpace`].
#[derive(Clone, Debug)]
pub struct Posterior<'a> {
    beliefs: Vec<Belief<'a>>,
}

impl<'a> Posterior<'a> {
    /// Start from the space's prior.
    pub fn from_prior(space: &'a HypothesisSpace) -> Self {
        let beliefs = space
            .iter()
            .map(|(hypothesis, log_prob)| Belief { hypothesis, log_prob })
            .collect();
        Self { beliefs }
    }

    /// Fold one observed `(signal, context)` into every belief and renormalise.
    ///
    /// On error the posterior is left untouched.
    pub fn update(&mut self, config: &ModelConfig, signal: Signal, context: &Context) -> Result<()> {
        let unnormalised = self
            .beliefs
            .iter()
            .map(|b| Ok(b.log_prob + log_likelihood(config, b.hypothesis, signal, context)?))
            .collect::<Result<Vec<f64>>>()?;
        for (belief, lp) in self.beliefs.iter_mut().zip(normalize_logprobs(&unnormalised)) {
            belief.log_prob = lp;
        }
        Ok(())
    }

    /// Beliefs in hypothesis order.
    pub fn beliefs(&self) -> &[Belief<'a>] {
        &self.beliefs
    }

    /// Log-probabilities in hypothesis order.
    pub fn log_probs(&self) -> Vec<f64> {
        self.beliefs.iter().map(|b| b.log_prob).collect()
    }

    /// Probabilities in hypothesis order.
    pub fn probabilities(&self) -> Vec<f64> {
        self.beliefs.iter().map(|b| b.log_prob.exp()).collect()
    }

    /// Probability of the hypothesis at `index`.
    pub fn probability_of(&self, index: usize) -> Result<f64> {
        self.beliefs
            .get(index)
            .map(|b| b.log_prob.exp())
            .ok_or(ModelError::HypothesisOutOfRange { index, len: self.beliefs.len() })
    }

    /// Index of the most probable hypothesis (first on ties).
    pub fn map_estimate(&self) -> usize {
        let mut best = 0;
        for (i, b) in self.beliefs.iter().enumerate() {
            if b.log_prob > self.beliefs[best].log_prob {
                best = i;
            }
        }
        best
    }

    /// Number of hypotheses.
    pub fn len(&self) -> usize {
        self.beliefs.len()
    }

    /// `true` if there are no hypotheses.
    pub fn is_empty(&self) -> bool {
        self.beliefs.is_empty()
    }
}

/// Pure form of [`Posterior::update`]: returns the updated posterior.
pub fn update_posterior<'a>(
    config: &ModelConfig,
    posterior: &Posterior<'a>,
    signal: Signal,
    context: &Context,
) -> Result<Posterior<'a>> {
    let mut next = posterior.clone();
    next.update(config, signal, context)?;
    Ok(next)
}
