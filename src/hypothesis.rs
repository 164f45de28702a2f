//! Hypotheses and the hypothesis space.
//!
//! A hypothesis is one candidate generative model of the speaker: a lexicon,
//! a perspective and a pragmatic level. The space enumerates every valid
//! lexicon for each (level, perspective) pair and attaches a prior.
//!
//! Ordering is level-major, then perspective, then lexicon in
//! [`Lexicon::enumerate`] order, so for the default 3 × 3 model with
//! perspectives `[0, 1]` and both levels the identity lexicon at perspective 0
//! sits at index 188 (literal) and 874 (pragmatic).

use core::fmt;
use core::str::FromStr;

use hashbrown::HashMap;

use crate::error::{ModelError, Result};
use crate::lexicon::Lexicon;
use crate::listener::PragmaticLevel;
use crate::prob::normalize_logprobs;

/// Prior mass the egocentric scheme gives to the learner's own perspective.
pub const EGOCENTRIC_OWN_MASS: f64 = 0.9;

/// One candidate model of the speaker.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hypothesis {
    /// Meaning → signal mapping.
    pub lexicon: Lexicon,
    /// Speaker perspective.
    pub perspective: f64,
    /// Reasoning depth.
    pub level: PragmaticLevel,
}

impl Hypothesis {
    /// Bundle a lexicon, perspective and level.
    pub fn new(lexicon: Lexicon, perspective: f64, level: PragmaticLevel) -> Self {
        Self { lexicon, perspective, level }
    }

    fn key(&self) -> HypothesisKey {
        (self.lexicon.clone(), self.perspective.to_bits(), self.level)
    }
}

impl fmt::Display for Hypothesis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            PragmaticLevel::Literal => "literal",
            PragmaticLevel::Pragmatic => "pragmatic",
        };
        write!(f, "{} p={} {}", self.lexicon, self.perspective, level)
    }
}

type HypothesisKey = (Lexicon, u64, PragmaticLevel);

/// How prior mass is spread over the hypothesis space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PriorScheme {
    /// Uniform over all hypotheses.
    Unbiased,
    /// [`EGOCENTRIC_OWN_MASS`] on hypotheses sharing the learner's perspective,
    /// the remainder split evenly across the other perspectives.
    Egocentric,
}

impl FromStr for PriorScheme {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "unbiased" => Ok(Self::Unbiased),
            "egocentric" => Ok(Self::Egocentric),
            other => Err(ModelError::UnknownPriorScheme(other.to_string())),
        }
    }
}

/// Ordered hypotheses, each paired with its log prior.
#[derive(Clone, Debug)]
pub struct HypothesisSpace {
    entries: Vec<(Hypothesis, f64)>,
    index: HashMap<HypothesisKey, usize>,
}

impl HypothesisSpace {
    /// Enumerate every (level, perspective, lexicon) triple and assign priors.
    pub fn generate(
        perspectives: &[f64],
        learner_perspective: f64,
        scheme: PriorScheme,
        levels: &[PragmaticLevel],
        num_meanings: usize,
        num_signals: usize,
    ) -> Result<Self> {
        if perspectives.is_empty() || levels.is_empty() {
            return Err(ModelError::EmptyHypothesisSpace);
        }
        let lexicons = Lexicon::enumerate(num_meanings, num_signals)?;
        let per_perspective = perspective_weights(perspectives, learner_perspective, scheme);
        let ln_lexicon = -(lexicons.len() as f64).ln();
        let ln_level = -(levels.len() as f64).ln();

        let mut hypotheses = Vec::with_capacity(levels.len() * perspectives.len() * lexicons.len());
        let mut log_priors = Vec::with_capacity(hypotheses.capacity());
        for &level in levels {
            for (&perspective, &weight) in perspectives.iter().zip(per_perspective.iter()) {
                for lexicon in &lexicons {
                    hypotheses.push(Hypothesis::new(lexicon.clone(), perspective, level));
                    log_priors.push(weight.ln() + ln_level + ln_lexicon);
                }
            }
        }
        Self::from_parts(hypotheses, &log_priors)
    }

    /// Build a space from explicit hypotheses and (unnormalised) log priors.
    pub fn from_parts(hypotheses: Vec<Hypothesis>, log_priors: &[f64]) -> Result<Self> {
        if hypotheses.is_empty() {
            return Err(ModelError::EmptyHypothesisSpace);
        }
        if hypotheses.len() != log_priors.len() {
            return Err(ModelError::InvalidConfig("one log prior is required per hypothesis"));
        }
        let normalised = normalize_logprobs(log_priors);
        let index = hypotheses
            .iter()
            .enumerate()
            .map(|(i, h)| (h.key(), i))
            .collect();
        let entries = hypotheses.into_iter().zip(normalised).collect();
        Ok(Self { entries, index })
    }

    /// Number of hypotheses.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if the space is empty (never, once constructed).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hypothesis at `index`.
    pub fn get(&self, index: usize) -> Result<&Hypothesis> {
        self.entries
            .get(index)
            .map(|(h, _)| h)
            .ok_or(ModelError::HypothesisOutOfRange { index, len: self.entries.len() })
    }

    /// Iterate over `(hypothesis, log prior)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&Hypothesis, f64)> {
        self.entries.iter().map(|(h, lp)| (h, *lp))
    }

    /// Log priors in hypothesis order.
    pub fn log_priors(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, lp)| *lp).collect()
    }

    /// Position of `hypothesis`, if it belongs to the space.
    pub fn index_of(&self, hypothesis: &Hypothesis) -> Option<usize> {
        self.index.get(&hypothesis.key()).copied()
    }

    /// Same lexicon and perspective as `index`, at `level`.
    pub fn counterpart(&self, index: usize, level: PragmaticLevel) -> Result<Option<usize>> {
        let h = self.get(index)?;
        let twin = Hypothesis::new(h.lexicon.clone(), h.perspective, level);
        Ok(self.index_of(&twin))
    }
}

fn perspective_weights(perspectives: &[f64], learner: f64, scheme: PriorScheme) -> Vec<f64> {
    let n = perspectives.len();
    match scheme {
        PriorScheme::Unbiased => vec![1.0 / n as f64; n],
        PriorScheme::Egocentric => {
            let own = perspectives.iter().filter(|&&p| p == learner).count();
            if own == 0 || own == n {
                return vec![1.0 / n as f64; n];
            }
            let other_share = (1.0 - EGOCENTRIC_OWN_MASS) / (n - own) as f64;
            let own_share = EGOCENTRIC_OWN_MASS / own as f64;
            perspectives
                .iter()
                .map(|&p| if p == learner { own_share } else { other_share })
                .collect()
        }
    }
}
