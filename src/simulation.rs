//! The learning loop.
//!
//! A fixed speaker hypothesis produces one utterance per context; the learner
//! folds each one into its posterior and the full log-posterior is recorded
//! after every step:
//!
//! ```text
//! prior ─▶ produce(ctx₀) ─▶ update ─▶ produce(ctx₁) ─▶ update ─▶ … (num_steps)
//!   │                          │                          │
//!   └──────────── trajectory[0], trajectory[1], trajectory[2] …
//! ```
//!
//! Runs never share mutable state: each one starts from the prior and owns its
//! random stream, so an [`Experiment`] is just repeated independent runs.

use rand::distr::Open01;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace};

use crate::config::ModelConfig;
use crate::error::{ModelError, Result};
use crate::hypothesis::{Hypothesis, HypothesisSpace};
use crate::listener::PragmaticLevel;
use crate::mental_state::Context;
use crate::posterior::Posterior;
use crate::speaker::{produce, Observation};

// ─── Trajectory ───────────────────────────────────────────────────────────────

/// Posterior snapshots of one run, initial prior first.
#[derive(Clone, Debug)]
pub struct Trajectory {
    log_posteriors: Vec<Vec<f64>>,
    observations: Vec<Observation>,
}

impl Trajectory {
    /// Number of observations folded in.
    pub fn steps(&self) -> usize {
        self.observations.len()
    }

    /// Log-posterior after `step` observations (`0` is the prior).
    pub fn log_posterior_at(&self, step: usize) -> Option<&[f64]> {
        self.log_posteriors.get(step).map(Vec::as_slice)
    }

    /// Log-posterior after the last observation.
    pub fn final_log_posterior(&self) -> &[f64] {
        self.log_posteriors.last().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Probability of hypothesis `index` at every step, prior included.
    pub fn series(&self, index: usize) -> Result<Vec<f64>> {
        let len = self.log_posteriors.first().map_or(0, Vec::len);
        if index >= len {
            return Err(ModelError::HypothesisOutOfRange { index, len });
        }
        Ok(self.log_posteriors.iter().map(|lp| lp[index].exp()).collect())
    }

    /// Utterances in production order.
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }
}

// ─── Simulation ───────────────────────────────────────────────────────────────

/// A validated model configuration bound to a hypothesis space.
#[derive(Clone, Debug)]
pub struct Simulation<'a> {
    config: ModelConfig,
    space: &'a HypothesisSpace,
}

impl<'a> Simulation<'a> {
    /// Validate `config` against itself and against the space's lexicon shape.
    pub fn new(config: ModelConfig, space: &'a HypothesisSpace) -> Result<Self> {
        config.validate()?;
        let lexicon = &space.get(0)?.lexicon;
        if lexicon.num_signals() != config.num_signals {
            return Err(ModelError::InvalidConfig(
                "num_signals does not match the hypothesis space",
            ));
        }
        Ok(Self { config, space })
    }

    /// Model parameters.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Hypothesis space.
    pub fn space(&self) -> &'a HypothesisSpace {
        self.space
    }

    /// Run `num_steps` productions from `speaker`, one per context, recording
    /// the posterior after each.
    pub fn run<R: Rng + ?Sized>(
        &self,
        speaker: &Hypothesis,
        num_steps: usize,
        contexts: &[Context],
        rng: &mut R,
    ) -> Result<Trajectory> {
        if contexts.len() < num_steps {
            return Err(ModelError::InsufficientContexts {
                needed: num_steps,
                available: contexts.len(),
            });
        }
        debug!(speaker = %speaker, num_steps, "run start");

        let mut posterior = Posterior::from_prior(self.space);
        let mut log_posteriors = Vec::with_capacity(num_steps + 1);
        let mut observations = Vec::with_capacity(num_steps);
        log_posteriors.push(posterior.log_probs());

        for (step, context) in contexts.iter().take(num_steps).enumerate() {
            let obs = produce(&self.config, speaker, context, rng)?;
            posterior.update(&self.config, obs.signal, &obs.context)?;
            trace!(step, signal = obs.signal, map = posterior.map_estimate(), "observation folded");
            log_posteriors.push(posterior.log_probs());
            observations.push(obs);
        }

        if let Some(index) = self.space.index_of(speaker) {
            debug!(
                speaker = %speaker,
                final_probability = posterior.probability_of(index)?,
                "run complete"
            );
        }
        Ok(Trajectory { log_posteriors, observations })
    }

    /// Repeat [`Simulation::run`] `experiment.num_runs` times and keep the
    /// probability series of the tracked hypotheses.
    ///
    /// Run `r` draws from `StdRng::seed_from_u64(seed + r)`.
    pub fn run_experiment(
        &self,
        experiment: &Experiment,
        contexts: &[Context],
    ) -> Result<ExperimentResult> {
        let speaker = self.space.get(experiment.speaker)?;
        for &index in &experiment.tracked {
            self.space.get(index)?;
        }
        info!(
            speaker = %speaker,
            runs = experiment.num_runs,
            steps = experiment.num_steps,
            "experiment start"
        );

        let mut runs = Vec::with_capacity(experiment.num_runs);
        for r in 0..experiment.num_runs {
            let mut rng = StdRng::seed_from_u64(experiment.seed.wrapping_add(r as u64));
            let trajectory = self.run(speaker, experiment.num_steps, contexts, &mut rng)?;
            let tracked = experiment
                .tracked
                .iter()
                .map(|&index| trajectory.series(index))
                .collect::<Result<Vec<_>>>()?;
            runs.push(tracked);
        }
        Ok(ExperimentResult { tracked: experiment.tracked.clone(), runs })
    }
}

// ─── Experiment ───────────────────────────────────────────────────────────────

/// Repeated independent runs from one speaker.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Experiment {
    /// Index of the speaker hypothesis.
    pub speaker: usize,
    /// Hypotheses whose probability is recorded.
    pub tracked: Vec<usize>,
    /// Number of independent runs.
    pub num_runs: usize,
    /// Productions per run.
    pub num_steps: usize,
    /// Base seed; run `r` uses `seed + r`.
    pub seed: u64,
}

impl Experiment {
    /// Track the speaker and its counterpart at the other pragmatic level.
    pub fn against_other_level(
        space: &HypothesisSpace,
        speaker: usize,
        num_runs: usize,
        num_steps: usize,
        seed: u64,
    ) -> Result<Self> {
        let other = match space.get(speaker)?.level {
            PragmaticLevel::Literal => PragmaticLevel::Pragmatic,
            PragmaticLevel::Pragmatic => PragmaticLevel::Literal,
        };
        let mut tracked = vec![speaker];
        tracked.extend(space.counterpart(speaker, other)?);
        Ok(Self { speaker, tracked, num_runs, num_steps, seed })
    }
}

/// Tracked probability series of every run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExperimentResult {
    /// Tracked hypothesis indices, in slot order.
    pub tracked: Vec<usize>,
    /// `runs[run][slot][step]`.
    pub runs: Vec<Vec<Vec<f64>>>,
}

impl ExperimentResult {
    /// Series of tracked slot `slot` in every run.
    pub fn series(&self, slot: usize) -> Vec<&[f64]> {
        self.runs.iter().map(|run| run[slot].as_slice()).collect()
    }

    /// Step-wise mean of tracked slot `slot` across runs.
    pub fn mean_series(&self, slot: usize) -> Vec<f64> {
        let runs = self.series(slot);
        let Some(first) = runs.first() else {
            return Vec::new();
        };
        let n = runs.len() as f64;
        (0..first.len())
            .map(|step| runs.iter().map(|r| r[step]).sum::<f64>() / n)
            .collect()
    }
}

// ─── Context generators ───────────────────────────────────────────────────────

/// Every permutation of every base salience vector, repeated `repeats` times.
///
/// `permutation_contexts(&[vec![0.1, 0.2, 0.9], vec![0.1, 0.8, 0.9]], 25)`
/// yields 2 × 6 × 25 = 300 contexts.
pub fn permutation_contexts(bases: &[Vec<f64>], repeats: usize) -> Result<Vec<Context>> {
    let mut block = Vec::new();
    for base in bases {
        let mut order: Vec<usize> = (0..base.len()).collect();
        loop {
            block.push(Context::new(order.iter().map(|&i| base[i]).collect())?);
            if !next_permutation(&mut order) {
                break;
            }
        }
    }
    let mut out = Vec::with_capacity(block.len() * repeats);
    for _ in 0..repeats {
        out.extend(block.iter().cloned());
    }
    Ok(out)
}

/// `count` contexts with saliences drawn uniformly from the open interval (0, 1).
pub fn random_contexts<R: Rng + ?Sized>(num_meanings: usize, count: usize, rng: &mut R) -> Vec<Context> {
    (0..count)
        .map(|_| Context::from_valid((0..num_meanings).map(|_| rng.sample(Open01)).collect()))
        .collect()
}

/// Advance `v` to the next lexicographic permutation; `false` after the last.
fn next_permutation(v: &mut [usize]) -> bool {
    if v.len() < 2 {
        return false;
    }
    let Some(i) = (0..v.len() - 1).rev().find(|&i| v[i] < v[i + 1]) else {
        return false;
    };
    let j = (i + 1..v.len()).rev().find(|&j| v[j] > v[i]).unwrap_or(i + 1);
    v.swap(i, j);
    v[i + 1..].reverse();
    true
}
