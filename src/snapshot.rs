//! Portable record of an experiment for persistence and plotting.
//!
//! # Layout
//!
//! ```text
//! RunRecord
//!   version        u16 = RUN_RECORD_VERSION
//!   config         ModelConfig
//!   speaker        Hypothesis
//!   num_steps      usize
//!   seed           u64
//!   tracked[]      TrackedRecord { index, hypothesis, runs[run][step] }
//! ```
//!
//! Series are stored in probability space, one value per step with the prior
//! first, which is what downstream convergence plots consume. The record is
//! format-agnostic: any serde format works.
//!
//! Requires the `serde` feature.

use crate::config::ModelConfig;
use crate::error::{ModelError, Result};
use crate::hypothesis::{Hypothesis, HypothesisSpace};
use crate::simulation::{Experiment, ExperimentResult};

/// Current [`RunRecord`] format version.
pub const RUN_RECORD_VERSION: u16 = 1;

/// Serialisable summary of one [`Experiment`].
///
/// ```rust,ignore
/// let record = RunRecord::from_experiment(&space, sim.config(), &experiment, &result)?;
/// let json = serde_json::to_string(&record).unwrap();
/// let restored: RunRecord = serde_json::from_str(&json).unwrap();
/// ```
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct RunRecord {
    /// Format version, always [`RUN_RECORD_VERSION`] for new records.
    pub version: u16,
    /// Parameters the runs were produced with.
    pub config: ModelConfig,
    /// Generating hypothesis.
    pub speaker: Hypothesis,
    /// Productions per run.
    pub num_steps: usize,
    /// Base seed of the experiment.
    pub seed: u64,
    /// Recorded hypotheses.
    pub tracked: Vec<TrackedRecord>,
}

/// Probability series of one tracked hypothesis across runs.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct TrackedRecord {
    /// Index in the hypothesis space.
    pub index: usize,
    /// The hypothesis itself, so the record survives reordering of the space.
    pub hypothesis: Hypothesis,
    /// `runs[run][step]`, prior first.
    pub runs: Vec<Vec<f64>>,
}

impl TrackedRecord {
    /// Step-wise mean over runs.
    pub fn mean_series(&self) -> Vec<f64> {
        let Some(first) = self.runs.first() else {
            return Vec::new();
        };
        let n = self.runs.len() as f64;
        (0..first.len())
            .map(|step| self.runs.iter().map(|r| r[step]).sum::<f64>() / n)
            .collect()
    }
}

impl RunRecord {
    /// Capture an experiment and its result.
    pub fn from_experiment(
        space: &HypothesisSpace,
        config: &ModelConfig,
        experiment: &Experiment,
        result: &ExperimentResult,
    ) -> Result<Self> {
        if result.tracked != experiment.tracked {
            return Err(ModelError::InvalidConfig("result does not belong to this experiment"));
        }
        let tracked = experiment
            .tracked
            .iter()
            .enumerate()
            .map(|(slot, &index)| {
                Ok(TrackedRecord {
                    index,
                    hypothesis: space.get(index)?.clone(),
                    runs: result.series(slot).into_iter().map(<[f64]>::to_vec).collect(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            version: RUN_RECORD_VERSION,
            config: config.clone(),
            speaker: space.get(experiment.speaker)?.clone(),
            num_steps: experiment.num_steps,
            seed: experiment.seed,
            tracked,
        })
    }

    /// Number of runs captured.
    pub fn run_count(&self) -> usize {
        self.tracked.first().map_or(0, |t| t.runs.len())
    }

    /// Look up a tracked hypothesis by its space index.
    pub fn find_tracked(&self, index: usize) -> Option<&TrackedRecord> {
        self.tracked.iter().find(|t| t.index == index)
    }
}
