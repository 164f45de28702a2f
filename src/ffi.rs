//! Python FFI bindings via PyO3.
//!
//! Exposes the learning experiment to Python for plotting and analysis. The
//! hypothesis space is always the full enumeration over `perspectives` and
//! both pragmatic levels.
//!
//! # Building the Python extension
//!
//! ```bash
//! pip install maturin
//! maturin develop --features python-ffi
//! ```
//!
//! # Usage
//!
//! ```python
//! from pragma_core import ModelConfig, simulate, lexicons, hypothesis_count
//!
//! assert hypothesis_count() == 1372
//!
//! cfg = ModelConfig(noise=0.05, alpha=3.0)
//! tracked, runs = simulate(cfg, "100/010/001", perspective=0.0, level=1,
//!                          num_runs=10, num_steps=300, seed=0)
//! # runs[run][slot][step]: slot 0 = speaker, slot 1 = same lexicon at the other level
//! ```

#![allow(non_snake_case)]

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::config::{ChannelNoise, ModelConfig as RustModelConfig};
use crate::error::ModelError;
use crate::hypothesis::{Hypothesis, HypothesisSpace, PriorScheme};
use crate::lexicon::Lexicon;
use crate::listener::PragmaticLevel;
use crate::mental_state::Context;
use crate::simulation::{permutation_contexts, Experiment, Simulation};

fn to_py(err: ModelError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Salience vectors whose permutations form the default context sequence.
const DEFAULT_CONTEXT_BASES: [[f64; 3]; 2] = [[0.1, 0.2, 0.9], [0.1, 0.8, 0.9]];

// ── ModelConfig ──────────────────────────────────────────────────────────────

/// Model parameters.
///
/// Args:
///     noise:         production error probability in (0, 1)
///     alpha:         speaker rationality (> 0)
///     channel_noise: "mixture" (default) or "sequential"
#[pyclass(name = "ModelConfig")]
#[derive(Clone)]
pub struct PyModelConfig {
    inner: RustModelConfig,
}

#[pymethods]
impl PyModelConfig {
    /// Create a validated config.
    #[new]
    #[pyo3(signature = (noise=0.05, alpha=3.0, channel_noise="mixture"))]
    pub fn new(noise: f64, alpha: f64, channel_noise: &str) -> PyResult<Self> {
        let channel_noise = match channel_noise {
            "mixture" => ChannelNoise::Mixture,
            "sequential" => ChannelNoise::Sequential,
            other => {
                return Err(PyValueError::new_err(format!(
                    "channel_noise must be \"mixture\" or \"sequential\", got {other:?}"
                )))
            }
        };
        let inner = RustModelConfig::default()
            .with_noise(noise)
            .with_alpha(alpha)
            .with_channel_noise(channel_noise);
        inner.validate().map_err(to_py)?;
        Ok(Self { inner })
    }

    /// Production noise.
    #[getter]
    pub fn noise(&self) -> f64 {
        self.inner.noise
    }

    /// Speaker rationality.
    #[getter]
    pub fn alpha(&self) -> f64 {
        self.inner.alpha
    }

    /// Python repr string.
    pub fn __repr__(&self) -> String {
        format!(
            "ModelConfig(noise={}, alpha={}, channel_noise={:?})",
            self.inner.noise, self.inner.alpha, self.inner.channel_noise
        )
    }
}

// ── Functions ────────────────────────────────────────────────────────────────

/// Run repeated learning simulations from one speaker.
///
/// Args:
///     config:              ModelConfig
///     lexicon:             speaker lexicon as "100/010/001"
///     perspective:         speaker perspective
///     level:               0 (literal) or 1 (pragmatic)
///     num_runs, num_steps: experiment size
///     seed:                base seed (run r uses seed + r)
///     prior:               "egocentric" or "unbiased"
///     learner_perspective: perspective favoured by the egocentric prior
///     perspectives:        perspectives in the hypothesis space
///     contexts:            optional list of salience lists (default: permutations
///                          of [0.1, 0.2, 0.9] and [0.1, 0.8, 0.9], repeated)
///
/// Returns:
///     (tracked hypothesis indices, runs[run][slot][step])
#[pyfunction]
#[pyo3(signature = (
    config, lexicon, perspective, level, num_runs, num_steps, seed=0,
    prior="egocentric", learner_perspective=1.0, perspectives=vec![0.0, 1.0], contexts=None
))]
#[allow(clippy::too_many_arguments)]
pub fn simulate(
    config: &PyModelConfig,
    lexicon: &str,
    perspective: f64,
    level: u8,
    num_runs: usize,
    num_steps: usize,
    seed: u64,
    prior: &str,
    learner_perspective: f64,
    perspectives: Vec<f64>,
    contexts: Option<Vec<Vec<f64>>>,
) -> PyResult<(Vec<usize>, Vec<Vec<Vec<f64>>>)> {
    let lexicon: Lexicon = lexicon.parse().map_err(to_py)?;
    let level = PragmaticLevel::try_from(level).map_err(to_py)?;
    let scheme: PriorScheme = prior.parse().map_err(to_py)?;
    let n = lexicon.num_signals();

    let space = HypothesisSpace::generate(
        &perspectives,
        learner_perspective,
        scheme,
        &PragmaticLevel::ALL,
        lexicon.num_meanings(),
        n,
    )
    .map_err(to_py)?;
    let speaker = space
        .index_of(&Hypothesis::new(lexicon, perspective, level))
        .ok_or_else(|| PyValueError::new_err("speaker is not part of the hypothesis space"))?;

    let contexts = match contexts {
        Some(raw) => raw
            .iter()
            .map(|c| c.as_slice().try_into())
            .collect::<Result<Vec<Context>, ModelError>>()
            .map_err(to_py)?,
        None => {
            let bases: Vec<Vec<f64>> = DEFAULT_CONTEXT_BASES.iter().map(|b| b.to_vec()).collect();
            let block = 2 * 6;
            permutation_contexts(&bases, num_steps.div_ceil(block)).map_err(to_py)?
        }
    };

    let sim = Simulation::new(config.inner.clone().with_num_signals(n), &space).map_err(to_py)?;
    let experiment =
        Experiment::against_other_level(&space, speaker, num_runs, num_steps, seed).map_err(to_py)?;
    let result = sim.run_experiment(&experiment, &contexts).map_err(to_py)?;
    Ok((result.tracked, result.runs))
}

/// Every valid lexicon of the given shape, in hypothesis-space order.
#[pyfunction]
#[pyo3(signature = (num_meanings=3, num_signals=3))]
pub fn lexicons(num_meanings: usize, num_signals: usize) -> PyResult<Vec<String>> {
    Ok(Lexicon::enumerate(num_meanings, num_signals)
        .map_err(to_py)?
        .iter()
        .map(Lexicon::to_string)
        .collect())
}

/// Size of the hypothesis space over `perspectives` and both pragmatic levels.
#[pyfunction]
#[pyo3(signature = (perspectives=vec![0.0, 1.0], num_meanings=3, num_signals=3))]
pub fn hypothesis_count(
    perspectives: Vec<f64>,
    num_meanings: usize,
    num_signals: usize,
) -> PyResult<usize> {
    let lexicons = Lexicon::enumerate(num_meanings, num_signals).map_err(to_py)?;
    Ok(lexicons.len() * perspectives.len() * PragmaticLevel::ALL.len())
}

// ── Module entry point ────────────────────────────────────────────────────────

/// pragma-core Python bindings.
///
/// Exposes recursive pragmatic lexicon learning simulations.
#[pymodule]
pub fn pragma_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyModelConfig>()?;
    m.add_function(wrap_pyfunction!(simulate, m)?)?;
    m.add_function(wrap_pyfunction!(lexicons, m)?)?;
    m.add_function(wrap_pyfunction!(hypothesis_count, m)?)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}
