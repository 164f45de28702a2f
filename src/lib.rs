//! # pragma-core
//!
//! Recursive pragmatic reasoning between a speaker and a learner.
//!
//! ---
//!
//! A speaker talks about objects in a shared context using a noisy, possibly
//! ambiguous lexicon. A learner entertains every combination of lexicon,
//! speaker perspective and reasoning depth, and updates a log-space posterior
//! over them after each `(signal, context)` it observes. The interesting
//! question is how fast, and how reliably, the posterior concentrates on the
//! hypothesis that actually generated the data.
//!
//! **Literal listener**: inverts a speaker who picks any conventional signal
//! for the intended referent and occasionally slips to an unconventional one.
//!
//! **Pragmatic speaker**: chooses signals by how well a literal listener would
//! recover the referent from them, sharpened by the rationality `alpha`.
//!
//! **Pragmatic listener**: inverts the pragmatic speaker, with channel noise
//! folded in.
//!
//! ---
//!
//! ## The pipeline
//!
//! ```text
//! Context ─▶ mental_state ─▶ literal listener ─▶ pragmatic speaker ─▶ pragmatic listener
//!                 │                 │                                         │
//!                 └──── produce ────┴───────────── Posterior::update ◀────────┘
//!                                                          │
//!                                              Simulation ─▶ Trajectory
//! ```
//!
//! ## Module overview
//!
//! | Module | Key types | What it does |
//! |--------|-----------|--------------|
//! | [`config`] | [`ModelConfig`], [`ChannelNoise`] | Noise, rationality, alphabet size |
//! | [`prob`] | — | Log-sum-exp, normalisation, categorical sampling |
//! | [`lexicon`] | [`Lexicon`] | Binary meaning × signal matrices and their enumeration |
//! | [`mental_state`] | [`Context`] | Referent distribution from perspective and saliences |
//! | [`listener`] | [`Listener`], [`PragmaticLevel`] | Literal and pragmatic listeners |
//! | [`speaker`] | [`Observation`] | Pragmatic speaker and signal production |
//! | [`hypothesis`] | [`Hypothesis`], [`HypothesisSpace`] | Hypothesis enumeration and priors |
//! | [`posterior`] | [`Posterior`] | Sequential Bayesian update |
//! | [`simulation`] | [`Simulation`], [`Trajectory`], [`Experiment`] | Learning runs and context generators |
//! | [`snapshot`] | [`snapshot::RunRecord`] | Serialisable experiment record (requires `serde`) |
//!
//! ## Example
//!
//! ```rust
//! use pragma_core::{HypothesisSpace, ModelConfig, PragmaticLevel, PriorScheme, Simulation};
//! use pragma_core::simulation::permutation_contexts;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let space = HypothesisSpace::generate(
//!     &[0.0, 1.0], 1.0, PriorScheme::Egocentric, &PragmaticLevel::ALL, 3, 3,
//! ).unwrap();
//! let sim = Simulation::new(ModelConfig::default(), &space).unwrap();
//! let contexts = permutation_contexts(&[vec![0.1, 0.2, 0.9], vec![0.1, 0.8, 0.9]], 1).unwrap();
//!
//! let speaker = space.get(188).unwrap();
//! let trajectory = sim.run(speaker, 12, &contexts, &mut StdRng::seed_from_u64(0)).unwrap();
//! assert_eq!(trajectory.series(188).unwrap().len(), 13);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod error;
pub mod hypothesis;
pub mod lexicon;
pub mod listener;
pub mod mental_state;
pub mod posterior;
pub mod prob;
pub mod simulation;
pub mod speaker;
#[cfg(feature = "serde")]
pub mod snapshot;

#[cfg(feature = "python-ffi")]
pub mod ffi;

pub use config::{ChannelNoise, ModelConfig};
pub use error::{ModelError, Result};
pub use hypothesis::{Hypothesis, HypothesisSpace, PriorScheme};
pub use lexicon::{Lexicon, Meaning, Signal};
pub use listener::{Listener, LiteralListener, PragmaticLevel, PragmaticListener};
pub use mental_state::{mental_state, Context};
pub use posterior::{log_likelihood, update_posterior, Belief, Posterior};
pub use simulation::{Experiment, ExperimentResult, Simulation, Trajectory};
pub use speaker::{produce, speaker_production_probs, Observation};
