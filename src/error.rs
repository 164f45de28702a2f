//! Error taxonomy for the learning model.
//!
//! Domain violations (a salience or perspective that would push a logarithm
//! out of its domain) are reported as explicit errors instead of NaN.
//! Lexicon degeneracy is rejected when a [`Lexicon`](crate::lexicon::Lexicon)
//! is built, so the listener and speaker kernels never see it.

use thiserror::Error;

/// Errors raised while building or running the model.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    /// A configuration value is outside its admissible range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// `ln(1 - |perspective - salience|)` has no real value.
    #[error("domain violation: perspective {perspective} and salience {salience} leave no mass for the referent")]
    DomainViolation {
        /// Speaker perspective.
        perspective: f64,
        /// Offending context salience.
        salience: f64,
    },

    /// A context salience lies outside [0, 1].
    #[error("salience {0} is outside [0, 1]")]
    InvalidSalience(f64),

    /// Context length does not match the number of meanings.
    #[error("context has {actual} saliences, expected {expected}")]
    ContextLength {
        /// Number of meanings in the lexicon.
        expected: usize,
        /// Number of saliences supplied.
        actual: usize,
    },

    /// A lexicon row has no usable signal.
    #[error("meaning {meaning} has no usable signal")]
    DegenerateLexicon {
        /// Index of the empty row.
        meaning: usize,
    },

    /// Lexicon rows are empty or of unequal length.
    #[error("malformed lexicon: {0}")]
    LexiconShape(&'static str),

    /// Signal index outside the alphabet.
    #[error("signal {signal} out of range for {num_signals} signals")]
    SignalOutOfRange {
        /// Requested signal.
        signal: usize,
        /// Alphabet size.
        num_signals: usize,
    },

    /// Meaning index outside the lexicon.
    #[error("meaning {meaning} out of range for {num_meanings} meanings")]
    MeaningOutOfRange {
        /// Requested meaning.
        meaning: usize,
        /// Number of meanings.
        num_meanings: usize,
    },

    /// Hypothesis index outside the hypothesis space.
    #[error("hypothesis {index} out of range for {len} hypotheses")]
    HypothesisOutOfRange {
        /// Requested index.
        index: usize,
        /// Size of the hypothesis space.
        len: usize,
    },

    /// Not enough contexts for the requested number of steps.
    #[error("simulation needs {needed} contexts but only {available} were supplied")]
    InsufficientContexts {
        /// Steps requested.
        needed: usize,
        /// Contexts available.
        available: usize,
    },

    /// Prior scheme name not recognised.
    #[error("unknown prior scheme {0:?} (expected \"egocentric\" or \"unbiased\")")]
    UnknownPriorScheme(String),

    /// The generator was given no perspectives, levels or lexicons.
    #[error("hypothesis space is empty")]
    EmptyHypothesisSpace,
}

/// Crate result alias.
pub type Result<T> = core::result::Result<T, ModelError>;
