//! Model parameters.
//!
//! Every component takes a `&ModelConfig`; nothing reads global state, so two
//! experiments with different noise or rationality settings can coexist.

use crate::error::{ModelError, Result};

/// How the pragmatic listener folds channel noise into the speaker's
/// production distribution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChannelNoise {
    /// Each signal keeps `(1 - noise)` of its own mass and receives
    /// `noise / (n - 1)` of the mass of every other signal:
    ///
    /// ```text
    /// noisy[s] = logsumexp(ln(1-noise) + p[s], ln(noise) + logsumexp(p[others]) - ln(n-1))
    /// ```
    #[default]
    Mixture,
    /// Same recombination, but entries are overwritten left to right so the
    /// "others" term for signal `s` already sees the noised values of earlier
    /// signals. Reproduces the recorded learning curves; not normalised.
    Sequential,
}

/// Immutable parameter set shared by every listener, speaker and update.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelConfig {
    /// Probability of a production error. Strictly inside (0, 1).
    /// Default: 0.05.
    pub noise: f64,

    /// Speaker rationality. Higher values concentrate production on the
    /// best-understood signal. Default: 3.0.
    pub alpha: f64,

    /// Size of the signal alphabet (and of the meaning set). Default: 3.
    pub num_signals: usize,

    /// Channel-noise recombination used by the pragmatic listener.
    pub channel_noise: ChannelNoise,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            noise: 0.05,
            alpha: 3.0,
            num_signals: 3,
            channel_noise: ChannelNoise::Mixture,
        }
    }
}

impl ModelConfig {
    /// Check every parameter against its admissible range.
    pub fn validate(&self) -> Result<()> {
        if !(self.noise > 0.0 && self.noise < 1.0) {
            return Err(ModelError::InvalidConfig("noise must lie strictly between 0 and 1"));
        }
        if !self.alpha.is_finite() || self.alpha <= 0.0 {
            return Err(ModelError::InvalidConfig("alpha must be finite and positive"));
        }
        if self.num_signals < 2 {
            return Err(ModelError::InvalidConfig("at least two signals are required"));
        }
        Ok(())
    }

    /// Replace the production noise.
    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    /// Replace the rationality parameter.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Replace the alphabet size.
    pub fn with_num_signals(mut self, num_signals: usize) -> Self {
        self.num_signals = num_signals;
        self
    }

    /// Replace the channel-noise recombination.
    pub fn with_channel_noise(mut self, channel_noise: ChannelNoise) -> Self {
        self.channel_noise = channel_noise;
        self
    }

    /// Fail unless a lexicon of width `num_signals` fits this alphabet.
    pub(crate) fn expect_num_signals(&self, num_signals: usize) -> Result<()> {
        if num_signals != self.num_signals {
            return Err(ModelError::InvalidConfig("lexicon width does not match num_signals"));
        }
        Ok(())
    }

    /// `ln(noise)`.
    pub(crate) fn ln_noise(&self) -> f64 {
        self.noise.ln()
    }

    /// `ln(1 - noise)`.
    pub(crate) fn ln_fidelity(&self) -> f64 {
        (-self.noise).ln_1p()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = ModelConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.num_signals, 3);
        assert_eq!(cfg.channel_noise, ChannelNoise::Mixture);
    }

    #[test]
    fn test_noise_bounds_rejected() {
        for noise in [0.0, 1.0, -0.1, f64::NAN] {
            let cfg = ModelConfig::default().with_noise(noise);
            assert!(
                matches!(cfg.validate(), Err(ModelError::InvalidConfig(_))),
                "noise={} should be rejected",
                noise
            );
        }
    }

    #[test]
    fn test_alpha_and_alphabet_rejected() {
        assert!(ModelConfig::default().with_alpha(0.0).validate().is_err());
        assert!(ModelConfig::default().with_alpha(f64::INFINITY).validate().is_err());
        assert!(ModelConfig::default().with_num_signals(1).validate().is_err());
    }

    #[test]
    fn test_log_helpers() {
        let cfg = ModelConfig::default().with_noise(0.25);
        assert!((cfg.ln_noise() - 0.25f64.ln()).abs() < 1e-12);
        assert!((cfg.ln_fidelity() - 0.75f64.ln()).abs() < 1e-12);
    }
}
