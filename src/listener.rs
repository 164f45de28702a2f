//! Listener models: literal and pragmatic.
//!
//! # The recursion
//!
//! ```text
//! literal listener ──perception matrix──▶ pragmatic speaker ──channel noise──▶ pragmatic listener
//! ```
//!
//! Both listeners return the *joint* log-probability that the speaker intended
//! `meaning` and produced `signal`, i.e. `ref[meaning] + ln P(signal | meaning)`.
//! Marginalising over meanings gives the evidence a hypothesis assigns to an
//! observed signal.
//!
//! # Invariants
//!
//! - For a fixed meaning, `exp(literal_listener(s, m) - ref[m])` sums to 1 over `s`.
//! - Each perception-matrix row is a normalised log-distribution over meanings.
//! - [`ChannelNoise::Mixture`] preserves normalisation of the speaker distribution.

use crate::config::{ChannelNoise, ModelConfig};
use crate::error::{ModelError, Result};
use crate::lexicon::{Lexicon, Meaning, Signal};
use crate::prob::{logsumexp, normalize_logprobs};
use crate::speaker::speaker_production_probs;

// ─── Literal listener ─────────────────────────────────────────────────────────

/// Joint log-probability of `meaning` being intended and `signal` produced
/// by a literal speaker using `lexicon`.
///
/// With `k` usable signals for `meaning` and `n` signals overall:
///
/// - usable signal: `ref[m] + ln((1 - noise) / k)`, or `ref[m] + ln(1 / k)` when `k == n`;
/// - otherwise: `ref[m] + ln(noise / (n - k))`.
pub fn literal_listener(
    config: &ModelConfig,
    signal: Signal,
    meaning: Meaning,
    lexicon: &Lexicon,
    ref_distribution: &[f64],
) -> f64 {
    let n = lexicon.num_signals();
    let k = lexicon.usable_count(meaning);
    let production = if lexicon.is_usable(meaning, signal) {
        if k == n {
            -(k as f64).ln()
        } else {
            config.ln_fidelity() - (k as f64).ln()
        }
    } else {
        config.ln_noise() - ((n - k) as f64).ln()
    };
    ref_distribution[meaning] + production
}

/// Signals × meanings matrix of literal-listener beliefs.
///
/// Row `s` is the normalised log-distribution over meanings a literal listener
/// holds after hearing `s`. Used as the utility table of the pragmatic speaker.
pub fn perception_matrix(
    config: &ModelConfig,
    lexicon: &Lexicon,
    ref_distribution: &[f64],
) -> Vec<Vec<f64>> {
    (0..lexicon.num_signals())
        .map(|s| {
            let row: Vec<f64> = (0..lexicon.num_meanings())
                .map(|m| literal_listener(config, s, m, lexicon, ref_distribution))
                .collect();
            normalize_logprobs(&row)
        })
        .collect()
}

// ─── Channel noise ────────────────────────────────────────────────────────────

/// Fold channel noise into a log-distribution over signals.
///
/// See [`ChannelNoise`] for the two recombination rules.
pub fn channel_noise(config: &ModelConfig, speaker_probs: &[f64]) -> Vec<f64> {
    let n = speaker_probs.len();
    if n < 2 {
        return speaker_probs.to_vec();
    }
    let ln_fidelity = config.ln_fidelity();
    let ln_spread = config.ln_noise() - ((n - 1) as f64).ln();

    let mix = |own: f64, others: &[f64]| logsumexp(&[ln_fidelity + own, ln_spread + logsumexp(others)]);

    match config.channel_noise {
        ChannelNoise::Mixture => (0..n)
            .map(|s| {
                let others: Vec<f64> = others_of(speaker_probs, s);
                mix(speaker_probs[s], &others)
            })
            .collect(),
        ChannelNoise::Sequential => {
            let mut noisy = speaker_probs.to_vec();
            for s in 0..n {
                noisy[s] += ln_fidelity;
                let others: Vec<f64> = others_of(&noisy, s);
                // `noisy[s]` already carries the fidelity factor here.
                noisy[s] = logsumexp(&[noisy[s], ln_spread + logsumexp(&others)]);
            }
            noisy
        }
    }
}

fn others_of(values: &[f64], skip: usize) -> Vec<f64> {
    values
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != skip)
        .map(|(_, &v)| v)
        .collect()
}

// ─── Pragmatic listener ───────────────────────────────────────────────────────

/// Joint log-probability of `meaning` being intended and `signal` received
/// from a pragmatic speaker, with channel noise folded in.
pub fn pragmatic_listener(
    config: &ModelConfig,
    signal: Signal,
    meaning: Meaning,
    lexicon: &Lexicon,
    ref_distribution: &[f64],
) -> f64 {
    let speaker_probs = speaker_production_probs(config, meaning, lexicon, ref_distribution);
    let noisy = channel_noise(config, &speaker_probs);
    ref_distribution[meaning] + noisy[signal]
}

// ─── Listener dispatch ────────────────────────────────────────────────────────

/// Uniform contract for listener models.
pub trait Listener {
    /// Joint log-probability of `(meaning, signal)` under `lexicon` and the
    /// speaker's referent distribution.
    fn evaluate(
        &self,
        config: &ModelConfig,
        signal: Signal,
        meaning: Meaning,
        lexicon: &Lexicon,
        ref_distribution: &[f64],
    ) -> f64;

    /// Log-probability of `signal`, marginalised over meanings.
    fn marginal(
        &self,
        config: &ModelConfig,
        signal: Signal,
        lexicon: &Lexicon,
        ref_distribution: &[f64],
    ) -> f64 {
        let joint: Vec<f64> = (0..lexicon.num_meanings())
            .map(|m| self.evaluate(config, signal, m, lexicon, ref_distribution))
            .collect();
        logsumexp(&joint)
    }
}

/// Level-0 listener: inverts the literal speaker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LiteralListener;

impl Listener for LiteralListener {
    fn evaluate(
        &self,
        config: &ModelConfig,
        signal: Signal,
        meaning: Meaning,
        lexicon: &Lexicon,
        ref_distribution: &[f64],
    ) -> f64 {
        literal_listener(config, signal, meaning, lexicon, ref_distribution)
    }
}

/// Level-1 listener: inverts the pragmatic speaker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PragmaticListener;

impl Listener for PragmaticListener {
    fn evaluate(
        &self,
        config: &ModelConfig,
        signal: Signal,
        meaning: Meaning,
        lexicon: &Lexicon,
        ref_distribution: &[f64],
    ) -> f64 {
        pragmatic_listener(config, signal, meaning, lexicon, ref_distribution)
    }
}

/// Depth of recursive speaker/listener reasoning a hypothesis asserts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PragmaticLevel {
    /// Literal speaker / listener (tag 0).
    Literal,
    /// One level of rational-speech-act reasoning (tag 1).
    Pragmatic,
}

impl PragmaticLevel {
    /// Both levels, in tag order.
    pub const ALL: [PragmaticLevel; 2] = [PragmaticLevel::Literal, PragmaticLevel::Pragmatic];

    /// Numeric tag (0 or 1).
    pub fn tag(self) -> u8 {
        match self {
            Self::Literal => 0,
            Self::Pragmatic => 1,
        }
    }

    /// Listener implementation for this level.
    pub fn listener(self) -> &'static dyn Listener {
        match self {
            Self::Literal => &LiteralListener,
            Self::Pragmatic => &PragmaticListener,
        }
    }

    /// Evaluate the level's listener.
    pub fn evaluate(
        self,
        config: &ModelConfig,
        signal: Signal,
        meaning: Meaning,
        lexicon: &Lexicon,
        ref_distribution: &[f64],
    ) -> f64 {
        self.listener()
            .evaluate(config, signal, meaning, lexicon, ref_distribution)
    }
}

impl TryFrom<u8> for PragmaticLevel {
    type Error = ModelError;

    fn try_from(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(Self::Literal),
            1 => Ok(Self::Pragmatic),
            _ => Err(ModelError::InvalidConfig("pragmatic level must be 0 or 1")),
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mental_state::{mental_state, Context};

    fn ref_dist() -> Vec<f64> {
        let ctx = Context::new(vec![0.1, 0.2, 0.9]).unwrap();
        mental_state(1.0, &ctx).unwrap()
    }

    fn lexicons() -> Vec<Lexicon> {
        ["100/010/001", "110/010/111", "111/111/111", "100/100/100", "011/101/110"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect()
    }

    #[test]
    fn test_literal_listener_mass_conservation() {
        let cfg = ModelConfig::default();
        let r = ref_dist();
        for lex in lexicons() {
            for m in 0..3 {
                let total: f64 = (0..3)
                    .map(|s| (literal_listener(&cfg, s, m, &lex, &r) - r[m]).exp())
                    .sum();
                assert!((total - 1.0).abs() < 1e-9, "lex={} m={} total={}", lex, m, total);
            }
        }
    }

    #[test]
    fn test_literal_listener_values() {
        let cfg = ModelConfig::default();
        let r = vec![0.0; 3];
        let lex: Lexicon = "110/010/111".parse().unwrap();
        assert!((literal_listener(&cfg, 0, 0, &lex, &r) - (0.95f64 / 2.0).ln()).abs() < 1e-12);
        assert!((literal_listener(&cfg, 2, 0, &lex, &r) - 0.05f64.ln()).abs() < 1e-12);
        assert!((literal_listener(&cfg, 0, 1, &lex, &r) - (0.05f64 / 2.0).ln()).abs() < 1e-12);
        // Universal row ignores noise.
        assert!((literal_listener(&cfg, 1, 2, &lex, &r) - (1.0f64 / 3.0).ln()).abs() < 1e-12);
    }

    #[test]
    fn test_perception_rows_normalised() {
        let cfg = ModelConfig::default();
        let r = ref_dist();
        for lex in lexicons() {
            for row in perception_matrix(&cfg, &lex, &r) {
                let sum: f64 = row.iter().map(|v| v.exp()).sum();
                assert!((sum - 1.0).abs() < 1e-9, "lex={} sum={}", lex, sum);
            }
        }
    }

    #[test]
    fn test_identity_perception_is_sharp() {
        let cfg = ModelConfig::default();
        let r = vec![(1.0f64 / 3.0).ln(); 3];
        let mat = perception_matrix(&cfg, &Lexicon::identity(3).unwrap(), &r);
        for s in 0..3 {
            for m in 0..3 {
                if m != s {
                    assert!(mat[s][s] > mat[s][m]);
                }
            }
        }
    }

    #[test]
    fn test_mixture_channel_noise_normalised() {
        let cfg = ModelConfig::default();
        let p = normalize_logprobs(&[2.0, 0.5, -1.0]);
        let noisy = channel_noise(&cfg, &p);
        let sum: f64 = noisy.iter().map(|v| v.exp()).sum();
        assert!((sum - 1.0).abs() < 1e-9, "sum={}", sum);
        // Closed form: (1 - e) p_s + e (1 - p_s) / (n - 1)
        for s in 0..3 {
            let ps = p[s].exp();
            let expect = 0.95 * ps + 0.05 * (1.0 - ps) / 2.0;
            assert!((noisy[s].exp() - expect).abs() < 1e-12);
        }
    }

    #[test]
    fn test_sequential_channel_noise_matches_recorded_recurrence() {
        let cfg = ModelConfig::default().with_channel_noise(ChannelNoise::Sequential);
        let p = normalize_logprobs(&[2.0, 0.5, -1.0]);
        let lin: Vec<f64> = p.iter().map(|v| v.exp()).collect();
        let noisy = channel_noise(&cfg, &p);

        let spread = 0.05 / 2.0;
        let q0 = 0.95 * lin[0] + spread * (lin[1] + lin[2]);
        let q1 = 0.95 * lin[1] + spread * (q0 + lin[2]);
        let q2 = 0.95 * lin[2] + spread * (q0 + q1);
        for (s, q) in [q0, q1, q2].iter().enumerate() {
            assert!((noisy[s].exp() - q).abs() < 1e-12, "s={}", s);
        }
    }

    #[test]
    fn test_pragmatic_listener_mass_conservation() {
        let cfg = ModelConfig::default();
        let r = ref_dist();
        for lex in lexicons() {
            for m in 0..3 {
                let total: f64 = (0..3)
                    .map(|s| (pragmatic_listener(&cfg, s, m, &lex, &r) - r[m]).exp())
                    .sum();
                assert!((total - 1.0).abs() < 1e-9, "lex={} m={} total={}", lex, m, total);
            }
        }
    }

    #[test]
    fn test_level_dispatch() {
        let cfg = ModelConfig::default();
        let r = ref_dist();
        let lex = Lexicon::identity(3).unwrap();
        assert_eq!(
            PragmaticLevel::Literal.evaluate(&cfg, 1, 1, &lex, &r),
            literal_listener(&cfg, 1, 1, &lex, &r)
        );
        assert_eq!(
            PragmaticLevel::Pragmatic.evaluate(&cfg, 1, 1, &lex, &r),
            pragmatic_listener(&cfg, 1, 1, &lex, &r)
        );
        assert_eq!(PragmaticLevel::try_from(1), Ok(PragmaticLevel::Pragmatic));
        assert!(PragmaticLevel::try_from(2).is_err());
        assert_eq!(PragmaticLevel::Pragmatic.tag(), 1);
    }

    #[test]
    fn test_marginal_over_signals_is_one() {
        let cfg = ModelConfig::default();
        let r = ref_dist();
        for level in PragmaticLevel::ALL {
            for lex in lexicons() {
                let marginals: Vec<f64> = (0..3)
                    .map(|s| level.listener().marginal(&cfg, s, &lex, &r))
                    .collect();
                assert!(logsumexp(&marginals).abs() < 1e-9, "level={:?} lex={}", level, lex);
            }
        }
    }
}
