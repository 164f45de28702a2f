//! Speaker models and signal production.
//!
//! The pragmatic speaker picks signals by how well a literal listener would
//! recover the intended meaning from them, sharpened by the rationality
//! parameter `alpha`:
//!
//! ```text
//! U(s; m) = alpha · ln P_L0(m | s)          P_S1(s | m) = softmax_s U(s; m)
//! ```
//!
//! [`produce`] is the generative half of the simulation: it samples a
//! referent from the speaker's mental state, chooses a signal according to the
//! speaker's pragmatic level and then applies production noise.

use rand::Rng;

use crate::config::ModelConfig;
use crate::error::Result;
use crate::hypothesis::Hypothesis;
use crate::lexicon::{Lexicon, Meaning, Signal};
use crate::listener::{perception_matrix, PragmaticLevel};
use crate::mental_state::{mental_state, Context};
use crate::prob::{log_softmax, sample_categorical_log};

/// Log-distribution over signals a pragmatic speaker uses for `meaning`.
pub fn speaker_production_probs(
    config: &ModelConfig,
    meaning: Meaning,
    lexicon: &Lexicon,
    mental_state: &[f64],
) -> Vec<f64> {
    let perception = perception_matrix(config, lexicon, mental_state);
    let utility: Vec<f64> = perception
        .iter()
        .map(|row| config.alpha * row[meaning])
        .collect();
    log_softmax(&utility)
}

/// One produced utterance: the signal and the context it was uttered in.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Observation {
    /// Produced signal.
    pub signal: Signal,
    /// Context of the trial.
    pub context: Context,
    /// Referent the speaker intended. Hidden from the learner.
    pub meaning: Meaning,
}

/// Let the speaker described by `hypothesis` talk about something in `context`.
///
/// - [`PragmaticLevel::Literal`]: the first usable signal for the sampled
///   meaning; with probability `noise` (only when the meaning is not
///   universally signalled) a uniformly chosen other signal instead.
/// - [`PragmaticLevel::Pragmatic`]: a draw from [`speaker_production_probs`];
///   with probability `noise` a uniformly chosen different signal instead.
///
/// The lexicon must be as wide as `config.num_signals`, otherwise
/// [`ModelError::InvalidConfig`](crate::error::ModelError::InvalidConfig).
pub fn produce<R: Rng + ?Sized>(
    config: &ModelConfig,
    hypothesis: &Hypothesis,
    context: &Context,
    rng: &mut R,
) -> Result<Observation> {
    let lexicon = &hypothesis.lexicon;
    config.expect_num_signals(lexicon.num_signals())?;
    context.expect_len(lexicon.num_meanings())?;
    let state = mental_state(hypothesis.perspective, context)?;
    let meaning = sample_categorical_log(&state, rng);
    let n = lexicon.num_signals();

    let signal = match hypothesis.level {
        PragmaticLevel::Literal => {
            let best = lexicon.best_signal(meaning)?;
            if rng.random::<f64>() < config.noise && !lexicon.is_universal(meaning) {
                substitute(best, n, rng)
            } else {
                best
            }
        }
        PragmaticLevel::Pragmatic => {
            let probs = speaker_production_probs(config, meaning, lexicon, &state);
            let chosen = sample_categorical_log(&probs, rng);
            // A one-signal alphabet has nothing to slip to.
            if n > 1 && rng.random::<f64>() < config.noise {
                substitute(chosen, n, rng)
            } else {
                chosen
            }
        }
    };

    Ok(Observation { signal, context: context.clone(), meaning })
}

/// Uniformly chosen signal other than `signal`.
fn substitute<R: Rng + ?Sized>(signal: Signal, num_signals: usize, rng: &mut R) -> Signal {
    let pick = rng.random_range(0..num_signals - 1);
    if pick >= signal {
        pick + 1
    } else {
        pick
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn state() -> Vec<f64> {
        mental_state(1.0, &Context::new(vec![0.1, 0.2, 0.9]).unwrap()).unwrap()
    }

    #[test]
    fn test_speaker_distribution_is_valid() {
        let cfg = ModelConfig::default();
        let ms = state();
        for lex in Lexicon::enumerate(3, 3).unwrap().iter().step_by(7) {
            for m in 0..3 {
                let p = speaker_production_probs(&cfg, m, lex, &ms);
                let sum: f64 = p.iter().map(|v| v.exp()).sum();
                assert!((sum - 1.0).abs() < 1e-9, "lex={} m={} sum={}", lex, m, sum);
            }
        }
    }

    #[test]
    fn test_identity_speaker_prefers_own_signal() {
        let cfg = ModelConfig::default();
        let ms = state();
        let lex = Lexicon::identity(3).unwrap();
        for m in 0..3 {
            let p = speaker_production_probs(&cfg, m, &lex, &ms);
            let best = p
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .map(|(i, _)| i)
                .unwrap();
            assert_eq!(best, m, "p={:?}", p);
        }
    }

    #[test]
    fn test_higher_alpha_sharpens_production() {
        let ms = state();
        let lex = Lexicon::identity(3).unwrap();
        let soft = speaker_production_probs(&ModelConfig::default().with_alpha(1.0), 0, &lex, &ms);
        let sharp = speaker_production_probs(&ModelConfig::default().with_alpha(6.0), 0, &lex, &ms);
        assert!(sharp[0] > soft[0], "sharp={} soft={}", sharp[0], soft[0]);
    }

    #[test]
    fn test_substitute_never_returns_input() {
        let mut rng = StdRng::seed_from_u64(3);
        for s in 0..3 {
            let mut seen = [false; 3];
            for _ in 0..200 {
                let o = substitute(s, 3, &mut rng);
                assert_ne!(o, s);
                seen[o] = true;
            }
            assert_eq!(seen.iter().filter(|&&b| b).count(), 2);
        }
    }

    #[test]
    fn test_universal_row_is_never_perturbed() {
        let cfg = ModelConfig::default().with_noise(0.5);
        let hyp = Hypothesis::new(Lexicon::fully_ambiguous(3, 3).unwrap(), 1.0, PragmaticLevel::Literal);
        let ctx = Context::new(vec![0.1, 0.2, 0.9]).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..500 {
            let obs = produce(&cfg, &hyp, &ctx, &mut rng).unwrap();
            assert_eq!(obs.signal, 0);
        }
    }

    #[test]
    fn test_produce_rejects_mismatched_context() {
        let cfg = ModelConfig::default();
        let hyp = Hypothesis::new(Lexicon::identity(3).unwrap(), 1.0, PragmaticLevel::Pragmatic);
        let ctx = Context::new(vec![0.1, 0.2]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(produce(&cfg, &hyp, &ctx, &mut rng).is_err());
    }

    #[test]
    fn test_pragmatic_production_tracks_intended_meaning() {
        let cfg = ModelConfig::default();
        let hyp = Hypothesis::new(Lexicon::identity(3).unwrap(), 1.0, PragmaticLevel::Pragmatic);
        let ctx = Context::new(vec![0.1, 0.2, 0.9]).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let trials = 4000;
        let matches = (0..trials)
            .map(|_| produce(&cfg, &hyp, &ctx, &mut rng).unwrap())
            .filter(|o| o.signal == o.meaning)
            .count();
        let rate = matches as f64 / trials as f64;
        assert!(rate > 0.7, "rate={}", rate);
    }

    #[test]
    fn test_pragmatic_noise_layer_frequencies() {
        let noise = 0.2;
        let cfg = ModelConfig::default().with_noise(noise);
        let lex: Lexicon = "110/010/011".parse().unwrap();
        let hyp = Hypothesis::new(lex.clone(), 1.0, PragmaticLevel::Pragmatic);
        let ctx = Context::new(vec![0.1, 0.2, 0.9]).unwrap();
        let mut rng = StdRng::seed_from_u64(2718);

        // counts[meaning][signal]
        let mut counts = [[0usize; 3]; 3];
        for _ in 0..20_000 {
            let obs = produce(&cfg, &hyp, &ctx, &mut rng).unwrap();
            counts[obs.meaning][obs.signal] += 1;
        }

        // Meaning 2 is the most salient referent from perspective 1.
        let total: usize = counts[2].iter().sum();
        assert!(total > 10_000, "total={}", total);
        let clean = speaker_production_probs(&cfg, 2, &lex, &mental_state(1.0, &ctx).unwrap());
        for s in 0..3 {
            let p = clean[s].exp();
            let expected = (1.0 - noise) * p + noise * (1.0 - p) / 2.0;
            let observed = counts[2][s] as f64 / total as f64;
            assert!(
                (observed - expected).abs() < 0.025,
                "s={} observed={} expected={} clean={}",
                s,
                observed,
                expected,
                p
            );
        }
    }

    #[test]
    fn test_single_signal_alphabet_never_slips() {
        let cfg = ModelConfig::default().with_noise(0.9).with_num_signals(1);
        let lex = Lexicon::new(vec![vec![true], vec![true]]).unwrap();
        let ctx = Context::new(vec![0.3, 0.8]).unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        for level in PragmaticLevel::ALL {
            let hyp = Hypothesis::new(lex.clone(), 1.0, level);
            for _ in 0..200 {
                assert_eq!(produce(&cfg, &hyp, &ctx, &mut rng).unwrap().signal, 0);
            }
        }
    }

    #[test]
    fn test_produce_rejects_foreign_alphabet() {
        let cfg = ModelConfig::default().with_noise(0.9);
        let hyp = Hypothesis::new(
            Lexicon::new(vec![vec![true], vec![true]]).unwrap(),
            1.0,
            PragmaticLevel::Pragmatic,
        );
        let ctx = Context::new(vec![0.3, 0.8]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            produce(&cfg, &hyp, &ctx, &mut rng),
            Err(crate::error::ModelError::InvalidConfig(_))
        ));
    }
}
