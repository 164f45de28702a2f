//! # Learning curves
//!
//! Three speakers with lexicons of decreasing informativeness talk to an
//! egocentric learner for 300 trials. For each speaker the learner's mean
//! posterior on the true hypothesis (and on the same lexicon at the other
//! pragmatic level) is printed every 30 trials.
//!
//! ```text
//! cargo run --example learning_curves          # literal speakers
//! cargo run --example learning_curves -- 1     # pragmatic speakers
//! RUST_LOG=pragma_core=debug cargo run --example learning_curves
//! ```

use pragma_core::simulation::permutation_contexts;
use pragma_core::{
    Experiment, ExperimentResult, HypothesisSpace, ModelConfig, PragmaticLevel, PriorScheme,
    Simulation,
};
use tracing_subscriber::EnvFilter;

const NUM_RUNS: usize = 10;
const NUM_STEPS: usize = 300;
const LEARNER_PERSPECTIVE: f64 = 1.0;

// ── Display helpers ───────────────────────────────────────────────────────────

fn bar(v: f64) -> String {
    let filled = (v * 20.0).round() as usize;
    let empty = 20usize.saturating_sub(filled);
    format!("[{}{}] {:.3}", "█".repeat(filled), "░".repeat(empty), v)
}

fn print_curve(space: &HypothesisSpace, result: &ExperimentResult) -> pragma_core::Result<()> {
    for (slot, &index) in result.tracked.iter().enumerate() {
        let h = space.get(index)?;
        println!("  #{:<4} {}", index, h);
        let mean = result.mean_series(slot);
        for step in (0..mean.len()).step_by(30) {
            println!("    t={:<4} {}", step, bar(mean[step]));
        }
    }
    println!();
    Ok(())
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> pragma_core::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let level = match std::env::args().nth(1).as_deref() {
        Some("1") => PragmaticLevel::Pragmatic,
        _ => PragmaticLevel::Literal,
    };

    println!("╔══════════════════════════════════════════════════════════════════════╗");
    println!("║  Recursive pragmatic lexicon learning: {:<9} speakers             ║", format!("{:?}", level));
    println!("╚══════════════════════════════════════════════════════════════════════╝\n");

    let space = HypothesisSpace::generate(
        &[0.0, 1.0],
        LEARNER_PERSPECTIVE,
        PriorScheme::Egocentric,
        &PragmaticLevel::ALL,
        3,
        3,
    )?;
    let config = ModelConfig::default();
    let sim = Simulation::new(config, &space)?;
    let contexts =
        permutation_contexts(&[vec![0.1, 0.2, 0.9], vec![0.1, 0.8, 0.9]], NUM_STEPS / 12)?;

    // Identity, last meaning fully ambiguous, one signal for everything.
    // All three speak from perspective 0, opposite the learner.
    let speakers: [usize; 3] = match level {
        PragmaticLevel::Literal => [188, 182, 171],
        PragmaticLevel::Pragmatic => [874, 868, 857],
    };

    for (seed, &speaker) in speakers.iter().enumerate() {
        let experiment =
            Experiment::against_other_level(&space, speaker, NUM_RUNS, NUM_STEPS, seed as u64 * 1000)?;
        let result = sim.run_experiment(&experiment, &contexts)?;
        println!("▶  Speaker #{} ({} runs × {} trials)\n", speaker, NUM_RUNS, NUM_STEPS);
        print_curve(&space, &result)?;
    }

    Ok(())
}
