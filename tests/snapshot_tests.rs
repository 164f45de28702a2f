//! RunRecord round-trip integration tests.
//!
//! Verifies that an experiment can be captured as a RunRecord, serialised to
//! JSON, deserialised back, and that every recorded series is preserved.

#[cfg(feature = "serde")]
mod tests {
    use pragma_core::simulation::permutation_contexts;
    use pragma_core::snapshot::{RunRecord, RUN_RECORD_VERSION};
    use pragma_core::{
        ChannelNoise, Experiment, ExperimentResult, HypothesisSpace, Lexicon, ModelConfig,
        PragmaticLevel, PriorScheme, Simulation,
    };

    // ── Helpers ──────────────────────────────────────────────────────────────

    fn space() -> HypothesisSpace {
        HypothesisSpace::generate(&[0.0, 1.0], 1.0, PriorScheme::Egocentric, &PragmaticLevel::ALL, 3, 3)
            .unwrap()
    }

    fn run(space: &HypothesisSpace, config: ModelConfig) -> (Experiment, ExperimentResult) {
        let sim = Simulation::new(config, space).unwrap();
        let contexts = permutation_contexts(&[vec![0.1, 0.2, 0.9], vec![0.1, 0.8, 0.9]], 1).unwrap();
        let experiment = Experiment::against_other_level(space, 182, 2, 12, 3).unwrap();
        let result = sim.run_experiment(&experiment, &contexts).unwrap();
        (experiment, result)
    }

    // ── Tests ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_record_captures_experiment() {
        let space = space();
        let config = ModelConfig::default();
        let (experiment, result) = run(&space, config.clone());
        let record = RunRecord::from_experiment(&space, &config, &experiment, &result).unwrap();

        assert_eq!(record.version, RUN_RECORD_VERSION);
        assert_eq!(record.run_count(), 2);
        assert_eq!(record.tracked.len(), 2);
        assert_eq!(record.speaker.lexicon.to_string(), "100/010/111");

        let speaker = record.find_tracked(182).expect("speaker tracked");
        assert_eq!(speaker.runs[0].len(), 13);
        let counterpart = record.find_tracked(868).expect("counterpart tracked");
        assert_eq!(counterpart.hypothesis.level, PragmaticLevel::Pragmatic);
        assert!(record.find_tracked(0).is_none());
    }

    #[test]
    fn test_json_round_trip() {
        let space = space();
        let config = ModelConfig::default().with_channel_noise(ChannelNoise::Sequential);
        let (experiment, result) = run(&space, config.clone());
        let record = RunRecord::from_experiment(&space, &config, &experiment, &result).unwrap();

        let json = serde_json::to_string(&record).expect("serialise");
        let restored: RunRecord = serde_json::from_str(&json).expect("deserialise");
        assert_eq!(restored, record);
        assert_eq!(restored.config.channel_noise, ChannelNoise::Sequential);
    }

    #[test]
    fn test_mean_series_matches_result() {
        let space = space();
        let config = ModelConfig::default();
        let (experiment, result) = run(&space, config.clone());
        let record = RunRecord::from_experiment(&space, &config, &experiment, &result).unwrap();

        assert_eq!(record.tracked[0].mean_series(), result.mean_series(0));
    }

    #[test]
    fn test_mismatched_result_rejected() {
        let space = space();
        let config = ModelConfig::default();
        let (mut experiment, result) = run(&space, config.clone());
        experiment.tracked.push(0);
        assert!(RunRecord::from_experiment(&space, &config, &experiment, &result).is_err());
    }

    #[test]
    fn test_lexicon_deserialisation_is_validated() {
        let lex: Lexicon = serde_json::from_str(r#"{"rows":[[true,false],[false,true]]}"#).unwrap();
        assert_eq!(lex, Lexicon::identity(2).unwrap());

        let empty_row = serde_json::from_str::<Lexicon>(r#"{"rows":[[true,false],[false,false]]}"#);
        assert!(empty_row.is_err());
        let no_signals = serde_json::from_str::<Lexicon>(r#"{"rows":[[],[]]}"#);
        assert!(no_signals.is_err());
        let ragged = serde_json::from_str::<Lexicon>(r#"{"rows":[[true],[true,false]]}"#);
        assert!(ragged.is_err());
    }
}
