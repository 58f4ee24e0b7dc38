//! Integration tests for the QKD and superdense-coding engines.
//!
//! Statistical checks use fixed seeds and tolerance bands wide enough to hold
//! for any reasonable sample at the chosen sizes.

use qlink::errors::ProtocolError;
use qlink::{
    Bit, BitPair, Eavesdropper, EntanglementStatus, QkdConfig, QkdEngine, QkdMode,
    QuantumSimulator, Sampler, SuperdenseConfig, bits, rng_from_seed, run_full_simulation,
    run_qkd, run_superdense, sample_superdense, transmit_text,
};

// =============================================================================
// QKD TESTS
// =============================================================================

mod qkd {
    use super::*;

    #[test]
    fn half_the_rounds_survive_sifting() {
        let result = run_qkd(4000, false, Some(1)).unwrap();
        let frac = result.matched_rounds() as f64 / 4000.0;
        assert!((frac - 0.5).abs() < 0.04, "matched fraction {frac}");
        assert_eq!(result.qber, 0.0);
        assert!(result.secure);
        assert_eq!(result.key.len(), result.matched_rounds());
    }

    #[test]
    fn intercept_resend_raises_qber_to_a_quarter() {
        let result = run_qkd(4000, true, Some(2)).unwrap();
        assert!((result.qber - 0.25).abs() < 0.04, "qber {}", result.qber);
        assert!(!result.secure);
        assert_eq!(result.intercepted_rounds(), 4000);
    }

    #[test]
    fn entangled_rounds_behave_like_prepare_and_measure() {
        let mut rng = rng_from_seed(Some(3));
        let engine = QkdEngine::new(QkdConfig::default().with_mode(QkdMode::Entanglement));

        let clean = engine.run(2000, false, &mut rng).unwrap();
        assert_eq!(clean.qber, 0.0);
        assert!(clean.secure);

        let attacked = engine.run(4000, true, &mut rng).unwrap();
        assert!((attacked.qber - 0.25).abs() < 0.04, "qber {}", attacked.qber);
        assert!(!attacked.secure);
    }

    #[test]
    fn single_round_never_divides_by_zero() {
        for seed in 0..32 {
            let result = run_qkd(1, false, Some(seed)).unwrap();
            if result.matched_rounds() == 0 {
                assert!(result.key.is_empty());
                assert_eq!(result.qber, 1.0);
                assert!(!result.secure);
            } else {
                assert_eq!(result.qber, 0.0);
            }
        }
    }

    #[test]
    fn zero_rounds_is_rejected() {
        assert!(matches!(
            run_qkd(0, false, Some(0)),
            Err(ProtocolError::InvalidInput(_))
        ));
    }

    #[test]
    fn same_seed_same_session() {
        let a = run_qkd(100, true, Some(99)).unwrap();
        let b = run_qkd(100, true, Some(99)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn multi_session_verdict_is_last_session() {
        let engine = QkdEngine::new(
            QkdConfig::default().with_eavesdropper(Eavesdropper::intercept_resend().with_rate(0.5)),
        );
        let mut rng = rng_from_seed(Some(4));
        let assembled = engine.assemble_key(64, 20, true, &mut rng).unwrap();
        assert_eq!(assembled.key.len(), 64);
        assert!(assembled.sessions > 1);

        // Replaying the same generator reproduces each session in turn
        let mut replay_rng = rng_from_seed(Some(4));
        let sessions: Vec<_> = (0..assembled.sessions)
            .map(|_| engine.run(20, true, &mut replay_rng).unwrap())
            .collect();
        let last = sessions.last().unwrap();

        assert_eq!(assembled.qber, last.qber);
        assert_eq!(assembled.mismatches, last.mismatches);
        assert_eq!(assembled.secure, last.secure);

        let rounds: Vec<_> = sessions.iter().flat_map(|s| s.rounds.clone()).collect();
        assert_eq!(assembled.rounds, rounds);
        let sifted: Vec<_> = sessions.iter().flat_map(|s| s.sifted.clone()).collect();
        assert_eq!(assembled.sifted, sifted);
        let key: Vec<_> = sessions.iter().flat_map(|s| s.key.clone()).take(64).collect();
        assert_eq!(assembled.key, key);
    }

    #[test]
    fn prepared_states_are_reported_per_round() {
        let result = run_qkd(10, false, Some(16)).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        let rounds = json["rounds"].as_array().unwrap();
        assert_eq!(rounds.len(), 10);
        for (r, value) in result.rounds.iter().zip(rounds) {
            assert!((r.prepared_bloch.length() - 1.0).abs() < 1e-9);
            assert!(value["prepared_bloch"]["z"].is_f64());
        }
    }
}

// =============================================================================
// SUPERDENSE CODING TESTS
// =============================================================================

mod superdense {
    use super::*;

    #[test]
    fn reference_scenario_without_eavesdropper() {
        let result = run_superdense("11", "01", false, Some(5)).unwrap();
        assert_eq!(result.encrypted.to_string(), "10");
        assert_eq!(result.decoded.to_string(), "11");
        assert_eq!(result.entanglement_status, EntanglementStatus::Intact);
        assert!(result.success);
    }

    #[test]
    fn reference_scenario_with_eavesdropper_is_at_chance() {
        let mut hits = 0;
        for seed in 0..400 {
            let result = run_superdense("11", "01", true, Some(seed)).unwrap();
            assert_eq!(result.entanglement_status, EntanglementStatus::Destroyed);
            hits += result.success as usize;
        }
        let rate = hits as f64 / 400.0;
        assert!(rate < 0.45, "success rate {rate}");
    }

    #[test]
    fn clean_channel_is_faithful_for_every_message_and_key() {
        let mut rng = rng_from_seed(Some(6));
        let sampler = Sampler::new();
        for message in BitPair::ALL {
            for key in BitPair::ALL {
                let stats = sampler
                    .run(message, &key.bits(), false, 128, &mut rng)
                    .unwrap();
                assert!(stats.success_rate >= 0.99);
            }
        }
    }

    #[test]
    fn intercepted_channel_matches_each_bit_half_the_time() {
        for message in ["00", "01", "10", "11"] {
            let stats = sample_superdense(message, "1010", true, 2000, Some(7)).unwrap();
            assert!(
                (stats.bit_match_rate - 0.5).abs() < 0.06,
                "message {message}: bit match rate {}",
                stats.bit_match_rate
            );
        }
    }

    #[test]
    fn key_length_boundaries() {
        assert!(run_superdense("01", "10", false, Some(8)).is_ok());
        for key in ["", "1"] {
            assert!(matches!(
                run_superdense("01", key, false, Some(8)),
                Err(ProtocolError::InsufficientKeyMaterial { required: 2, .. })
            ));
        }
    }

    #[test]
    fn only_the_first_two_key_bits_are_used() {
        let short = run_superdense("10", "11", false, Some(9)).unwrap();
        let long = run_superdense("10", "110000", false, Some(9)).unwrap();
        assert_eq!(short.encrypted, long.encrypted);
        assert_eq!(short.decoded, long.decoded);
    }

    #[test]
    fn invalid_messages_are_rejected_before_simulation() {
        for message in ["", "0", "012", "2x"] {
            let err = run_superdense(message, "00", false, Some(0)).unwrap_err();
            assert!(matches!(err, ProtocolError::InvalidInput(_)));
            assert!(!err.is_defect());
        }
        assert!(matches!(
            run_superdense("01", "0a", false, Some(0)),
            Err(ProtocolError::InvalidInput(_))
        ));
    }

    #[test]
    fn same_seed_same_channel_use() {
        let a = run_superdense("01", "11", true, Some(10)).unwrap();
        let b = run_superdense("01", "11", true, Some(10)).unwrap();
        assert_eq!(a.received, b.received);
        assert_eq!(a.statevector, b.statevector);
        assert_eq!(a.bloch_vectors, b.bloch_vectors);
    }

    #[test]
    fn result_serializes_to_json() {
        let result = run_superdense("11", "01", false, Some(11)).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["decoded"], "11");
        assert_eq!(json["entanglement_status"], "Intact");
        assert_eq!(json["bloch_vectors"].as_array().unwrap().len(), 2);
        assert_eq!(json["density_matrix"]["dim"], serde_json::json!([4, 4]));
        for entropy in json["entropies"].as_array().unwrap() {
            assert!(entropy.as_f64().unwrap().is_sign_positive());
        }
    }

    #[test]
    fn pure_halves_report_positive_zero_entropy() {
        let result = run_superdense("10", "00", true, Some(17)).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        for (entropy, value) in result.entropies.iter().zip(json["entropies"].as_array().unwrap()) {
            assert!(*entropy < 1e-9);
            assert!(entropy.is_sign_positive());
            assert!(value.as_f64().unwrap().is_sign_positive());
        }
    }
}

// =============================================================================
// PIPELINE TESTS
// =============================================================================

mod pipeline {
    use super::*;

    #[test]
    fn full_simulation_uses_qkd_key() {
        let result = run_full_simulation("01", 10, false, Some(12)).unwrap();
        assert!(result.qkd.key.len() >= 2);
        let key_pair = BitPair::from_prefix(&result.qkd.key).unwrap();
        assert_eq!(result.sdc.encrypted, BitPair::B01 ^ key_pair);
        assert!(result.sdc.success);
    }

    #[test]
    fn full_simulation_with_eavesdropper_reports_both_stages() {
        let result = run_full_simulation("10", 50, true, Some(13)).unwrap();
        assert!(!result.qkd.secure);
        assert_eq!(
            result.sdc.entanglement_status,
            EntanglementStatus::Destroyed
        );
    }

    #[test]
    fn text_arrives_over_clean_link() {
        let result = transmit_text("33.89729,74.24314,0", 100, false, Some(14)).unwrap();
        assert!(result.transmission.success);
        assert_eq!(result.transmission.decoded_text, "33.89729,74.24314,0");
        assert_eq!(
            result.qkd.key.len(),
            result.transmission.key_bits_used
        );
    }

    #[test]
    fn configured_simulator_is_reusable() {
        let simulator = QuantumSimulator::new()
            .with_qkd_config(QkdConfig::default().with_mode(QkdMode::Entanglement));
        let mut rng = rng_from_seed(Some(15));
        let first = simulator.full("11", 20, false, &mut rng).unwrap();
        let second = simulator.full("00", 20, false, &mut rng).unwrap();
        assert!(first.sdc.success && second.sdc.success);
    }

    #[test]
    fn config_loads_from_json() {
        let config: QkdConfig = serde_json::from_str(
            r#"{ "mode": "Entanglement", "qber_threshold": 0.2,
                 "eavesdropper": { "interception": "MeasureAndReset", "basis": "Random" } }"#,
        )
        .unwrap();
        assert_eq!(config.mode, QkdMode::Entanglement);
        assert_eq!(config.qber_threshold, 0.2);
        assert_eq!(config.eavesdropper.rate, 1.0);
        assert_eq!(config.max_sessions, 64);
    }

    #[test]
    fn misspelled_config_fields_are_rejected() {
        let flat = serde_json::from_str::<QkdConfig>(
            r#"{ "interception": "MeasureAndReset", "interception_rate": 0.3,
                 "eve_basis": "Random" }"#,
        );
        assert!(flat.is_err());

        let nested = serde_json::from_str::<SuperdenseConfig>(
            r#"{ "eavesdropper": { "interception": "MeasureAndResend", "probability": 0.3 } }"#,
        );
        assert!(nested.is_err());

        let config: SuperdenseConfig = serde_json::from_str(
            r#"{ "eavesdropper": { "interception": "MeasureAndResend", "rate": 0.3 } }"#,
        )
        .unwrap();
        assert_eq!(config.eavesdropper.rate, 0.3);
    }

    #[test]
    fn bit_helpers_round_trip_text() {
        let b = bits::text_to_bits("hi");
        assert_eq!(bits::format_bits(&b), "0110100001101001");
        assert_eq!(bits::parse_bits("10").unwrap(), vec![Bit::One, Bit::Zero]);
    }
}
