//! End-to-end behaviour of the analysis pipeline

use proptest::prelude::*;
use wavemodes::{
    extensional, max_abs_diff, product_of_rows, scales_from_frequencies, AnalysisConfig,
    BackendKind, CoefficientSet, DetectionRule, FailureReason, ModeAnalyzer, ModeDetection,
    ModeError, PassthroughBackend, ScaleSet, Signal, SyntheticAe, WaveMode,
};

const FS: f64 = 5_000_000.0;

fn impulse(len: usize, at: usize) -> Signal {
    let mut samples = vec![0.0; len];
    samples[at] = 1.0;
    Signal::new(samples, FS).unwrap()
}

#[test]
fn impulse_arrival_through_identity_backend() {
    let config = AnalysisConfig {
        flexural_scale_index_range: [0, 0],
        leading_window_samples: 100,
        detection_threshold_multiplier: 3.0,
        ..AnalysisConfig::default()
    };

    let analyzer = ModeAnalyzer::with_backend(config, PassthroughBackend).unwrap();
    let report = analyzer.analyze(&impulse(1000, 500)).unwrap();

    let arrival = report.flexural.require_arrival().unwrap();
    assert_eq!(arrival.index, 500);
    assert!((arrival.micros() - 100.0).abs() < 1e-9);
    assert_eq!(report.extensional.arrival_index(), Some(500));
}

#[test]
fn all_zero_signal_fails_both_modes_without_aborting() {
    let signal = Signal::new(vec![0.0; 2000], FS).unwrap();
    let report = wavemodes::analyze(&signal, &AnalysisConfig::default()).unwrap();

    for mode in [WaveMode::Extensional, WaveMode::Flexural] {
        let failure = report.mode(mode).arrival.clone().unwrap_err();
        assert_eq!(failure.mode, Some(mode));
        assert!(matches!(failure.reason, FailureReason::BelowThreshold { .. }));
    }
}

#[test]
fn window_covering_whole_signal_is_a_detection_failure() {
    let config = AnalysisConfig {
        leading_window_samples: 1000,
        ..AnalysisConfig::default()
    };

    let analyzer = ModeAnalyzer::with_backend(config, PassthroughBackend).unwrap();
    let report = analyzer.analyze(&impulse(1000, 500)).unwrap();

    for result in [&report.extensional, &report.flexural] {
        let failure = result.arrival.clone().unwrap_err();
        assert_eq!(
            failure.reason,
            FailureReason::WindowCoversSignal { window: 1000, len: 1000 }
        );
    }
}

#[test]
fn extensional_index_equal_to_scale_count_is_invalid() {
    let config = AnalysisConfig {
        extensional_scale_index: 13,
        ..AnalysisConfig::default()
    };
    let err = ModeAnalyzer::from_config(config).err().unwrap();
    assert_eq!(err.parameter(), Some("extensionalScaleIndex"));

    // Same rule when synthesizing from coefficients directly
    let scales = ScaleSet::from_scales(vec![1.0, 2.0, 3.0]).unwrap();
    let coefs = CoefficientSet::new(ndarray::Array2::zeros((3, 10)), scales).unwrap();
    let err = extensional(&coefs, 3).unwrap_err();
    assert!(matches!(err, ModeError::InvalidParameter { .. }));
}

#[test]
fn analysis_is_idempotent() {
    let signal = SyntheticAe::pencil_lead_break(3000, FS).generate().unwrap();
    let analyzer = ModeAnalyzer::from_config(AnalysisConfig::default()).unwrap();

    let first = analyzer.analyze(&signal).unwrap();
    let second = analyzer.analyze(&signal).unwrap();

    assert_eq!(first, second);
}

#[test]
fn coefficient_shape_for_both_backends() {
    let signal = SyntheticAe::pencil_lead_break(1500, FS).generate().unwrap();
    let mut rows = Vec::new();

    for backend in [BackendKind::Fft, BackendKind::Direct] {
        let config = AnalysisConfig {
            backend,
            ..AnalysisConfig::default()
        };
        let analyzer = ModeAnalyzer::from_config(config).unwrap();
        let coefs = analyzer.decompose(&signal).unwrap();

        assert_eq!(coefs.as_array().dim(), (13, 1500));
        rows.push(coefs.row(9).unwrap().to_vec());
    }

    let peak = rows[0].iter().fold(0.0f64, |acc, x| acc.max(x.abs()));
    assert!(max_abs_diff(&rows[0], &rows[1]) < 1e-9 * peak.max(1.0));
}

#[test]
fn extensional_burst_is_picked_near_its_onset() {
    let signal = SyntheticAe::pencil_lead_break(5000, FS).generate().unwrap();
    let report = wavemodes::analyze(&signal, &AnalysisConfig::default()).unwrap();

    let index = report.extensional.arrival_index().unwrap();
    assert!((900..1050).contains(&index), "extensional arrival {}", index);
    assert_eq!(report.flexural.signal.len(), 5000);
}

#[test]
fn flexural_burst_is_picked_near_its_onset() {
    let synth = SyntheticAe::pencil_lead_break(5000, FS);
    let signal = synth.generate().unwrap();
    let report = wavemodes::analyze(&signal, &AnalysisConfig::default()).unwrap();

    let onset = synth.bursts[1].onset;
    let index = report.flexural.arrival_index().unwrap();
    assert!((onset - 10..onset + 100).contains(&index), "flexural arrival {}", index);

    let true_delay = (onset - synth.bursts[0].onset) as f64 / FS;
    let delay = report.arrival_delay().unwrap();
    assert!((delay - true_delay).abs() < 30e-6, "delay {} s", delay);
}

#[test]
fn prominence_rules_paired_per_mode_on_a_clean_record() {
    let synth = SyntheticAe::pencil_lead_break(5000, FS).with_noise(0.0);
    let signal = synth.generate().unwrap();
    // The sliding-mean rule needs exact zeros away from the bursts, which
    // the time-domain backend keeps and FFT rounding does not
    let config = AnalysisConfig {
        backend: BackendKind::Direct,
        extensional_detection: ModeDetection {
            rule: Some(DetectionRule::ExtensionalProminence),
            ..ModeDetection::default()
        },
        flexural_detection: ModeDetection {
            rule: Some(DetectionRule::Prominence),
            ..ModeDetection::default()
        },
        ..AnalysisConfig::default()
    };
    let report = wavemodes::analyze(&signal, &config).unwrap();

    let ext = report.extensional.arrival_index().unwrap();
    let flex = report.flexural.arrival_index().unwrap();
    assert!((950..1010).contains(&ext), "extensional arrival {}", ext);
    assert!((1990..2080).contains(&flex), "flexural arrival {}", flex);
}

#[test]
fn extensional_prominence_rule_on_a_noisy_record() {
    let signal = SyntheticAe::pencil_lead_break(5000, FS).generate().unwrap();
    let config = AnalysisConfig {
        detection_rule: DetectionRule::ExtensionalProminence,
        ..AnalysisConfig::default()
    };
    let report = wavemodes::analyze(&signal, &config).unwrap();

    let ext = report.extensional.arrival_index().unwrap();
    let flex = report.flexural.arrival_index().unwrap();
    assert!((900..1010).contains(&ext), "extensional arrival {}", ext);
    assert!((1990..2080).contains(&flex), "flexural arrival {}", flex);
}

#[test]
fn synthetic_wav_record_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plb.wav");
    let signal = SyntheticAe::pencil_lead_break(2000, FS).generate().unwrap();

    wavemodes::save_signal(&signal, &path).unwrap();
    let loaded = wavemodes::load_signal(&path, None).unwrap();

    assert_eq!(loaded.len(), signal.len());
    assert_eq!(loaded.sample_rate(), FS);
    let peak = loaded.samples().iter().fold(0.0f64, |acc, x| acc.max(x.abs()));
    assert!((peak - 1.0).abs() < 1e-3, "peak {}", peak);
}

#[test]
fn estimated_center_frequency_shifts_the_scales() {
    let config = AnalysisConfig {
        wavelet_center_frequency: None,
        ..AnalysisConfig::default()
    };
    let analyzer = ModeAnalyzer::from_config(config).unwrap();

    let expected = 0.8125 * FS / 310_000.0;
    assert!((analyzer.scales().get(9).unwrap() - expected).abs() < 1e-9);
}

#[test]
fn text_input_round_trip_through_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("impulse.txt");
    wavemodes::write_text(impulse(800, 400).samples(), &path).unwrap();

    let signal = wavemodes::load_signal(&path, Some(FS)).unwrap();
    let config = AnalysisConfig {
        flexural_scale_index_range: [3, 3],
        detection_threshold_multiplier: 3.0,
        ..AnalysisConfig::default()
    };
    let report = ModeAnalyzer::with_backend(config, PassthroughBackend)
        .unwrap()
        .analyze(&signal)
        .unwrap();

    assert_eq!(report.flexural.arrival_index(), Some(400));
}

fn matrix_and_permutation() -> impl Strategy<Value = (Vec<Vec<f64>>, Vec<usize>)> {
    (2usize..6, 1usize..24).prop_flat_map(|(m, n)| {
        (
            prop::collection::vec(prop::collection::vec(-10.0f64..10.0, n), m),
            Just((0..m).collect::<Vec<usize>>()).prop_shuffle(),
        )
    })
}

proptest! {
    #[test]
    fn flexural_product_ignores_row_order((rows, order) in matrix_and_permutation()) {
        let m = rows.len();
        let n = rows[0].len();
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        let array = ndarray::Array2::from_shape_vec((m, n), flat).unwrap();
        let scales = ScaleSet::from_scales((1..=m).map(|s| s as f64).collect()).unwrap();
        let coefs = CoefficientSet::new(array, scales).unwrap();

        let forward: Vec<usize> = (0..m).collect();
        let a = product_of_rows(&coefs, &forward).unwrap();
        let b = product_of_rows(&coefs, &order).unwrap();

        for (x, y) in a.iter().zip(b.iter()) {
            prop_assert!((x - y).abs() <= 1e-12 * x.abs().max(1.0));
        }
    }

    #[test]
    fn scale_set_matches_closed_form(
        freqs in prop::collection::vec(1.0e3f64..1.0e6, 1..20),
        fc in 0.1f64..2.0,
        fs in 1.0e5f64..1.0e7,
    ) {
        let scales = scales_from_frequencies(&freqs, fc, fs).unwrap();

        prop_assert_eq!(scales.len(), freqs.len());
        for (i, f) in freqs.iter().enumerate() {
            let expected = fc * fs / f;
            prop_assert!((scales.get(i).unwrap() - expected).abs() <= 1e-12 * expected);
        }
    }
}
