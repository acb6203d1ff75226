//! Property checks for the sample-size and design engine.

use be_synopsis::design::VariabilityClass;
use be_synopsis::{
    compute_sample_size, decide_design, DesignError, DesignInputs, DesignPreference,
    SampleSizeParams, StudyDesign,
};

fn cv_grid() -> Vec<f64> {
    (1..=120).map(|i| i as f64 * 0.01).collect()
}

#[test]
fn test_monotonic_in_cv() {
    for params in [
        SampleSizeParams::default(),
        SampleSizeParams::default().with_dropout(0.0),
        SampleSizeParams::default().with_power(0.9).with_alpha(0.1),
    ] {
        let mut previous = 0;
        for cv in cv_grid() {
            let result = compute_sample_size(Some(cv), &params).unwrap();
            assert!(
                result.per_sequence_count >= previous,
                "N dropped at cv={} ({:?})",
                cv,
                params
            );
            assert!(result.total_count >= result.per_sequence_count);
            previous = result.per_sequence_count;
        }
    }
}

#[test]
fn test_dropout_inflation_non_decreasing() {
    for cv in [0.1, 0.25, 0.4, 0.8] {
        let mut previous = 0;
        for step in 0..=40 {
            let dropout = step as f64 / 100.0;
            let params = SampleSizeParams::default().with_dropout(dropout);
            let result = compute_sample_size(Some(cv), &params).unwrap();
            assert!(result.total_count >= previous, "cv={} dropout={}", cv, dropout);
            if step == 0 {
                assert_eq!(result.total_count, result.per_sequence_count);
            }
            previous = result.total_count;
        }
    }
}

#[test]
fn test_boundary_rejection() {
    let params = SampleSizeParams::default();
    for cv in [Some(0.0), Some(-0.1), None] {
        match compute_sample_size(cv, &params) {
            Err(DesignError::InvalidArgument { name, .. }) => assert_eq!(name, "cv_intra"),
            other => panic!("expected InvalidArgument for {:?}, got {:?}", cv, other),
        }
    }
}

#[test]
fn test_reference_value_follows_formula() {
    let result = compute_sample_size(Some(0.25), &SampleSizeParams::default()).unwrap();
    assert_eq!(result.per_sequence_count, 20);
    assert_eq!(result.total_count, 25);
}

#[test]
fn test_idempotent() {
    let params = SampleSizeParams::default().with_dropout(0.15);
    let first = compute_sample_size(Some(0.287), &params).unwrap();
    for _ in 0..10 {
        assert_eq!(compute_sample_size(Some(0.287), &params).unwrap(), first);
    }

    let inputs = DesignInputs {
        cv_intra: 0.287,
        half_life_hours: 7.3,
        preference: DesignPreference::Auto,
        rsabe_opt_in: true,
    };
    let decision = decide_design(&inputs, Some(&first)).unwrap();
    assert_eq!(decide_design(&inputs, Some(&first)).unwrap(), decision);
}

#[test]
fn test_design_selection_end_to_end() {
    let params = SampleSizeParams::default();
    let cases = [
        (0.35, DesignPreference::Auto, true, StudyDesign::ReplicateRsabe),
        (0.20, DesignPreference::Auto, true, StudyDesign::StandardCrossover),
        (0.99, DesignPreference::StandardCrossover, true, StudyDesign::StandardCrossover),
    ];
    for (cv, preference, rsabe_opt_in, expected) in cases {
        let sample = compute_sample_size(Some(cv), &params).unwrap();
        let decision = decide_design(
            &DesignInputs {
                cv_intra: cv,
                half_life_hours: 14.0,
                preference,
                rsabe_opt_in,
            },
            Some(&sample),
        )
        .unwrap();
        assert_eq!(decision.design, expected, "cv={}", cv);
        assert_eq!(decision.washout_days, 3);
        assert_eq!(decision.study_duration_days, 20);
        assert_eq!(decision.per_arm_count, sample.total_count / 2);
    }
}

#[test]
fn test_odd_total_loses_a_subject_per_arm() {
    // CV 0.35 -> N=37, N_total=47
    let sample = compute_sample_size(Some(0.35), &SampleSizeParams::default()).unwrap();
    assert_eq!(sample.total_count, 47);
    let decision = decide_design(
        &DesignInputs {
            cv_intra: 0.35,
            half_life_hours: 2.0,
            preference: DesignPreference::Auto,
            rsabe_opt_in: false,
        },
        Some(&sample),
    )
    .unwrap();
    assert_eq!(decision.per_arm_count, 23);
    assert_eq!(decision.washout_days, 1);
    assert_eq!(decision.rationale.class, VariabilityClass::HighlyVariable);
}
