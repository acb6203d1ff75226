use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{DesignPreference, StudyDesign, VariabilityClass};
use crate::error::{DesignError, DesignResult};
use crate::stats::SampleSizeResult;

/// CVintra above which a drug is treated as highly variable.
pub const HIGH_VARIABILITY_CV: f64 = 0.30;
/// Half-lives needed for near-complete elimination.
pub const WASHOUT_HALF_LIVES: f64 = 5.0;
/// Screening and follow-up days added on top of two periods.
pub const STUDY_BUFFER_DAYS: u32 = 14;

/// Inputs to [`decide_design`] that come from the study request and the
/// variability estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesignInputs {
    pub cv_intra: f64,
    pub half_life_hours: f64,
    pub preference: DesignPreference,
    /// Caller allows replicate/RSABE designs for highly variable drugs.
    pub rsabe_opt_in: bool,
}

/// What the rationale text is chosen from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesignRationale {
    pub class: VariabilityClass,
    pub cv_intra: f64,
    pub total_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesignDecision {
    pub design: StudyDesign,
    pub washout_days: u32,
    pub study_duration_days: u32,
    /// Half of total enrollment, truncated. Odd totals drop a subject here.
    pub per_arm_count: u32,
    pub rationale: DesignRationale,
}

/// Pick the trial design and derive washout, duration and allocation.
pub fn decide_design(
    inputs: &DesignInputs,
    sample_size: Option<&SampleSizeResult>,
) -> DesignResult<DesignDecision> {
    if !inputs.cv_intra.is_finite() || inputs.cv_intra <= 0.0 {
        return Err(DesignError::invalid(
            "cv_intra",
            format!("must be a positive number, got {}", inputs.cv_intra),
        ));
    }
    if !inputs.half_life_hours.is_finite() || inputs.half_life_hours <= 0.0 {
        return Err(DesignError::invalid(
            "half_life_hours",
            format!("must be a positive number, got {}", inputs.half_life_hours),
        ));
    }
    let sample_size = sample_size.ok_or(DesignError::MissingDependency("sample size"))?;

    let design = select_design(inputs.preference, inputs.rsabe_opt_in, inputs.cv_intra);
    let washout_days = washout_days(inputs.half_life_hours)?;
    let study_duration_days = washout_days
        .checked_mul(2)
        .and_then(|days| days.checked_add(STUDY_BUFFER_DAYS))
        .ok_or_else(|| {
            DesignError::invalid(
                "half_life_hours",
                format!(
                    "study duration overflows a day count (t½ = {} h)",
                    inputs.half_life_hours
                ),
            )
        })?;
    let decision = DesignDecision {
        design,
        washout_days,
        study_duration_days,
        per_arm_count: sample_size.total_count / 2,
        rationale: DesignRationale {
            class: VariabilityClass::classify(inputs.cv_intra),
            cv_intra: inputs.cv_intra,
            total_count: sample_size.total_count,
        },
    };

    debug!(?decision, "design decided");
    Ok(decision)
}

fn select_design(preference: DesignPreference, rsabe_opt_in: bool, cv_intra: f64) -> StudyDesign {
    match preference {
        DesignPreference::StandardCrossover => StudyDesign::StandardCrossover,
        DesignPreference::ReplicateRsabe => StudyDesign::ReplicateRsabe,
        DesignPreference::Auto if rsabe_opt_in && cv_intra > HIGH_VARIABILITY_CV => {
            StudyDesign::ReplicateRsabe
        }
        DesignPreference::Auto => StudyDesign::StandardCrossover,
    }
}

/// `floor(t½ · 5 / 24) + 1`. Truncate-then-add-one, not a ceiling.
fn washout_days(half_life_hours: f64) -> DesignResult<u32> {
    let whole_days = (half_life_hours * WASHOUT_HALF_LIVES / 24.0).floor();
    if whole_days >= f64::from(u32::MAX) {
        return Err(DesignError::invalid(
            "half_life_hours",
            format!("washout overflows a day count (t½ = {} h)", half_life_hours),
        ));
    }
    Ok(whole_days as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(total: u32) -> SampleSizeResult {
        SampleSizeResult {
            per_sequence_count: total,
            total_count: total,
        }
    }

    fn inputs(cv: f64, preference: DesignPreference, rsabe: bool) -> DesignInputs {
        DesignInputs {
            cv_intra: cv,
            half_life_hours: 4.0,
            preference,
            rsabe_opt_in: rsabe,
        }
    }

    #[test]
    fn test_auto_selects_rsabe_for_high_cv() {
        let d = decide_design(&inputs(0.35, DesignPreference::Auto, true), Some(&sample(47))).unwrap();
        assert_eq!(d.design, StudyDesign::ReplicateRsabe);
        assert_eq!(d.rationale.class, VariabilityClass::HighlyVariable);
    }

    #[test]
    fn test_auto_keeps_crossover_for_low_cv() {
        let d = decide_design(&inputs(0.20, DesignPreference::Auto, true), Some(&sample(17))).unwrap();
        assert_eq!(d.design, StudyDesign::StandardCrossover);
        assert_eq!(d.rationale.class, VariabilityClass::Moderate);
    }

    #[test]
    fn test_auto_without_opt_in_is_crossover() {
        let d = decide_design(&inputs(0.50, DesignPreference::Auto, false), Some(&sample(89))).unwrap();
        assert_eq!(d.design, StudyDesign::StandardCrossover);
        // classification still reflects the variability
        assert_eq!(d.rationale.class, VariabilityClass::HighlyVariable);
    }

    #[test]
    fn test_threshold_is_strict() {
        let d = decide_design(&inputs(0.30, DesignPreference::Auto, true), Some(&sample(35))).unwrap();
        assert_eq!(d.design, StudyDesign::StandardCrossover);
        assert_eq!(d.rationale.class, VariabilityClass::Moderate);
    }

    #[test]
    fn test_explicit_preference_wins() {
        let d = decide_design(
            &inputs(0.99, DesignPreference::StandardCrossover, true),
            Some(&sample(270)),
        )
        .unwrap();
        assert_eq!(d.design, StudyDesign::StandardCrossover);

        let d = decide_design(
            &inputs(0.10, DesignPreference::ReplicateRsabe, false),
            Some(&sample(5)),
        )
        .unwrap();
        assert_eq!(d.design, StudyDesign::ReplicateRsabe);
    }

    #[test]
    fn test_washout_truncates() {
        assert_eq!(washout_days(2.0), Ok(1));
        assert_eq!(washout_days(14.0), Ok(3));
        assert_eq!(washout_days(4.8), Ok(2));
        assert_eq!(washout_days(1.5), Ok(1));
    }

    #[test]
    fn test_duration_and_per_arm() {
        let mut input = inputs(0.25, DesignPreference::Auto, false);
        input.half_life_hours = 14.0;
        let d = decide_design(&input, Some(&sample(25))).unwrap();
        assert_eq!(d.washout_days, 3);
        assert_eq!(d.study_duration_days, 20);
        assert_eq!(d.per_arm_count, 12);
        assert_eq!(d.rationale.total_count, 25);
    }

    #[test]
    fn test_rejects_bad_half_life() {
        for t in [0.0, -2.0, f64::INFINITY] {
            let mut input = inputs(0.25, DesignPreference::Auto, false);
            input.half_life_hours = t;
            let err = decide_design(&input, Some(&sample(25))).unwrap_err();
            assert!(err.is_invalid_argument());
        }
    }

    #[test]
    fn test_rejects_bad_cv() {
        for cv in [0.0, -0.3, f64::NAN, f64::INFINITY] {
            let err = decide_design(&inputs(cv, DesignPreference::Auto, true), Some(&sample(25)))
                .unwrap_err();
            match err {
                DesignError::InvalidArgument { name, .. } => assert_eq!(name, "cv_intra"),
                other => panic!("expected InvalidArgument for cv {}, got {:?}", cv, other),
            }
        }
    }

    #[test]
    fn test_huge_half_life_is_rejected_not_wrapped() {
        // 1e12 h: washout exceeds u32. 2e10 h: washout fits, 2 · washout + 14 does not.
        for t in [1.0e12, 2.0e10] {
            let mut input = inputs(0.25, DesignPreference::Auto, false);
            input.half_life_hours = t;
            match decide_design(&input, Some(&sample(25))) {
                Err(DesignError::InvalidArgument { name, .. }) => assert_eq!(name, "half_life_hours"),
                other => panic!("expected InvalidArgument for t½ {}, got {:?}", t, other),
            }
        }
    }

    #[test]
    fn test_largest_representable_half_life() {
        let mut input = inputs(0.25, DesignPreference::Auto, false);
        input.half_life_hours = 1.0e10;
        let d = decide_design(&input, Some(&sample(25))).unwrap();
        assert_eq!(d.washout_days, 2_083_333_334);
        assert_eq!(d.study_duration_days, 4_166_666_682);
    }

    #[test]
    fn test_missing_sample_size() {
        let err = decide_design(&inputs(0.25, DesignPreference::Auto, false), None).unwrap_err();
        assert_eq!(err, DesignError::MissingDependency("sample size"));
    }
}
