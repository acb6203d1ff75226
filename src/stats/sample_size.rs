//! Sample Size Calculator
//!
//! Required subject count for a 2x2 crossover average-bioequivalence trial
//! on the log scale:
//!
//! ```text
//! N       = ceil(2 · (z_{1-α/2} + z_{power})² · ln(1 + CV²) / ln(0.80)²)
//! N_total = ceil(N / (1 - dropout))
//! ```

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

use crate::error::{DesignError, DesignResult};

/// Lower bound of the regulatory acceptance range [80.00%, 125.00%].
pub const LOWER_BE_MARGIN: f64 = 0.80;

/// Statistical settings for a sample-size calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleSizeParams {
    /// Target power, in (0, 1).
    pub power: f64,
    /// Two-sided significance level, in (0, 1).
    pub alpha: f64,
    /// Expected fraction of subjects lost, in [0, 1).
    pub dropout: f64,
}

impl Default for SampleSizeParams {
    fn default() -> Self {
        Self {
            power: 0.8,
            alpha: 0.05,
            dropout: 0.2,
        }
    }
}

impl SampleSizeParams {
    pub fn with_dropout(mut self, dropout: f64) -> Self {
        self.dropout = dropout;
        self
    }

    pub fn with_power(mut self, power: f64) -> Self {
        self.power = power;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    fn validate(&self) -> DesignResult<()> {
        if !self.power.is_finite() || self.power <= 0.0 || self.power >= 1.0 {
            return Err(DesignError::invalid(
                "power",
                format!("must lie in (0, 1), got {}", self.power),
            ));
        }
        if !self.alpha.is_finite() || self.alpha <= 0.0 || self.alpha >= 1.0 {
            return Err(DesignError::invalid(
                "alpha",
                format!("must lie in (0, 1), got {}", self.alpha),
            ));
        }
        if !self.dropout.is_finite() || self.dropout < 0.0 || self.dropout >= 1.0 {
            return Err(DesignError::invalid(
                "dropout",
                format!("must lie in [0, 1), got {}", self.dropout),
            ));
        }
        Ok(())
    }
}

/// Subject counts produced by [`compute_sample_size`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleSizeResult {
    /// Minimum evaluable subjects (N) before dropout adjustment.
    pub per_sequence_count: u32,
    /// Subjects to enroll (N_total) after inflating for dropout.
    pub total_count: u32,
}

/// Compute the required sample size for the given intra-subject CV.
///
/// `cv_intra` is an `Option` because upstream estimation may not have
/// produced one; `None` is rejected rather than defaulted.
pub fn compute_sample_size(
    cv_intra: Option<f64>,
    params: &SampleSizeParams,
) -> DesignResult<SampleSizeResult> {
    let cv = cv_intra.ok_or_else(|| {
        DesignError::invalid("cv_intra", "no estimate supplied; provide CVintra first")
    })?;
    if !cv.is_finite() || cv <= 0.0 {
        return Err(DesignError::invalid(
            "cv_intra",
            format!("must be a positive number, got {}", cv),
        ));
    }
    params.validate()?;

    let z_alpha = standard_normal_quantile(1.0 - params.alpha / 2.0)?;
    let z_beta = standard_normal_quantile(params.power)?;
    let sigma_sq = (1.0 + cv * cv).ln();
    let theta_low = LOWER_BE_MARGIN.ln();

    let raw = 2.0 * (z_alpha + z_beta).powi(2) * sigma_sq / theta_low.powi(2);
    let per_sequence_count = subject_count(raw.ceil().max(1.0), "cv_intra")?;
    let total_count = subject_count(
        (f64::from(per_sequence_count) / (1.0 - params.dropout)).ceil(),
        "dropout",
    )?;

    debug!(
        cv,
        z_alpha, z_beta, sigma_sq, raw, per_sequence_count, total_count, "sample size computed"
    );

    Ok(SampleSizeResult {
        per_sequence_count,
        total_count,
    })
}

/// Whole subject count, rejected rather than saturated when out of range.
fn subject_count(value: f64, cause: &'static str) -> DesignResult<u32> {
    if !value.is_finite() || value > f64::from(u32::MAX) {
        return Err(DesignError::invalid(
            cause,
            format!("required subject count {} is not representable", value),
        ));
    }
    Ok(value as u32)
}

fn standard_normal_quantile(p: f64) -> DesignResult<f64> {
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| DesignError::invalid("normal distribution", e.to_string()))?;
    Ok(normal.inverse_cdf(p))
}
