//! Design Module
//!
//! Deterministic rules that turn variability, half-life and a computed
//! sample size into a trial design with its derived protocol quantities.

mod decision;
mod types;

pub use decision::{
    decide_design, DesignDecision, DesignInputs, DesignRationale, HIGH_VARIABILITY_CV,
    STUDY_BUFFER_DAYS, WASHOUT_HALF_LIVES,
};
pub use types::{DesignPreference, StudyDesign, VariabilityClass};
