use serde::{Deserialize, Serialize};

use crate::design::DesignPreference;
use crate::stats::SampleSizeParams;

/// Dosing conditions relative to food.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeMode {
    #[default]
    Fasting,
    Fed,
    Both,
}

impl std::str::FromStr for IntakeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "fasting" | "fasted" => Ok(IntakeMode::Fasting),
            "fed" | "after food" | "after meal" => Ok(IntakeMode::Fed),
            "both" => Ok(IntakeMode::Both),
            other => Err(format!("unknown intake mode '{}'", other)),
        }
    }
}

impl std::fmt::Display for IntakeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntakeMode::Fasting => write!(f, "fasting"),
            IntakeMode::Fed => write!(f, "fed"),
            IntakeMode::Both => write!(f, "fasting and fed"),
        }
    }
}

/// Everything the user specifies for one synopsis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyRequest {
    /// International nonproprietary name of the drug.
    pub inn: String,
    pub dosage_form: String,
    pub dosage_strength: String,
    pub intake_mode: IntakeMode,
    pub design_preference: DesignPreference,
    pub rsabe_opt_in: bool,
    pub sample_size: SampleSizeParams,
    /// Manual CVintra; wins over anything extracted.
    pub cv_override: Option<f64>,
    /// Manual half-life in hours; wins over anything extracted.
    pub t_half_override: Option<f64>,
}

impl StudyRequest {
    pub fn new(inn: impl Into<String>) -> Self {
        Self {
            inn: inn.into(),
            dosage_form: "tablets".to_string(),
            dosage_strength: "200 mg".to_string(),
            intake_mode: IntakeMode::default(),
            design_preference: DesignPreference::default(),
            rsabe_opt_in: false,
            sample_size: SampleSizeParams::default(),
            cv_override: None,
            t_half_override: None,
        }
    }

    pub fn dropout(&self) -> f64 {
        self.sample_size.dropout
    }
}
