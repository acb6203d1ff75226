use serde::{Deserialize, Serialize};

use super::decision::HIGH_VARIABILITY_CV;

/// Trial designs the engine can choose between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyDesign {
    /// Two-period, two-sequence crossover (2x2)
    StandardCrossover,
    /// Replicate design analysed with reference-scaled average BE
    ReplicateRsabe,
}

impl StudyDesign {
    /// Periods each subject goes through.
    pub fn periods(&self) -> u32 {
        match self {
            StudyDesign::StandardCrossover => 2,
            StudyDesign::ReplicateRsabe => 4,
        }
    }
}

impl std::fmt::Display for StudyDesign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StudyDesign::StandardCrossover => write!(f, "2x2 crossover"),
            StudyDesign::ReplicateRsabe => write!(f, "replicate (RSABE)"),
        }
    }
}

/// Caller's design choice; anything other than `Auto` overrides selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesignPreference {
    #[default]
    Auto,
    StandardCrossover,
    ReplicateRsabe,
}

impl std::str::FromStr for DesignPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "auto" => Ok(DesignPreference::Auto),
            "2x2" | "crossover" | "standard" | "2x2 crossover" => {
                Ok(DesignPreference::StandardCrossover)
            }
            "rsabe" | "replicate" | "replicate (rsabe)" => Ok(DesignPreference::ReplicateRsabe),
            other => Err(format!("unknown design preference '{}'", other)),
        }
    }
}

impl std::fmt::Display for DesignPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DesignPreference::Auto => write!(f, "auto"),
            DesignPreference::StandardCrossover => write!(f, "{}", StudyDesign::StandardCrossover),
            DesignPreference::ReplicateRsabe => write!(f, "{}", StudyDesign::ReplicateRsabe),
        }
    }
}

/// Variability classification that drives the rationale text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariabilityClass {
    /// CVintra > 30%: replicate/RSABE rationale
    HighlyVariable,
    /// CVintra <= 30%: standard crossover rationale
    Moderate,
}

impl VariabilityClass {
    pub fn classify(cv_intra: f64) -> Self {
        if cv_intra > HIGH_VARIABILITY_CV {
            VariabilityClass::HighlyVariable
        } else {
            VariabilityClass::Moderate
        }
    }
}
