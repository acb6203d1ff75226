use serde::{Deserialize, Serialize};

/// Where a set of pharmacokinetic parameters came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterSource {
    /// Parsed from the language model's reply.
    Model,
    /// Static literature defaults.
    Fallback,
    /// Typed in by the user.
    Manual,
}

/// Candidate pharmacokinetic parameters for a drug.
///
/// Field names double as the JSON keys the model is asked to produce.
/// Anything the model could not find stays `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PkParameters {
    #[serde(default)]
    pub cv_intra: Option<f64>,
    /// Elimination half-life in hours.
    #[serde(default)]
    pub t_half: Option<f64>,
    #[serde(default)]
    pub cmax_range: Option<String>,
    #[serde(default)]
    pub auc_range: Option<String>,
}

/// Parameters tagged with their provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcedParameters {
    pub params: PkParameters,
    pub source: ParameterSource,
}

impl SourcedParameters {
    pub fn new(params: PkParameters, source: ParameterSource) -> Self {
        Self { params, source }
    }
}
