//! Bioequivalence Study Synopsis Designer
//!
//! Drafts a clinical bioequivalence protocol synopsis for a drug:
//! - PubMed literature retrieval
//! - Pharmacokinetic parameter extraction (language model + literature defaults)
//! - Sample-size computation for 2x2 crossover average bioequivalence
//! - Deterministic design selection (standard crossover vs replicate RSABE)
//! - `{{key}}` template rendering

pub mod agent;
pub mod config;
pub mod design;
pub mod error;
pub mod evidence;
pub mod pipeline;
pub mod stats;
pub mod synopsis;
pub mod utils;

// Re-exports for convenience
pub use design::{decide_design, DesignDecision, DesignInputs, DesignPreference, StudyDesign};
pub use error::DesignError;
pub use pipeline::{PipelineError, SynopsisDraft, SynopsisPipeline};
pub use stats::{compute_sample_size, SampleSizeParams, SampleSizeResult};
