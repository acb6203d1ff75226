//! Synopsis Pipeline
//!
//! Literature → parameter extraction → sample size → design → rendered
//! synopsis. Collaborators are injected at construction; each run is
//! independent of the others.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Organisations;
use crate::design::{decide_design, DesignDecision, DesignInputs};
use crate::error::DesignError;
use crate::evidence::{LiteratureSource, ParameterExtractor, ParameterSource, SourcedParameters};
use crate::stats::{compute_sample_size, SampleSizeResult};
use crate::synopsis::{build_fields, StudyRequest, SynopsisInputs, SynopsisTemplate};

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Neither extraction nor the request supplied a value; ask the user.
    #[error("{name} could not be determined; please enter it manually")]
    MissingParameter { name: &'static str },

    #[error(transparent)]
    Design(#[from] DesignError),

    /// The synopsis template file could not be read.
    #[error("Failed to read synopsis template {}: {source}", .path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Literature text and the parameters extracted from it.
#[derive(Debug, Clone, Serialize)]
pub struct Evidence {
    pub abstracts: String,
    pub extracted: SourcedParameters,
}

/// A parameter value together with where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Resolved {
    pub value: f64,
    pub source: ParameterSource,
}

#[derive(Debug, Clone, Serialize)]
pub struct SynopsisDraft {
    pub request: StudyRequest,
    pub cv_intra: Resolved,
    pub t_half: Resolved,
    pub sample_size: SampleSizeResult,
    pub decision: DesignDecision,
    pub fields: BTreeMap<String, String>,
    pub document: String,
}

impl SynopsisDraft {
    /// `synopsis_<INN>_<YYYYmmdd_HHMM>.txt`, INN reduced to filename-safe chars.
    pub fn file_name(&self, generated_at: &NaiveDateTime) -> String {
        let inn: String = self
            .request
            .inn
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        format!("synopsis_{}_{}.txt", inn, generated_at.format("%Y%m%d_%H%M"))
    }
}

pub struct SynopsisPipeline {
    literature: Arc<dyn LiteratureSource>,
    extractor: ParameterExtractor,
    template: SynopsisTemplate,
    organisations: Organisations,
}

impl SynopsisPipeline {
    pub fn new(
        literature: Arc<dyn LiteratureSource>,
        extractor: ParameterExtractor,
        template: SynopsisTemplate,
    ) -> Self {
        Self {
            literature,
            extractor,
            template,
            organisations: Organisations::default(),
        }
    }

    pub fn with_organisations(mut self, organisations: Organisations) -> Self {
        self.organisations = organisations;
        self
    }

    /// Fetch abstracts and extract candidate parameters. Retrieval failures
    /// are logged and treated as "no abstracts".
    pub async fn gather(&self, inn: &str) -> Evidence {
        let abstracts = match self.literature.abstracts(inn).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Literature retrieval failed for {}: {:#}", inn, e);
                String::new()
            }
        };
        if abstracts.is_empty() {
            warn!("No abstracts found for {}; literature defaults will be used", inn);
        } else {
            info!("Retrieved {} characters of abstracts for {}", abstracts.len(), inn);
        }

        let extracted = self.extractor.extract(&abstracts, inn).await;
        Evidence {
            abstracts,
            extracted,
        }
    }

    /// Compute sample size and design from gathered evidence and render
    /// the synopsis. Manual overrides in `request` win over extraction.
    pub fn draft(
        &self,
        request: &StudyRequest,
        evidence: &Evidence,
        generated_at: NaiveDateTime,
    ) -> Result<SynopsisDraft, PipelineError> {
        let extracted = &evidence.extracted;
        let cv_intra = resolve(request.cv_override, extracted.params.cv_intra, extracted.source)
            .ok_or(PipelineError::MissingParameter { name: "CVintra" })?;
        let t_half = resolve(request.t_half_override, extracted.params.t_half, extracted.source)
            .ok_or(PipelineError::MissingParameter { name: "half-life (T½)" })?;

        let sample_size = compute_sample_size(Some(cv_intra.value), &request.sample_size)?;
        let decision = decide_design(
            &DesignInputs {
                cv_intra: cv_intra.value,
                half_life_hours: t_half.value,
                preference: request.design_preference,
                rsabe_opt_in: request.rsabe_opt_in,
            },
            Some(&sample_size),
        )?;
        info!(
            "{}: N={} N_total={} design={} washout={}d",
            request.inn,
            sample_size.per_sequence_count,
            sample_size.total_count,
            decision.design,
            decision.washout_days
        );

        let fields = build_fields(&SynopsisInputs {
            request,
            organisations: &self.organisations,
            cv_intra: cv_intra.value,
            t_half: t_half.value,
            cmax_range: extracted.params.cmax_range.as_deref(),
            auc_range: extracted.params.auc_range.as_deref(),
            sample_size: &sample_size,
            decision: &decision,
            generated_at,
        });

        let missing = self.template.missing_fields(&fields);
        if !missing.is_empty() {
            warn!("Template placeholders without values: {}", missing.join(", "));
        }
        let document = self.template.render(&fields);

        Ok(SynopsisDraft {
            request: request.clone(),
            cv_intra,
            t_half,
            sample_size,
            decision,
            fields,
            document,
        })
    }

    pub async fn run(
        &self,
        request: &StudyRequest,
        generated_at: NaiveDateTime,
    ) -> Result<SynopsisDraft, PipelineError> {
        let evidence = self.gather(&request.inn).await;
        self.draft(request, &evidence, generated_at)
    }
}

fn resolve(manual: Option<f64>, extracted: Option<f64>, source: ParameterSource) -> Option<Resolved> {
    match (manual, extracted) {
        (Some(value), _) => Some(Resolved {
            value,
            source: ParameterSource::Manual,
        }),
        (None, Some(value)) => Some(Resolved { value, source }),
        (None, None) => None,
    }
}
