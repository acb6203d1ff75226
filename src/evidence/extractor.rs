//! Parameter Extraction
//!
//! Prompts a language model for CVintra, half-life and exposure ranges from
//! PubMed abstracts. Every failure path (no model, empty abstracts, request
//! error, no JSON in the reply) degrades to [`FallbackTable`].

use regex::Regex;
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

use super::fallback::FallbackTable;
use super::params::{ParameterSource, PkParameters, SourcedParameters};
use crate::agent::LLMProvider;
use crate::utils::{preview, truncate_chars};

/// Characters of abstract text handed to the model.
pub const MAX_CONTEXT_CHARS: usize = 3000;

const SYSTEM_PROMPT: &str = "You are an expert clinical pharmacologist. \
    You read study abstracts and report pharmacokinetic parameters as strict JSON.";

pub struct ParameterExtractor {
    provider: Option<Arc<dyn LLMProvider>>,
    model: String,
    fallback: FallbackTable,
}

impl ParameterExtractor {
    pub fn new(provider: Option<Arc<dyn LLMProvider>>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            fallback: FallbackTable,
        }
    }

    /// Extractor that always answers from the fallback table.
    pub fn offline() -> Self {
        Self::new(None, "")
    }

    pub fn build_prompt(context: &str, inn: &str) -> String {
        format!(
            "Analyse the PubMed abstracts below for the drug {inn}.\n\n\
             Abstracts:\n{context}\n\n\
             Extract the following parameters as a JSON object:\n\
             - cv_intra: intra-subject coefficient of variation (a number between 0 and 1, e.g. 0.25 for 25%)\n\
             - t_half: elimination half-life in hours (a number)\n\
             - cmax_range: Cmax range (a string, e.g. \"15-25 µg/mL\")\n\
             - auc_range: AUC range (a string, e.g. \"50-80 µg·h/mL\")\n\n\
             If a parameter is not found, use null.\n\
             Reply with the JSON object only, without explanations."
        )
    }

    pub async fn extract(&self, abstracts: &str, inn: &str) -> SourcedParameters {
        let Some(provider) = self.provider.as_ref() else {
            debug!("No model configured, using literature defaults for {}", inn);
            return self.fallback(inn);
        };

        if !provider.is_available().await {
            warn!("Model unavailable, using literature defaults for {}", inn);
            return self.fallback(inn);
        }

        let context = truncate_chars(abstracts, MAX_CONTEXT_CHARS);
        if context.trim().is_empty() {
            info!("No abstracts found, using literature defaults for {}", inn);
            return self.fallback(inn);
        }

        let prompt = Self::build_prompt(context, inn);
        let reply = match provider
            .generate(&self.model, prompt, Some(SYSTEM_PROMPT.to_string()))
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Model request failed: {}", e);
                return self.fallback(inn);
            }
        };

        match parse_reply(&reply) {
            Some(params) => {
                info!(
                    "Model extracted cv_intra={:?} t_half={:?} for {}",
                    params.cv_intra, params.t_half, inn
                );
                SourcedParameters::new(params, ParameterSource::Model)
            }
            None => {
                warn!(
                    "Model did not return usable JSON ({}), using literature defaults",
                    preview(&reply, 120)
                );
                self.fallback(inn)
            }
        }
    }

    fn fallback(&self, inn: &str) -> SourcedParameters {
        SourcedParameters::new(self.fallback.lookup(inn), ParameterSource::Fallback)
    }
}

fn json_object_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?s)\{.*\}").ok())
        .as_ref()
}

/// Pull the outermost `{...}` span out of a reply and read parameters from it.
///
/// Numbers given as strings ("0.25") are accepted; anything else
/// non-numeric becomes `None`.
pub fn parse_reply(reply: &str) -> Option<PkParameters> {
    let span = json_object_pattern()?.find(reply)?;
    let value: Value = serde_json::from_str(span.as_str()).ok()?;
    let object = value.as_object()?;

    Some(PkParameters {
        cv_intra: object.get("cv_intra").and_then(number),
        t_half: object.get("t_half").and_then(number),
        cmax_range: object.get("cmax_range").and_then(text),
        auc_range: object.get("auc_range").and_then(text),
    })
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedProvider {
        reply: Result<String, String>,
        available: bool,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                available: true,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        async fn generate(&self, _model: &str, prompt: String, _system: Option<String>) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt);
            self.reply.clone().map_err(|e| anyhow::anyhow!(e))
        }

        async fn is_available(&self) -> bool {
            self.available
        }
    }

    fn extractor_with(provider: &Arc<ScriptedProvider>) -> ParameterExtractor {
        ParameterExtractor::new(Some(provider.clone() as Arc<dyn LLMProvider>), "mistral")
    }

    #[test]
    fn test_parse_reply_embedded_in_prose() {
        let reply = "Sure! Here is the data:\n```json\n{\"cv_intra\": 0.31,\n \"t_half\": 6.5, \"cmax_range\": null, \"auc_range\": \"10-20\"}\n```";
        let params = parse_reply(reply).unwrap();
        assert_eq!(params.cv_intra, Some(0.31));
        assert_eq!(params.t_half, Some(6.5));
        assert_eq!(params.cmax_range, None);
        assert_eq!(params.auc_range.as_deref(), Some("10-20"));
    }

    #[test]
    fn test_parse_reply_numeric_strings() {
        let params = parse_reply(r#"{"cv_intra": "0.22", "t_half": "n/a"}"#).unwrap();
        assert_eq!(params.cv_intra, Some(0.22));
        assert_eq!(params.t_half, None);
    }

    #[test]
    fn test_parse_reply_rejects_non_json() {
        assert!(parse_reply("I could not find anything.").is_none());
        assert!(parse_reply("{not json}").is_none());
    }

    #[tokio::test]
    async fn test_offline_uses_fallback() {
        let result = ParameterExtractor::offline().extract("some abstract", "Atorvastatin").await;
        assert_eq!(result.source, ParameterSource::Fallback);
        assert_eq!(result.params.cv_intra, Some(0.35));
    }

    #[tokio::test]
    async fn test_model_reply_used() {
        let provider = Arc::new(ScriptedProvider::replying(r#"{"cv_intra": 0.4, "t_half": 10}"#));
        let extractor = extractor_with(&provider);
        let result = extractor.extract("Abstract text about metformin.", "Metformin").await;
        assert_eq!(result.source, ParameterSource::Model);
        assert_eq!(result.params.cv_intra, Some(0.4));
        assert_eq!(result.params.t_half, Some(10.0));

        let prompts = provider.prompts.lock().unwrap();
        assert!(prompts[0].contains("Metformin"));
        assert!(prompts[0].contains("Abstract text about metformin."));
    }

    #[tokio::test]
    async fn test_empty_abstracts_skip_model() {
        let provider = Arc::new(ScriptedProvider::replying(r#"{"cv_intra": 0.4}"#));
        let extractor = extractor_with(&provider);
        let result = extractor.extract("   \n", "Ibuprofen").await;
        assert_eq!(result.source, ParameterSource::Fallback);
        assert!(provider.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_and_failing_providers_fall_back() {
        let mut unavailable = ScriptedProvider::replying("{}");
        unavailable.available = false;
        let extractor = extractor_with(&Arc::new(unavailable));
        assert_eq!(extractor.extract("text", "Ibuprofen").await.source, ParameterSource::Fallback);

        let failing = ScriptedProvider {
            reply: Err("connection refused".to_string()),
            available: true,
            prompts: Mutex::new(Vec::new()),
        };
        let extractor = extractor_with(&Arc::new(failing));
        assert_eq!(extractor.extract("text", "Ibuprofen").await.source, ParameterSource::Fallback);

        let chatty = ScriptedProvider::replying("No JSON here, sorry.");
        let extractor = extractor_with(&Arc::new(chatty));
        let result = extractor.extract("text", "Ibuprofen").await;
        assert_eq!(result.source, ParameterSource::Fallback);
        assert_eq!(result.params.t_half, Some(2.0));
    }

    #[tokio::test]
    async fn test_context_is_truncated() {
        let provider = Arc::new(ScriptedProvider::replying("{}"));
        let extractor = extractor_with(&provider);
        let abstracts = format!("{}TAIL", "a".repeat(MAX_CONTEXT_CHARS));
        extractor.extract(&abstracts, "X").await;
        assert!(!provider.prompts.lock().unwrap()[0].contains("TAIL"));
    }
}
