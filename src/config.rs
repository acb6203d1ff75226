//! Runtime configuration
//!
//! Everything is read from the environment (after `.env` is loaded by the
//! binary). Unset or unparsable values fall back to the defaults below.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmConfig {
    pub enabled: bool,
    pub model: String,
    /// OpenAI-compatible endpoint; when set it replaces Ollama.
    pub provider_url: Option<String>,
    pub api_key: Option<String>,
    pub ollama_host: String,
    pub ollama_port: u16,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "mistral".to_string(),
            provider_url: None,
            api_key: None,
            ollama_host: "http://localhost".to_string(),
            ollama_port: 11434,
            temperature: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PubMedConfig {
    pub base_url: String,
    /// Contact address NCBI asks E-utilities clients to send.
    pub email: Option<String>,
    pub retmax: u32,
}

impl Default for PubMedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".to_string(),
            email: None,
            retmax: 5,
        }
    }
}

/// Organisations named in the synopsis header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Organisations {
    pub sponsor: String,
    pub research_center: String,
    pub laboratory: String,
    pub insurer: String,
}

impl Default for Organisations {
    fn default() -> Self {
        Self {
            sponsor: "PharmaCom LLC".to_string(),
            research_center: "Clinical Research Center LLC".to_string(),
            laboratory: "Analytica LLC".to_string(),
            insurer: "Soglasie Insurance LLC".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SynopsisConfig {
    pub llm: LlmConfig,
    pub pubmed: PubMedConfig,
    pub organisations: Organisations,
    pub template_path: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for SynopsisConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl SynopsisConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup so tests need not touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let llm_defaults = LlmConfig::default();
        let pubmed_defaults = PubMedConfig::default();
        let org_defaults = Organisations::default();

        let llm = LlmConfig {
            enabled: lookup("BE_LLM_ENABLED")
                .map(|v| !matches!(v.trim(), "0" | "false" | "no" | "off"))
                .unwrap_or(llm_defaults.enabled),
            model: lookup("BE_LLM_MODEL").unwrap_or(llm_defaults.model),
            provider_url: lookup("BE_LLM_PROVIDER_URL").filter(|v| !v.trim().is_empty()),
            api_key: lookup("BE_LLM_API_KEY").filter(|v| !v.trim().is_empty()),
            ollama_host: lookup("OLLAMA_HOST").unwrap_or(llm_defaults.ollama_host),
            ollama_port: parse_or(&lookup, "OLLAMA_PORT", llm_defaults.ollama_port),
            temperature: parse_or(&lookup, "BE_LLM_TEMPERATURE", llm_defaults.temperature),
        };

        let pubmed = PubMedConfig {
            base_url: lookup("PUBMED_BASE_URL").unwrap_or(pubmed_defaults.base_url),
            email: lookup("PUBMED_EMAIL").filter(|v| !v.trim().is_empty()),
            retmax: parse_or(&lookup, "PUBMED_RETMAX", pubmed_defaults.retmax),
        };

        let organisations = Organisations {
            sponsor: lookup("BE_SPONSOR").unwrap_or(org_defaults.sponsor),
            research_center: lookup("BE_RESEARCH_CENTER").unwrap_or(org_defaults.research_center),
            laboratory: lookup("BE_LABORATORY").unwrap_or(org_defaults.laboratory),
            insurer: lookup("BE_INSURER").unwrap_or(org_defaults.insurer),
        };

        Self {
            llm,
            pubmed,
            organisations,
            template_path: lookup("BE_TEMPLATE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("templates/synopsis_template.txt")),
            output_dir: lookup("BE_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {}='{}', using {}", key, raw, default);
            default
        }),
        None => default,
    }
}
