//! Synopsis Template
//!
//! Plain-text protocol synopsis with `{{key}}` placeholders. Placeholders
//! with no value are left untouched so they stay visible in the output.

use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;
use tokio::fs;

use crate::pipeline::PipelineError;

const BUILTIN_TEMPLATE: &str = include_str!("../../templates/synopsis_template.txt");

#[derive(Debug, Clone, PartialEq)]
pub struct SynopsisTemplate {
    text: String,
}

fn placeholder_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\{\{([^{}]+)\}\}").ok())
        .as_ref()
}

impl SynopsisTemplate {
    pub fn from_string(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Template shipped with the crate.
    pub fn builtin() -> Self {
        Self::from_string(BUILTIN_TEMPLATE)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .await
            .map_err(|source| PipelineError::Template {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_string(text))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Distinct placeholder keys in order of first appearance.
    pub fn placeholders(&self) -> Vec<String> {
        let Some(pattern) = placeholder_pattern() else {
            return Vec::new();
        };
        let mut keys: Vec<String> = Vec::new();
        for caps in pattern.captures_iter(&self.text) {
            let key = caps[1].to_string();
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    /// Placeholders in the template that `fields` has no value for.
    pub fn missing_fields(&self, fields: &BTreeMap<String, String>) -> Vec<String> {
        self.placeholders()
            .into_iter()
            .filter(|key| !fields.contains_key(key))
            .collect()
    }

    pub fn render(&self, fields: &BTreeMap<String, String>) -> String {
        let mut out = self.text.clone();
        for (key, value) in fields {
            let placeholder = format!("{{{{{}}}}}", key);
            if out.contains(&placeholder) {
                out = out.replace(&placeholder, value);
            }
        }
        out
    }
}

impl Default for SynopsisTemplate {
    fn default() -> Self {
        Self::builtin()
    }
}
