use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

/// A text-generation backend the extractor can prompt.
///
/// Constructed once at startup and shared as `Arc<dyn LLMProvider>`.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn generate(&self, model: &str, prompt: String, system: Option<String>) -> Result<String>;

    /// Whether the backend is reachable. Unreachable backends are skipped
    /// in favour of the fallback table.
    async fn is_available(&self) -> bool {
        true
    }
}

/// Upper bound on generated tokens; the extraction reply is a small JSON object.
pub const MAX_RESPONSE_TOKENS: i32 = 512;

pub struct OllamaProvider {
    client: ollama_rs::Ollama,
    temperature: f32,
}

impl OllamaProvider {
    pub fn new(client: ollama_rs::Ollama) -> Self {
        Self {
            client,
            temperature: 0.1,
        }
    }

    /// Client for `host:port`. The host must be an absolute URL such as
    /// `http://localhost`.
    pub fn from_host(host: &str, port: u16) -> Result<Self> {
        let mut url = reqwest::Url::parse(host)
            .with_context(|| format!("Invalid Ollama host '{}'", host))?;
        if !url.has_host() || url.set_port(Some(port)).is_err() {
            anyhow::bail!("Ollama host '{}' cannot carry a port", host);
        }
        Ok(Self::new(ollama_rs::Ollama::builder().url(url).build()))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub(crate) fn model_options(&self) -> ollama_rs::models::ModelOptions {
        ollama_rs::models::ModelOptions::default()
            .temperature(self.temperature)
            .num_predict(MAX_RESPONSE_TOKENS)
    }
}

#[async_trait]
impl LLMProvider for OllamaProvider {
    async fn generate(&self, model: &str, prompt: String, system: Option<String>) -> Result<String> {
        use ollama_rs::generation::chat::{request::ChatMessageRequest, ChatMessage};

        let mut messages = Vec::new();
        if let Some(sys) = system {
            messages.push(ChatMessage::system(sys));
        }
        messages.push(ChatMessage::user(prompt));

        debug!("Sending extraction prompt to Ollama model {}", model);
        let res = self
            .client
            .send_chat_messages(
                ChatMessageRequest::new(model.to_string(), messages).options(self.model_options()),
            )
            .await
            .context("Ollama chat request failed")?;

        Ok(res.message.content)
    }

    async fn is_available(&self) -> bool {
        match self.client.list_local_models().await {
            Ok(_) => true,
            Err(e) => {
                warn!("Ollama is not reachable (is 'ollama serve' running?): {}", e);
                false
            }
        }
    }
}

pub struct OpenAICompatibleProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    temperature: f32,
}

impl OpenAICompatibleProvider {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
            temperature: 0.1,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl LLMProvider for OpenAICompatibleProvider {
    async fn generate(&self, model: &str, prompt: String, system: Option<String>) -> Result<String> {
        let mut messages = Vec::new();
        if let Some(sys) = system {
            messages.push(json!({ "role": "system", "content": sys }));
        }
        messages.push(json!({ "role": "user", "content": prompt }));

        let body = json!({
            "model": model,
            "messages": messages,
            "temperature": self.temperature,
            "max_tokens": MAX_RESPONSE_TOKENS,
        });

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.base_url.trim_end_matches('/')))
            .json(&body);

        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let res = request.send().await?.error_for_status()?;
        let json: serde_json::Value = res.json().await?;

        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .context("Failed to parse content from OpenAI response")?;

        Ok(content.to_string())
    }
}
