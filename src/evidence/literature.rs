//! Literature Source
//!
//! Fetches PubMed abstracts through the NCBI E-utilities (no API key
//! required): `esearch` for PMIDs, then `efetch` for plain-text abstracts.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::PubMedConfig;

/// Anything that can return abstract text for a drug.
///
/// An empty string means nothing was found.
#[async_trait]
pub trait LiteratureSource: Send + Sync {
    async fn abstracts(&self, inn: &str) -> Result<String>;
}

pub struct PubMedSource {
    client: Client,
    config: PubMedConfig,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    esearchresult: SearchResult,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

impl PubMedSource {
    pub fn new(config: PubMedConfig) -> Self {
        Self {
            client: Client::builder()
                .user_agent("be_synopsis/0.1.0")
                .build()
                .unwrap_or_default(),
            config,
        }
    }

    /// Search term for BE/PK papers mentioning the drug.
    pub fn query_for(inn: &str) -> String {
        format!(
            "{}[Title/Abstract] AND (bioequivalence[Title/Abstract] OR pharmacokinetics[Title/Abstract])",
            inn
        )
    }

    fn endpoint(&self, tool: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), tool)
    }

    fn with_contact(&self, mut url: String) -> String {
        if let Some(ref email) = self.config.email {
            url.push_str(&format!("&email={}", urlencoding::encode(email)));
        }
        url
    }

    async fn search(&self, query: &str) -> Result<Vec<String>> {
        let url = self.with_contact(format!(
            "{}?db=pubmed&retmode=json&retmax={}&term={}",
            self.endpoint("esearch.fcgi"),
            self.config.retmax,
            urlencoding::encode(query)
        ));

        debug!("Searching PubMed: {}", query);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send PubMed search request")?
            .error_for_status()
            .context("PubMed search returned an error status")?;

        let parsed: SearchResponse = response
            .json()
            .await
            .context("Failed to parse PubMed search response")?;
        Ok(parsed.esearchresult.idlist)
    }

    async fn fetch(&self, pmids: &[String]) -> Result<String> {
        if pmids.is_empty() {
            return Ok(String::new());
        }

        let url = self.with_contact(format!(
            "{}?db=pubmed&rettype=abstract&retmode=text&id={}",
            self.endpoint("efetch.fcgi"),
            pmids.join(",")
        ));

        let text = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send PubMed fetch request")?
            .error_for_status()
            .context("PubMed fetch returned an error status")?
            .text()
            .await
            .context("Failed to read PubMed abstracts")?;
        Ok(text)
    }
}

#[async_trait]
impl LiteratureSource for PubMedSource {
    async fn abstracts(&self, inn: &str) -> Result<String> {
        let pmids = self.search(&Self::query_for(inn)).await?;
        info!("PubMed returned {} PMIDs for {}", pmids.len(), inn);
        self.fetch(&pmids).await
    }
}
