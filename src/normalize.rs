// src/normalize.rs - External text-normalization collaborator
//
// Normalization runs a query through the Solr field analysis chain
// (synonym and stemming rules live server-side) and joins the tokens
// of the final analysis phase with single spaces. The capability is a
// trait so the aggregation core can be tested offline against a
// deterministic stub.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use once_cell::sync::Lazy;
use reqwest::Client;
use serde_json::Value;
use std::env;

/// Shared HTTP client for both Solr collaborators (analysis and
/// update). reqwest clients are Arc-backed, so cloning is cheap.
pub static HTTP_CLIENT: Lazy<Client> = Lazy::new(Client::new);

/// Injectable normalization capability. Fallible: a transport error
/// or non-2xx response propagates and aborts the run; there is no
/// retry and no fallback to the raw text.
#[async_trait]
pub trait Normalizer: Send + Sync {
    async fn normalize(&self, text: &str) -> Result<String>;
}

/// Solr endpoint configuration, environment-driven with localhost
/// defaults.
#[derive(Debug, Clone)]
pub struct SolrConfig {
    pub base_url: String,
    pub core: String,
    pub field_type: String,
}

impl SolrConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("SOLR_URL")
                .unwrap_or_else(|_| "http://localhost:8983/solr".to_string()),
            core: env::var("SOLR_CORE").unwrap_or_else(|_| "search_queries".to_string()),
            field_type: env::var("SOLR_FIELD_TYPE")
                .unwrap_or_else(|_| "dig_practice_char_syns".to_string()),
        }
    }

    pub fn log_config(&self) {
        info!(
            "Solr endpoint: {} (core: {}, analysis field type: {})",
            self.base_url, self.core, self.field_type
        );
    }
}

/// Normalizer backed by the Solr field analysis endpoint.
pub struct SolrNormalizer {
    client: Client,
    config: SolrConfig,
}

impl SolrNormalizer {
    pub fn new(config: SolrConfig) -> Self {
        Self {
            client: HTTP_CLIENT.clone(),
            config,
        }
    }

    fn analysis_url(&self) -> String {
        format!(
            "{}/{}/analysis/field",
            self.config.base_url, self.config.core
        )
    }
}

#[async_trait]
impl Normalizer for SolrNormalizer {
    async fn normalize(&self, text: &str) -> Result<String> {
        let response = self
            .client
            .get(self.analysis_url())
            .query(&[
                ("wt", "json"),
                ("analysis.fieldtype", self.config.field_type.as_str()),
                ("analysis.fieldvalue", text),
            ])
            .send()
            .await
            .with_context(|| format!("Normalization request failed for '{}'", text))?
            .error_for_status()
            .with_context(|| format!("Normalization returned an error status for '{}'", text))?;

        let body: Value = response
            .json()
            .await
            .context("Normalization response was not valid JSON")?;

        let normalized = extract_normalized_text(&body, &self.config.field_type);
        debug!("Normalized '{}' -> '{}'", text, normalized);
        Ok(normalized)
    }
}

/// Pull the final analysis phase out of a Solr field-analysis
/// response and join its token texts with single spaces. The `index`
/// array alternates analyzer class names and token lists; the last
/// element holds the tokens the index would actually see.
fn extract_normalized_text(body: &Value, field_type: &str) -> String {
    let phases = body
        .get("analysis")
        .and_then(|v| v.get("field_types"))
        .and_then(|v| v.get(field_type))
        .and_then(|v| v.get("index"))
        .and_then(Value::as_array);

    let mut tokens: Vec<&str> = Vec::new();
    if let Some(phases) = phases {
        if let Some(Value::Array(last_phase)) = phases.last() {
            for token in last_phase {
                if let Some(text) = token.get("text").and_then(Value::as_str) {
                    tokens.push(text);
                }
            }
        }
    }
    tokens.join(" ")
}
