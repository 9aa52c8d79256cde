// src/ingest.rs - External document-index ingestion collaborator
//
// Pushes {query, visits, revenue} documents into the Solr core via
// its JSON update API. The ingestion path is independent of matching:
// it clears the collection first (clear and rebuild), then adds
// documents in batches with a commit per request.

use anyhow::{anyhow, Context, Result};
use log::info;
use reqwest::Client;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use serde_json::json;

use crate::models::core::QueryRecord;
use crate::normalize::{SolrConfig, HTTP_CLIENT};

/// One document on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct QueryDocument {
    pub query: String,
    pub visits: u64,
    pub revenue: f64,
}

impl QueryDocument {
    pub fn from_record(record: &QueryRecord) -> Result<Self> {
        let revenue = record
            .revenue
            .to_f64()
            .ok_or_else(|| anyhow!("Revenue {} does not fit in an f64", record.revenue))?;
        Ok(Self {
            query: record.query.clone(),
            visits: record.visits,
            revenue,
        })
    }
}

/// Client for the Solr update endpoint.
pub struct SolrIngestClient {
    client: Client,
    config: SolrConfig,
}

impl SolrIngestClient {
    pub fn new(config: SolrConfig) -> Self {
        Self {
            client: HTTP_CLIENT.clone(),
            config,
        }
    }

    fn update_url(&self) -> String {
        format!("{}/{}/update", self.config.base_url, self.config.core)
    }

    /// Delete every document in the collection and commit.
    pub async fn clear_all(&self) -> Result<()> {
        self.client
            .post(self.update_url())
            .query(&[("commit", "true")])
            .json(&json!({"delete": {"query": "*:*"}}))
            .send()
            .await
            .context("Delete-all request failed")?
            .error_for_status()
            .context("Delete-all returned an error status")?;
        info!("All documents deleted from {}", self.config.core);
        Ok(())
    }

    /// Add a batch of documents and commit.
    pub async fn ingest(&self, documents: &[QueryDocument]) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }
        self.client
            .post(self.update_url())
            .query(&[("commit", "true")])
            .json(documents)
            .send()
            .await
            .context("Document add request failed")?
            .error_for_status()
            .context("Document add returned an error status")?;
        info!("Ingested {} documents into {}", documents.len(), self.config.core);
        Ok(())
    }
}
