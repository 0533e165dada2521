//! crates/daily_insight/src/fetch.rs
//!
//! Retrieval of a single insight from the API.

use async_trait::async_trait;
use vivamate_core::{InsightEnvelope, InsightKind};

#[derive(Debug, thiserror::Error)]
pub enum InsightClientError {
    #[error("Insight request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Anything that can answer "give me today's insight of this kind".
#[async_trait]
pub trait InsightFetcher: Send + Sync {
    async fn fetch(&self, kind: InsightKind) -> Result<InsightEnvelope, InsightClientError>;
}

/// Fetches insights from `GET {base_url}/ai/insight?type=...`.
#[derive(Clone)]
pub struct HttpInsightFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpInsightFetcher {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn endpoint(&self, kind: InsightKind) -> String {
        format!(
            "{}/ai/insight?type={}",
            self.base_url.trim_end_matches('/'),
            kind.as_query()
        )
    }
}

#[async_trait]
impl InsightFetcher for HttpInsightFetcher {
    async fn fetch(&self, kind: InsightKind) -> Result<InsightEnvelope, InsightClientError> {
        // The status code is not inspected: failure bodies carry `success: false`.
        let envelope = self
            .client
            .get(self.endpoint(kind))
            .send()
            .await?
            .json::<InsightEnvelope>()
            .await?;
        Ok(envelope)
    }
}
