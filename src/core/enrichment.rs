use crate::core::rate_limit::{RateLimit, RateLimiter};
use crate::domain::model::EnrichedRecord;
use crate::utils::error::{EnrichError, Result};
use reqwest::Client;
use std::time::Duration;

pub const IDENTIFIER_PLACEHOLDER: &str = "{urs_taxid}";

/// 批次豐富化：依輸入順序對每個識別碼發出一次 API 呼叫，
/// 由 RateLimiter 控制呼叫准入
pub struct RnaEnricher {
    client: Client,
    endpoint: String,
    limiter: RateLimiter,
}

impl RnaEnricher {
    pub fn new(endpoint: String, limit: RateLimit, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint,
            limiter: RateLimiter::new(limit),
        })
    }

    /// One lookup per identifier, in order; `output[i]` belongs to
    /// `input[i]`. Duplicates are not deduplicated. The first failing call
    /// aborts the batch and the error names the identifier.
    pub async fn enrich_all(&mut self, identifiers: &[String]) -> Result<Vec<EnrichedRecord>> {
        let mut enriched = Vec::with_capacity(identifiers.len());

        for (index, identifier) in identifiers.iter().enumerate() {
            self.limiter.acquire().await;
            tracing::debug!(
                "📡 Enrichment call {}/{}: {}",
                index + 1,
                identifiers.len(),
                identifier
            );
            enriched.push(self.fetch_one(identifier).await?);
        }

        Ok(enriched)
    }

    fn build_endpoint(&self, identifier: &str) -> String {
        self.endpoint.replace(IDENTIFIER_PLACEHOLDER, identifier)
    }

    async fn fetch_one(&self, identifier: &str) -> Result<EnrichedRecord> {
        let url = self.build_endpoint(identifier);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichError::HttpStatusError {
                identifier: identifier.to_string(),
                status: status.as_u16(),
            });
        }

        let json_data: serde_json::Value =
            response
                .json()
                .await
                .map_err(|e| EnrichError::DecodeError {
                    identifier: identifier.to_string(),
                    reason: e.to_string(),
                })?;

        match json_data {
            serde_json::Value::Object(obj) => Ok(EnrichedRecord {
                fields: obj.into_iter().collect(),
            }),
            other => Err(EnrichError::DecodeError {
                identifier: identifier.to_string(),
                reason: format!("expected a JSON object, got: {}", other),
            }),
        }
    }
}
