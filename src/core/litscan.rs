use crate::domain::model::Publication;
use crate::utils::error::{EnrichError, Result};
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::time::Duration;

pub const DEFAULT_LITSCAN_ENDPOINT: &str =
    "https://www.ebi.ac.uk/ebisearch/ws/rest/rnacentral-litscan";
pub const PMC_ARTICLE_BASE: &str = "https://www.ncbi.nlm.nih.gov/pmc/articles";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    entries: Vec<SearchEntry>,
}

#[derive(Debug, Deserialize)]
struct SearchEntry {
    #[serde(default)]
    fields: SearchFields,
}

#[derive(Debug, Default, Deserialize)]
struct SearchFields {
    #[serde(default)]
    title: Vec<String>,
    #[serde(default)]
    pmcid: Vec<String>,
}

/// Single-shot publication lookup against the EBI search endpoint. Not
/// designed to batch across many gene sets.
pub struct LitScanClient {
    client: Client,
    endpoint: String,
}

impl LitScanClient {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    /// Duplicates collapse by set semantics and the query terms are sorted,
    /// so the same gene set always produces the same request. Hits come back
    /// in endpoint order; whatever one response holds is treated as complete.
    pub async fn lookup(&self, genes: &[String]) -> Result<Vec<Publication>> {
        let query = Self::build_query(genes);
        tracing::debug!("📡 Literature query: {}", query);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("query", query.as_str()),
                ("fields", "title,pmcid"),
                ("format", "json"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichError::HttpStatusError {
                identifier: query,
                status: status.as_u16(),
            });
        }

        let decoded: SearchResponse =
            response
                .json()
                .await
                .map_err(|e| EnrichError::DecodeError {
                    identifier: query.clone(),
                    reason: e.to_string(),
                })?;

        let publications = decoded
            .entries
            .into_iter()
            .map(|entry| {
                let title = entry.fields.title.first().cloned().unwrap_or_default();
                let pmcid = entry.fields.pmcid.first().cloned().unwrap_or_default();
                let link = Self::pmc_link(&pmcid);
                Publication { title, pmcid, link }
            })
            .collect();

        Ok(publications)
    }

    fn build_query(genes: &[String]) -> String {
        let unique: BTreeSet<&str> = genes
            .iter()
            .map(|g| g.as_str())
            .filter(|g| !g.is_empty())
            .collect();

        unique
            .iter()
            .map(|gene| format!("job_id:\"{}\"", gene))
            .collect::<Vec<_>>()
            .join(" OR ")
    }

    pub fn pmc_link(pmcid: &str) -> String {
        format!("{}/{}/", PMC_ARTICLE_BASE, pmcid)
    }
}
