use crate::domain::model::{DeRecord, EnrichmentResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    /// URL or local path of the differential-expression table.
    fn table_source(&self) -> &str;
    /// Enrichment endpoint template containing `{urs_taxid}`.
    fn rna_endpoint(&self) -> &str;
    fn pvalue_threshold(&self) -> f64;
    fn max_records(&self) -> Option<usize>;
    fn max_calls(&self) -> usize;
    fn window_seconds(&self) -> f64;
    fn timeout_seconds(&self) -> u64;
    fn output_path(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<DeRecord>>;
    async fn transform(&self, data: Vec<DeRecord>) -> Result<EnrichmentResult>;
    async fn load(&self, result: EnrichmentResult) -> Result<String>;
}
