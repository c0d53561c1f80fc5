pub mod enrichment;
pub mod etl;
pub mod litscan;
pub mod pipeline;
pub mod rate_limit;

pub use crate::domain::model::{DeRecord, EnrichedRecord, EnrichmentResult, Publication};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
