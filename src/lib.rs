pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};

pub use core::{
    enrichment::RnaEnricher, etl::EtlEngine, litscan::LitScanClient, pipeline::EnrichmentPipeline,
    rate_limit::RateLimit, rate_limit::RateLimiter,
};
pub use utils::error::{EnrichError, Result};
