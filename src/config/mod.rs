pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{
    self, validate_endpoint_template, validate_path, validate_positive_number,
    validate_probability, validate_url, validate_window_seconds, Validate,
};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "rna-enrich")]
#[command(about = "Filter a differential-expression table and enrich it via the RNAcentral API")]
pub struct CliConfig {
    /// URL or local path of the differential-expression table
    #[arg(long, default_value = "./de_results.tsv")]
    pub table_source: String,

    /// Enrichment endpoint template; {urs_taxid} is replaced per row
    #[arg(long, default_value = "https://rnacentral.org/api/v1/rna/{urs_taxid}")]
    pub rna_endpoint: String,

    /// Keep rows with pvalue strictly below this threshold
    #[arg(long, default_value = "0.01")]
    pub pvalue_threshold: f64,

    /// Stop after this many retained rows
    #[arg(long)]
    pub max_records: Option<usize>,

    /// Rate ceiling: calls admitted per window
    #[arg(long, default_value = "20")]
    pub max_calls: usize,

    /// Rate ceiling: window length in seconds
    #[arg(long, default_value = "1.0")]
    pub window_seconds: f64,

    /// Connect/read timeout for every HTTP request
    #[arg(long, default_value = "30")]
    pub timeout_seconds: u64,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// TOML configuration file; overrides the flags above
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log per-phase system stats")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn table_source(&self) -> &str {
        &self.table_source
    }

    fn rna_endpoint(&self) -> &str {
        &self.rna_endpoint
    }

    fn pvalue_threshold(&self) -> f64 {
        self.pvalue_threshold
    }

    fn max_records(&self) -> Option<usize> {
        self.max_records
    }

    fn max_calls(&self) -> usize {
        self.max_calls
    }

    fn window_seconds(&self) -> f64 {
        self.window_seconds
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("table_source", &self.table_source)?;
        if self.table_source.starts_with("http://") || self.table_source.starts_with("https://") {
            validate_url("table_source", &self.table_source)?;
        }
        validate_endpoint_template("rna_endpoint", &self.rna_endpoint, "{urs_taxid}")?;
        validate_probability("pvalue_threshold", self.pvalue_threshold)?;
        validate_positive_number("max_calls", self.max_calls, 1)?;
        validate_window_seconds("window_seconds", self.window_seconds)?;
        validate_positive_number("timeout_seconds", self.timeout_seconds as usize, 1)?;
        validate_path("output_path", &self.output_path)?;
        Ok(())
    }
}
