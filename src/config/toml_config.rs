use crate::core::ConfigProvider;
use crate::utils::error::{EnrichError, Result};
use crate::utils::validation::{
    validate_endpoint_template, validate_path, validate_positive_number, validate_probability,
    validate_window_seconds, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineInfo,
    pub source: SourceConfig,
    pub filter: FilterConfig,
    pub rate_limit: RateLimitConfig,
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineInfo {
    pub name: String,
    pub description: Option<String>,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// URL or local path of the differential-expression table
    pub table_url: String,
    pub rna_endpoint: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub pvalue_threshold: f64,
    pub max_records: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub max_calls: usize,
    pub window_seconds: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EnrichError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EnrichError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OUTPUT_DIR})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl ConfigProvider for TomlConfig {
    fn table_source(&self) -> &str {
        &self.source.table_url
    }

    fn rna_endpoint(&self) -> &str {
        &self.source.rna_endpoint
    }

    fn pvalue_threshold(&self) -> f64 {
        self.filter.pvalue_threshold
    }

    fn max_records(&self) -> Option<usize> {
        self.filter.max_records
    }

    fn max_calls(&self) -> usize {
        self.rate_limit.max_calls
    }

    fn window_seconds(&self) -> f64 {
        self.rate_limit.window_seconds
    }

    fn timeout_seconds(&self) -> u64 {
        self.source.timeout_seconds.unwrap_or(30)
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_endpoint_template("source.rna_endpoint", &self.source.rna_endpoint, "{urs_taxid}")?;
        validate_probability("filter.pvalue_threshold", self.filter.pvalue_threshold)?;
        validate_positive_number("rate_limit.max_calls", self.rate_limit.max_calls, 1)?;
        validate_window_seconds("rate_limit.window_seconds", self.rate_limit.window_seconds)?;
        validate_path("load.output_path", &self.load.output_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[pipeline]
name = "lihc-enrichment"
description = "Liver cancer DE table enrichment"
version = "0.1.0"

[source]
table_url = "https://example.com/de_results.tsv"
rna_endpoint = "https://rnacentral.org/api/v1/rna/{urs_taxid}"
timeout_seconds = 15

[filter]
pvalue_threshold = 0.01
max_records = 100

[rate_limit]
max_calls = 20
window_seconds = 1.0

[load]
output_path = "./output"
"#;

    #[test]
    fn test_toml_config_parsing() {
        let config = TomlConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.pipeline.name, "lihc-enrichment");
        assert_eq!(config.filter.pvalue_threshold, 0.01);
        assert_eq!(config.rate_limit.max_calls, 20);
        assert_eq!(config.timeout_seconds(), 15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_max_calls_fails_validation() {
        let content = SAMPLE.replace("max_calls = 20", "max_calls = 0");
        let config = TomlConfig::from_toml_str(&content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_window_fails_validation() {
        let content = SAMPLE.replace("window_seconds = 1.0", "window_seconds = -2.0");
        let config = TomlConfig::from_toml_str(&content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_endpoint_without_placeholder_fails_validation() {
        let content = SAMPLE.replace("/rna/{urs_taxid}", "/rna/");
        let config = TomlConfig::from_toml_str(&content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("RNA_ENRICH_TEST_OUTPUT", "/tmp/enrich-out");
        let content = SAMPLE.replace("\"./output\"", "\"${RNA_ENRICH_TEST_OUTPUT}\"");
        let config = TomlConfig::from_toml_str(&content).unwrap();
        assert_eq!(config.load.output_path, "/tmp/enrich-out");
    }

    #[test]
    fn test_unknown_env_var_is_left_as_is() {
        let content = SAMPLE.replace("\"./output\"", "\"${RNA_ENRICH_UNSET_VAR}\"");
        let config = TomlConfig::from_toml_str(&content).unwrap();
        assert_eq!(config.load.output_path, "${RNA_ENRICH_UNSET_VAR}");
    }
}
