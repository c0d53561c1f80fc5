use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("Network request failed: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("API returned status {status} for identifier '{identifier}'")]
    HttpStatusError { identifier: String, status: u16 },

    #[error("Failed to decode response for identifier '{identifier}': {reason}")]
    DecodeError { identifier: String, reason: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    RemoteApi,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EnrichError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EnrichError::NetworkError(_) => ErrorCategory::Network,
            EnrichError::HttpStatusError { .. } => ErrorCategory::RemoteApi,
            EnrichError::DecodeError { .. }
            | EnrichError::CsvError(_)
            | EnrichError::SerializationError(_)
            | EnrichError::ProcessingError { .. } => ErrorCategory::Data,
            EnrichError::InvalidConfigValueError { .. }
            | EnrichError::MissingConfigError { .. }
            | EnrichError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            EnrichError::IoError(_) | EnrichError::ZipError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 網路錯誤通常重試就能解決
            EnrichError::NetworkError(_) => ErrorSeverity::Medium,
            EnrichError::HttpStatusError { status, .. } if *status == 404 => ErrorSeverity::Medium,
            EnrichError::HttpStatusError { .. } => ErrorSeverity::High,
            EnrichError::DecodeError { .. }
            | EnrichError::CsvError(_)
            | EnrichError::SerializationError(_)
            | EnrichError::ProcessingError { .. } => ErrorSeverity::High,
            EnrichError::InvalidConfigValueError { .. }
            | EnrichError::MissingConfigError { .. }
            | EnrichError::ConfigValidationError { .. } => ErrorSeverity::High,
            EnrichError::IoError(_) | EnrichError::ZipError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EnrichError::NetworkError(_) => {
                "Check network connectivity and whether rnacentral.org is reachable, then rerun"
                    .to_string()
            }
            EnrichError::HttpStatusError { identifier, status } if *status == 404 => format!(
                "Identifier '{}' was not found by the API; verify the urs_taxid column of the input table",
                identifier
            ),
            EnrichError::HttpStatusError { status, .. } if *status == 429 => {
                "The API is throttling this client; lower --max-calls or widen --window-seconds"
                    .to_string()
            }
            EnrichError::HttpStatusError { .. } => {
                "The remote API rejected the request; rerun later or check the endpoint URL"
                    .to_string()
            }
            EnrichError::DecodeError { .. } => {
                "The API response did not have the expected shape; check the endpoint URL points at the JSON API"
                    .to_string()
            }
            EnrichError::CsvError(_) => {
                "Check that the input table is valid delimited text with a header row".to_string()
            }
            EnrichError::InvalidConfigValueError { field, .. } => {
                format!("Correct the value of '{}' and rerun", field)
            }
            EnrichError::MissingConfigError { field } => {
                format!("Provide a value for '{}' via the CLI or config file", field)
            }
            EnrichError::ConfigValidationError { .. } => {
                "Fix the configuration file and rerun".to_string()
            }
            EnrichError::ProcessingError { .. } => {
                "Inspect the input data for the reported problem".to_string()
            }
            EnrichError::IoError(_) => {
                "Check file permissions and that the output directory is writable".to_string()
            }
            EnrichError::ZipError(_) => "Check disk space and output path".to_string(),
            EnrichError::SerializationError(_) => {
                "Report this as a bug; enriched records should always serialize".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EnrichError::NetworkError(e) => format!("Could not reach the remote API: {}", e),
            EnrichError::HttpStatusError { identifier, status } => format!(
                "Enrichment of '{}' failed: the API answered with HTTP {}",
                identifier, status
            ),
            EnrichError::DecodeError { identifier, reason } => format!(
                "The API response for '{}' could not be understood: {}",
                identifier, reason
            ),
            EnrichError::CsvError(e) => format!("The input table could not be parsed: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EnrichError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_error_carries_identifier() {
        let err = EnrichError::HttpStatusError {
            identifier: "URS0000123_9606".to_string(),
            status: 500,
        };
        assert!(err.to_string().contains("URS0000123_9606"));
        assert!(err.to_string().contains("500"));
        assert_eq!(err.category(), ErrorCategory::RemoteApi);
    }

    #[test]
    fn test_config_errors_are_configuration_category() {
        let err = EnrichError::InvalidConfigValueError {
            field: "rate_limit.max_calls".to_string(),
            value: "0".to_string(),
            reason: "must be at least 1".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_not_found_is_medium_severity() {
        let err = EnrichError::HttpStatusError {
            identifier: "URS0_1".to_string(),
            status: 404,
        };
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.recovery_suggestion().contains("urs_taxid"));
    }
}
