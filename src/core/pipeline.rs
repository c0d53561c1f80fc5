use crate::core::enrichment::RnaEnricher;
use crate::core::rate_limit::RateLimit;
use crate::core::{ConfigProvider, DeRecord, EnrichmentResult, Pipeline, Storage};
use crate::domain::model::EnrichedRow;
use crate::utils::error::{EnrichError, Result};
use reqwest::Client;
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::time::Duration;
use zip::write::{FileOptions, ZipWriter};

pub struct EnrichmentPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> EnrichmentPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            client: Client::new(),
        }
    }

    /// 取得表格原始內容：HTTP URL 下載，否則視為本地檔案
    async fn fetch_table_bytes(&self) -> Result<Vec<u8>> {
        let source = self.config.table_source();

        if source.starts_with("http://") || source.starts_with("https://") {
            tracing::debug!("📥 Downloading table from: {}", source);
            let response = self
                .client
                .get(source)
                .timeout(Duration::from_secs(self.config.timeout_seconds()))
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(EnrichError::HttpStatusError {
                    identifier: source.to_string(),
                    status: status.as_u16(),
                });
            }

            Ok(response.bytes().await?.to_vec())
        } else {
            tracing::debug!("📥 Reading table from local file: {}", source);
            self.storage.read_file(source).await
        }
    }
}

/// Parse the delimited table and keep rows with `pvalue` below `threshold`.
/// The delimiter is sniffed from the header line (tab or comma). Retained
/// identifiers must be non-empty and unique for enrichment to be meaningful.
pub fn parse_and_filter_table(
    raw: &[u8],
    threshold: f64,
    max_records: Option<usize>,
) -> Result<Vec<DeRecord>> {
    let header_line = raw.split(|b| *b == b'\n').next().unwrap_or_default();
    let delimiter = if header_line.contains(&b'\t') {
        b'\t'
    } else {
        b','
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(raw);

    let headers = reader.headers()?.clone();
    let id_index = headers
        .iter()
        .position(|h| h == "urs_taxid")
        .ok_or_else(|| EnrichError::ProcessingError {
            message: "Input table has no 'urs_taxid' column".to_string(),
        })?;
    let pvalue_index = headers
        .iter()
        .position(|h| h == "pvalue")
        .ok_or_else(|| EnrichError::ProcessingError {
            message: "Input table has no 'pvalue' column".to_string(),
        })?;

    let mut retained = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (row, record) in reader.records().enumerate() {
        let record = record?;

        let urs_taxid = record.get(id_index).unwrap_or_default().trim().to_string();
        if urs_taxid.is_empty() {
            return Err(EnrichError::ProcessingError {
                message: format!("Row {}: empty urs_taxid", row + 1),
            });
        }

        let pvalue_raw = record.get(pvalue_index).unwrap_or_default().trim();
        let pvalue: f64 = pvalue_raw
            .parse()
            .map_err(|_| EnrichError::ProcessingError {
                message: format!("Row {}: invalid pvalue '{}'", row + 1, pvalue_raw),
            })?;

        if pvalue >= threshold {
            continue;
        }

        if !seen.insert(urs_taxid.clone()) {
            return Err(EnrichError::ProcessingError {
                message: format!(
                    "Duplicate identifier '{}' in the filtered table",
                    urs_taxid
                ),
            });
        }

        let stats: HashMap<String, String> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != id_index && *i != pvalue_index)
            .map(|(i, h)| (h.to_string(), record.get(i).unwrap_or_default().to_string()))
            .collect();

        retained.push(DeRecord {
            urs_taxid,
            pvalue,
            stats,
        });

        if let Some(max) = max_records {
            if retained.len() >= max {
                tracing::warn!("🔶 Stopping at max_records = {}", max);
                break;
            }
        }
    }

    Ok(retained)
}

fn csv_field(value: &str) -> String {
    let cleaned = value.replace(['\n', '\r'], " ");
    if cleaned.contains(',') || cleaned.contains('"') {
        format!("\"{}\"", cleaned.replace('"', "''"))
    } else {
        cleaned
    }
}

fn tsv_field(value: &str) -> String {
    value.replace(['\n', '\r', '\t'], " ")
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for EnrichmentPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<DeRecord>> {
        let raw = self.fetch_table_bytes().await?;
        let threshold = self.config.pvalue_threshold();

        let records = parse_and_filter_table(&raw, threshold, self.config.max_records())?;

        tracing::info!(
            "📥 Retained {} rows with pvalue < {}",
            records.len(),
            threshold
        );
        Ok(records)
    }

    async fn transform(&self, data: Vec<DeRecord>) -> Result<EnrichmentResult> {
        // 配置錯誤在任何 API 呼叫前回報
        let limit = RateLimit::new(self.config.max_calls(), self.config.window_seconds())?;
        let mut enricher = RnaEnricher::new(
            self.config.rna_endpoint().to_string(),
            limit,
            Duration::from_secs(self.config.timeout_seconds()),
        )?;

        let identifiers: Vec<String> = data.iter().map(|r| r.urs_taxid.clone()).collect();
        tracing::info!(
            "🔄 Enriching {} identifiers (max {} calls per {:?})",
            identifiers.len(),
            limit.max_calls(),
            limit.window()
        );

        let annotations = enricher.enrich_all(&identifiers).await?;

        let mut csv_lines = vec!["urs_taxid,pvalue,rna_type,length,genes,description".to_string()];
        let mut tsv_lines =
            vec!["urs_taxid\tpvalue\trna_type\tlength\tgenes\tdescription".to_string()];
        let mut type_counts: HashMap<String, usize> = HashMap::new();
        let mut rows = Vec::with_capacity(data.len());

        for (record, annotation) in data.into_iter().zip(annotations) {
            let rna_type = annotation.rna_type().unwrap_or("unknown").to_string();
            *type_counts.entry(rna_type.clone()).or_insert(0) += 1;

            let length = annotation
                .length()
                .map(|l| l.to_string())
                .unwrap_or_default();
            let genes = annotation.genes().join(";");
            let description = annotation.description().unwrap_or_default().to_string();

            csv_lines.push(format!(
                "{},{},{},{},{},{}",
                record.urs_taxid,
                record.pvalue,
                rna_type,
                length,
                csv_field(&genes),
                csv_field(&description)
            ));
            tsv_lines.push(format!(
                "{}\t{}\t{}\t{}\t{}\t{}",
                record.urs_taxid,
                record.pvalue,
                rna_type,
                length,
                tsv_field(&genes),
                tsv_field(&description)
            ));

            rows.push(EnrichedRow { record, annotation });
        }

        for (rna_type, count) in &type_counts {
            tracing::info!("🔄 rna_type {}: {} rows", rna_type, count);
        }

        Ok(EnrichmentResult {
            rows,
            csv_output: csv_lines.join("\n"),
            tsv_output: tsv_lines.join("\n"),
            type_counts,
        })
    }

    async fn load(&self, result: EnrichmentResult) -> Result<String> {
        let output_path = format!("{}/rna_enrich_output.zip", self.config.output_path());

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            zip.start_file::<_, ()>("output.csv", FileOptions::default())?;
            zip.write_all(result.csv_output.as_bytes())?;

            zip.start_file::<_, ()>("output.tsv", FileOptions::default())?;
            zip.write_all(result.tsv_output.as_bytes())?;

            zip.start_file::<_, ()>("enriched.json", FileOptions::default())?;
            let json_data = serde_json::to_string_pretty(&result.rows)?;
            zip.write_all(json_data.as_bytes())?;

            zip.start_file::<_, ()>("summary.json", FileOptions::default())?;
            let summary = serde_json::json!({
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "rows": result.rows.len(),
                "type_counts": result.type_counts,
            });
            zip.write_all(serde_json::to_string_pretty(&summary)?.as_bytes())?;

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("💾 Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.storage.write_file("rna_enrich_output.zip", &zip_data).await?;

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_retains_significant_rows_only() {
        let table = b"urs_taxid,pvalue,log2fc\nA,0.001,2.5\nB,0.5,-0.3\n";
        let records = parse_and_filter_table(table, 0.01, None).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].urs_taxid, "A");
        assert_eq!(records[0].pvalue, 0.001);
        assert_eq!(records[0].stats.get("log2fc").unwrap(), "2.5");
    }

    #[test]
    fn test_tab_delimiter_is_sniffed() {
        let table = b"urs_taxid\tpvalue\nURS1_9606\t0.0001\n";
        let records = parse_and_filter_table(table, 0.01, None).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].urs_taxid, "URS1_9606");
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let table = b"urs_taxid,pvalue\nA,0.01\n";
        let records = parse_and_filter_table(table, 0.01, None).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_missing_required_column_is_an_error() {
        let table = b"id,pvalue\nA,0.001\n";
        let err = parse_and_filter_table(table, 0.01, None).unwrap_err();
        assert!(err.to_string().contains("urs_taxid"));
    }

    #[test]
    fn test_invalid_pvalue_is_an_error() {
        let table = b"urs_taxid,pvalue\nA,not-a-number\n";
        let err = parse_and_filter_table(table, 0.01, None).unwrap_err();
        assert!(err.to_string().contains("not-a-number"));
    }

    #[test]
    fn test_duplicate_identifier_in_filtered_set_is_an_error() {
        let table = b"urs_taxid,pvalue\nA,0.001\nA,0.002\n";
        let err = parse_and_filter_table(table, 0.01, None).unwrap_err();
        assert!(err.to_string().contains("Duplicate identifier 'A'"));
    }

    #[test]
    fn test_duplicate_outside_filter_is_ignored() {
        // Second A row is filtered out, so uniqueness of the retained set holds
        let table = b"urs_taxid,pvalue\nA,0.001\nA,0.9\n";
        let records = parse_and_filter_table(table, 0.01, None).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_max_records_caps_retained_rows() {
        let table = b"urs_taxid,pvalue\nA,0.001\nB,0.002\nC,0.003\n";
        let records = parse_and_filter_table(table, 0.01, Some(2)).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].urs_taxid, "A");
        assert_eq!(records[1].urs_taxid, "B");
    }

    #[test]
    fn test_csv_field_quotes_commas() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a, b"), "\"a, b\"");
        assert_eq!(csv_field("line\nbreak"), "line break");
    }
}
