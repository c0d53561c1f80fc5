use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One row of the differential-expression table. `urs_taxid` and `pvalue`
/// are required columns; every other statistic column is kept verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeRecord {
    pub urs_taxid: String,
    pub pvalue: f64,
    pub stats: HashMap<String, String>,
}

/// JSON-decoded RNAcentral response for one identifier. The API schema is
/// open; fields are kept as-is and typed accessors exist only for the fields
/// this tool consumes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub fields: HashMap<String, serde_json::Value>,
}

impl EnrichedRecord {
    pub fn rna_type(&self) -> Option<&str> {
        self.fields.get("rna_type").and_then(|v| v.as_str())
    }

    pub fn description(&self) -> Option<&str> {
        self.fields.get("description").and_then(|v| v.as_str())
    }

    pub fn sequence(&self) -> Option<&str> {
        self.fields.get("sequence").and_then(|v| v.as_str())
    }

    pub fn length(&self) -> Option<u64> {
        self.fields.get("length").and_then(|v| v.as_u64())
    }

    /// Gene names attached to the sequence; a missing or malformed `genes`
    /// field reads as no genes.
    pub fn genes(&self) -> Vec<String> {
        self.fields
            .get("genes")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|g| g.as_str().map(|s| s.to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A filtered table row paired with its API annotation, in table order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedRow {
    pub record: DeRecord,
    pub annotation: EnrichedRecord,
}

/// Output of the transform stage.
#[derive(Debug, Clone)]
pub struct EnrichmentResult {
    pub rows: Vec<EnrichedRow>,
    pub csv_output: String,
    pub tsv_output: String,
    pub type_counts: HashMap<String, usize>,
}

/// One literature hit from the EBI search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub title: String,
    pub pmcid: String,
    pub link: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record_from(value: serde_json::Value) -> EnrichedRecord {
        let fields = value
            .as_object()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        EnrichedRecord { fields }
    }

    #[test]
    fn test_typed_accessors() {
        let record = record_from(json!({
            "rna_type": "miRNA",
            "description": "Homo sapiens miR-21",
            "sequence": "UAGCUUAUCAGACUGAUGUUGA",
            "length": 22,
            "genes": ["MIR21", "hsa-mir-21"]
        }));

        assert_eq!(record.rna_type(), Some("miRNA"));
        assert_eq!(record.description(), Some("Homo sapiens miR-21"));
        assert_eq!(record.length(), Some(22));
        assert_eq!(record.genes(), vec!["MIR21", "hsa-mir-21"]);
    }

    #[test]
    fn test_missing_genes_reads_as_empty() {
        let record = record_from(json!({"rna_type": "lncRNA"}));
        assert!(record.genes().is_empty());
    }

    #[test]
    fn test_malformed_genes_reads_as_empty() {
        let record = record_from(json!({"genes": "not-a-list"}));
        assert!(record.genes().is_empty());
    }

    #[test]
    fn test_unknown_fields_are_preserved() {
        let record = record_from(json!({"xrefs": [{"db": "miRBase"}], "count": 3}));
        assert!(record.fields.contains_key("xrefs"));
        assert_eq!(record.fields.get("count"), Some(&json!(3)));
        assert_eq!(record.rna_type(), None);
    }
}
