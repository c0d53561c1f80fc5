use httpmock::prelude::*;
use rna_enrich::core::Publication;
use rna_enrich::utils::error::EnrichError;
use rna_enrich::LitScanClient;
use std::time::Duration;

fn client_for(server: &MockServer) -> LitScanClient {
    LitScanClient::new(server.url("/rnacentral-litscan"), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_lookup_returns_hits_in_endpoint_order() {
    let server = MockServer::start();
    let search_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rnacentral-litscan")
            .query_param("fields", "title,pmcid")
            .query_param("format", "json");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "entries": [
                    {"fields": {"title": ["miR-21 in hepatocellular carcinoma"], "pmcid": ["PMC1111111"]}},
                    {"fields": {"title": ["lncRNA HOTAIR review"], "pmcid": ["PMC2222222"]}}
                ]
            }));
    });

    let client = client_for(&server);
    let publications = client.lookup(&["MIR21".to_string()]).await.unwrap();

    search_mock.assert();
    assert_eq!(
        publications,
        vec![
            Publication {
                title: "miR-21 in hepatocellular carcinoma".to_string(),
                pmcid: "PMC1111111".to_string(),
                link: "https://www.ncbi.nlm.nih.gov/pmc/articles/PMC1111111/".to_string(),
            },
            Publication {
                title: "lncRNA HOTAIR review".to_string(),
                pmcid: "PMC2222222".to_string(),
                link: "https://www.ncbi.nlm.nih.gov/pmc/articles/PMC2222222/".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn test_lookup_query_collapses_duplicates_into_sorted_terms() {
    let server = MockServer::start();
    let search_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rnacentral-litscan")
            .query_param("query", "job_id:\"HOTAIR\" OR job_id:\"MIR21\"");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"entries": []}));
    });

    let client = client_for(&server);
    let genes = vec![
        "MIR21".to_string(),
        "HOTAIR".to_string(),
        "MIR21".to_string(),
    ];
    let publications = client.lookup(&genes).await.unwrap();

    search_mock.assert();
    assert!(publications.is_empty());
}

#[tokio::test]
async fn test_lookup_treats_missing_entries_as_empty() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/rnacentral-litscan");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"hitCount": 0}));
    });

    let client = client_for(&server);
    let publications = client.lookup(&["XIST".to_string()]).await.unwrap();

    assert!(publications.is_empty());
}

#[tokio::test]
async fn test_lookup_http_error_propagates() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/rnacentral-litscan");
        then.status(500);
    });

    let client = client_for(&server);
    let err = client.lookup(&["MIR21".to_string()]).await.unwrap_err();

    assert!(matches!(err, EnrichError::HttpStatusError { status: 500, .. }));
}
