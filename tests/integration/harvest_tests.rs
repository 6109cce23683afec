//! End-to-end harvest tests against a mock registry

use crate::{
    chemical_body, detail_html, listing_body, test_config, CHEMICAL_PATH, DETAIL_PATH,
    LISTING_PATH,
};
use cdr_harvest::client::RegistryClient;
use cdr_harvest::output::{JsonFileSink, OutputSink, RunSummary};
use cdr_harvest::{Config, HarvestError, Harvester};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_listing(server: &MockServer, page: u32, ids: &[&str]) {
    Mock::given(method("POST"))
        .and(path(LISTING_PATH))
        .and(body_string_contains(format!("pageNo={}", page)))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_body(ids)))
        .mount(server)
        .await;
}

async fn mount_facility(server: &MockServer, id: &str, name: &str) {
    Mock::given(method("POST"))
        .and(path(DETAIL_PATH))
        .and(body_string_contains(format!("bplcId={}&", id)))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_html(name)))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(CHEMICAL_PATH))
        .and(query_param("bplcId", id))
        .respond_with(ResponseTemplate::new(200).set_body_json(chemical_body(&[("64-17-5", "10")])))
        .mount(server)
        .await;
}

fn harvester(config: &Config) -> Harvester<RegistryClient> {
    let client = RegistryClient::from_config(config).unwrap();
    Harvester::from_config(client, config, "test-hash").unwrap()
}

#[tokio::test]
async fn test_full_harvest_writes_dataset() {
    let mock_server = MockServer::start().await;
    mount_listing(&mock_server, 1, &["A1", "A2"]).await;
    mount_listing(&mock_server, 2, &[]).await;
    mount_facility(&mock_server, "A1", "Acme").await;
    mount_facility(&mock_server, "A2", "Beta").await;

    let config = test_config(&mock_server);
    let result = harvester(&config)
        .run("64-17-5", "2022", 10, Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(result.records.len(), 2);
    assert_eq!(result.metadata.succeeded, 2);
    assert_eq!(result.metadata.config_hash, "test-hash");

    let first = &result.records[0];
    assert_eq!(first.facility_id, "A1");
    assert_eq!(first.sequence, 1);
    assert_eq!(first.name_hint, "A1 Chem");
    assert_eq!(first.identity_fields.get("업체명").unwrap(), "Acme");
    assert_eq!(first.identity_fields.get("대표자").unwrap(), "홍길동");
    assert_eq!(first.substances.len(), 1);
    assert_eq!(first.substances[0].material_name.as_deref(), Some("에탄올"));
    assert_eq!(first.substances[0].cas_number.as_deref(), Some("64-17-5"));
    assert_eq!(first.substances[0].annual_input_volume.as_deref(), Some("10"));
    assert_eq!(first.substances[0].annual_usage_volume.as_deref(), Some("8"));
    assert_eq!(result.records[1].display_name(), "Beta");

    let dir = TempDir::new().unwrap();
    let path = JsonFileSink::in_directory(dir.path()).write(&result).unwrap();
    assert!(path.ends_with("64-17-5_2022_facilities.json"));

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written["records"][1]["facility_id"], "A2");
    assert_eq!(written["metadata"]["discovered"], 2);

    let summary = RunSummary::from_result(&result);
    assert_eq!(summary.total_substances, 2);
    assert_eq!(summary.preview, vec!["Acme", "Beta"]);
}

#[tokio::test]
async fn test_failed_detail_is_retried_then_recorded() {
    let mock_server = MockServer::start().await;
    mount_listing(&mock_server, 1, &["A1", "A2"]).await;
    mount_listing(&mock_server, 2, &[]).await;
    mount_facility(&mock_server, "A1", "Acme").await;

    Mock::given(method("POST"))
        .and(path(DETAIL_PATH))
        .and(body_string_contains("bplcId=A2&"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server);
    let result = harvester(&config)
        .run("64-17-5", "2022", 10, Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(result.records.len(), 2);
    assert!(result.records[0].is_success());

    let failed = &result.records[1];
    assert_eq!(failed.facility_id, "A2");
    assert_eq!(failed.attempts, 3);
    assert!(failed.error.as_deref().unwrap().contains("500"));
    assert!(failed.identity_fields.is_empty());
    assert_eq!(result.metadata.failed, 1);
}

#[tokio::test]
async fn test_max_companies_limits_retrieval() {
    let mock_server = MockServer::start().await;
    mount_listing(&mock_server, 1, &["A1", "A2", "A3"]).await;
    mount_facility(&mock_server, "A1", "Acme").await;

    Mock::given(method("POST"))
        .and(path(DETAIL_PATH))
        .and(body_string_contains("bplcId=A2&"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_html("Beta")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server);
    let result = harvester(&config)
        .run("64-17-5", "2022", 1, Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(result.metadata.discovered, 1);
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].facility_id, "A1");
}

#[tokio::test]
async fn test_no_matching_facilities() {
    let mock_server = MockServer::start().await;
    mount_listing(&mock_server, 1, &[]).await;

    Mock::given(method("POST"))
        .and(path(DETAIL_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server);
    let result = harvester(&config)
        .run("unknown", "2022", 10, Duration::ZERO)
        .await
        .unwrap();

    assert!(result.is_empty());
    assert_eq!(result.metadata.obtained, 0);

    let dir = TempDir::new().unwrap();
    let written = JsonFileSink::in_directory(dir.path())
        .write_non_empty(&result)
        .unwrap();
    assert_eq!(written, None);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_unreachable_registry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server);
    let err = harvester(&config)
        .run("64-17-5", "2022", 10, Duration::ZERO)
        .await
        .unwrap_err();

    assert!(matches!(err, HarvestError::Unreachable { .. }));
}
