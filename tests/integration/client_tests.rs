//! Tests for the registry HTTP client against a mock server

use crate::{chemical_body, detail_html, test_config, CHEMICAL_PATH, DETAIL_PATH, LISTING_PATH};
use cdr_harvest::client::RegistryClient;
use cdr_harvest::harvest::{ChemicalFetcher, DetailFetcher, ListingFetcher};
use cdr_harvest::HarvestError;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_listing_sends_search_form() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LISTING_PATH))
        .and(header("X-Requested-With", "XMLHttpRequest"))
        .and(body_string_contains("search1=2022"))
        .and(body_string_contains("searchMttrWord=64-17-5"))
        .and(body_string_contains("pageNo=3"))
        .and(body_string_contains("searchCategory=03"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "list": [
                {"bplcId": "A1", "bplcNm": "Acme", "addr": "Seoul"},
                {"bplcNm": "No id"},
                {"bplcId": "A2"}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = RegistryClient::from_config(&test_config(&mock_server)).unwrap();
    let page = client.fetch_page("64-17-5", "2022", 3, 10).await.unwrap();

    assert_eq!(page.len(), 2);
    assert_eq!(page[0].facility_id, "A1");
    assert_eq!(page[0].name_hint, "Acme");
    assert_eq!(page[0].address_hint, "Seoul");
    assert_eq!(page[1].facility_id, "A2");
    assert_eq!(page[1].name_hint, "");
}

#[tokio::test]
async fn test_listing_without_items_field_is_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"totalCount": 0})))
        .mount(&mock_server)
        .await;

    let client = RegistryClient::from_config(&test_config(&mock_server)).unwrap();
    let page = client.fetch_page("q", "2022", 1, 10).await.unwrap();

    assert!(page.is_empty());
}

#[tokio::test]
async fn test_listing_status_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = RegistryClient::from_config(&test_config(&mock_server)).unwrap();
    let err = client.fetch_page("q", "2022", 1, 10).await.unwrap_err();

    assert!(matches!(err, HarvestError::Status { status: 503, .. }));
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_listing_malformed_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let client = RegistryClient::from_config(&test_config(&mock_server)).unwrap();
    let err = client.fetch_page("q", "2022", 1, 10).await.unwrap_err();

    assert!(matches!(err, HarvestError::Json(_)));
}

#[tokio::test]
async fn test_detail_posts_facility_form() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(DETAIL_PATH))
        .and(body_string_contains("bplcId=A1"))
        .and(body_string_contains("searchYear=2021"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_html("Acme")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = RegistryClient::from_config(&test_config(&mock_server)).unwrap();
    let html = client.fetch_detail("A1", "2021").await.unwrap();

    assert!(html.contains("Acme"));
}

#[tokio::test]
async fn test_chemical_page_query_and_parse() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CHEMICAL_PATH))
        .and(query_param("bplcId", "A1"))
        .and(query_param("searchYear", "2022"))
        .and(query_param("pageIndex", "2"))
        .and(query_param("pageUnit", "10"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chemical_body(&[("64-17-5", "10"), ("7722-84-1", "3")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = RegistryClient::from_config(&test_config(&mock_server)).unwrap();
    let page = client.fetch_chemical_page("A1", "2022", 2, 10).await.unwrap();

    assert_eq!(page.total_count, Some(2));
    assert_eq!(page.table.body_rows.len(), 2);
    assert!(page.table.header_text().contains("CAS No."));
}
