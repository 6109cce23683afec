//! Integration tests for cdr-harvest
//!
//! These tests use wiremock to stand in for the registry and exercise the
//! HTTP client and the full harvest cycle end-to-end.

mod client_tests;
mod harvest_tests;

use cdr_harvest::config::Config;
use serde_json::json;
use wiremock::MockServer;

pub const LISTING_PATH: &str = "/iprtr/cdrInfoDetailListJson.do";
pub const DETAIL_PATH: &str = "/iprtr/cdrInfoView.do";
pub const CHEMICAL_PATH: &str = "/iprtr/cdrMttrListJson.do";

/// Creates a configuration pointing at the mock registry
pub fn test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.upstream.base_url = server.uri();
    config.upstream.request_timeout_secs = 5;
    config.detail.retry_delay_ms = 10;
    config.harvest.inter_request_delay_ms = 0;
    config
}

/// Listing response body for the given facility ids
pub fn listing_body(ids: &[&str]) -> serde_json::Value {
    let items: Vec<_> = ids
        .iter()
        .map(|id| json!({"bplcId": id, "bplcNm": format!("{} Chem", id), "addr": "Seoul"}))
        .collect();
    json!({ "list": items })
}

/// Detail document with a labelled identity table
pub fn detail_html(name: &str) -> String {
    format!(
        r#"<html><body>
        <table class="view_table"><tbody>
            <tr><th>업체명</th><td>{}</td><th>대표자</th><td>홍길동</td></tr>
            <tr><th>주소</th><td>서울특별시 중구</td></tr>
        </tbody></table>
        </body></html>"#,
        name
    )
}

/// Chemical sub-list body with the given `(cas, input volume)` rows
pub fn chemical_body(rows: &[(&str, &str)]) -> serde_json::Value {
    let total = rows.len().to_string();
    let rows: Vec<_> = rows
        .iter()
        .map(|(cas, volume)| {
            json!({
                "totalCount": total,
                "mttrNm": "에탄올",
                "casNo": cas,
                "yrWrhsQy": volume,
                "yrUseSaleQy": "8",
            })
        })
        .collect();
    json!({ "result": rows })
}
