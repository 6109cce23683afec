use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Main configuration structure for cdr-harvest
///
/// Every section is optional; missing sections and keys fall back to the
/// values that match the public registry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub upstream: UpstreamConfig,
    pub listing: ListingConfig,
    pub detail: DetailConfig,
    pub chemical: ChemicalConfig,
    pub harvest: HarvestConfig,
    pub output: OutputConfig,
}

/// Upstream endpoint and connection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Scheme and host of the registry, without a trailing slash
    #[serde(rename = "base-url")]
    pub base_url: String,

    #[serde(rename = "listing-path")]
    pub listing_path: String,

    #[serde(rename = "detail-path")]
    pub detail_path: String,

    #[serde(rename = "chemical-path")]
    pub chemical_path: String,

    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Sent as the Referer header on every request
    pub referer: String,

    /// Sent as the Origin header on every request
    pub origin: String,

    /// Total deadline for a single request (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://icis.me.go.kr".to_string(),
            listing_path: "/iprtr/cdrInfoDetailListJson.do".to_string(),
            detail_path: "/iprtr/cdrInfoView.do".to_string(),
            chemical_path: "/iprtr/cdrMttrListJson.do".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
            referer: "https://icis.me.go.kr/pageLink.do".to_string(),
            origin: "https://icis.me.go.kr".to_string(),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Facility listing (search) configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Number of facilities requested per listing page
    #[serde(rename = "page-size")]
    pub page_size: u32,

    /// Name of the JSON array holding the facilities in a listing response
    #[serde(rename = "items-field")]
    pub items_field: String,

    #[serde(rename = "year-field")]
    pub year_field: String,

    #[serde(rename = "query-field")]
    pub query_field: String,

    #[serde(rename = "page-field")]
    pub page_field: String,

    /// Form field carrying the page size; omitted from requests when unset
    #[serde(rename = "page-size-field")]
    pub page_size_field: Option<String>,

    /// Consecutive pages without a new facility before pagination gives up
    #[serde(rename = "max-stalled-pages")]
    pub max_stalled_pages: u32,

    /// Hard ceiling on the number of listing pages requested
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Static form fields sent with every listing request
    pub form: BTreeMap<String, String>,
}

impl Default for ListingConfig {
    fn default() -> Self {
        let form = [
            ("search3", ""),
            ("search4", ""),
            ("search5", "전체지역"),
            ("search6", ""),
            ("search7", "전체지역"),
            ("mttrGroup", ""),
            ("searchCategory", "03"),
            ("irsttList", ""),
            ("level", ""),
            ("indutyCode", ""),
            ("indutyCode2", ""),
            ("indutyCode3", ""),
            ("indutyCode4", ""),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            page_size: 10,
            items_field: "list".to_string(),
            year_field: "search1".to_string(),
            query_field: "searchMttrWord".to_string(),
            page_field: "pageNo".to_string(),
            page_size_field: None,
            max_stalled_pages: 3,
            max_pages: 1000,
            form,
        }
    }
}

/// Facility detail page configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetailConfig {
    /// CSS selectors for the identity table, in priority order
    #[serde(rename = "identity-selectors")]
    pub identity_selectors: Vec<String>,

    /// CSS selector used to recover the facility name from the page title
    #[serde(rename = "title-selector")]
    pub title_selector: String,

    /// Labels extracted from the identity table
    #[serde(rename = "identity-labels")]
    pub identity_labels: Vec<String>,

    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,
}

/// Label under which the facility name is stored in identity fields
pub const FACILITY_NAME_LABEL: &str = "업체명";

impl Default for DetailConfig {
    fn default() -> Self {
        Self {
            identity_selectors: vec![
                "table.view_table".to_string(),
                "table.viewTypeA".to_string(),
                "table.tbl_st3".to_string(),
            ],
            title_selector: "td.title strong".to_string(),
            identity_labels: [
                FACILITY_NAME_LABEL,
                "대표자",
                "소재지",
                "대표업종",
                "종업원수",
                "관할 환경청",
                "사업장 비상연락번호",
                "설립년도",
                "자본금",
                "매출액",
                "업종분류",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            max_attempts: 3,
            retry_delay_ms: 2000,
        }
    }
}

impl DetailConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Per-facility chemical sub-list configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChemicalConfig {
    /// Rows requested per chemical sub-list page
    #[serde(rename = "page-unit")]
    pub page_unit: u32,

    /// Hard ceiling on chemical pages fetched for one facility
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Row key carrying the server-declared total row count
    #[serde(rename = "total-count-field")]
    pub total_count_field: String,

    /// Name of the JSON array holding the rows of a chemical page
    #[serde(rename = "rows-field")]
    pub rows_field: String,

    /// Display labels for row keys, so header matching can locate them
    #[serde(rename = "key-labels")]
    pub key_labels: BTreeMap<String, String>,
}

impl Default for ChemicalConfig {
    fn default() -> Self {
        let key_labels = [
            ("mttrNm", "물질명"),
            ("casNo", "CAS No."),
            ("yrWrhsQy", "연간입고량"),
            ("yrUseSaleQy", "연간사용판매량"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            page_unit: 10,
            max_pages: 100,
            total_count_field: "totalCount".to_string(),
            rows_field: "result".to_string(),
            key_labels,
        }
    }
}

/// Defaults for a harvest run; command-line arguments override these
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Reporting year queried
    pub year: String,

    #[serde(rename = "max-companies")]
    pub max_companies: usize,

    /// Pause between consecutive facilities (milliseconds)
    #[serde(rename = "inter-request-delay-ms")]
    pub inter_request_delay_ms: u64,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            year: "2022".to_string(),
            max_companies: 10,
            inter_request_delay_ms: 1000,
        }
    }
}

impl HarvestConfig {
    pub fn inter_request_delay(&self) -> Duration {
        Duration::from_millis(self.inter_request_delay_ms)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the JSON dataset is written to
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
        }
    }
}
