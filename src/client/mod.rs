//! HTTP client for the registry endpoints
//!
//! This module handles all HTTP requests of a harvest, including:
//! - Building the shared HTTP client (user agent, referer, cookie store, timeouts)
//! - Form-encoded listing searches returning JSON
//! - Form-encoded detail requests returning HTML
//! - Paged chemical sub-list requests returning JSON
//!
//! One [`RegistryClient`] is the connection context of a run: cookies set by
//! the registry on one request are sent on the following ones.

mod chemical;

pub use chemical::rows_to_page;

use crate::config::{ChemicalConfig, Config, ListingConfig, UpstreamConfig};
use crate::harvest::{ChemicalFetcher, ChemicalPage, DetailFetcher, ListingFetcher};
use crate::model::FacilityReference;
use crate::{HarvestError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ORIGIN, REFERER};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The upstream configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &UpstreamConfig) -> std::result::Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    if let Ok(referer) = HeaderValue::from_str(&config.referer) {
        headers.insert(REFERER, referer);
    }
    if let Ok(origin) = HeaderValue::from_str(&config.origin) {
        headers.insert(ORIGIN, origin);
    }

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .cookie_store(true)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Registry client implementing the listing, detail and chemical fetchers
#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: Client,
    upstream: UpstreamConfig,
    listing: ListingConfig,
    chemical: ChemicalConfig,
}

impl RegistryClient {
    pub fn from_config(config: &Config) -> Result<Self> {
        let client =
            build_http_client(&config.upstream).map_err(|source| HarvestError::Transport {
                url: config.upstream.base_url.clone(),
                source,
            })?;

        Ok(Self {
            client,
            upstream: config.upstream.clone(),
            listing: config.listing.clone(),
            chemical: config.chemical.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.upstream.base_url.trim_end_matches('/'), path)
    }

    /// Sends a request and rejects non-success statuses
    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|source| HarvestError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    async fn fetch_json(&self, request: RequestBuilder, url: &str) -> Result<Value> {
        let body = self.fetch_text(request, url).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn fetch_text(&self, request: RequestBuilder, url: &str) -> Result<String> {
        self.send(request, url)
            .await?
            .text()
            .await
            .map_err(|source| HarvestError::Transport {
                url: url.to_string(),
                source,
            })
    }
}

/// Reads the array stored under `field`; a missing field is an empty array
fn array_field<'a>(body: &'a Value, field: &str) -> &'a [Value] {
    body.get(field)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

impl ListingFetcher for RegistryClient {
    async fn fetch_page(
        &self,
        query: &str,
        year: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<FacilityReference>> {
        let url = self.endpoint(&self.upstream.listing_path);

        let mut form: Vec<(String, String)> = self
            .listing
            .form
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        form.push((self.listing.year_field.clone(), year.to_string()));
        form.push((self.listing.query_field.clone(), query.to_string()));
        form.push((self.listing.page_field.clone(), page.to_string()));
        if let Some(field) = &self.listing.page_size_field {
            form.push((field.clone(), page_size.to_string()));
        }

        let request = self
            .client
            .post(&url)
            .header("X-Requested-With", "XMLHttpRequest")
            .form(&form);
        let body = self.fetch_json(request, &url).await?;

        let items = array_field(&body, &self.listing.items_field);
        let references = items
            .iter()
            .filter_map(|item| match FacilityReference::deserialize(item) {
                Ok(reference) => Some(reference),
                Err(e) => {
                    tracing::debug!("Skipping listing item without facility id: {}", e);
                    None
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            "Listing page {} returned {} facilities",
            page,
            references.len()
        );
        Ok(references)
    }
}

impl DetailFetcher for RegistryClient {
    async fn fetch_detail(&self, facility_id: &str, year: &str) -> Result<String> {
        let url = self.endpoint(&self.upstream.detail_path);
        let form = [("bplcId", facility_id), ("streNo", ""), ("searchYear", year)];

        let request = self.client.post(&url).form(&form);
        self.fetch_text(request, &url).await
    }
}

impl ChemicalFetcher for RegistryClient {
    async fn fetch_chemical_page(
        &self,
        facility_id: &str,
        year: &str,
        page_index: u32,
        page_unit: u32,
    ) -> Result<ChemicalPage> {
        let url = self.endpoint(&self.upstream.chemical_path);
        let page_index = page_index.to_string();
        let page_unit = page_unit.to_string();
        let query = [
            ("bplcId", facility_id),
            ("searchYear", year),
            ("pageIndex", page_index.as_str()),
            ("pageUnit", page_unit.as_str()),
        ];

        let request = self
            .client
            .get(&url)
            .header("X-Requested-With", "XMLHttpRequest")
            .query(&query);
        let body = self.fetch_json(request, &url).await?;

        let rows = array_field(&body, &self.chemical.rows_field);
        Ok(rows_to_page(
            rows,
            &self.chemical.key_labels,
            &self.chemical.total_count_field,
        ))
    }
}
