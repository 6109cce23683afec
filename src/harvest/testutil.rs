//! Scripted in-memory collaborators for harvest tests

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::extract::{HeaderCell, Table};
use crate::harvest::traits::{ChemicalFetcher, ChemicalPage, DetailFetcher, ListingFetcher, Sleeper};
use crate::model::FacilityReference;
use crate::{HarvestError, Result};

/// A scripted upstream response
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    /// Fails with the given HTTP status
    Status(u16),
}

impl<T: Clone> Reply<T> {
    fn into_result(self, url: &str) -> Result<T> {
        match self {
            Reply::Ok(value) => Ok(value),
            Reply::Status(status) => Err(HarvestError::Status {
                url: url.to_string(),
                status,
            }),
        }
    }
}

/// In-memory registry: listing pages by number, detail documents and
/// chemical pages by facility id
#[derive(Default)]
pub struct MockRegistry {
    listing: HashMap<u32, Reply<Vec<FacilityReference>>>,
    /// Replies consumed in order; the last one repeats
    details: Mutex<HashMap<String, VecDeque<Reply<String>>>>,
    chemicals: HashMap<String, Vec<ChemicalPage>>,
    /// Remaining scripted chemical failures per facility, with their status
    chemical_failures: Mutex<HashMap<String, (u32, u16)>>,
    pub listing_calls: Mutex<Vec<u32>>,
    pub detail_calls: Mutex<Vec<String>>,
    pub chemical_calls: Mutex<Vec<(String, u32)>>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listing_page(mut self, page: u32, ids: &[&str]) -> Self {
        let refs = ids
            .iter()
            .map(|id| FacilityReference {
                facility_id: id.to_string(),
                name_hint: format!("hint-{}", id),
                address_hint: format!("addr-{}", id),
            })
            .collect();
        self.listing.insert(page, Reply::Ok(refs));
        self
    }

    pub fn with_listing_failure(mut self, page: u32, status: u16) -> Self {
        self.listing.insert(page, Reply::Status(status));
        self
    }

    pub fn with_detail(self, id: &str, replies: Vec<Reply<String>>) -> Self {
        self.details
            .lock()
            .unwrap()
            .insert(id.to_string(), replies.into());
        self
    }

    pub fn with_chemical_pages(mut self, id: &str, pages: Vec<ChemicalPage>) -> Self {
        self.chemicals.insert(id.to_string(), pages);
        self
    }

    /// Fails the next `count` chemical requests of `id` with `status`
    pub fn with_chemical_failures(self, id: &str, count: u32, status: u16) -> Self {
        self.chemical_failures
            .lock()
            .unwrap()
            .insert(id.to_string(), (count, status));
        self
    }

    pub fn chemical_call_count(&self, id: &str) -> usize {
        self.chemical_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| c.as_str() == id)
            .count()
    }

    pub fn listing_call_count(&self) -> usize {
        self.listing_calls.lock().unwrap().len()
    }

    pub fn detail_call_count(&self, id: &str) -> usize {
        self.detail_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == id)
            .count()
    }
}

impl ListingFetcher for MockRegistry {
    async fn fetch_page(
        &self,
        _query: &str,
        _year: &str,
        page: u32,
        _page_size: u32,
    ) -> Result<Vec<FacilityReference>> {
        self.listing_calls.lock().unwrap().push(page);
        self.listing
            .get(&page)
            .cloned()
            .unwrap_or(Reply::Ok(Vec::new()))
            .into_result("mock://listing")
    }
}

impl DetailFetcher for MockRegistry {
    async fn fetch_detail(&self, facility_id: &str, _year: &str) -> Result<String> {
        self.detail_calls.lock().unwrap().push(facility_id.to_string());
        let reply = {
            let mut details = self.details.lock().unwrap();
            match details.get_mut(facility_id) {
                Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
                Some(queue) => queue.front().cloned().unwrap_or(Reply::Status(404)),
                None => Reply::Status(404),
            }
        };
        reply.into_result("mock://detail")
    }
}

impl ChemicalFetcher for MockRegistry {
    async fn fetch_chemical_page(
        &self,
        facility_id: &str,
        _year: &str,
        page_index: u32,
        _page_unit: u32,
    ) -> Result<ChemicalPage> {
        self.chemical_calls
            .lock()
            .unwrap()
            .push((facility_id.to_string(), page_index));

        let scripted = {
            let mut failures = self.chemical_failures.lock().unwrap();
            match failures.get_mut(facility_id) {
                Some((remaining, status)) if *remaining > 0 => {
                    *remaining -= 1;
                    Some(*status)
                }
                _ => None,
            }
        };
        if let Some(status) = scripted {
            return Reply::Status(status).into_result("mock://chemical");
        }

        Ok(self
            .chemicals
            .get(facility_id)
            .and_then(|pages| pages.get(page_index as usize - 1))
            .cloned()
            .unwrap_or_default())
    }
}

/// Sleeper that records requested durations and returns immediately
#[derive(Default)]
pub struct RecordingSleeper {
    pub sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn recorded(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// Sleeper that cancels `token` when asked to sleep, standing in for a
/// Ctrl-C arriving during a pause
pub struct CancellingSleeper {
    token: CancellationToken,
    pub sleeps: Mutex<Vec<Duration>>,
}

impl CancellingSleeper {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Sleeper for CancellingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        self.token.cancel();
    }
}

/// Detail page with an identity table naming the facility
pub fn detail_html(name: &str) -> String {
    format!(
        r#"<html><body><table class="view_table"><tbody>
            <tr><th>업체명</th><td>{}</td><th>대표자</th><td>홍길동</td></tr>
        </tbody></table></body></html>"#,
        name
    )
}

/// Chemical page with the given `(cas, input volume)` rows
pub fn chemical_page(total_count: Option<u64>, rows: &[(&str, &str)]) -> ChemicalPage {
    ChemicalPage {
        total_count,
        table: Table {
            header_rows: vec![vec![HeaderCell::new("CAS No."), HeaderCell::new("연간입고량")]],
            body_rows: rows
                .iter()
                .map(|(cas, volume)| vec![cas.to_string(), volume.to_string()])
                .collect(),
        },
    }
}
