//! Paginated REST adapter for the JSJobbs job board.
//!
//! The API has no server-side search, so every page is filtered locally.
//! A one-record probe asks for the total count first; pagination then
//! stops at that count, at the requested window, or at the first empty
//! page, whichever comes first.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use jobsift_core::collect::{ListingFilter, SeenKeys, window};
use jobsift_core::error::AppError;
use jobsift_core::http::HttpRequest;
use jobsift_core::models::{
    Compensation, CompensationInterval, JobType, Listing, ListingBatch, Location,
};
use jobsift_core::normalize::{
    detect_remote, extract_emails, extract_skills_from_description, is_email,
    render_description, salary::DEFAULT_CURRENCY,
};
use jobsift_core::traits::{HttpTransport, Scraper};
use jobsift_core::{ScrapeRequest, Site};

use crate::session::{DEFAULT_USER_AGENT, RotatingSession};

pub const DEFAULT_BASE_URL: &str = "https://jsjobbs.com/api/jobs";

pub const PAGE_SIZE: usize = 100;
pub const PROBE_PAGE_SIZE: usize = 1;
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
pub const PAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// `workplaceType` code for on-site roles.
pub const ON_SITE_CODE: i64 = 10;

const ID_PREFIX: &str = "js-";

#[derive(Debug, Deserialize)]
struct PageEnvelope {
    count: Option<u64>,
    jobs: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobRecord {
    public_id: Option<Value>,
    title: Option<String>,
    description: Option<String>,
    apply_link_or_email: Option<String>,
    job_type: Option<i64>,
    date_created: Option<i64>,
    date_published: Option<i64>,
    company: Option<CompanyRecord>,
    applicant_locations: Option<Vec<LocationRecord>>,
    tags: Option<Vec<TagRecord>>,
    min_salary: Option<f64>,
    max_salary: Option<f64>,
    workplace_type: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct CompanyRecord {
    name: Option<String>,
    website: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LocationRecord {
    abbreviation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagRecord {
    name: Option<String>,
}

/// JSJobbs adapter over any [`HttpTransport`].
pub struct JsJobbs<T = RotatingSession> {
    transport: T,
    base_url: String,
}

impl<T: HttpTransport> JsJobbs<T> {
    pub fn new(transport: T) -> Self {
        Self::with_base_url(transport, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(transport: T, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    fn page_request(&self, page: usize, page_size: usize) -> HttpRequest {
        HttpRequest::get(&self.base_url)
            .header("Accept", "application/json")
            .header("User-Agent", DEFAULT_USER_AGENT)
            .query("pageNum", page)
            .query("pageSize", page_size)
    }

    /// Total listing count, or `None` if the probe fails or omits it.
    async fn probe_total(&self) -> Option<u64> {
        let request = self
            .page_request(1, PROBE_PAGE_SIZE)
            .timeout(PROBE_TIMEOUT);
        match self.transport.execute(request).await {
            Ok(response) if response.is_ok() => match response.json::<PageEnvelope>() {
                Ok(envelope) => envelope.count,
                Err(e) => {
                    warn!(error = %e, "Count probe returned an unreadable body");
                    None
                }
            },
            Ok(response) => {
                warn!(status = response.status, "Count probe failed");
                None
            }
            Err(e) => {
                warn!(error = %e, "Count probe failed");
                None
            }
        }
    }

    async fn fetch_page(&self, page: usize) -> Result<Vec<Value>, AppError> {
        let request = self.page_request(page, PAGE_SIZE).timeout(PAGE_TIMEOUT);
        let response = self.transport.execute(request).await?.error_for_status()?;
        let envelope: PageEnvelope = response.json()?;
        Ok(envelope.jobs.unwrap_or_default())
    }
}

#[async_trait]
impl<T: HttpTransport> Scraper for JsJobbs<T> {
    fn site(&self) -> Site {
        Site::JsJobbs
    }

    fn is_block_prone(&self) -> bool {
        true
    }

    async fn scrape(&self, request: &ScrapeRequest) -> Result<ListingBatch, AppError> {
        let filter = ListingFilter::from_request(request, Utc::now().naive_utc());
        let mut seen = SeenKeys::new();
        let mut candidates: Vec<Listing> = Vec::new();
        let mut warnings = Vec::new();

        let total = self.probe_total().await;
        match total {
            Some(total) => info!(total, "Total jobs available"),
            None => warn!("Could not determine total job count; paging until empty"),
        }

        let needed = request.candidates_needed();
        let mut fetched: u64 = 0;
        let mut page = 1;

        while total.is_none_or(|total| fetched < total) && seen.len() < needed {
            info!(page, fetched, "Fetching page");
            let records = match self.fetch_page(page).await {
                Ok(records) => records,
                Err(e) if page == 1 => return Err(e),
                Err(e) => {
                    warn!(page, error = %e, "Page fetch failed; keeping partial results");
                    warnings.push(format!("pagination stopped at page {page}: {e}"));
                    break;
                }
            };
            if records.is_empty() {
                info!(page, "No jobs on page");
                break;
            }
            fetched += records.len() as u64;

            for raw in records {
                let record: JobRecord = match serde_json::from_value(raw) {
                    Ok(record) => record,
                    Err(e) => {
                        debug!(page, error = %e, "Skipping malformed job record");
                        continue;
                    }
                };
                let Some(key) = record
                    .apply_link_or_email
                    .as_deref()
                    .map(str::trim)
                    .filter(|key| !key.is_empty())
                    .map(str::to_string)
                else {
                    debug!(page, "Skipping job record without an apply link");
                    continue;
                };
                if !seen.insert(&key) {
                    continue;
                }

                let listing = to_listing(record, key, request);
                if filter.accepts(&listing) {
                    candidates.push(listing);
                }
            }
            page += 1;
        }

        info!(fetched, candidates = candidates.len(), "Finished scraping");
        let mut batch = ListingBatch::new(window(
            candidates,
            request.offset,
            request.results_wanted,
        ));
        batch.warnings = warnings;
        Ok(batch)
    }
}

fn to_listing(record: JobRecord, job_url: String, request: &ScrapeRequest) -> Listing {
    let description = record
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .map(|html| render_description(html, request.description_format));

    let mut skills = extract_skills_from_description(description.as_deref().unwrap_or(""));
    skills.extend(
        record
            .tags
            .unwrap_or_default()
            .into_iter()
            .filter_map(|tag| tag.name)
            .filter(|name| !name.trim().is_empty()),
    );

    let mut emails = description
        .as_deref()
        .and_then(extract_emails)
        .unwrap_or_default();
    if is_email(&job_url) && !emails.contains(&job_url) {
        emails.push(job_url.clone());
    }

    let (company_name, company_url) = match record.company {
        Some(company) => (company.name, company.website),
        None => (None, None),
    };

    let location = record
        .applicant_locations
        .unwrap_or_default()
        .into_iter()
        .next()
        .map(|loc| Location {
            country: loc.abbreviation,
            city: None,
            state: None,
        });

    let is_remote = detect_remote(
        record.workplace_type.map(|code| code != ON_SITE_CODE),
        description.as_deref(),
    );

    Listing {
        id: format!("{ID_PREFIX}{}", public_id_text(record.public_id)),
        site: Site::JsJobbs,
        title: record.title.unwrap_or_default(),
        company_name,
        company_url,
        location,
        job_types: vec![record.job_type.map_or(JobType::FullTime, JobType::from_code)],
        compensation: compensation(record.min_salary, record.max_salary),
        date_posted: record
            .date_created
            .or(record.date_published)
            .and_then(date_from_millis),
        job_url,
        emails: (!emails.is_empty()).then_some(emails),
        is_remote,
        skills,
        description,
    }
}

/// Yearly USD compensation when either bound is present and non-zero.
fn compensation(min: Option<f64>, max: Option<f64>) -> Option<Compensation> {
    let min = min.filter(|v| *v != 0.0);
    let max = max.filter(|v| *v != 0.0);
    if min.is_none() && max.is_none() {
        return None;
    }
    Some(Compensation {
        interval: CompensationInterval::Yearly,
        min_amount: min,
        max_amount: max,
        currency: DEFAULT_CURRENCY.to_string(),
    })
}

/// `publicId` arrives as a string or a number depending on the record's age.
fn public_id_text(value: Option<Value>) -> String {
    match value {
        Some(Value::String(id)) => id,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn date_from_millis(millis: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.date_naive())
}
