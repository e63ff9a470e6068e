//! Test utilities: mock implementations of the core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::collections::{BTreeSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::catalog::Site;
use crate::error::AppError;
use crate::http::{HttpRequest, HttpResponse};
use crate::models::{JobType, Listing, ListingBatch, Location};
use crate::request::ScrapeRequest;
use crate::traits::{HttpTransport, Scraper};

// ---------------------------------------------------------------------------
// MockTransport
// ---------------------------------------------------------------------------

type Handler = dyn Fn(&HttpRequest) -> Result<HttpResponse, AppError> + Send + Sync;

/// Mock transport that answers from a queue or a routing closure and
/// records every request it receives.
#[derive(Clone)]
pub struct MockTransport {
    /// Queue of responses. Each call pops the front element.
    responses: Arc<Mutex<VecDeque<Result<HttpResponse, AppError>>>>,
    /// Consulted when the queue is empty.
    handler: Option<Arc<Handler>>,
    pub requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockTransport {
    /// Transport answering every request with `200` and `body`.
    pub fn new(body: &str) -> Self {
        let body = body.to_string();
        Self::with_handler(move |req| Ok(HttpResponse::new(200, req.url.clone(), body.clone())))
    }

    pub fn with_responses(responses: Vec<Result<HttpResponse, AppError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            handler: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_error(error: AppError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    /// Transport that computes each response from the request.
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, AppError> + Send + Sync + 'static,
    {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            handler: Some(Arc::new(handler)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn recorded(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpTransport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, AppError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(next) = self.responses.lock().unwrap().pop_front() {
            return next;
        }
        match &self.handler {
            Some(handler) => handler(&request),
            None => Err(AppError::Network(format!(
                "no canned response for {}",
                request.url
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// MockScraper
// ---------------------------------------------------------------------------

/// Mock adapter that returns a fixed batch (or error) and counts calls.
#[derive(Clone)]
pub struct MockScraper {
    site: Site,
    block_prone: bool,
    listings: Vec<Listing>,
    warnings: Vec<String>,
    error: Arc<Mutex<Option<AppError>>>,
    pub calls: Arc<Mutex<Vec<ScrapeRequest>>>,
}

impl MockScraper {
    pub fn new(site: Site, listings: Vec<Listing>) -> Self {
        Self {
            site,
            block_prone: false,
            listings,
            warnings: Vec::new(),
            error: Arc::new(Mutex::new(None)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn empty(site: Site) -> Self {
        Self::new(site, Vec::new())
    }

    /// Adapter whose next call fails with `error`.
    pub fn with_error(site: Site, error: AppError) -> Self {
        let mock = Self::empty(site);
        *mock.error.lock().unwrap() = Some(error);
        mock
    }

    pub fn block_prone(mut self) -> Self {
        self.block_prone = true;
        self
    }

    pub fn with_warning(mut self, warning: &str) -> Self {
        self.warnings.push(warning.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Scraper for MockScraper {
    fn site(&self) -> Site {
        self.site
    }

    fn is_block_prone(&self) -> bool {
        self.block_prone
    }

    async fn scrape(&self, request: &ScrapeRequest) -> Result<ListingBatch, AppError> {
        self.calls.lock().unwrap().push(request.clone());
        if let Some(e) = self.error.lock().unwrap().take() {
            return Err(e);
        }
        Ok(ListingBatch {
            listings: self.listings.clone(),
            warnings: self.warnings.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A minimal valid listing for `site` keyed by `key`.
pub fn sample_listing(site: Site, key: &str) -> Listing {
    Listing {
        id: format!("test-{key}"),
        site,
        title: format!("Engineer {key}"),
        description: Some("Build things with Rust".to_string()),
        company_name: Some("Acme".to_string()),
        company_url: Some("https://acme.test".to_string()),
        location: Some(Location::country("US")),
        job_types: vec![JobType::FullTime],
        compensation: None,
        date_posted: None,
        job_url: format!("https://acme.test/jobs/{key}"),
        emails: None,
        is_remote: false,
        skills: BTreeSet::new(),
    }
}
