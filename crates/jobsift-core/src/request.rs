use serde::Serialize;

use crate::catalog::{DEFAULT_COUNTRY, Site};
use crate::models::{DescriptionFormat, JobType};

pub const DEFAULT_RESULTS_WANTED: usize = 15;
pub const DEFAULT_DISTANCE: u32 = 50;
pub const MAX_DISTANCE: i64 = 200;

/// A fully resolved scrape request.
///
/// Only the Config Validator builds one from raw input, so every field
/// holds a concrete value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapeRequest {
    pub sites: Vec<Site>,
    /// `None` means no text filter.
    pub search_term: Option<String>,
    pub location: Option<String>,
    /// Canonical country alias from the catalog.
    pub country: String,
    /// `None` means no job-type filter.
    pub job_type: Option<JobType>,
    pub results_wanted: usize,
    pub offset: usize,
    /// Search radius in miles, 0–200.
    pub distance: u32,
    pub is_remote: bool,
    pub easy_apply: bool,
    pub fetch_full_description: bool,
    pub enforce_annual_salary: bool,
    /// Maximum listing age; `None` keeps everything.
    pub hours_old: Option<u32>,
    pub description_format: DescriptionFormat,
    pub proxies: Vec<String>,
    pub ca_cert: Option<String>,
}

impl Default for ScrapeRequest {
    fn default() -> Self {
        Self {
            sites: Vec::new(),
            search_term: None,
            location: None,
            country: DEFAULT_COUNTRY.to_string(),
            job_type: None,
            results_wanted: DEFAULT_RESULTS_WANTED,
            offset: 0,
            distance: DEFAULT_DISTANCE,
            is_remote: false,
            easy_apply: false,
            fetch_full_description: false,
            enforce_annual_salary: false,
            hours_old: None,
            description_format: DescriptionFormat::default(),
            proxies: Vec::new(),
            ca_cert: None,
        }
    }
}

impl ScrapeRequest {
    /// Request for the given sites with every other field defaulted.
    pub fn for_sites(sites: impl IntoIterator<Item = Site>) -> Self {
        Self {
            sites: sites.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_window(mut self, offset: usize, results_wanted: usize) -> Self {
        self.offset = offset;
        self.results_wanted = results_wanted;
        self
    }

    /// Number of candidates an adapter must gather to fill the window.
    pub fn candidates_needed(&self) -> usize {
        self.offset.saturating_add(self.results_wanted)
    }
}
