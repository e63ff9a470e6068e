//! Per-invocation helpers every adapter uses while assembling candidates:
//! identity dedup, client-side request filtering, and final windowing.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use crate::models::{JobType, Listing};
use crate::request::ScrapeRequest;

/// Identity keys seen during a single scrape call.
///
/// Create one per call; never store it on an adapter.
#[derive(Debug, Default)]
pub struct SeenKeys {
    keys: HashSet<String>,
}

impl SeenKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key`; returns false if it was already seen.
    pub fn insert(&mut self, key: &str) -> bool {
        if self.keys.contains(key) {
            return false;
        }
        self.keys.insert(key.to_string())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Client-side equivalent of the server-side filters a request asks for.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    search_term: Option<String>,
    location: Option<String>,
    job_type: Option<JobType>,
    remote_only: bool,
    posted_since: Option<NaiveDate>,
}

impl ListingFilter {
    /// Build the filter for `request`, measuring `hours_old` back from `now`.
    ///
    /// A window reaching past the representable calendar puts no limit on age.
    pub fn from_request(request: &ScrapeRequest, now: NaiveDateTime) -> Self {
        let lowered = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_lowercase)
        };
        Self {
            search_term: lowered(&request.search_term),
            location: lowered(&request.location),
            job_type: request.job_type,
            remote_only: request.is_remote,
            posted_since: request.hours_old.and_then(|hours| {
                TimeDelta::try_hours(i64::from(hours))
                    .and_then(|age| now.checked_sub_signed(age))
                    .map(|since| since.date())
            }),
        }
    }

    /// Case-insensitive substring match of the search term against `parts`
    /// joined by spaces. Always true without a search term.
    pub fn matches_search(&self, parts: &[&str]) -> bool {
        match &self.search_term {
            Some(term) => parts.join(" ").to_lowercase().contains(term.as_str()),
            None => true,
        }
    }

    /// Apply every configured filter to a normalized listing.
    ///
    /// Listings with no location or no posted date are not rejected by the
    /// location or age filters.
    pub fn accepts(&self, listing: &Listing) -> bool {
        let text_ok = self.matches_search(&[
            listing.title.as_str(),
            listing.description.as_deref().unwrap_or(""),
            listing.company_name.as_deref().unwrap_or(""),
        ]);

        let location_ok = match (&self.location, &listing.location) {
            (Some(wanted), Some(loc)) => loc.search_text().to_lowercase().contains(wanted.as_str()),
            _ => true,
        };

        let job_type_ok = self
            .job_type
            .is_none_or(|wanted| listing.job_types.contains(&wanted));

        let remote_ok = !self.remote_only || listing.is_remote;

        let age_ok = match (self.posted_since, listing.date_posted) {
            (Some(since), Some(posted)) => posted >= since,
            _ => true,
        };

        text_ok && location_ok && job_type_ok && remote_ok && age_ok
    }
}

/// Slice `candidates[offset .. offset + results_wanted]`, clamped to the
/// available length.
pub fn window<T>(candidates: Vec<T>, offset: usize, results_wanted: usize) -> Vec<T> {
    candidates
        .into_iter()
        .skip(offset)
        .take(results_wanted)
        .collect()
}
