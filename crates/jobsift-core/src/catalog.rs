//! Static catalogs of supported sources, countries, and job types.
//!
//! The Config Validator checks raw requests against these tables, and the
//! boundary layer uses them to enrich error responses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::JobType;

/// A source the dispatch layer knows how to scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    /// Paginated REST job board.
    JsJobbs,
    /// GraphQL product-launch feed.
    ProductHunt,
}

impl Site {
    pub const ALL: [Site; 2] = [Site::JsJobbs, Site::ProductHunt];

    pub fn as_str(&self) -> &'static str {
        match self {
            Site::JsJobbs => "jsjobbs",
            Site::ProductHunt => "producthunt",
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Site {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Site::ALL
            .into_iter()
            .find(|site| site.as_str() == s)
            .ok_or_else(|| format!("Unknown site: {s}"))
    }
}

/// Country used when a request does not name one.
pub const DEFAULT_COUNTRY: &str = "usa";

/// Supported countries. Each entry is a comma-separated alias group; the
/// first alias is the canonical value.
pub const COUNTRIES: &[&str] = &[
    "argentina",
    "australia",
    "austria",
    "bahrain",
    "belgium",
    "brazil",
    "canada",
    "chile",
    "china",
    "colombia",
    "costa rica",
    "czech republic, czechia",
    "denmark",
    "ecuador",
    "egypt",
    "finland",
    "france",
    "germany",
    "greece",
    "hong kong",
    "hungary",
    "india",
    "indonesia",
    "ireland",
    "israel",
    "italy",
    "japan",
    "kuwait",
    "luxembourg",
    "malaysia",
    "mexico",
    "morocco",
    "netherlands",
    "new zealand",
    "nigeria",
    "norway",
    "oman",
    "pakistan",
    "panama",
    "peru",
    "philippines",
    "poland",
    "portugal",
    "qatar",
    "romania",
    "saudi arabia",
    "singapore",
    "south africa",
    "south korea",
    "spain",
    "sweden",
    "switzerland",
    "taiwan",
    "thailand",
    "türkiye, turkey",
    "ukraine",
    "united arab emirates",
    "uk, united kingdom",
    "usa, us, united states",
    "uruguay",
    "venezuela",
    "vietnam",
    "usa/ca",
    "worldwide",
];

/// Match a user-supplied country against [`COUNTRIES`], case-insensitively.
///
/// Returns the canonical (first) alias of the matching group.
pub fn match_country(input: &str) -> Option<&'static str> {
    let needle = input.trim().to_lowercase();
    COUNTRIES.iter().find_map(|entry| {
        let canonical = entry.split(',').next()?.trim();
        entry
            .split(',')
            .any(|alias| alias.trim().to_lowercase() == needle)
            .then_some(canonical)
    })
}

pub fn supported_sites() -> Vec<&'static str> {
    Site::ALL.iter().map(Site::as_str).collect()
}

pub fn supported_countries() -> Vec<&'static str> {
    COUNTRIES.to_vec()
}

pub fn supported_job_types() -> Vec<&'static str> {
    JobType::ALL.iter().map(JobType::as_str).collect()
}

/// Counts and contents of every catalog, for the boundary's info endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogStats {
    pub supported_sites_count: usize,
    pub supported_countries_count: usize,
    pub supported_job_types_count: usize,
    pub supported_sites: Vec<&'static str>,
    pub supported_countries: Vec<&'static str>,
    pub supported_job_types: Vec<&'static str>,
}

pub fn stats() -> CatalogStats {
    let supported_sites = supported_sites();
    let supported_countries = supported_countries();
    let supported_job_types = supported_job_types();
    CatalogStats {
        supported_sites_count: supported_sites.len(),
        supported_countries_count: supported_countries.len(),
        supported_job_types_count: supported_job_types.len(),
        supported_sites,
        supported_countries,
        supported_job_types,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_round_trips_through_str() {
        for site in Site::ALL {
            assert_eq!(site.as_str().parse::<Site>().unwrap(), site);
        }
        assert!("linkedin".parse::<Site>().is_err());
    }

    #[test]
    fn country_alias_cleans_to_first_entry() {
        assert_eq!(match_country("uk"), Some("uk"));
        assert_eq!(match_country("United Kingdom"), Some("uk"));
        assert_eq!(match_country("US"), Some("usa"));
        assert_eq!(match_country("united states"), Some("usa"));
        assert_eq!(match_country("turkey"), Some("türkiye"));
        assert_eq!(match_country("atlantis"), None);
    }

    #[test]
    fn default_country_is_in_catalog() {
        assert_eq!(match_country(DEFAULT_COUNTRY), Some(DEFAULT_COUNTRY));
    }

    #[test]
    fn stats_counts_match_lists() {
        let stats = stats();
        assert_eq!(stats.supported_sites_count, 2);
        assert_eq!(stats.supported_job_types_count, 4);
        assert_eq!(stats.supported_countries_count, COUNTRIES.len());
    }
}
