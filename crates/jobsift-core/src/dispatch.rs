//! Dispatch wrapper: runs the adapters a validated request names, one after
//! the other, and classifies the merged outcome for the boundary.

use std::time::Instant;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::catalog::Site;
use crate::models::Listing;
use crate::registry::ScraperRegistry;
use crate::request::ScrapeRequest;
use crate::validate::validate;

pub const NO_RESULTS_MESSAGE: &str = "No jobs found matching the criteria";

/// Note attached to a block-prone site that came back empty while others did not.
pub const BLOCKED_WARNING: &str = "no results; the source may be blocking requests";

pub const BLOCKED_SUGGESTION: &str =
    "The source may be rate limiting or blocking automated requests. \
     Try again later, use proxies, or choose a different source.";

/// Failure classes the boundary maps to response codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ValidationError,
    SiteBlocking,
    ScrapingError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "validation_error",
            ErrorKind::SiteBlocking => "site_blocking",
            ErrorKind::ScrapingError => "scraping_error",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            ErrorKind::ValidationError => 400,
            ErrorKind::SiteBlocking | ErrorKind::ScrapingError => 503,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One adapter that raised instead of returning a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteError {
    pub site: Site,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScrapeReport {
    pub success: bool,
    pub listings: Vec<Listing>,
    pub total_count: usize,
    pub elapsed_seconds: f64,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scraping_errors: Vec<SiteError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub config_used: ScrapeRequest,
}

#[derive(Debug, Clone, Serialize)]
pub struct DispatchFailure {
    pub success: bool,
    pub error_kind: ErrorKind,
    pub detail: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validation_errors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scraping_errors: Vec<SiteError>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl DispatchFailure {
    fn new(error_kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            success: false,
            error_kind,
            detail: detail.into(),
            validation_errors: Vec::new(),
            scraping_errors: Vec::new(),
            warnings: Vec::new(),
            suggestion: None,
        }
    }
}

/// Result of one dispatch. Serializes to the flat `{success: ...}` shape.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DispatchOutcome {
    Success(ScrapeReport),
    Failure(DispatchFailure),
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DispatchOutcome::Success(_))
    }

    /// Status code the boundary should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            DispatchOutcome::Success(_) => 200,
            DispatchOutcome::Failure(failure) => failure.error_kind.http_status(),
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            DispatchOutcome::Success(_) => None,
            DispatchOutcome::Failure(failure) => Some(failure.error_kind),
        }
    }

    pub fn listings(&self) -> &[Listing] {
        match self {
            DispatchOutcome::Success(report) => &report.listings,
            DispatchOutcome::Failure(_) => &[],
        }
    }
}

pub struct Dispatcher {
    registry: ScraperRegistry,
}

impl Dispatcher {
    pub fn new(registry: ScraperRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ScraperRegistry {
        &self.registry
    }

    /// Validate a raw configuration, then dispatch it.
    ///
    /// Invalid input never reaches the network.
    pub async fn run(&self, raw: &Value) -> DispatchOutcome {
        let validation = validate(raw);
        if !validation.is_valid {
            warn!(errors = ?validation.errors, "Configuration rejected");
            let mut failure =
                DispatchFailure::new(ErrorKind::ValidationError, "Configuration validation failed");
            failure.validation_errors = validation.errors;
            failure.warnings = validation.warnings;
            return DispatchOutcome::Failure(failure);
        }

        let mut outcome = self.dispatch(&validation.cleaned_config).await;
        let mut merged = validation.warnings;
        if !merged.is_empty() {
            let warnings = match &mut outcome {
                DispatchOutcome::Success(report) => &mut report.warnings,
                DispatchOutcome::Failure(failure) => &mut failure.warnings,
            };
            merged.append(warnings);
            *warnings = merged;
        }
        outcome
    }

    /// Run every requested adapter in order and merge their batches.
    pub async fn dispatch(&self, request: &ScrapeRequest) -> DispatchOutcome {
        if request.sites.is_empty() {
            let mut failure =
                DispatchFailure::new(ErrorKind::ValidationError, "Configuration validation failed");
            failure.validation_errors.push("source is required".to_string());
            return DispatchOutcome::Failure(failure);
        }

        let started = Instant::now();
        let mut listings: Vec<Listing> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();
        let mut errors: Vec<SiteError> = Vec::new();
        let mut empty_block_prone: Vec<Site> = Vec::new();
        let mut succeeded = 0usize;

        for &site in &request.sites {
            let scraper = match self.registry.build(site, request) {
                Ok(scraper) => scraper,
                Err(e) => {
                    warn!(site = %site, error = %e, "No adapter for site");
                    errors.push(SiteError {
                        site,
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            info!(site = %site, "Scraping");
            match scraper.scrape(request).await {
                Ok(batch) => {
                    succeeded += 1;
                    info!(site = %site, count = batch.len(), "Site finished");
                    if batch.is_empty() && scraper.is_block_prone() {
                        empty_block_prone.push(site);
                    }
                    warnings.extend(batch.warnings.into_iter().map(|w| format!("{site}: {w}")));
                    listings.extend(batch.listings);
                }
                Err(e) => {
                    warn!(site = %site, error = %e, "Site failed");
                    errors.push(SiteError {
                        site,
                        error: e.to_string(),
                    });
                }
            }
        }

        if request.enforce_annual_salary {
            for listing in &mut listings {
                if let Some(comp) = listing.compensation.as_mut() {
                    *comp = comp.to_annual();
                }
            }
        }

        let elapsed_seconds = started.elapsed().as_secs_f64();

        if listings.is_empty() {
            if !empty_block_prone.is_empty() {
                let names: Vec<&str> = empty_block_prone.iter().map(Site::as_str).collect();
                let mut failure = DispatchFailure::new(
                    ErrorKind::SiteBlocking,
                    format!(
                        "No results from {}; the source may be blocking requests",
                        names.join(", ")
                    ),
                );
                failure.suggestion = Some(BLOCKED_SUGGESTION.to_string());
                failure.scraping_errors = errors;
                failure.warnings = warnings;
                return DispatchOutcome::Failure(failure);
            }
            if succeeded == 0 {
                let mut failure =
                    DispatchFailure::new(ErrorKind::ScrapingError, "All requested sources failed");
                failure.scraping_errors = errors;
                failure.warnings = warnings;
                return DispatchOutcome::Failure(failure);
            }
        }

        for site in &empty_block_prone {
            warnings.push(format!("{site}: {BLOCKED_WARNING}"));
        }
        for e in &errors {
            warnings.push(format!("{} failed: {}", e.site, e.error));
        }

        let message = listings.is_empty().then(|| NO_RESULTS_MESSAGE.to_string());
        info!(total = listings.len(), elapsed_seconds, "Dispatch finished");

        DispatchOutcome::Success(ScrapeReport {
            success: true,
            total_count: listings.len(),
            listings,
            elapsed_seconds,
            warnings,
            scraping_errors: errors,
            message,
            config_used: request.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::AppError;
    use crate::models::{Compensation, CompensationInterval};
    use crate::testutil::{MockScraper, sample_listing};
    use crate::traits::Scraper;

    fn registry_with(mocks: Vec<MockScraper>) -> ScraperRegistry {
        let mut registry = ScraperRegistry::new();
        for mock in mocks {
            let site = mock.site();
            registry.register(site, move |_| Box::new(mock.clone()) as Box<dyn Scraper>);
        }
        registry
    }

    #[tokio::test]
    async fn merges_sites_in_request_order() {
        let dispatcher = Dispatcher::new(registry_with(vec![
            MockScraper::new(Site::JsJobbs, vec![sample_listing(Site::JsJobbs, "a")]),
            MockScraper::new(Site::ProductHunt, vec![sample_listing(Site::ProductHunt, "b")]),
        ]));
        let request = ScrapeRequest::for_sites([Site::ProductHunt, Site::JsJobbs]);

        let DispatchOutcome::Success(report) = dispatcher.dispatch(&request).await else {
            panic!("expected success");
        };
        assert_eq!(report.total_count, 2);
        assert_eq!(report.listings[0].site, Site::ProductHunt);
        assert_eq!(report.listings[1].site, Site::JsJobbs);
        assert!(report.elapsed_seconds >= 0.0);
        assert_eq!(report.config_used, request);
    }

    #[tokio::test]
    async fn one_failing_site_does_not_sink_the_rest() {
        let dispatcher = Dispatcher::new(registry_with(vec![
            MockScraper::with_error(Site::JsJobbs, AppError::Network("refused".into())),
            MockScraper::new(Site::ProductHunt, vec![sample_listing(Site::ProductHunt, "b")]),
        ]));
        let request = ScrapeRequest::for_sites([Site::JsJobbs, Site::ProductHunt]);

        let DispatchOutcome::Success(report) = dispatcher.dispatch(&request).await else {
            panic!("expected success");
        };
        assert_eq!(report.total_count, 1);
        assert_eq!(report.scraping_errors.len(), 1);
        assert_eq!(report.scraping_errors[0].site, Site::JsJobbs);
        assert!(report.warnings.iter().any(|w| w.contains("refused")));
    }

    #[tokio::test]
    async fn all_sites_failing_is_a_scraping_error() {
        let dispatcher = Dispatcher::new(registry_with(vec![MockScraper::with_error(
            Site::ProductHunt,
            AppError::Timeout(30),
        )]));
        let outcome = dispatcher
            .dispatch(&ScrapeRequest::for_sites([Site::ProductHunt]))
            .await;
        assert_eq!(outcome.error_kind(), Some(ErrorKind::ScrapingError));
        assert_eq!(outcome.http_status(), 503);
    }

    #[tokio::test]
    async fn empty_block_prone_site_is_site_blocking() {
        let dispatcher = Dispatcher::new(registry_with(vec![
            MockScraper::empty(Site::JsJobbs).block_prone(),
        ]));
        let outcome = dispatcher
            .dispatch(&ScrapeRequest::for_sites([Site::JsJobbs]))
            .await;
        let DispatchOutcome::Failure(failure) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(failure.error_kind, ErrorKind::SiteBlocking);
        assert!(failure.suggestion.is_some());
        assert!(failure.detail.contains("jsjobbs"));
    }

    #[tokio::test]
    async fn empty_block_prone_site_is_flagged_beside_other_results() {
        let dispatcher = Dispatcher::new(registry_with(vec![
            MockScraper::empty(Site::JsJobbs).block_prone(),
            MockScraper::new(Site::ProductHunt, vec![sample_listing(Site::ProductHunt, "b")]),
        ]));
        let outcome = dispatcher
            .dispatch(&ScrapeRequest::for_sites([Site::JsJobbs, Site::ProductHunt]))
            .await;
        let DispatchOutcome::Success(report) = outcome else {
            panic!("expected success");
        };
        assert_eq!(report.total_count, 1);
        assert_eq!(report.warnings, vec![format!("jsjobbs: {BLOCKED_WARNING}")]);
        assert!(report.scraping_errors.is_empty());
    }

    #[tokio::test]
    async fn adapter_warnings_are_prefixed_with_their_site() {
        let dispatcher = Dispatcher::new(registry_with(vec![
            MockScraper::new(Site::JsJobbs, vec![sample_listing(Site::JsJobbs, "a")])
                .with_warning("pagination stopped at page 2"),
        ]));
        let outcome = dispatcher
            .dispatch(&ScrapeRequest::for_sites([Site::JsJobbs]))
            .await;
        let DispatchOutcome::Success(report) = outcome else {
            panic!("expected success");
        };
        assert_eq!(report.total_count, 1);
        assert_eq!(report.warnings, vec!["jsjobbs: pagination stopped at page 2"]);
    }

    #[tokio::test]
    async fn empty_ordinary_site_is_success_with_message() {
        let dispatcher =
            Dispatcher::new(registry_with(vec![MockScraper::empty(Site::ProductHunt)]));
        let outcome = dispatcher
            .dispatch(&ScrapeRequest::for_sites([Site::ProductHunt]))
            .await;
        let DispatchOutcome::Success(report) = outcome else {
            panic!("expected success");
        };
        assert_eq!(report.total_count, 0);
        assert_eq!(report.message.as_deref(), Some(NO_RESULTS_MESSAGE));
    }

    #[tokio::test]
    async fn missing_adapter_is_recorded_per_site() {
        let dispatcher = Dispatcher::new(registry_with(vec![MockScraper::new(
            Site::ProductHunt,
            vec![sample_listing(Site::ProductHunt, "x")],
        )]));
        let outcome = dispatcher
            .dispatch(&ScrapeRequest::for_sites([Site::JsJobbs, Site::ProductHunt]))
            .await;
        let DispatchOutcome::Success(report) = outcome else {
            panic!("expected success");
        };
        assert_eq!(report.scraping_errors[0].site, Site::JsJobbs);
        assert!(report.scraping_errors[0].error.contains("No adapter"));
    }

    #[tokio::test]
    async fn annual_salary_toggle_annualizes_compensation() {
        let mut listing = sample_listing(Site::JsJobbs, "h");
        listing.compensation = Some(Compensation {
            interval: CompensationInterval::Hourly,
            min_amount: Some(20.0),
            max_amount: Some(30.0),
            currency: "USD".into(),
        });
        let dispatcher =
            Dispatcher::new(registry_with(vec![MockScraper::new(Site::JsJobbs, vec![listing])]));

        let mut request = ScrapeRequest::for_sites([Site::JsJobbs]);
        let outcome = dispatcher.dispatch(&request).await;
        let comp = outcome.listings()[0].compensation.clone().unwrap();
        assert_eq!(comp.interval, CompensationInterval::Hourly);

        request.enforce_annual_salary = true;
        let outcome = dispatcher.dispatch(&request).await;
        let comp = outcome.listings()[0].compensation.clone().unwrap();
        assert_eq!(comp.interval, CompensationInterval::Yearly);
        assert_eq!(comp.min_amount, Some(41_600.0));
        assert_eq!(comp.max_amount, Some(62_400.0));
    }

    #[tokio::test]
    async fn run_rejects_invalid_config_without_scraping() {
        let mock = MockScraper::new(Site::JsJobbs, vec![sample_listing(Site::JsJobbs, "a")]);
        let dispatcher = Dispatcher::new(registry_with(vec![mock.clone()]));

        let outcome = dispatcher.run(&json!({"search_term": "rust"})).await;
        let DispatchOutcome::Failure(failure) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(failure.error_kind, ErrorKind::ValidationError);
        assert_eq!(failure.validation_errors, vec!["source is required"]);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn run_carries_validation_warnings() {
        let dispatcher = Dispatcher::new(registry_with(vec![MockScraper::new(
            Site::JsJobbs,
            vec![sample_listing(Site::JsJobbs, "a")],
        )]));
        let outcome = dispatcher
            .run(&json!({"source": "jsjobbs", "results_wanted": 500}))
            .await;
        let DispatchOutcome::Success(report) = outcome else {
            panic!("expected success");
        };
        assert!(report.warnings[0].contains("results_wanted is very high"));
    }

    #[test]
    fn failure_serializes_flat() {
        let mut failure = DispatchFailure::new(ErrorKind::SiteBlocking, "blocked");
        failure.suggestion = Some("retry".into());
        let value = serde_json::to_value(DispatchOutcome::Failure(failure)).unwrap();
        assert_eq!(value["success"], json!(false));
        assert_eq!(value["error_kind"], json!("site_blocking"));
        assert_eq!(value["suggestion"], json!("retry"));
    }
}
