//! Wiring from catalog sites to the reqwest-backed adapters.

use jobsift_core::registry::ScraperRegistry;
use jobsift_core::request::ScrapeRequest;
use jobsift_core::traits::Scraper;
use jobsift_core::Site;

use crate::session::{RetryPolicy, RotatingSession, SessionConfig, TransportMode};
use crate::sites::{JsJobbs, ProductHunt};

/// Settings shared by every session the default registry builds.
#[derive(Debug, Clone, Default)]
pub struct ClientSettings {
    /// Used when a request carries no proxies of its own.
    pub proxies: Vec<String>,
    /// Used when a request carries no CA bundle of its own.
    pub ca_cert: Option<String>,
    pub accept_invalid_certs: bool,
    pub producthunt_token: Option<String>,
}

impl ClientSettings {
    /// Session settings for one request; request values win over defaults.
    pub fn session_config(&self, request: &ScrapeRequest) -> SessionConfig {
        let proxies = if request.proxies.is_empty() {
            &self.proxies
        } else {
            &request.proxies
        };
        let mut config = SessionConfig::new()
            .with_proxies(proxies.iter().cloned())
            .danger_accept_invalid_certs(self.accept_invalid_certs);
        if let Some(path) = request.ca_cert.as_ref().or(self.ca_cert.as_ref()) {
            config = config.with_ca_cert(path);
        }
        config
    }
}

/// Registry with every built-in adapter.
///
/// Each adapter gets its own session per request. JSJobbs retries
/// transient failures; ProductHunt presents a browser user agent and
/// keeps no cookies.
pub fn default_registry(settings: ClientSettings) -> ScraperRegistry {
    let jsjobbs_settings = settings.clone();
    ScraperRegistry::new()
        .with(Site::JsJobbs, move |request| {
            let config = jsjobbs_settings
                .session_config(request)
                .with_retry(RetryPolicy::default());
            Box::new(JsJobbs::new(RotatingSession::new(config))) as Box<dyn Scraper>
        })
        .with(Site::ProductHunt, move |request| {
            let config = settings
                .session_config(request)
                .with_mode(TransportMode::Browser)
                .with_clear_cookies(true);
            Box::new(ProductHunt::new(
                RotatingSession::new(config),
                settings.producthunt_token.clone(),
            )) as Box<dyn Scraper>
        })
}
