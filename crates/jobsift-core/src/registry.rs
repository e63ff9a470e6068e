use std::collections::BTreeMap;

use crate::catalog::Site;
use crate::error::AppError;
use crate::request::ScrapeRequest;
use crate::traits::Scraper;

/// Builds an adapter for one request.
///
/// The request is passed so constructors can pick up per-request session
/// settings such as proxies or a CA bundle.
pub type ScraperFactory = Box<dyn Fn(&ScrapeRequest) -> Box<dyn Scraper> + Send + Sync>;

/// Map from catalog site to adapter constructor.
#[derive(Default)]
pub struct ScraperRegistry {
    factories: BTreeMap<Site, ScraperFactory>,
}

impl ScraperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the constructor for `site`.
    pub fn register<F>(&mut self, site: Site, factory: F) -> &mut Self
    where
        F: Fn(&ScrapeRequest) -> Box<dyn Scraper> + Send + Sync + 'static,
    {
        self.factories.insert(site, Box::new(factory));
        self
    }

    pub fn with<F>(mut self, site: Site, factory: F) -> Self
    where
        F: Fn(&ScrapeRequest) -> Box<dyn Scraper> + Send + Sync + 'static,
    {
        self.register(site, factory);
        self
    }

    pub fn contains(&self, site: Site) -> bool {
        self.factories.contains_key(&site)
    }

    /// Sites that currently have an adapter.
    pub fn sites(&self) -> Vec<Site> {
        self.factories.keys().copied().collect()
    }

    /// Construct the adapter for `site`.
    pub fn build(&self, site: Site, request: &ScrapeRequest) -> Result<Box<dyn Scraper>, AppError> {
        let factory = self.factories.get(&site).ok_or(AppError::NoAdapter(site))?;
        Ok(factory(request))
    }
}

impl std::fmt::Debug for ScraperRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScraperRegistry")
            .field("sites", &self.sites())
            .finish()
    }
}
