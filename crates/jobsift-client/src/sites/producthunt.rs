//! Single-query GraphQL adapter for Product Hunt launches.
//!
//! Products are presented as listing-like records: the product is the
//! "company", its website the apply target, and every record is a remote
//! contract-style entry.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use jobsift_core::collect::{ListingFilter, SeenKeys, window};
use jobsift_core::error::AppError;
use jobsift_core::http::HttpRequest;
use jobsift_core::models::{JobType, Listing, ListingBatch, Location};
use jobsift_core::normalize::{extract_emails, extract_skills_from_description, render_description};
use jobsift_core::traits::{HttpTransport, Scraper};
use jobsift_core::{ScrapeRequest, Site};

use crate::session::{BROWSER_USER_AGENT, RotatingSession};

pub const DEFAULT_ENDPOINT: &str = "https://api.producthunt.com/v2/api/graphql";

pub const QUERY_TIMEOUT: Duration = Duration::from_secs(30);

pub const POSTS_QUERY: &str = "{ posts { edges { node { slug name description url website } } } }";

/// Country reported for every product.
pub const WORLDWIDE: &str = "Worldwide";

const ID_PREFIX: &str = "ph-";

#[derive(Debug, Deserialize)]
struct PostNode {
    slug: Option<String>,
    name: Option<String>,
    description: Option<String>,
    url: Option<String>,
    website: Option<String>,
}

/// Post with every mandatory field present and non-empty.
struct Post {
    slug: String,
    name: String,
    description: String,
    url: String,
    website: Option<String>,
}

impl PostNode {
    fn into_post(self) -> Option<Post> {
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        Some(Post {
            name: non_empty(self.name)?,
            description: non_empty(self.description)?,
            url: non_empty(self.url)?,
            slug: self.slug.unwrap_or_default(),
            website: non_empty(self.website),
        })
    }
}

/// Product Hunt adapter over any [`HttpTransport`].
pub struct ProductHunt<T = RotatingSession> {
    transport: T,
    endpoint: String,
    token: Option<String>,
}

impl<T: HttpTransport> ProductHunt<T> {
    pub fn new(transport: T, token: Option<String>) -> Self {
        Self {
            transport,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn fetch_posts(&self) -> Result<Vec<Value>, AppError> {
        let mut request = HttpRequest::post(&self.endpoint)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .header("User-Agent", BROWSER_USER_AGENT)
            .json(json!({ "query": POSTS_QUERY }))
            .timeout(QUERY_TIMEOUT);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = self.transport.execute(request).await?.error_for_status()?;
        let body: Value = response.json()?;

        let edges = body
            .pointer("/data/posts/edges")
            .and_then(Value::as_array)
            .ok_or_else(|| AppError::parse("unexpected GraphQL response shape", &response.body))?;

        Ok(edges
            .iter()
            .filter_map(|edge| edge.get("node").cloned())
            .collect())
    }
}

#[async_trait]
impl<T: HttpTransport> Scraper for ProductHunt<T> {
    fn site(&self) -> Site {
        Site::ProductHunt
    }

    async fn scrape(&self, request: &ScrapeRequest) -> Result<ListingBatch, AppError> {
        info!("Starting ProductHunt scraping");
        let nodes = self.fetch_posts().await?;

        let filter = ListingFilter::from_request(request, Utc::now().naive_utc());
        let mut seen = SeenKeys::new();
        let mut candidates = Vec::new();

        for node in nodes {
            let post = match serde_json::from_value::<PostNode>(node) {
                Ok(node) => match node.into_post() {
                    Some(post) => post,
                    None => {
                        debug!("Skipping post missing name, description, or url");
                        continue;
                    }
                },
                Err(e) => {
                    debug!(error = %e, "Skipping malformed post");
                    continue;
                }
            };

            if !seen.insert(&post.url) {
                continue;
            }
            if !filter.matches_search(&[post.name.as_str(), post.description.as_str()]) {
                continue;
            }

            let listing = to_listing(post, request);
            if filter.accepts(&listing) {
                candidates.push(listing);
            }
        }

        info!(count = candidates.len(), "ProductHunt scraping completed");
        Ok(ListingBatch::new(window(
            candidates,
            request.offset,
            request.results_wanted,
        )))
    }
}

fn to_listing(post: Post, request: &ScrapeRequest) -> Listing {
    let job_url = post.website.clone().unwrap_or_else(|| post.url.clone());
    Listing {
        id: format!("{ID_PREFIX}{}", post.slug),
        site: Site::ProductHunt,
        title: format!("Product: {}", post.name),
        description: Some(render_description(&post.description, request.description_format)),
        company_name: Some(post.name),
        company_url: post.website,
        location: Some(Location::country(WORLDWIDE)),
        job_types: vec![JobType::Contract],
        compensation: None,
        date_posted: Some(Utc::now().date_naive()),
        job_url,
        emails: extract_emails(&post.description),
        is_remote: true,
        skills: extract_skills_from_description(&post.description),
    }
}
