use std::future::Future;

use async_trait::async_trait;

use crate::catalog::Site;
use crate::error::AppError;
use crate::http::{HttpRequest, HttpResponse};
use crate::models::ListingBatch;
use crate::request::ScrapeRequest;

/// Sends one HTTP request.
///
/// Connection failures come back as `Err`; a response with a failing
/// status is still `Ok` and callers check [`HttpResponse::is_ok`].
pub trait HttpTransport: Send + Sync {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, AppError>> + Send;
}

/// Fetches and normalizes listings from one external source.
///
/// Implementations hold no per-call state: dedup sets and candidate
/// buffers are created inside each `scrape` call, so one instance can
/// serve any number of requests.
#[async_trait]
pub trait Scraper: Send + Sync {
    fn site(&self) -> Site;

    /// Whether an empty result from this source usually means an anti-bot block.
    fn is_block_prone(&self) -> bool {
        false
    }

    /// Run one scrape. The returned batch is already windowed to
    /// `request.offset .. request.offset + request.results_wanted`.
    async fn scrape(&self, request: &ScrapeRequest) -> Result<ListingBatch, AppError>;
}
