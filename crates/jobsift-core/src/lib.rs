pub mod catalog;
pub mod collect;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod models;
pub mod normalize;
pub mod registry;
pub mod request;
pub mod traits;
pub mod validate;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use catalog::Site;
pub use collect::{ListingFilter, SeenKeys, window};
pub use dispatch::{DispatchOutcome, Dispatcher, ErrorKind};
pub use error::AppError;
pub use http::{HttpRequest, HttpResponse, Method};
pub use models::{
    Compensation, CompensationInterval, DescriptionFormat, JobType, Listing, ListingBatch,
    Location,
};
pub use registry::ScraperRegistry;
pub use request::ScrapeRequest;
pub use traits::{HttpTransport, Scraper};
pub use validate::{ValidationResult, validate};
