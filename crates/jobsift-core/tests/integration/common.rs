use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use jobsift_core::normalize::{
    detect_remote, extract_emails, extract_job_types, extract_salary,
    extract_skills_from_description, render_description,
};
use jobsift_core::{
    AppError, JobType, Listing, ListingBatch, ListingFilter, Location, ScrapeRequest, Scraper,
    ScraperRegistry, SeenKeys, Site, window,
};

/// One raw upstream posting.
#[derive(Clone)]
pub struct Posting {
    pub apply_url: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub company: &'static str,
}

pub fn postings() -> Vec<Posting> {
    vec![
        Posting {
            apply_url: "https://board.test/1",
            title: "Rust Engineer",
            description: "<p>Full time, remote. Salary $120k - $160k. Mail jobs@board.test</p>",
            company: "Ferric",
        },
        Posting {
            apply_url: "https://board.test/2",
            title: "Frontend Developer",
            description: "<p>Contract role using React and TypeScript.</p>",
            company: "Pixel",
        },
        Posting {
            apply_url: "https://board.test/1",
            title: "Rust Engineer (repost)",
            description: "<p>Duplicate of the first posting.</p>",
            company: "Ferric",
        },
        Posting {
            apply_url: "https://board.test/3",
            title: "Backend Engineer",
            description: "<p>Part time Go backend work, $40 - $60 per hour.</p>",
            company: "Gopher Co",
        },
        Posting {
            apply_url: "https://board.test/4",
            title: "Data Engineer",
            description: "<p>Full time data pipelines in Python.</p>",
            company: "Ferric",
        },
    ]
}

/// In-memory adapter built from the shared collection helpers, the way a
/// real site adapter is.
#[derive(Clone)]
pub struct BoardScraper {
    site: Site,
    postings: Vec<Posting>,
    block_prone: bool,
    pub calls: Arc<Mutex<usize>>,
}

impl BoardScraper {
    pub fn new(site: Site, postings: Vec<Posting>) -> Self {
        Self {
            site,
            postings,
            block_prone: false,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn block_prone(mut self) -> Self {
        self.block_prone = true;
        self
    }
}

#[async_trait]
impl Scraper for BoardScraper {
    fn site(&self) -> Site {
        self.site
    }

    fn is_block_prone(&self) -> bool {
        self.block_prone
    }

    async fn scrape(&self, request: &ScrapeRequest) -> Result<ListingBatch, AppError> {
        *self.calls.lock().unwrap() += 1;
        let filter = ListingFilter::from_request(request, Utc::now().naive_utc());
        let mut seen = SeenKeys::new();
        let mut candidates = Vec::new();

        for posting in &self.postings {
            if !seen.insert(posting.apply_url) {
                continue;
            }
            let listing = Listing {
                id: format!("bd-{}", candidates.len()),
                site: self.site,
                title: posting.title.to_string(),
                description: Some(render_description(
                    posting.description,
                    request.description_format,
                )),
                company_name: Some(posting.company.to_string()),
                company_url: None,
                location: Some(Location::country("US")),
                job_types: extract_job_types(posting.description)
                    .unwrap_or(vec![JobType::FullTime]),
                compensation: extract_salary(posting.description, false),
                date_posted: Some(Utc::now().date_naive()),
                job_url: posting.apply_url.to_string(),
                emails: extract_emails(posting.description),
                is_remote: detect_remote(None, Some(posting.description)),
                skills: extract_skills_from_description(posting.description),
            };
            if filter.accepts(&listing) {
                candidates.push(listing);
            }
        }

        Ok(ListingBatch::new(window(
            candidates,
            request.offset,
            request.results_wanted,
        )))
    }
}

pub fn registry_with(scrapers: Vec<BoardScraper>) -> ScraperRegistry {
    let mut registry = ScraperRegistry::new();
    for scraper in scrapers {
        let site = scraper.site();
        registry.register(site, move |_| Box::new(scraper.clone()) as Box<dyn Scraper>);
    }
    registry
}
