use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::Site;

/// Employment arrangement tag attached to a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Internship,
}

impl JobType {
    pub const ALL: [JobType; 4] = [
        JobType::FullTime,
        JobType::PartTime,
        JobType::Contract,
        JobType::Internship,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "fulltime",
            JobType::PartTime => "parttime",
            JobType::Contract => "contract",
            JobType::Internship => "internship",
        }
    }

    /// Map an integer job-type code from a numbered-code API.
    ///
    /// Unrecognized codes default to full-time.
    pub fn from_code(code: i64) -> Self {
        match code {
            10 => JobType::FullTime,
            20 => JobType::PartTime,
            30 => JobType::Contract,
            40 => JobType::Internship,
            _ => JobType::FullTime,
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for JobType {
    type Err = String;

    /// Accepts catalog names plus spaced, hyphenated, and underscored spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect();
        match normalized.as_str() {
            "fulltime" => Ok(JobType::FullTime),
            "parttime" => Ok(JobType::PartTime),
            "contract" | "contractor" => Ok(JobType::Contract),
            "internship" | "intern" => Ok(JobType::Internship),
            _ => Err(format!("Unknown job type: {s}")),
        }
    }
}

/// Pay period of a compensation figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompensationInterval {
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl CompensationInterval {
    /// Periods per year, as used for annualization.
    pub fn annual_multiplier(&self) -> f64 {
        match self {
            CompensationInterval::Hourly => 2080.0,
            CompensationInterval::Daily => 260.0,
            CompensationInterval::Weekly => 52.0,
            CompensationInterval::Monthly => 12.0,
            CompensationInterval::Yearly => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compensation {
    pub interval: CompensationInterval,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub currency: String,
}

impl Compensation {
    /// Convert to a yearly figure.
    pub fn to_annual(&self) -> Compensation {
        let factor = self.interval.annual_multiplier();
        Compensation {
            interval: CompensationInterval::Yearly,
            min_amount: self.min_amount.map(|v| v * factor),
            max_amount: self.max_amount.map(|v| v * factor),
            currency: self.currency.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub country: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

impl Location {
    pub fn country(country: impl Into<String>) -> Self {
        Self {
            country: Some(country.into()),
            city: None,
            state: None,
        }
    }

    /// City, state, and country joined by spaces; used for location filtering.
    pub fn search_text(&self) -> String {
        [&self.city, &self.state, &self.country]
            .iter()
            .map(|part| part.as_deref().unwrap_or(""))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Output format for listing descriptions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptionFormat {
    #[default]
    Markdown,
    Html,
    Plain,
}

impl FromStr for DescriptionFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "markdown" => Ok(DescriptionFormat::Markdown),
            "html" => Ok(DescriptionFormat::Html),
            "plain" => Ok(DescriptionFormat::Plain),
            _ => Err(format!("Unknown description format: {s}")),
        }
    }
}

/// One canonical, normalized record produced by a site adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Source-qualified id, e.g. `js-abc123`.
    pub id: String,
    pub site: Site,
    pub title: String,
    pub description: Option<String>,
    pub company_name: Option<String>,
    pub company_url: Option<String>,
    pub location: Option<Location>,
    pub job_types: Vec<JobType>,
    pub compensation: Option<Compensation>,
    pub date_posted: Option<NaiveDate>,
    /// Apply target; also the dedup identity key.
    pub job_url: String,
    pub emails: Option<Vec<String>>,
    pub is_remote: bool,
    pub skills: BTreeSet<String>,
}

/// Final, windowed output of one adapter invocation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListingBatch {
    pub listings: Vec<Listing>,
    /// Non-fatal problems hit while scraping (e.g. pagination cut short).
    pub warnings: Vec<String>,
}

impl ListingBatch {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self {
            listings,
            warnings: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}
