//! Validation and defaulting of raw scrape configurations.
//!
//! Every rule runs independently so a caller sees all problems at once.
//! The cleaned request is always populated with best-effort values, even
//! when the configuration is rejected.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::catalog::{self, Site};
use crate::models::{DescriptionFormat, JobType};
use crate::request::{DEFAULT_DISTANCE, DEFAULT_RESULTS_WANTED, MAX_DISTANCE, ScrapeRequest};

/// `results_wanted` above this only produces a warning.
pub const RESULTS_WANTED_WARN_ABOVE: i64 = 100;

const SOURCE_KEYS: &[&str] = &["source", "site_name"];
const COUNTRY_KEYS: &[&str] = &["country", "country_indeed"];
const REMOTE_KEYS: &[&str] = &["is_remote"];
const EASY_APPLY_KEYS: &[&str] = &["easy_apply"];
const FULL_DESCRIPTION_KEYS: &[&str] = &["fetch_full_description", "linkedin_fetch_description"];
const ANNUAL_SALARY_KEYS: &[&str] = &["enforce_annual_salary"];

#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub cleaned_config: ScrapeRequest,
}

/// Validate a raw JSON configuration and resolve defaults.
pub fn validate(raw: &Value) -> ValidationResult {
    let empty = Map::new();
    let (config, mut errors) = match raw {
        Value::Object(map) => (map, Vec::new()),
        _ => (&empty, vec!["configuration must be a JSON object".to_string()]),
    };

    let mut warnings = Vec::new();
    let mut cleaned = ScrapeRequest::default();

    match lookup(config, SOURCE_KEYS) {
        None => errors.push("source is required".to_string()),
        Some(value) => match parse_sites(value) {
            Ok(sites) if sites.is_empty() => errors.push("source is required".to_string()),
            Ok(sites) => cleaned.sites = sites,
            Err(message) => errors.push(message),
        },
    }

    cleaned.search_term = config
        .get("search_term")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_string);

    cleaned.location = config.get("location").and_then(scalar_to_string);

    if let Some(value) = lookup(config, COUNTRY_KEYS).filter(|v| !v.is_null()) {
        let country = value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string());
        match catalog::match_country(&country) {
            Some(canonical) => cleaned.country = canonical.to_string(),
            None => errors.push(format!(
                "Unsupported country: {country}. Supported countries: {:?}",
                catalog::supported_countries()
            )),
        }
    }

    if let Some(value) = config.get("job_type").filter(|v| is_truthy(v)) {
        let raw_type = value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string());
        match raw_type.parse::<JobType>() {
            Ok(job_type) => cleaned.job_type = Some(job_type),
            Err(_) => errors.push(format!(
                "Unsupported job type: {raw_type}. Supported job types: {:?}",
                catalog::supported_job_types()
            )),
        }
    }

    if let Some(value) = config.get("results_wanted") {
        match parse_int(value) {
            Some(n) if n <= 0 => errors.push("results_wanted must be a positive integer".into()),
            Some(n) => {
                if n > RESULTS_WANTED_WARN_ABOVE {
                    warnings.push("results_wanted is very high, this may take a long time".into());
                }
                cleaned.results_wanted = usize::try_from(n).unwrap_or(DEFAULT_RESULTS_WANTED);
            }
            None => errors.push("results_wanted must be a valid integer".into()),
        }
    }

    if let Some(value) = config.get("distance") {
        match parse_int(value) {
            Some(n) if (0..=MAX_DISTANCE).contains(&n) => {
                cleaned.distance = u32::try_from(n).unwrap_or(DEFAULT_DISTANCE);
            }
            Some(_) => errors.push(format!("distance must be between 0 and {MAX_DISTANCE} miles")),
            None => errors.push("distance must be a valid integer".into()),
        }
    }

    let toggles: [(&[&str], &mut bool); 4] = [
        (REMOTE_KEYS, &mut cleaned.is_remote),
        (EASY_APPLY_KEYS, &mut cleaned.easy_apply),
        (FULL_DESCRIPTION_KEYS, &mut cleaned.fetch_full_description),
        (ANNUAL_SALARY_KEYS, &mut cleaned.enforce_annual_salary),
    ];
    for (keys, slot) in toggles {
        if let Some(value) = lookup(config, keys) {
            match parse_bool(value) {
                Some(flag) => *slot = flag,
                None => errors.push(format!("{} must be a boolean value", keys[0])),
            }
        }
    }

    if let Some(value) = config.get("offset").filter(|v| !v.is_null()) {
        match parse_int(value).map(usize::try_from) {
            Some(Ok(offset)) => cleaned.offset = offset,
            Some(Err(_)) => errors.push("offset must be a non-negative integer".into()),
            None => errors.push("offset must be a valid integer".into()),
        }
    }

    if let Some(value) = config.get("hours_old").filter(|v| !v.is_null()) {
        match parse_int(value).map(u32::try_from) {
            Some(Ok(hours)) => cleaned.hours_old = Some(hours),
            Some(Err(_)) => errors.push("hours_old must be a non-negative integer".into()),
            None => errors.push("hours_old must be a valid integer".into()),
        }
    }

    if let Some(value) = config.get("description_format").filter(|v| !v.is_null()) {
        match value.as_str().map(str::parse::<DescriptionFormat>) {
            Some(Ok(format)) => cleaned.description_format = format,
            _ => errors.push(format!(
                "description_format must be one of markdown, html, plain (got {value})"
            )),
        }
    }

    if let Some(value) = config.get("proxies").filter(|v| !v.is_null()) {
        match string_or_list(value) {
            Some(proxies) => cleaned.proxies = proxies,
            None => errors.push("proxies must be a string or list of strings".into()),
        }
    }

    if let Some(value) = config.get("ca_cert").filter(|v| !v.is_null()) {
        match value.as_str() {
            Some(path) => cleaned.ca_cert = Some(path.to_string()),
            None => errors.push("ca_cert must be a string path".into()),
        }
    }

    ValidationResult {
        is_valid: errors.is_empty(),
        errors,
        warnings,
        cleaned_config: cleaned,
    }
}

/// First present key among `keys` (primary name, then aliases).
fn lookup<'a>(config: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| config.get(*key))
}

fn parse_sites(value: &Value) -> Result<Vec<Site>, String> {
    let names = string_or_list(value)
        .ok_or_else(|| "source must be a string or list of strings".to_string())?;

    let (known, unknown): (Vec<_>, Vec<_>) = names
        .iter()
        .map(|name| (name, name.parse::<Site>()))
        .partition(|(_, parsed)| parsed.is_ok());

    if !unknown.is_empty() {
        let offending: Vec<&String> = unknown.into_iter().map(|(name, _)| name).collect();
        return Err(format!(
            "Unsupported sites: {offending:?}. Supported sites: {:?}",
            catalog::supported_sites()
        ));
    }

    let mut sites = Vec::with_capacity(known.len());
    for site in known.into_iter().filter_map(|(_, parsed)| parsed.ok()) {
        if !sites.contains(&site) {
            sites.push(site);
        }
    }
    Ok(sites)
}

fn string_or_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(s) => Some(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => None,
    }
}

fn parse_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.to_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Number(_) => true,
    }
}
