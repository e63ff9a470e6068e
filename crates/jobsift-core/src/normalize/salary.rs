use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Compensation, CompensationInterval};

pub const DEFAULT_CURRENCY: &str = "USD";

const HOURS_PER_YEAR: f64 = 2080.0;
const MONTHS_PER_YEAR: f64 = 12.0;

static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\$(\d+(?:,\d+)?(?:\.\d+)?)([kK]?)\s*[-—–]\s*(?:\$)?(\d+(?:,\d+)?(?:\.\d+)?)([kK]?)",
    )
    .expect("valid regex")
});

static NON_NUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^-0-9.,]").expect("valid regex"));

/// Thresholds used to classify and sanity-check a salary range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SalaryLimits {
    /// Lowest plausible annual amount.
    pub lower: f64,
    /// Highest plausible annual amount.
    pub upper: f64,
    /// Raw amounts below this are hourly.
    pub hourly_threshold: f64,
    /// Raw amounts below this (and not hourly) are monthly.
    pub monthly_threshold: f64,
}

impl Default for SalaryLimits {
    fn default() -> Self {
        Self {
            lower: 1_000.0,
            upper: 700_000.0,
            hourly_threshold: 350.0,
            monthly_threshold: 30_000.0,
        }
    }
}

/// Find a `$min - $max` range in free text using the default limits.
///
/// See [`extract_salary_with`].
pub fn extract_salary(text: &str, enforce_annual: bool) -> Option<Compensation> {
    extract_salary_with(text, &SalaryLimits::default(), enforce_annual)
}

/// Find a `$min - $max` range in free text.
///
/// The interval is chosen from the raw minimum: hourly below
/// `hourly_threshold`, monthly below `monthly_threshold`, yearly otherwise.
/// The range is rejected unless both annualized bounds fall inside
/// `[lower, upper]` and min is strictly below max. With `enforce_annual`
/// the annualized figures are returned, otherwise the raw ones.
pub fn extract_salary_with(
    text: &str,
    limits: &SalaryLimits,
    enforce_annual: bool,
) -> Option<Compensation> {
    let caps = RANGE_RE.captures(text)?;
    let min = amount(&caps[1], &caps[2])?;
    let max = amount(&caps[3], &caps[4])?;

    let (interval, annual_min, annual_max) = if min < limits.hourly_threshold {
        let annual_max = (max < limits.hourly_threshold).then_some(max * HOURS_PER_YEAR);
        (CompensationInterval::Hourly, min * HOURS_PER_YEAR, annual_max)
    } else if min < limits.monthly_threshold {
        let annual_max = (max < limits.monthly_threshold).then_some(max * MONTHS_PER_YEAR);
        (CompensationInterval::Monthly, min * MONTHS_PER_YEAR, annual_max)
    } else {
        (CompensationInterval::Yearly, min, Some(max))
    };

    let annual_max = annual_max?;
    let window = limits.lower..=limits.upper;
    if !(window.contains(&annual_min) && window.contains(&annual_max) && annual_min < annual_max) {
        return None;
    }

    let (min_amount, max_amount) = if enforce_annual {
        (annual_min, annual_max)
    } else {
        (min, max)
    };

    Some(Compensation {
        interval,
        min_amount: Some(min_amount),
        max_amount: Some(max_amount),
        currency: DEFAULT_CURRENCY.to_string(),
    })
}

/// Parse one side of a range: drop separators, truncate, apply a `k` suffix.
fn amount(number: &str, suffix: &str) -> Option<f64> {
    let value = number.replace(',', "").parse::<f64>().ok()?.trunc();
    Some(if suffix.eq_ignore_ascii_case("k") {
        value * 1000.0
    } else {
        value
    })
}

/// Parse a formatted currency amount such as `$1,234.56` or `€1.234,56`.
///
/// Separators before the last three characters are treated as thousands
/// separators; a `.` or `,` in the last three is the decimal mark.
pub fn parse_currency(raw: &str) -> Option<f64> {
    let cleaned = NON_NUMERIC_RE.replace_all(raw, "");
    let split = cleaned.len().saturating_sub(3);
    let (head, tail) = cleaned.split_at(split);
    let head: String = head.chars().filter(|c| !matches!(c, '.' | ',')).collect();
    let number = format!("{head}{}", tail.replace(',', "."));
    let value = number.parse::<f64>().ok()?;
    Some((value * 100.0).round() / 100.0)
}
