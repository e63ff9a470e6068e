use std::sync::LazyLock;

use regex::Regex;

use crate::models::JobType;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("valid regex")
});

static EXACT_EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid regex")
});

static JOB_TYPE_RES: LazyLock<[(JobType, Regex); 4]> = LazyLock::new(|| {
    [
        (JobType::FullTime, r"(?i)full\s?time"),
        (JobType::PartTime, r"(?i)part\s?time"),
        (JobType::Internship, r"(?i)internship"),
        (JobType::Contract, r"(?i)contract"),
    ]
    .map(|(job_type, pattern)| (job_type, Regex::new(pattern).expect("valid regex")))
});

pub const REMOTE_KEYWORDS: &[&str] = &[
    "remote",
    "work from home",
    "wfh",
    "virtual",
    "distributed",
    "fully remote",
    "work anywhere",
];

/// All distinct email addresses in `text`, in order of first appearance.
pub fn extract_emails(text: &str) -> Option<Vec<String>> {
    let mut emails: Vec<String> = Vec::new();
    for m in EMAIL_RE.find_iter(text) {
        if !emails.iter().any(|e| e == m.as_str()) {
            emails.push(m.as_str().to_string());
        }
    }
    (!emails.is_empty()).then_some(emails)
}

/// True when the whole (trimmed) string is a syntactically valid address.
pub fn is_email(text: &str) -> bool {
    EXACT_EMAIL_RE.is_match(text.trim())
}

/// Job types whose keywords appear in `text`.
pub fn extract_job_types(text: &str) -> Option<Vec<JobType>> {
    let found: Vec<JobType> = JOB_TYPE_RES
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(job_type, _)| *job_type)
        .collect();
    (!found.is_empty()).then_some(found)
}

/// Case-insensitive scan for remote-work keywords.
pub fn mentions_remote(text: &str) -> bool {
    let lower = text.to_lowercase();
    REMOTE_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

/// Remote status from a source-specific signal, falling back to a text scan.
pub fn detect_remote(structured: Option<bool>, text: Option<&str>) -> bool {
    match structured {
        Some(remote) => remote,
        None => text.is_some_and(mentions_remote),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_deduplicated_in_order() {
        let emails =
            extract_emails("Write to jobs@acme.io or hr@acme.io. Again: jobs@acme.io").unwrap();
        assert_eq!(emails, vec!["jobs@acme.io", "hr@acme.io"]);
    }

    #[test]
    fn no_emails_is_none() {
        assert!(extract_emails("apply online").is_none());
        assert!(extract_emails("").is_none());
    }

    #[test]
    fn exact_email_check() {
        assert!(is_email(" careers@example.com "));
        assert!(!is_email("https://example.com/apply"));
        assert!(!is_email("mail careers@example.com"));
    }

    #[test]
    fn job_types_from_keywords() {
        assert_eq!(
            extract_job_types("Full time or part-time? contract possible"),
            Some(vec![JobType::FullTime, JobType::Contract])
        );
        assert_eq!(
            extract_job_types("Summer INTERNSHIP, parttime"),
            Some(vec![JobType::PartTime, JobType::Internship])
        );
        assert_eq!(extract_job_types("Permanent role"), None);
    }

    #[test]
    fn remote_keywords_are_case_insensitive() {
        assert!(mentions_remote("Fully REMOTE team"));
        assert!(mentions_remote("We are a Distributed company"));
        assert!(mentions_remote("WFH friendly"));
        assert!(!mentions_remote("Office in Berlin"));
    }

    #[test]
    fn structured_remote_signal_wins() {
        assert!(!detect_remote(Some(false), Some("remote")));
        assert!(detect_remote(Some(true), None));
        assert!(detect_remote(None, Some("work from home")));
        assert!(!detect_remote(None, None));
    }
}
