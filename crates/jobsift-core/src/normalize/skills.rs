//! Heuristic skill extraction from descriptions and structured attributes.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use super::description::to_markdown;

/// Clauses following these trigger phrases are split into candidate skills.
static CLAUSE_RES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        r"(?im)(?:required|must have|essential|preferred|nice to have|skills?)[\s:]*([^.!?]*)",
        r"(?im)(?:experience with|proficient in|knowledge of|familiar with)[\s:]*([^.!?]*)",
        r"(?im)(?:technologies?|tools?|frameworks?|languages?)[\s:]*([^.!?]*)",
    ]
    .map(|pattern| Regex::new(pattern).expect("valid regex"))
});

static SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,;•\n\r\t]+").expect("valid regex"));

static FILLER_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(experience with|knowledge of|proficient in|familiar with)\s*")
        .expect("valid regex")
});

static FILLER_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+(experience|knowledge|proficiency|familiarity)$").expect("valid regex")
});

static DISALLOWED_CHAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s\-\./\+]").expect("valid regex"));

const TECHNICAL_SKILLS: &[&str] = &[
    // Programming languages
    "python", "javascript", "java", "c++", "c#", "php", "ruby", "go", "rust", "swift", "kotlin",
    "typescript", "scala", "r", "matlab", "perl", "haskell", "clojure", "dart", "elixir",
    // Web
    "html", "css", "react", "angular", "vue", "node.js", "express", "django", "flask", "spring",
    "laravel", "rails", "asp.net", "jquery", "bootstrap", "sass", "less", "webpack", "babel",
    // Databases
    "mysql", "postgresql", "mongodb", "redis", "sqlite", "oracle", "sql server", "cassandra",
    "elasticsearch", "dynamodb", "neo4j", "mariadb",
    // Cloud and ops
    "aws", "azure", "gcp", "docker", "kubernetes", "jenkins", "git", "ci/cd", "terraform",
    "ansible", "chef", "puppet", "vagrant", "nginx", "apache",
    // Data
    "sql", "pandas", "numpy", "scikit-learn", "tensorflow", "pytorch", "keras", "spark",
    "hadoop", "hive", "pig", "kafka", "airflow", "jupyter", "tableau", "power bi",
    // Mobile
    "ios", "android", "react native", "flutter", "xamarin", "cordova", "ionic",
    // Other
    "linux", "unix", "windows", "macos", "bash", "powershell", "rest api", "graphql",
    "microservices", "api", "json", "xml", "yaml", "tomcat", "jboss", "weblogic",
];

const SOFT_SKILLS: &[&str] = &[
    "communication", "leadership", "teamwork", "problem solving", "analytical",
    "creative", "time management", "project management", "agile", "scrum",
    "customer service", "mentoring", "collaboration", "adaptability", "initiative",
];

const STOP_WORDS: &[&str] = &["and", "or", "the", "with", "in", "of", "for", "to", "a", "an"];

const ATTRIBUTE_SKILL_KEYS: &[&str] = &[
    "skill",
    "technology",
    "tool",
    "language",
    "framework",
    "platform",
];

/// Extract a set of skills from a job description.
///
/// Runs three passes: clause capture after trigger phrases, vocabulary
/// containment, then cleanup of every candidate (filler phrases, 3–40
/// chars, character whitelist, stop-words). Candidates that differ only
/// in case collapse to one entry, preferring the vocabulary spelling.
pub fn extract_skills_from_description(description: &str) -> BTreeSet<String> {
    if description.trim().is_empty() {
        return BTreeSet::new();
    }

    let text = if description.contains('<') && description.contains('>') {
        to_markdown(description)
    } else {
        description.to_string()
    };
    let lower = text.to_lowercase();

    // Keyed by lowercase form; vocabulary matches overwrite clause captures.
    let mut candidates: HashMap<String, String> = HashMap::new();

    for re in CLAUSE_RES.iter() {
        for caps in re.captures_iter(&lower) {
            for token in SEPARATOR_RE.split(&caps[1]) {
                let token = token.trim();
                if (3..50).contains(&token.chars().count()) {
                    candidates
                        .entry(token.to_lowercase())
                        .or_insert_with(|| token.to_string());
                }
            }
        }
    }

    for skill in TECHNICAL_SKILLS.iter().chain(SOFT_SKILLS) {
        if lower.contains(skill) {
            candidates.insert(skill.to_string(), title_case(skill));
        }
    }

    candidates.into_values().filter_map(|skill| clean_skill(&skill)).collect()
}

fn clean_skill(raw: &str) -> Option<String> {
    let stripped = FILLER_PREFIX_RE.replace(raw, "");
    let stripped = FILLER_SUFFIX_RE.replace(&stripped, "");
    let skill = stripped.trim();

    let len = skill.chars().count();
    if !(3..=40).contains(&len)
        || DISALLOWED_CHAR_RE.is_match(skill)
        || STOP_WORDS.contains(&skill.to_lowercase().as_str())
    {
        return None;
    }
    Some(skill.to_string())
}

/// Capitalize each run of letters, e.g. `node.js` -> `Node.Js`.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// A `{key, label}` attribute as exposed by some listing APIs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Attribute {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub label: String,
}

/// Extract skills from structured attributes.
///
/// An attribute contributes when its key names a skill-like category or
/// its label is short; labels are split on common separators.
pub fn extract_skills_from_attributes(attributes: &[Attribute]) -> BTreeSet<String> {
    let mut skills = BTreeSet::new();
    for attr in attributes {
        let key = attr.key.to_lowercase();
        let label = attr.label.trim();
        let skill_like = ATTRIBUTE_SKILL_KEYS.iter().any(|k| key.contains(k));
        if !skill_like && label.chars().count() >= 50 {
            continue;
        }
        for token in SEPARATOR_RE.split(label) {
            let token = token.trim();
            if (3..50).contains(&token.chars().count()) {
                skills.insert(token.to_string());
            }
        }
    }
    skills
}
