//! Stateless field-normalization helpers shared by every site adapter.
//!
//! All extraction here is best-effort: a value is either found or absent,
//! never scored.

pub mod description;
pub mod salary;
pub mod skills;
pub mod text;

pub use description::{render_description, to_markdown, to_plain};
pub use salary::{SalaryLimits, extract_salary, extract_salary_with, parse_currency};
pub use skills::{extract_skills_from_attributes, extract_skills_from_description};
pub use text::{detect_remote, extract_emails, extract_job_types, is_email, mentions_remote};
