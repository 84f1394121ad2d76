/// Data structures for email lookups
use crate::config::GUESS_SCORE;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cache key for a (founder name, company domain) pair
///
/// Both parts are lower-cased and joined with `_`, so lookups that differ
/// only in case share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupKey(String);

impl LookupKey {
    pub fn new(person_name: &str, company_domain: &str) -> LookupKey {
        LookupKey(format!(
            "{}_{}",
            person_name.to_lowercase(),
            company_domain.to_lowercase()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a lookup result was obtained
///
/// Stored as a plain string; statuses the provider invents are kept verbatim.
/// A `null` status reads as the default.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum LookupStatus {
    #[default]
    Found,
    /// Provider is still working on it; try again later
    Searching,
    /// Local first-name@domain heuristic
    Guessed,
    NotFound,
    Other(String),
}

impl From<String> for LookupStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "found" => LookupStatus::Found,
            "searching" => LookupStatus::Searching,
            "guessed" => LookupStatus::Guessed,
            "not_found" => LookupStatus::NotFound,
            _ => LookupStatus::Other(value),
        }
    }
}

impl From<Option<String>> for LookupStatus {
    fn from(value: Option<String>) -> Self {
        value.map(LookupStatus::from).unwrap_or_default()
    }
}

impl From<LookupStatus> for String {
    fn from(value: LookupStatus) -> Self {
        value.to_string()
    }
}

impl fmt::Display for LookupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupStatus::Found => f.write_str("found"),
            LookupStatus::Searching => f.write_str("searching"),
            LookupStatus::Guessed => f.write_str("guessed"),
            LookupStatus::NotFound => f.write_str("not_found"),
            LookupStatus::Other(status) => f.write_str(status),
        }
    }
}

/// Outcome of resolving a founder's email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupResult {
    pub email: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub status: LookupStatus,
}

impl LookupResult {
    pub fn guessed(email: String) -> LookupResult {
        LookupResult {
            email: Some(email),
            score: Some(GUESS_SCORE),
            status: LookupStatus::Guessed,
        }
    }

    /// Only results carrying an email are written to the cache.
    pub fn is_cacheable(&self) -> bool {
        self.email.is_some()
    }
}
