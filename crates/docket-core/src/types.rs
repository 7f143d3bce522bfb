//! Shared types used across Docket.
//!
//! This module defines the newtypes and small enums that give the pipeline
//! type safety at its boundaries.

use crate::error::CoreError;
use chrono::{DateTime, Local, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Case reference number.
///
/// Never empty. Usually a 16-character CNR, but component lookups without a
/// CNR in the result fall back to `{type}{number}{year}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CaseIdentifier(String);

impl CaseIdentifier {
    /// Placeholder used when neither the page nor the caller supplied an identifier.
    pub const UNKNOWN: &'static str = "unknown_case";

    /// Create a new `CaseIdentifier` from a string.
    ///
    /// # Errors
    /// Returns error if the identifier is empty after trimming.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(CoreError::Validation(
                "case identifier must not be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Identifier for records where nothing better is known.
    #[must_use]
    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_string())
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Variant of the identifier that is safe to embed in a file name.
    #[must_use]
    pub fn file_stem(&self) -> String {
        self.0
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}

impl TryFrom<String> for CaseIdentifier {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CaseIdentifier> for String {
    fn from(id: CaseIdentifier) -> Self {
        id.0
    }
}

impl fmt::Display for CaseIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the caller asked the portal for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseQuery {
    /// Full 16-character CNR
    Cnr(CaseIdentifier),
    /// Case type, number, and registration year
    Components {
        /// Case type code or label (matched against the portal's dropdown)
        case_type: String,
        /// Case number
        number: String,
        /// Registration year
        year: String,
    },
}

impl CaseQuery {
    /// Length of a full CNR.
    pub const CNR_LEN: usize = 16;

    /// Build a query from positional command-line tokens.
    ///
    /// A lone token must be a full CNR; otherwise all three components are required.
    pub fn from_tokens(
        first: &str,
        number: Option<&str>,
        year: Option<&str>,
    ) -> Result<Self, CoreError> {
        let first = first.trim();
        match (number, year) {
            (None, None) => {
                static CNR_REGEX: OnceLock<Regex> = OnceLock::new();
                let regex =
                    CNR_REGEX.get_or_init(|| Regex::new(r"^[A-Za-z0-9]{16}$").expect("valid regex"));

                if regex.is_match(first) {
                    Ok(Self::Cnr(CaseIdentifier::new(first.to_ascii_uppercase())?))
                } else {
                    Err(CoreError::Validation(format!(
                        "expected a full {}-character CNR (e.g. MHAU030151912016), got '{first}'",
                        Self::CNR_LEN
                    )))
                }
            }
            (Some(number), Some(year)) => {
                let (number, year) = (number.trim(), year.trim());
                if first.is_empty() || number.is_empty() || year.is_empty() {
                    return Err(CoreError::Validation(
                        "case type, number, and year must all be non-empty".to_string(),
                    ));
                }
                Ok(Self::Components {
                    case_type: first.to_string(),
                    number: number.to_string(),
                    year: year.to_string(),
                })
            }
            _ => Err(CoreError::Validation(
                "provide either a full CNR or case type, number, and year".to_string(),
            )),
        }
    }

    /// Identifier to use when the result page does not carry a CNR.
    #[must_use]
    pub fn fallback_identifier(&self) -> CaseIdentifier {
        match self {
            Self::Cnr(cnr) => cnr.clone(),
            Self::Components {
                case_type,
                number,
                year,
            } => CaseIdentifier::new(format!("{case_type}{number}{year}"))
                .unwrap_or_else(|_| CaseIdentifier::unknown()),
        }
    }
}

impl fmt::Display for CaseQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cnr(cnr) => write!(f, "CNR {cnr}"),
            Self::Components {
                case_type,
                number,
                year,
            } => write!(f, "case {case_type}/{number}/{year}"),
        }
    }
}

/// Dropdown choices that identify one court's cause list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CauseListSelection {
    /// State, by visible dropdown text
    pub state: String,
    /// District, by visible dropdown text
    pub district: String,
    /// Court complex, by visible dropdown text
    pub court_complex: String,
    /// Listing date in `DD-MM-YYYY`; today when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl CauseListSelection {
    /// The listing date to submit, defaulting to `today`.
    #[must_use]
    pub fn date_or(&self, today: NaiveDate) -> String {
        self.date
            .clone()
            .unwrap_or_else(|| today.format("%d-%m-%Y").to_string())
    }
}

/// Wrapper around `chrono::DateTime<Utc>` for consistent timestamp handling.
///
/// Provides serialization/deserialization and utility methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp representing the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Create a timestamp from a `DateTime<Utc>`.
    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Get the inner `DateTime<Utc>`.
    #[must_use]
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Parse a timestamp from an RFC3339 string.
    pub fn from_rfc3339(s: &str) -> Result<Self, CoreError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(|e| CoreError::Validation(format!("invalid timestamp: {e}")))
    }

    /// Format as RFC3339 string.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }

    /// Local `YYYYMMDD_HHMMSS`, used in artifact file names.
    #[must_use]
    pub fn file_stamp(&self) -> String {
        self.0
            .with_timezone(&Local)
            .format("%Y%m%d_%H%M%S")
            .to_string()
    }

    /// Local wall-clock rendering for documents.
    #[must_use]
    pub fn human(&self) -> String {
        self.0
            .with_timezone(&Local)
            .format("%Y-%m-%d at %H:%M:%S")
            .to_string()
    }

    /// Local calendar date.
    #[must_use]
    pub fn local_date(&self) -> NaiveDate {
        self.0.with_timezone(&Local).date_naive()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_identifier_trims() {
        let id = CaseIdentifier::new("  MHAU030151912016 ").expect("valid identifier");
        assert_eq!(id.as_str(), "MHAU030151912016");
    }

    #[test]
    fn test_case_identifier_rejects_empty() {
        assert!(CaseIdentifier::new("").is_err());
        assert!(CaseIdentifier::new("   ").is_err());
    }

    #[test]
    fn test_case_identifier_file_stem() {
        let id = CaseIdentifier::new("CS/12 of 2016").expect("valid identifier");
        assert_eq!(id.file_stem(), "CS_12_of_2016");
    }

    #[test]
    fn test_case_identifier_deserialize_rejects_empty() {
        assert!(serde_json::from_str::<CaseIdentifier>("\"\"").is_err());
        let id: CaseIdentifier = serde_json::from_str("\"ABC\"").expect("deserialize identifier");
        assert_eq!(id.as_str(), "ABC");
    }

    #[test]
    fn test_query_full_cnr() {
        let query = CaseQuery::from_tokens("mhau030151912016", None, None).expect("valid CNR");
        assert_eq!(
            query,
            CaseQuery::Cnr(CaseIdentifier::new("MHAU030151912016").expect("valid"))
        );
        assert_eq!(query.fallback_identifier().as_str(), "MHAU030151912016");
    }

    #[test]
    fn test_query_components() {
        let query =
            CaseQuery::from_tokens("MHAU03", Some("0151912"), Some("2016")).expect("valid query");
        assert!(matches!(query, CaseQuery::Components { .. }));
        assert_eq!(query.fallback_identifier().as_str(), "MHAU0301519122016");
        assert_eq!(query.to_string(), "case MHAU03/0151912/2016");
    }

    #[test]
    fn test_query_invalid() {
        let invalid = vec![
            ("MHAU03", None, None),               // Too short for a CNR
            ("MHAU0301519120161", None, None),    // Too long
            ("MHAU-3015191-2016", None, None),    // Punctuation
            ("MHAU03", Some("0151912"), None),    // Missing year
            ("MHAU03", Some(" "), Some("2016")),  // Blank number
        ];

        for (first, number, year) in invalid {
            assert!(
                CaseQuery::from_tokens(first, number, year).is_err(),
                "Should fail for: {first} {number:?} {year:?}"
            );
        }
    }

    #[test]
    fn test_cause_list_date_default() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 5).expect("valid date");
        let mut selection = CauseListSelection {
            state: "Maharashtra".to_string(),
            district: "Mumbai".to_string(),
            court_complex: "City Civil Court".to_string(),
            date: None,
        };
        assert_eq!(selection.date_or(today), "05-03-2026");

        selection.date = Some("06-03-2026".to_string());
        assert_eq!(selection.date_or(today), "06-03-2026");
    }

    #[test]
    fn test_timestamp_rfc3339() {
        let ts = Timestamp::now();
        let s = ts.to_rfc3339();
        let parsed = Timestamp::from_rfc3339(&s).expect("parse RFC3339 timestamp");
        assert_eq!(ts.as_datetime().timestamp(), parsed.as_datetime().timestamp());
    }

    #[test]
    fn test_timestamp_file_stamp_shape() {
        let stamp = Timestamp::now().file_stamp();
        assert_eq!(stamp.len(), 15);
        assert_eq!(stamp.as_bytes()[8], b'_');
        assert!(stamp.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
    }
}
