//! The canonical case record.
//!
//! A [`CaseRecord`] is produced once per successful extraction pass and is
//! immutable afterwards. Its free-form `fields` stay a dynamic label/value map
//! because the source markup has no schema; the handful of listing facts the
//! rest of the system relies on live in [`ListingInfo`] behind typed accessors.

use crate::error::Result;
use crate::types::{CaseIdentifier, Timestamp};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered label/value pairs scraped from tabular markup.
///
/// Labels keep the position of their first occurrence. Empty labels and empty
/// values are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "IndexMap<String, String>", into = "IndexMap<String, String>")]
pub struct CaseFields(IndexMap<String, String>);

impl CaseFields {
    /// Create an empty field map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pair, overwriting the value of an existing label in place.
    ///
    /// Returns `false` (and stores nothing) when either side is blank.
    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) -> bool {
        let label = label.into();
        let value = value.into();
        let (label, value) = (label.trim(), value.trim());
        if label.is_empty() || value.is_empty() {
            return false;
        }
        self.0.insert(label.to_string(), value.to_string());
        true
    }

    /// Look up a value by exact label.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&str> {
        self.0.get(label).map(String::as_str)
    }

    /// Iterate pairs in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of stored pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no pairs are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<IndexMap<String, String>> for CaseFields {
    fn from(map: IndexMap<String, String>) -> Self {
        let mut fields = Self::new();
        for (label, value) in map {
            fields.insert(label, value);
        }
        fields
    }
}

impl From<CaseFields> for IndexMap<String, String> {
    fn from(fields: CaseFields) -> Self {
        fields.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CaseFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (label, value) in iter {
            fields.insert(label, value);
        }
        fields
    }
}

/// Scheduling information for the case's upcoming hearing.
///
/// The hearing date stays in the portal's textual `DD-MM-YYYY` form; it is
/// matched by containment, never parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingInfo {
    /// Next hearing date as printed by the portal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_hearing_date: Option<String>,
    /// Court or bench the case is listed before
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court: Option<String>,
    /// Serial number on the cause list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
}

impl ListingInfo {
    /// Whether every facet is unset or blank.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Set facets as `(snake_case_key, value)` pairs in declaration order.
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("next_hearing_date", &self.next_hearing_date),
            ("court", &self.court),
            ("serial_number", &self.serial_number),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(|v| (key, v))
        })
        .collect()
    }
}

/// One extracted case, as handed to rendering and persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRecord {
    identifier: CaseIdentifier,
    retrieved_at: Timestamp,
    fields: CaseFields,
    listing: ListingInfo,
    raw_markup: String,
    plain_text: String,
}

impl CaseRecord {
    /// Assemble a record. `raw_markup` is expected to be the non-empty result block.
    #[must_use]
    pub fn new(
        identifier: CaseIdentifier,
        retrieved_at: Timestamp,
        fields: CaseFields,
        listing: ListingInfo,
        raw_markup: String,
        plain_text: String,
    ) -> Self {
        debug_assert!(!raw_markup.is_empty(), "case record without markup");
        Self {
            identifier,
            retrieved_at,
            fields,
            listing,
            raw_markup,
            plain_text,
        }
    }

    /// Case reference number.
    #[must_use]
    pub fn identifier(&self) -> &CaseIdentifier {
        &self.identifier
    }

    /// When the record was extracted.
    #[must_use]
    pub fn retrieved_at(&self) -> Timestamp {
        self.retrieved_at
    }

    /// Free-form label/value pairs.
    #[must_use]
    pub fn fields(&self) -> &CaseFields {
        &self.fields
    }

    /// Listing facets.
    #[must_use]
    pub fn listing(&self) -> &ListingInfo {
        &self.listing
    }

    /// Next hearing date, if one was found.
    #[must_use]
    pub fn next_hearing_date(&self) -> Option<&str> {
        self.listing.next_hearing_date.as_deref()
    }

    /// Court the case is listed before, if found.
    #[must_use]
    pub fn court(&self) -> Option<&str> {
        self.listing.court.as_deref()
    }

    /// Cause list serial number, if found.
    #[must_use]
    pub fn serial_number(&self) -> Option<&str> {
        self.listing.serial_number.as_deref()
    }

    /// Result block markup exactly as captured.
    #[must_use]
    pub fn raw_markup(&self) -> &str {
        &self.raw_markup
    }

    /// Flattened text of the result block.
    #[must_use]
    pub fn plain_text(&self) -> &str {
        &self.plain_text
    }

    /// Serialize to the persisted record format.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse the persisted record format.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(listing: ListingInfo) -> CaseRecord {
        let fields: CaseFields = [
            ("Case Type", "CS - Civil Suit"),
            ("Filing Number", "1234/2016"),
        ]
        .into_iter()
        .collect();

        CaseRecord::new(
            CaseIdentifier::new("MHAU030151912016").expect("valid identifier"),
            Timestamp::from_rfc3339("2026-03-01T10:15:30.123456789Z").expect("valid timestamp"),
            fields,
            listing,
            "<div id=\"history_cnr\"><table></table></div>".to_string(),
            "Case Type CS - Civil Suit".to_string(),
        )
    }

    #[test]
    fn test_fields_drop_blank_pairs() {
        let mut fields = CaseFields::new();
        assert!(!fields.insert("", "value"));
        assert!(!fields.insert("Label", "   "));
        assert!(fields.insert("Label", "value"));
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn test_fields_overwrite_keeps_position() {
        let mut fields = CaseFields::new();
        fields.insert("First", "placeholder");
        fields.insert("Second", "b");
        fields.insert("First", "final");

        let pairs: Vec<_> = fields.iter().collect();
        assert_eq!(pairs, vec![("First", "final"), ("Second", "b")]);
    }

    #[test]
    fn test_listing_entries_skip_unset() {
        let listing = ListingInfo {
            next_hearing_date: Some("05-03-2026".to_string()),
            court: None,
            serial_number: Some(String::new()),
        };
        assert_eq!(listing.entries(), vec![("next_hearing_date", "05-03-2026")]);
        assert!(!listing.is_empty());
        assert!(ListingInfo::default().is_empty());
    }

    #[test]
    fn test_record_json_keys() {
        let record = sample_record(ListingInfo {
            next_hearing_date: Some("05-03-2026".to_string()),
            ..ListingInfo::default()
        });
        let value: serde_json::Value =
            serde_json::from_str(&record.to_json_pretty().expect("serialize")).expect("parse");

        for key in ["identifier", "retrievedAt", "fields", "listing", "rawMarkup", "plainText"] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(value["listing"]["nextHearingDate"], "05-03-2026");
        assert!(value["listing"].get("court").is_none());
        assert_eq!(value["fields"]["Case Type"], "CS - Civil Suit");
    }

    #[test]
    fn test_record_round_trip_preserves_unset() {
        let record = sample_record(ListingInfo {
            court: Some("2nd civil judge".to_string()),
            ..ListingInfo::default()
        });

        let json = record.to_json_pretty().expect("serialize record");
        let parsed = CaseRecord::from_json(&json).expect("deserialize record");

        assert_eq!(parsed, record);
        assert_eq!(parsed.next_hearing_date(), None);
        assert_eq!(parsed.serial_number(), None);
        assert_eq!(parsed.court(), Some("2nd civil judge"));
    }

    #[test]
    fn test_record_field_order_round_trips() {
        let record = sample_record(ListingInfo::default());
        let parsed =
            CaseRecord::from_json(&record.to_json_pretty().expect("serialize")).expect("parse");
        let labels: Vec<_> = parsed.fields().iter().map(|(k, _)| k).collect();
        assert_eq!(labels, vec!["Case Type", "Filing Number"]);
    }
}
