//! Best-effort check for a hearing on a given date.
//!
//! Matching is textual containment of `DD-MM-YYYY` or the partial `DD-MM`,
//! never date parsing. It is permissive on purpose: a coincidental substring
//! may produce a false positive, but a genuine listing is never missed.

use chrono::NaiveDate;
use docket_core::CaseRecord;

/// Where a date was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchTier {
    /// The extracted next hearing date
    NextHearingDate,
    /// A field whose label mentions a date or hearing; carries the label
    LabeledField(String),
    /// Anywhere in the raw result markup
    RawMarkup,
}

/// Answers whether a record shows a hearing on a date.
pub struct ListingDateMatcher;

impl ListingDateMatcher {
    /// `true` when any tier contains the date.
    #[must_use]
    pub fn is_listed_on(record: &CaseRecord, date: NaiveDate) -> bool {
        Self::match_tier(record, date).is_some()
    }

    /// First tier that contains the date, checked in order.
    #[must_use]
    pub fn match_tier(record: &CaseRecord, date: NaiveDate) -> Option<MatchTier> {
        let full = date.format("%d-%m-%Y").to_string();
        let partial = date.format("%d-%m").to_string();
        let contains = |text: &str| text.contains(&full) || text.contains(&partial);

        if record.next_hearing_date().is_some_and(contains) {
            return Some(MatchTier::NextHearingDate);
        }

        let labeled = record.fields().iter().find(|(label, value)| {
            let label = label.to_lowercase();
            (label.contains("date") || label.contains("hearing")) && contains(value)
        });
        if let Some((label, _)) = labeled {
            return Some(MatchTier::LabeledField(label.to_string()));
        }

        if contains(&record.raw_markup().to_lowercase()) {
            return Some(MatchTier::RawMarkup);
        }

        None
    }
}
