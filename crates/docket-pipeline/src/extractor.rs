//! Heuristic extraction of a [`CaseRecord`] from result markup.
//!
//! Two passes, the second only filling what the first left empty:
//!
//! 1. every row of two or more cells in every table becomes a label/value pair
//! 2. ordered regex rules over the lower-cased flattened text fill the listing
//!    facets; within a facet the first pattern that matches wins
//!
//! Extraction never fails. Missing data leaves facets unset.

use crate::markup::{self, normalize_whitespace};
use crate::readiness::SelectorSpec;
use docket_core::{CaseFields, CaseIdentifier, CaseRecord, ListingInfo, Timestamp};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::OnceLock;

/// The result container's markup, guaranteed to carry visible text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultBlock {
    markup: String,
    text: String,
}

impl ResultBlock {
    /// Wrap container markup, or `None` when it has no visible text.
    #[must_use]
    pub fn from_markup(markup: impl Into<String>) -> Option<Self> {
        let markup = markup.into();
        let text = markup::visible_text(&markup);
        if text.is_empty() {
            return None;
        }
        Some(Self { markup, text })
    }

    /// Container markup as found on the page.
    #[must_use]
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Visible text, one normalized line per text node.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A listing fact filled by the regex pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingFacet {
    /// [`ListingInfo::next_hearing_date`]
    NextHearingDate,
    /// [`ListingInfo::court`]
    Court,
    /// [`ListingInfo::serial_number`]
    SerialNumber,
}

impl ListingFacet {
    fn slot(self, listing: &mut ListingInfo) -> &mut Option<String> {
        match self {
            Self::NextHearingDate => &mut listing.next_hearing_date,
            Self::Court => &mut listing.court,
            Self::SerialNumber => &mut listing.serial_number,
        }
    }
}

/// Ordered candidate patterns for one facet. The first capture group of the
/// first matching pattern is the value.
#[derive(Debug, Clone)]
pub struct FacetRule {
    facet: ListingFacet,
    patterns: Vec<Regex>,
}

impl FacetRule {
    /// Build a rule from patterns that each have one capture group.
    pub fn new(facet: ListingFacet, patterns: &[&str]) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { facet, patterns })
    }

    /// Facet this rule fills.
    #[must_use]
    pub fn facet(&self) -> ListingFacet {
        self.facet
    }

    /// Value captured by the first matching pattern. A match whose capture is
    /// blank counts as no match and the next pattern is tried.
    #[must_use]
    pub fn apply(&self, text: &str) -> Option<String> {
        self.patterns.iter().find_map(|pattern| {
            let captured = pattern.captures(text)?.get(1)?.as_str().trim();
            (!captured.is_empty()).then(|| captured.to_string())
        })
    }
}

fn default_rules() -> &'static [FacetRule] {
    static RULES: OnceLock<Vec<FacetRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        vec![
            FacetRule::new(
                ListingFacet::NextHearingDate,
                &[
                    r"next hearing date[:\s]*([0-9]{1,2}-[0-9]{1,2}-[0-9]{4})",
                    r"next date[:\s]*([0-9]{1,2}-[0-9]{1,2}-[0-9]{4})",
                    r"hearing date[:\s]*([0-9]{1,2}-[0-9]{1,2}-[0-9]{4})",
                    r"listed on[:\s]*([0-9]{1,2}-[0-9]{1,2}-[0-9]{4})",
                ],
            )
            .expect("valid regex"),
            FacetRule::new(
                ListingFacet::Court,
                &[
                    r"court[:\s]*([^\n]+)",
                    r"before[:\s]*([^\n]+)",
                    r"judge[:\s]*([^\n]+)",
                ],
            )
            .expect("valid regex"),
            FacetRule::new(
                ListingFacet::SerialNumber,
                &[
                    r"serial no[.:]\s*([^\s]+)",
                    r"sl no[.:]\s*([^\s]+)",
                    r"sr no[.:]\s*([^\s]+)",
                ],
            )
            .expect("valid regex"),
        ]
    })
}

fn cnr_label_regex() -> &'static Regex {
    static CNR_LABEL: OnceLock<Regex> = OnceLock::new();
    CNR_LABEL.get_or_init(|| Regex::new(r"CNR No[.:]\s*([A-Z0-9]+)").expect("valid regex"))
}

/// Turns result markup into a [`CaseRecord`].
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    container: Option<SelectorSpec>,
    rules: Vec<FacetRule>,
}

impl Default for RecordExtractor {
    fn default() -> Self {
        Self {
            container: None,
            rules: default_rules().to_vec(),
        }
    }
}

impl RecordExtractor {
    /// Locate results inside `container` when given a full page.
    #[must_use]
    pub fn with_container(mut self, container: SelectorSpec) -> Self {
        self.container = Some(container);
        self
    }

    /// Append a rule, tried after the built-in rules for its facet.
    #[must_use]
    pub fn with_rule(mut self, rule: FacetRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Find the result container in a full page.
    ///
    /// `None` when the container is missing or carries no visible text; the
    /// caller reports that as its own outcome instead of extracting.
    #[must_use]
    pub fn locate(&self, page_markup: &str) -> Option<ResultBlock> {
        let markup = match &self.container {
            Some(container) => markup::first_outer_html(page_markup, container.selector())?,
            None => page_markup.to_string(),
        };
        ResultBlock::from_markup(markup)
    }

    /// Extract a record, stamped with the current time.
    #[must_use]
    pub fn extract(&self, block: &ResultBlock, fallback: &CaseIdentifier) -> CaseRecord {
        self.extract_at(block, fallback, Timestamp::now())
    }

    /// Extract a record with an explicit retrieval time.
    #[must_use]
    pub fn extract_at(
        &self,
        block: &ResultBlock,
        fallback: &CaseIdentifier,
        retrieved_at: Timestamp,
    ) -> CaseRecord {
        let (fields, plain_text) = tabular_pass(block.markup());

        let lowered = block.text().to_lowercase();
        let mut listing = ListingInfo::default();
        for rule in &self.rules {
            let slot = rule.facet().slot(&mut listing);
            if slot.is_none() {
                *slot = rule.apply(&lowered);
            }
        }

        let identifier = resolve_identifier(block.text(), fallback);

        tracing::debug!(
            %identifier,
            fields = fields.len(),
            listing = listing.entries().len(),
            "extracted case record"
        );

        CaseRecord::new(
            identifier,
            retrieved_at,
            fields,
            listing,
            block.markup().to_string(),
            plain_text,
        )
    }
}

/// Label/value pairs from every table row, plus the block's flattened text.
fn tabular_pass(block_markup: &str) -> (CaseFields, String) {
    static SELECTORS: OnceLock<(Selector, Selector, Selector)> = OnceLock::new();
    let (table, row, cell) = SELECTORS.get_or_init(|| {
        (
            Selector::parse("table").expect("valid selector"),
            Selector::parse("tr").expect("valid selector"),
            Selector::parse("td, th").expect("valid selector"),
        )
    });

    let fragment = Html::parse_fragment(block_markup);
    let mut fields = CaseFields::new();

    for table in fragment.select(table) {
        for row in table.select(row) {
            let cells: Vec<_> = row.select(cell).take(2).collect();
            if cells.len() < 2 {
                continue;
            }
            let label = normalize_whitespace(&cells[0].text().collect::<String>());
            let label = label.replace(':', "");
            let value = normalize_whitespace(&cells[1].text().collect::<String>());
            fields.insert(label.trim(), value);
        }
    }

    let plain_text = fragment
        .root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    (fields, plain_text)
}

fn resolve_identifier(text: &str, fallback: &CaseIdentifier) -> CaseIdentifier {
    cnr_label_regex()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| CaseIdentifier::new(m.as_str()).ok())
        .unwrap_or_else(|| fallback.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(html: &str) -> ResultBlock {
        ResultBlock::from_markup(html).expect("block has text")
    }

    fn fallback() -> CaseIdentifier {
        CaseIdentifier::new("MHAU030151912016").unwrap()
    }

    #[test]
    fn test_tabular_pairs_normalized_and_blank_skipped() {
        let html = r#"<div id="history_cnr"><table>
            <tr><th>Case Type :</th><td>  Civil   Suit </td></tr>
            <tr><td>Filing Number</td><td></td></tr>
            <tr><td>   </td><td>orphan</td></tr>
            <tr><td>Only one cell</td></tr>
            <tr><td>Registration
                Number:</td><td>55/2020</td><td>ignored third cell</td></tr>
        </table></div>"#;

        let record = RecordExtractor::default().extract(&block(html), &fallback());
        let fields: Vec<_> = record.fields().iter().collect();
        assert_eq!(
            fields,
            vec![
                ("Case Type", "Civil Suit"),
                ("Registration Number", "55/2020"),
            ]
        );
    }

    #[test]
    fn test_duplicate_label_last_value_wins() {
        let html = r"<table>
            <tr><td>Case Status</td><td>Pending</td></tr>
            <tr><td>Stage</td><td>Evidence</td></tr>
        </table><table>
            <tr><td>Case Status:</td><td>Disposed</td></tr>
        </table>";

        let record = RecordExtractor::default().extract(&block(html), &fallback());
        let fields: Vec<_> = record.fields().iter().collect();
        assert_eq!(
            fields,
            vec![("Case Status", "Disposed"), ("Stage", "Evidence")]
        );
    }

    #[test]
    fn test_each_hearing_phrase_extracts_date() {
        for phrase in ["Next Hearing Date", "Next Date", "Hearing Date", "Listed On"] {
            let html = format!("<p>{phrase}: 05-03-2026</p>");
            let record = RecordExtractor::default().extract(&block(&html), &fallback());
            assert_eq!(
                record.next_hearing_date(),
                Some("05-03-2026"),
                "phrase {phrase}"
            );
        }
    }

    #[test]
    fn test_hearing_pattern_priority() {
        let html = "<p>Listed on 01-02-2026</p><p>Next Date: 7-3-2026</p>";
        let record = RecordExtractor::default().extract(&block(html), &fallback());
        assert_eq!(record.next_hearing_date(), Some("7-3-2026"));
    }

    #[test]
    fn test_court_and_serial_facets() {
        let html = r"<table>
            <tr><td>Court Number and Judge</td><td>2-Civil Judge Senior Division</td></tr>
            <tr><td>Sr No.</td><td>14</td></tr>
        </table>";

        let record = RecordExtractor::default().extract(&block(html), &fallback());
        assert_eq!(record.court(), Some("number and judge"));
        assert_eq!(record.serial_number(), Some("14"));
    }

    #[test]
    fn test_missing_facets_stay_unset() {
        let record =
            RecordExtractor::default().extract(&block("<p>Case disposed</p>"), &fallback());
        assert!(record.listing().is_empty());
        assert_eq!(record.next_hearing_date(), None);
    }

    #[test]
    fn test_identifier_from_cnr_label() {
        let html = "<p>CNR No: DLHC010012342021</p><p>Case disposed</p>";
        let record = RecordExtractor::default().extract(&block(html), &fallback());
        assert_eq!(record.identifier().as_str(), "DLHC010012342021");

        let record =
            RecordExtractor::default().extract(&block("<p>Case disposed</p>"), &fallback());
        assert_eq!(record.identifier(), &fallback());
    }

    #[test]
    fn test_raw_markup_and_plain_text_kept() {
        let html = "<div><b>Case</b>\n   <i>Status</i></div>";
        let record = RecordExtractor::default().extract(&block(html), &fallback());
        assert_eq!(record.raw_markup(), html);
        assert_eq!(record.plain_text(), "Case Status");
    }

    #[test]
    fn test_locate_requires_visible_text() {
        let extractor = RecordExtractor::default()
            .with_container(SelectorSpec::new("#history_cnr").unwrap());

        assert!(extractor.locate("<div id='other'>text</div>").is_none());
        assert!(extractor
            .locate("<div id='history_cnr'> <script>x()</script> </div>")
            .is_none());

        let found = extractor
            .locate("<body><div id='history_cnr'><p>Case Status</p></div></body>")
            .expect("container");
        assert!(found.markup().starts_with("<div id=\"history_cnr\">"));
        assert_eq!(found.text(), "Case Status");
    }

    #[test]
    fn test_custom_rule_fills_only_unset_facets() {
        let rule = FacetRule::new(ListingFacet::SerialNumber, &[r"item\s+([0-9]+)"])
            .expect("valid rule");
        let extractor = RecordExtractor::default().with_rule(rule);

        let record = extractor.extract(&block("<p>Item 9</p>"), &fallback());
        assert_eq!(record.serial_number(), Some("9"));

        let record = extractor.extract(&block("<p>Sl No: 3 Item 9</p>"), &fallback());
        assert_eq!(record.serial_number(), Some("3"));
    }

    #[test]
    fn test_blank_capture_falls_through() {
        let rule = FacetRule::new(ListingFacet::Court, &[r"court[:\s]*([^\n]*)", r"judge (\w+)"])
            .expect("valid rule");
        assert_eq!(rule.apply("judge smith\ncourt:"), Some("smith".to_string()));
    }
}
