//! Case and cause-list reports.

use crate::document::{Block, Column, Document, Table, TextStyle};
use crate::error::{ReportError, Result};
use crate::layout::{paginate, PageGeometry};
use crate::pdf;
use docket_core::{CaseIdentifier, CaseRecord, RawSnapshot, Timestamp};
use std::path::{Path, PathBuf};

const CASE_TITLE: &str = "eCourts India - Case Details";
const CAUSE_LIST_TITLE: &str = "eCourts India - Cause List";

const FIELD_COLUMNS: [Column; 2] = [Column::new(30, 46.0), Column::new(50, 114.0)];
const LISTING_COLUMNS: [Column; 2] = [Column::new(25, 51.0), Column::new(40, 109.0)];

const VERIFY_NOTICE: &str = "For official purposes, please verify with the original court records";
const FOOTER: &str = "Confidential - Generated by Docket";

/// File name for a case report: `case_{identifier}_{YYYYMMDD_HHMMSS}.pdf`.
#[must_use]
pub fn case_file_name(identifier: &CaseIdentifier, generated_at: Timestamp) -> String {
    format!(
        "case_{}_{}.pdf",
        identifier.file_stem(),
        generated_at.file_stamp()
    )
}

/// File name for a cause-list report: `cause_list_{YYYYMMDD_HHMMSS}.pdf`.
#[must_use]
pub fn cause_list_file_name(generated_at: Timestamp) -> String {
    format!("cause_list_{}.pdf", generated_at.file_stamp())
}

/// `next_hearing_date` becomes `Next Hearing Date`.
#[must_use]
pub fn humanize_key(key: &str) -> String {
    key.split('_')
        .filter(|token| !token.is_empty())
        .map(|token| {
            let mut chars = token.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builds report documents and writes them under one output directory.
#[derive(Debug, Clone)]
pub struct ReportRenderer {
    output_dir: PathBuf,
    geometry: PageGeometry,
}

impl ReportRenderer {
    /// Renderer writing A4 reports into `output_dir`, created on first use.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            geometry: PageGeometry::default(),
        }
    }

    /// Directory reports are written to.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Case report generated now.
    #[must_use]
    pub fn render_case_report(record: &CaseRecord) -> Document {
        Self::render_case_report_at(record, Timestamp::now())
    }

    /// Case report with sections in a fixed order: title, case information,
    /// case details, hearing information, notes, footer.
    #[must_use]
    pub fn render_case_report_at(record: &CaseRecord, generated_at: Timestamp) -> Document {
        let identifier = record.identifier();
        let mut doc = Document::new(CASE_TITLE, case_file_name(identifier, generated_at));

        doc.text(TextStyle::Title, CASE_TITLE)
            .text(TextStyle::Heading, "Case Information")
            .field("CNR Number", identifier.as_str())
            .field("Retrieved", record.retrieved_at().human());

        if !record.fields().is_empty() {
            let mut table = Table::new(FIELD_COLUMNS, ["Field", "Value"]);
            for (label, value) in record.fields().iter() {
                table.push_row(label, value);
            }
            doc.text(TextStyle::Heading, "Case Details")
                .push(Block::Table(table));
        }

        let listing = record.listing().entries();
        if !listing.is_empty() {
            let mut table = Table::new(LISTING_COLUMNS, ["Information", "Details"]);
            for (key, value) in listing {
                table.push_row(humanize_key(key), value);
            }
            doc.text(TextStyle::Heading, "Hearing & Court Information")
                .push(Block::Table(table));
        }

        doc.text(TextStyle::Heading, "Additional Information")
            .text(
                TextStyle::Note,
                "- This document was automatically generated from the eCourts India portal",
            )
            .text(
                TextStyle::Note,
                format!("- Generated on: {}", generated_at.human()),
            )
            .text(TextStyle::Note, format!("- {VERIFY_NOTICE}"))
            .text(TextStyle::Note, format!("- Document ID: {identifier}"))
            .text(TextStyle::Footer, FOOTER);

        doc
    }

    /// Cause-list report generated now.
    #[must_use]
    pub fn render_cause_list_snapshot(snapshot: &RawSnapshot) -> Document {
        Self::render_cause_list_snapshot_at(snapshot, Timestamp::now())
    }

    /// Cause-list report: title, capture details, page text, note.
    #[must_use]
    pub fn render_cause_list_snapshot_at(snapshot: &RawSnapshot, generated_at: Timestamp) -> Document {
        let mut doc = Document::new(CAUSE_LIST_TITLE, cause_list_file_name(generated_at));

        doc.text(TextStyle::Title, CAUSE_LIST_TITLE)
            .field("Generated on", generated_at.human())
            .field("Captured", snapshot.captured_at.human())
            .field("URL", snapshot.url.as_deref().unwrap_or("N/A"));

        if let Some(selection) = &snapshot.selection {
            doc.field("State", &selection.state)
                .field("District", &selection.district)
                .field("Court Complex", &selection.court_complex)
                .field("Date", selection.date.as_deref().unwrap_or("N/A"));
        }

        doc.text(TextStyle::Heading, "Cause List");
        let mut any_text = false;
        for line in snapshot.text.lines().filter(|l| !l.trim().is_empty()) {
            doc.text(TextStyle::Body, line);
            any_text = true;
        }
        if !any_text {
            doc.text(TextStyle::Body, "The captured page carried no readable text.");
        }

        doc.push(Block::Spacer(4.0)).text(
            TextStyle::Note,
            "Note: This is an automatically generated document from the eCourts portal. \
             For official purposes, please refer to the original website.",
        );

        doc
    }

    /// Write `doc` as a PDF into the output directory.
    ///
    /// Returns the written path, or `None` after logging why rendering failed.
    #[must_use]
    pub fn publish(&self, doc: &Document) -> Option<PathBuf> {
        match self.write(doc) {
            Ok(path) => {
                tracing::info!("PDF created: {}", path.display());
                Some(path)
            }
            Err(e) => {
                tracing::error!("error creating PDF {}: {}", doc.file_name(), e);
                None
            }
        }
    }

    fn write(&self, doc: &Document) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir).map_err(|source| ReportError::Io {
            path: self.output_dir.clone(),
            source,
        })?;

        let path = self.output_dir.join(doc.file_name());
        let pages = paginate(doc, &self.geometry);
        tracing::debug!(pages = pages.len(), "rendering {}", doc.file_name());
        pdf::write_pdf(doc.title(), &pages, &self.geometry, &path)?;
        Ok(path)
    }
}
