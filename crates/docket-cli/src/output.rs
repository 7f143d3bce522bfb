//! User-facing report on stdout and JSON artifacts.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use docket_core::{persist, CaseRecord, CauseListSelection, RawSnapshot, Timestamp};
use serde::Serialize;

use crate::args::DateCheck;

const RULE: &str = "==================================================";

/// Outcome of a cause-list run, written as `cause_list_result.json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CauseListResult<'a> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<&'a CauseListSelection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<&'a str>,
    pub captured_at: Timestamp,
    pub pdf_created: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_path: Option<&'a Path>,
}

impl<'a> CauseListResult<'a> {
    pub fn new(snapshot: &'a RawSnapshot, pdf_path: Option<&'a Path>) -> Self {
        Self {
            status: "success",
            selection: snapshot.selection.as_ref(),
            url: snapshot.url.as_deref(),
            captured_at: snapshot.captured_at,
            pdf_created: pdf_path.is_some(),
            pdf_path,
        }
    }
}

pub fn print_case(record: &CaseRecord) {
    println!("\n{RULE}\nCASE DETAILS\n{RULE}");
    println!("CNR Number: {}", record.identifier());
    for (label, value) in record.fields().iter() {
        println!("{label}: {value}");
    }
}

pub fn print_listing_check(record: &CaseRecord, check: DateCheck, date: NaiveDate, listed: bool) {
    let label = check.label();
    println!(
        "\n{RULE}\nLISTING CHECK FOR {} ({})\n{RULE}",
        label.to_uppercase(),
        date.format("%Y-%m-%d")
    );

    if listed {
        println!("✓ Case IS listed {label}");
        println!("Serial Number: {}", record.serial_number().unwrap_or("N/A"));
        println!("Court Name: {}", record.court().unwrap_or("N/A"));
        println!("Next Hearing: {}", record.next_hearing_date().unwrap_or("N/A"));
    } else {
        println!("✗ Case is NOT listed {label}");
    }
}

pub fn print_pdf_status(pdf: Option<&Path>) {
    match pdf {
        Some(path) => println!("✓ PDF Created: {}", path.display()),
        None => println!("✗ PDF creation failed"),
    }
}

/// JSON file for a case record under `dir`.
pub fn case_json_path(dir: &Path, record: &CaseRecord) -> PathBuf {
    dir.join(format!(
        "case_{}_{}.json",
        record.identifier().file_stem(),
        record.retrieved_at().file_stamp()
    ))
}

/// Save `value` as pretty JSON and tell the user where it went.
pub fn save<T: Serialize + ?Sized>(value: &T, path: &Path) -> docket_core::Result<()> {
    persist::save_json(value, path)?;
    println!("✓ Data saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cause_list_result_json() {
        let snapshot = RawSnapshot {
            url: Some("https://services.ecourts.gov.in/ecourtindia_v6/".to_string()),
            selection: None,
            captured_at: Timestamp::now(),
            markup: "<html></html>".to_string(),
            text: String::new(),
        };

        let value = serde_json::to_value(CauseListResult::new(&snapshot, None)).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["pdfCreated"], false);
        assert!(value.get("pdfPath").is_none());
        assert!(value.get("selection").is_none());
        assert!(value.get("capturedAt").is_some());
    }
}
