//! JSON persistence for records and run outcomes.

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Write `value` as pretty-printed JSON, creating parent directories.
pub fn save_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let contents = serde_json::to_string_pretty(value)?;
    fs::write(path, contents)?;
    tracing::debug!("Saved {}", path.display());
    Ok(())
}

/// Read a JSON document written by [`save_json`].
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CaseFields, CaseRecord, ListingInfo};
    use crate::types::{CaseIdentifier, Timestamp};
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load_record() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("nested").join("case.json");

        let record = CaseRecord::new(
            CaseIdentifier::new("DLHC010001232024").expect("valid identifier"),
            Timestamp::now(),
            [("Case Status", "Pending")].into_iter().collect::<CaseFields>(),
            ListingInfo {
                serial_number: Some("14".to_string()),
                ..ListingInfo::default()
            },
            "<div>Case Status Pending</div>".to_string(),
            "Case Status Pending".to_string(),
        );

        save_json(&record, &path).expect("save record");
        let loaded: CaseRecord = load_json(&path).expect("load record");
        assert_eq!(loaded, record);
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = TempDir::new().expect("create temp dir");
        let result: Result<CaseRecord> = load_json(&tmp.path().join("absent.json"));
        assert!(result.is_err());
    }
}
