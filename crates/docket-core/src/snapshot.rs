//! Raw cause-list page snapshots.

use crate::types::{CauseListSelection, Timestamp};
use serde::{Deserialize, Serialize};

/// A cause-list page as it looked when captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSnapshot {
    /// Page URL at capture time, when the browser reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Dropdown choices used to reach the list; `None` in manual mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<CauseListSelection>,
    /// When the page was captured
    pub captured_at: Timestamp,
    /// Full page markup
    pub markup: String,
    /// Visible text lines of the page, whitespace-normalized
    pub text: String,
}
