use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserError>;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("chromium error: {0}")]
    ChromiumError(String),

    #[error("navigation failed: {0}")]
    NavigationError(String),

    #[error("selector not found: {0}")]
    SelectorNotFound(String),

    #[error("no option matching '{wanted}' in {selector}")]
    OptionNotFound { selector: String, wanted: String },

    #[error("script failed: {0}")]
    ScriptError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BrowserError::NavigationError("page not found".to_string());
        assert_eq!(err.to_string(), "navigation failed: page not found");
    }

    #[test]
    fn test_option_not_found_display() {
        let err = BrowserError::OptionNotFound {
            selector: "#state_code".to_string(),
            wanted: "Atlantis".to_string(),
        };
        assert!(err.to_string().contains("Atlantis"));
        assert!(err.to_string().contains("#state_code"));
    }
}
