use crate::error::{BrowserError, Result};

/// Browser actions for automation
#[async_trait::async_trait]
pub trait BrowserActions: Send + Sync {
    /// Navigate to a URL
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Current page markup
    async fn content(&self) -> Result<String>;

    /// Current page URL, if the page has one
    async fn url(&self) -> Result<Option<String>>;

    /// Clear a form field and type a value into it
    async fn fill_field(&self, selector: &str, value: &str) -> Result<()>;

    /// Click an element by selector
    async fn click(&self, selector: &str) -> Result<()>;

    /// Evaluate a script in the page and return its JSON result
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value>;
}

/// Helper to extract domain from URL
pub fn extract_domain(url: &str) -> Result<String> {
    let url = url::Url::parse(url)
        .map_err(|e| BrowserError::NavigationError(format!("Invalid URL: {}", e)))?;

    url.host_str()
        .ok_or_else(|| BrowserError::NavigationError("No host in URL".to_string()))
        .map(|s| s.to_string())
}

/// Encode a string as a JavaScript string literal.
pub fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_domain() {
        assert_eq!(
            extract_domain("https://services.ecourts.gov.in/ecourtindia_v6/").unwrap(),
            "services.ecourts.gov.in"
        );
        assert_eq!(
            extract_domain("http://subdomain.example.com:8080/path").unwrap(),
            "subdomain.example.com"
        );
    }

    #[test]
    fn test_extract_domain_invalid() {
        assert!(extract_domain("not-a-url").is_err());
    }

    #[test]
    fn test_js_string_escapes() {
        assert_eq!(js_string("#cino"), "\"#cino\"");
        assert_eq!(js_string("a\"b"), "\"a\\\"b\"");
    }
}
