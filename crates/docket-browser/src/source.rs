//! The page source consumed by the acquisition pipeline.

use crate::error::Result;
use async_trait::async_trait;

/// How a dropdown option is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMatch {
    /// Visible text must equal the wanted value
    ExactText,
    /// Visible text contains the wanted value (case-insensitive) or the option
    /// value equals it; falls back to the first real option when nothing matches
    LooseWithFallback,
}

/// Which option ended up selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectedOption {
    /// An option matched the wanted value
    Matched(String),
    /// Nothing matched and the first real option was taken instead
    Fallback(String),
}

/// A single live page of the source portal.
///
/// One session per acquisition run, used by one caller at a time.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Current raw markup of the page.
    async fn current_markup(&self) -> Result<String>;

    /// Current page URL, if known.
    async fn current_url(&self) -> Result<Option<String>>;

    /// Load a new page.
    async fn navigate(&self, target: &str) -> Result<()>;

    /// Replace the contents of a form field.
    async fn fill_field(&self, selector: &str, value: &str) -> Result<()>;

    /// Choose an option in a dropdown.
    async fn select_option(
        &self,
        selector: &str,
        wanted: &str,
        mode: OptionMatch,
    ) -> Result<SelectedOption>;

    /// Click an element.
    async fn click(&self, selector: &str) -> Result<()>;

    /// Enter a CAPTCHA solution and submit the search form.
    async fn submit_challenge_response(&self, text: &str) -> Result<()>;

    /// Text of every visible, non-empty error region.
    async fn find_visible_error_text(&self) -> Result<Vec<String>>;

    /// Ask the page for a new CAPTCHA image.
    async fn refresh_challenge(&self) -> Result<()>;
}
