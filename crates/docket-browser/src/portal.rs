//! Portal-specific page operations on top of generic browser actions.

use crate::actions::{extract_domain, js_string, BrowserActions};
use crate::error::{BrowserError, Result};
use crate::source::{OptionMatch, PageSource, SelectedOption};
use async_trait::async_trait;
use docket_core::PortalConfig;
use serde::Deserialize;

/// A [`PageSource`] that drives the portal's forms through [`BrowserActions`].
pub struct PortalSession<A> {
    actions: A,
    portal: PortalConfig,
}

/// What the selection script reports back.
#[derive(Debug, Deserialize)]
struct SelectionReport {
    index: i64,
    text: Option<String>,
    matched: bool,
}

impl<A: BrowserActions> PortalSession<A> {
    /// Wrap a browser with the portal's selectors.
    pub fn new(actions: A, portal: PortalConfig) -> Self {
        Self { actions, portal }
    }

    /// Portal settings this session uses.
    pub fn portal(&self) -> &PortalConfig {
        &self.portal
    }

    /// Release the underlying browser, e.g. to close it.
    pub fn into_inner(self) -> A {
        self.actions
    }

    fn selection_script(selector: &str, wanted: &str, mode: OptionMatch) -> String {
        let loose = matches!(mode, OptionMatch::LooseWithFallback);
        format!(
            r"(() => {{
  const sel = document.querySelector({selector});
  if (!sel) return null;
  const wanted = {wanted};
  const upper = wanted.toUpperCase();
  const opts = Array.from(sel.options);
  let idx = opts.findIndex(o => {loose}
    ? (o.text.toUpperCase().includes(upper) || o.value === wanted)
    : o.text.trim() === wanted);
  const matched = idx >= 0;
  if (!matched && {loose} && opts.length > 1) idx = 1;
  if (idx < 0) return {{ index: -1, text: null, matched: false }};
  sel.selectedIndex = idx;
  sel.dispatchEvent(new Event('change', {{ bubbles: true }}));
  return {{ index: idx, text: opts[idx].text.trim(), matched }};
}})()",
            selector = js_string(selector),
            wanted = js_string(wanted),
        )
    }

    fn visible_errors_script(regions: &str) -> String {
        format!(
            r"Array.from(document.querySelectorAll({regions}))
  .filter(e => !!(e.offsetWidth || e.offsetHeight || e.getClientRects().length))
  .map(e => (e.innerText || '').trim())
  .filter(t => t.length > 0)",
            regions = js_string(regions),
        )
    }
}

#[async_trait]
impl<A: BrowserActions> PageSource for PortalSession<A> {
    async fn current_markup(&self) -> Result<String> {
        self.actions.content().await
    }

    async fn current_url(&self) -> Result<Option<String>> {
        self.actions.url().await
    }

    async fn navigate(&self, target: &str) -> Result<()> {
        let domain = extract_domain(target)?;
        tracing::debug!(%domain, "opening portal page");
        self.actions.navigate(target).await
    }

    async fn fill_field(&self, selector: &str, value: &str) -> Result<()> {
        self.actions.fill_field(selector, value).await
    }

    async fn select_option(
        &self,
        selector: &str,
        wanted: &str,
        mode: OptionMatch,
    ) -> Result<SelectedOption> {
        let value = self
            .actions
            .evaluate(&Self::selection_script(selector, wanted, mode))
            .await?;

        if value.is_null() {
            return Err(BrowserError::SelectorNotFound(selector.to_string()));
        }

        let report: SelectionReport = serde_json::from_value(value)
            .map_err(|e| BrowserError::ScriptError(format!("unexpected selection result: {e}")))?;

        match (report.index, report.text) {
            (index, Some(text)) if index >= 0 => {
                if report.matched {
                    Ok(SelectedOption::Matched(text))
                } else {
                    tracing::warn!(selector, wanted, fallback = %text, "no matching option");
                    Ok(SelectedOption::Fallback(text))
                }
            }
            _ => Err(BrowserError::OptionNotFound {
                selector: selector.to_string(),
                wanted: wanted.to_string(),
            }),
        }
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.actions.click(selector).await
    }

    async fn submit_challenge_response(&self, text: &str) -> Result<()> {
        self.actions
            .fill_field(&self.portal.captcha_input, text)
            .await?;
        self.actions.click(&self.portal.captcha_submit).await
    }

    async fn find_visible_error_text(&self) -> Result<Vec<String>> {
        let value = self
            .actions
            .evaluate(&Self::visible_errors_script(&self.portal.error_regions))
            .await?;

        if value.is_null() {
            return Ok(Vec::new());
        }

        serde_json::from_value(value)
            .map_err(|e| BrowserError::ScriptError(format!("unexpected error-region result: {e}")))
    }

    async fn refresh_challenge(&self) -> Result<()> {
        self.actions
            .evaluate(&self.portal.captcha_refresh_script)
            .await
            .map(|_| ())
    }
}
