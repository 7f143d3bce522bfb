//! Polling the page until a result container carries real content.
//!
//! The portal renders results asynchronously and the container's shape varies
//! between page variants, so readiness is an ordered list of candidate
//! selectors tried most-specific first. Running out of polls is a normal
//! outcome, reported as [`ReadinessResult::TimedOut`].

use crate::error::{AcquisitionError, Result};
use crate::wait;
use async_trait::async_trait;
use docket_browser::PageSource;
use docket_core::ReadinessConfig;
use scraper::{Html, Selector};
use std::fmt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// A validated CSS selector together with its source text.
#[derive(Clone)]
pub struct SelectorSpec {
    css: String,
    selector: Selector,
}

impl SelectorSpec {
    /// Parse a CSS selector.
    pub fn new(css: impl Into<String>) -> Result<Self> {
        let css = css.into();
        let selector =
            Selector::parse(&css).map_err(|e| AcquisitionError::InvalidSelector {
                selector: css.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self { css, selector })
    }

    /// Parse an ordered list of selectors, failing on the first invalid one.
    pub fn parse_all<I, S>(candidates: I) -> Result<Vec<Self>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        candidates.into_iter().map(Self::new).collect()
    }

    /// Selector text as configured.
    #[must_use]
    pub fn css(&self) -> &str {
        &self.css
    }

    /// Parsed selector.
    #[must_use]
    pub fn selector(&self) -> &Selector {
        &self.selector
    }
}

impl fmt::Debug for SelectorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SelectorSpec").field(&self.css).finish()
    }
}

/// Supplies the current page markup, or `None` when it cannot be read right now.
#[async_trait]
pub trait ContentProbe: Send + Sync {
    /// Take one snapshot of the page.
    async fn snapshot(&self) -> Option<String>;
}

/// Probes a live [`PageSource`].
pub struct PageProbe<'a> {
    source: &'a dyn PageSource,
}

impl<'a> PageProbe<'a> {
    /// Probe the given page.
    #[must_use]
    pub fn new(source: &'a dyn PageSource) -> Self {
        Self { source }
    }
}

#[async_trait]
impl ContentProbe for PageProbe<'_> {
    async fn snapshot(&self) -> Option<String> {
        match self.source.current_markup().await {
            Ok(markup) => Some(markup),
            Err(e) => {
                tracing::debug!("page markup unavailable: {}", e);
                None
            }
        }
    }
}

/// Timing and threshold settings for [`ResultReadinessPoller`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    /// Wait before the first poll
    pub initial_delay: Duration,
    /// Wait between polls
    pub poll_interval: Duration,
    /// Poll cycles before giving up
    pub max_polls: u32,
    /// Content must be strictly longer than this many characters after trimming
    pub min_content_chars: usize,
}

impl From<&ReadinessConfig> for ReadinessPolicy {
    fn from(config: &ReadinessConfig) -> Self {
        Self {
            initial_delay: config.initial_delay(),
            poll_interval: config.poll_interval(),
            max_polls: config.max_polls,
            min_content_chars: config.min_content_chars,
        }
    }
}

/// How a readiness wait ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessResult {
    /// A container held enough content
    Ready {
        /// Selector that matched
        selector: String,
        /// Trimmed inner markup of the container
        content: String,
        /// Poll cycle on which it matched, starting at 1
        polls: u32,
    },
    /// No container qualified within the poll budget
    TimedOut {
        /// Number of cycles made
        polls: u32,
    },
    /// The wait was cancelled
    Cancelled,
}

impl ReadinessResult {
    /// `true` when a container qualified.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

/// Waits for result content to appear.
pub struct ResultReadinessPoller {
    policy: ReadinessPolicy,
    cancel: Option<CancellationToken>,
}

impl ResultReadinessPoller {
    /// Poller with no cancellation token.
    #[must_use]
    pub fn new(policy: ReadinessPolicy) -> Self {
        Self {
            policy,
            cancel: None,
        }
    }

    /// Stop waiting as soon as `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Poll `probe` until one of `selectors` yields qualifying content.
    ///
    /// Blocks for at most `initial_delay + poll_interval * (max_polls - 1)`
    /// plus probe time.
    pub async fn wait_until_ready(
        &self,
        probe: &dyn ContentProbe,
        selectors: &[SelectorSpec],
    ) -> ReadinessResult {
        let cancel = self.cancel.as_ref();

        if wait::pause(self.policy.initial_delay, cancel).await {
            return ReadinessResult::Cancelled;
        }

        for poll in 1..=self.policy.max_polls {
            if let Some(markup) = probe.snapshot().await {
                if let Some((selector, content)) =
                    first_ready(&markup, selectors, self.policy.min_content_chars)
                {
                    tracing::info!(%selector, poll, "results loaded");
                    return ReadinessResult::Ready {
                        selector,
                        content,
                        polls: poll,
                    };
                }
            }

            tracing::debug!("loading... ({}/{})", poll, self.policy.max_polls);

            if poll < self.policy.max_polls && wait::pause(self.policy.poll_interval, cancel).await
            {
                return ReadinessResult::Cancelled;
            }
        }

        ReadinessResult::TimedOut {
            polls: self.policy.max_polls,
        }
    }
}

/// First selector, in priority order, whose first match has more than
/// `min_chars` characters of trimmed inner markup.
fn first_ready(
    markup: &str,
    selectors: &[SelectorSpec],
    min_chars: usize,
) -> Option<(String, String)> {
    let document = Html::parse_document(markup);
    selectors.iter().find_map(|candidate| {
        let element = document.select(candidate.selector()).next()?;
        let inner = element.inner_html();
        let content = inner.trim();
        (content.chars().count() > min_chars).then(|| (candidate.css.clone(), content.to_string()))
    })
}
