//! One acquisition run against the portal.
//!
//! [`CaseAcquisition`] borrows a single live page and the person solving
//! CAPTCHAs, and runs the stages in order: form filling, CAPTCHA exchange,
//! readiness polling, container location, extraction. The session itself is
//! owned by the caller, who closes it on every exit path.

use crate::captcha::{CaptchaPolicy, CaptchaRetryController, RetryOutcome, UserPrompt};
use crate::error::{AcquisitionError, Result};
use crate::extractor::RecordExtractor;
use crate::markup;
use crate::readiness::{
    PageProbe, ReadinessPolicy, ReadinessResult, ResultReadinessPoller, SelectorSpec,
};
use crate::wait;
use docket_browser::{OptionMatch, PageSource, SelectedOption};
use docket_core::{AppConfig, CaseQuery, CaseRecord, CauseListSelection, RawSnapshot, Timestamp};
use tokio_util::sync::CancellationToken;

/// Message shown while the user picks a cause list by hand.
const MANUAL_CAUSE_LIST_PROMPT: &str = "Select the cause list options in the browser, \
     then press Enter to capture the page...";

/// Drives one case lookup or cause-list capture.
pub struct CaseAcquisition<'a> {
    source: &'a dyn PageSource,
    prompt: &'a dyn UserPrompt,
    config: &'a AppConfig,
    extractor: RecordExtractor,
    result_container: SelectorSpec,
    candidates: Vec<SelectorSpec>,
    cancel: Option<CancellationToken>,
}

impl<'a> CaseAcquisition<'a> {
    /// Prepare a run. Fails when a configured selector does not parse.
    pub fn new(
        source: &'a dyn PageSource,
        prompt: &'a dyn UserPrompt,
        config: &'a AppConfig,
    ) -> Result<Self> {
        let result_container = SelectorSpec::new(config.portal.result_container.clone())?;
        let candidates = SelectorSpec::parse_all(config.readiness.selectors.iter().cloned())?;
        let extractor = RecordExtractor::default().with_container(result_container.clone());

        Ok(Self {
            source,
            prompt,
            config,
            extractor,
            result_container,
            candidates,
            cancel: None,
        })
    }

    /// Abort waits when `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Replace the extractor, e.g. to add facet rules.
    #[must_use]
    pub fn with_extractor(mut self, extractor: RecordExtractor) -> Self {
        self.extractor = extractor.with_container(self.result_container.clone());
        self
    }

    /// Look up one case and extract its record.
    pub async fn fetch_case(&self, query: &CaseQuery) -> Result<CaseRecord> {
        let portal = &self.config.portal;

        self.source.navigate(&portal.base_url).await?;
        self.pause(self.config.browser.page_load_delay()).await?;

        match query {
            CaseQuery::Cnr(cnr) => {
                self.source
                    .fill_field(&portal.cnr_input, cnr.as_str())
                    .await?;
            }
            CaseQuery::Components {
                case_type,
                number,
                year,
            } => {
                let selected = self
                    .source
                    .select_option(
                        &portal.case_type_select,
                        case_type,
                        OptionMatch::LooseWithFallback,
                    )
                    .await?;
                if let SelectedOption::Fallback(option) = &selected {
                    tracing::warn!(
                        "case type '{}' not found, using first available option '{}'",
                        case_type,
                        option
                    );
                }
                self.source
                    .fill_field(&portal.case_number_input, number)
                    .await?;
                self.source.fill_field(&portal.case_year_input, year).await?;
            }
        }

        tracing::info!("searching for {}", query);
        self.verify().await?;
        let markup = self.wait_for_results().await?;

        let block = self
            .extractor
            .locate(&markup)
            .ok_or_else(|| AcquisitionError::ContentEmpty {
                container: self.result_container.css().to_string(),
            })?;

        Ok(self.extractor.extract(&block, &query.fallback_identifier()))
    }

    /// Capture a cause-list page.
    ///
    /// With a selection the dropdowns and date are filled automatically;
    /// without one the user picks the list in the browser and confirms.
    pub async fn capture_cause_list(
        &self,
        selection: Option<&CauseListSelection>,
    ) -> Result<RawSnapshot> {
        let portal = &self.config.portal;

        self.source.navigate(&portal.cause_list_url).await?;
        self.pause(self.config.browser.page_load_delay()).await?;

        let selection = match selection {
            Some(selection) => {
                let date = selection.date_or(Timestamp::now().local_date());
                tracing::info!(
                    "automating cause list for {} / {} / {} on {}",
                    selection.state,
                    selection.district,
                    selection.court_complex,
                    date
                );

                for (select, wanted) in [
                    (&portal.state_select, &selection.state),
                    (&portal.district_select, &selection.district),
                    (&portal.court_complex_select, &selection.court_complex),
                ] {
                    self.source
                        .select_option(select, wanted, OptionMatch::ExactText)
                        .await?;
                    self.pause(self.config.browser.dropdown_delay()).await?;
                }

                self.source
                    .fill_field(&portal.cause_list_date_input, &date)
                    .await?;
                self.source.click(&portal.cause_list_submit).await?;
                self.pause(self.config.readiness.initial_delay()).await?;

                Some(CauseListSelection {
                    date: Some(date),
                    ..selection.clone()
                })
            }
            None => {
                tracing::info!("cause list manual mode");
                tokio::select! {
                    biased;
                    () = wait::cancelled(self.cancel.as_ref()) => {
                        return Err(AcquisitionError::Cancelled)
                    }
                    confirmed = self.prompt.confirm(MANUAL_CAUSE_LIST_PROMPT) => confirmed?,
                }
                None
            }
        };

        let markup = self.source.current_markup().await?;
        let url = self.source.current_url().await?;
        let text = markup::visible_text(&markup);

        Ok(RawSnapshot {
            url,
            selection,
            captured_at: Timestamp::now(),
            markup,
            text,
        })
    }

    async fn verify(&self) -> Result<()> {
        let policy = CaptchaPolicy::from(&self.config.captcha)
            .with_success_signal(self.result_container.clone());
        let mut controller = CaptchaRetryController::new(policy);
        if let Some(token) = &self.cancel {
            controller = controller.with_cancellation(token.clone());
        }

        match controller.attempt(self.source, self.prompt).await {
            RetryOutcome::Accepted { .. } => Ok(()),
            RetryOutcome::RejectedRetryable { attempt, message } => {
                Err(AcquisitionError::VerificationExhausted {
                    attempts: attempt,
                    last_error: message,
                })
            }
            RetryOutcome::RejectedExhausted {
                attempts,
                last_error,
            } => Err(AcquisitionError::VerificationExhausted {
                attempts,
                last_error,
            }),
            RetryOutcome::TransportFailure { attempt, reason } => {
                tracing::error!(attempt, "CAPTCHA submission failed: {}", reason);
                Err(AcquisitionError::VerificationTransportFailure { reason })
            }
            RetryOutcome::Cancelled => Err(AcquisitionError::Cancelled),
        }
    }

    /// Wait for a result container, then return the full page markup.
    async fn wait_for_results(&self) -> Result<String> {
        let mut poller = ResultReadinessPoller::new(ReadinessPolicy::from(&self.config.readiness));
        if let Some(token) = &self.cancel {
            poller = poller.with_cancellation(token.clone());
        }

        tracing::info!("waiting for case details to load");
        match poller
            .wait_until_ready(&PageProbe::new(self.source), &self.candidates)
            .await
        {
            ReadinessResult::Ready { .. } => Ok(self.source.current_markup().await?),
            ReadinessResult::TimedOut { polls } => Err(AcquisitionError::ContentNotReady { polls }),
            ReadinessResult::Cancelled => Err(AcquisitionError::Cancelled),
        }
    }

    async fn pause(&self, delay: std::time::Duration) -> Result<()> {
        if wait::pause(delay, self.cancel.as_ref()).await {
            return Err(AcquisitionError::Cancelled);
        }
        Ok(())
    }
}
