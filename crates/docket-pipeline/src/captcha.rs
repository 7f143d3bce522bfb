//! Human-solved CAPTCHA exchange with bounded retries.
//!
//! Each attempt asks a person for the solution, submits it, waits for the page
//! to settle, and classifies what the page shows afterwards. A page with no
//! CAPTCHA error is treated as accepted even when no success signal is visible;
//! such acceptances are reported with `confirmed: false` because they are a
//! known source of false success.

use crate::readiness::SelectorSpec;
use crate::wait;
use async_trait::async_trait;
use docket_browser::PageSource;
use docket_core::CaptchaConfig;
use scraper::Html;
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// The person at the keyboard.
#[async_trait]
pub trait UserPrompt: Send + Sync {
    /// Ask for the CAPTCHA text currently shown in the browser.
    ///
    /// Has no timeout: a human may take arbitrarily long.
    async fn request_challenge_solution(&self) -> io::Result<String>;

    /// Show `message` and wait until the user acknowledges it.
    async fn confirm(&self, message: &str) -> io::Result<()>;
}

/// Prompts on stderr and reads answers from stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsolePrompt;

impl ConsolePrompt {
    async fn read_line(prompt: String) -> io::Result<String> {
        tokio::task::spawn_blocking(move || {
            let mut stderr = io::stderr();
            write!(stderr, "{prompt}")?;
            stderr.flush()?;

            let mut line = String::new();
            if io::stdin().lock().read_line(&mut line)? == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "standard input closed",
                ));
            }
            Ok(line.trim().to_string())
        })
        .await
        .map_err(io::Error::other)?
    }
}

#[async_trait]
impl UserPrompt for ConsolePrompt {
    async fn request_challenge_solution(&self) -> io::Result<String> {
        Self::read_line("Enter CAPTCHA: ".to_string()).await
    }

    async fn confirm(&self, message: &str) -> io::Result<()> {
        Self::read_line(format!("{message} ")).await.map(|_| ())
    }
}

/// Retry and classification settings for [`CaptchaRetryController`].
#[derive(Debug, Clone)]
pub struct CaptchaPolicy {
    /// Submissions before giving up
    pub max_attempts: u32,
    /// Wait after each submission before reading the page
    pub settle_delay: Duration,
    /// Wait after requesting a fresh CAPTCHA image
    pub refresh_delay: Duration,
    /// Lower-cased words that mark an error region as a CAPTCHA rejection
    pub rejection_keywords: Vec<String>,
    /// Container whose text signals an explicit success
    pub success_signal: Option<SelectorSpec>,
}

impl CaptchaPolicy {
    /// Detect explicit success by text appearing in `container`.
    #[must_use]
    pub fn with_success_signal(mut self, container: SelectorSpec) -> Self {
        self.success_signal = Some(container);
        self
    }
}

impl From<&CaptchaConfig> for CaptchaPolicy {
    fn from(config: &CaptchaConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            settle_delay: config.settle_delay(),
            refresh_delay: config.refresh_delay(),
            rejection_keywords: config
                .rejection_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
            success_signal: None,
        }
    }
}

/// What the page shows after one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionVerdict {
    /// Explicit success signal present
    Accepted,
    /// A visible error mentions the CAPTCHA; carries the error text
    Rejected(String),
    /// Neither an explicit error nor an explicit success
    Ambiguous,
}

/// Result of one [`CaptchaRetryController::attempt`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome {
    /// The portal accepted a solution
    Accepted {
        /// Submissions made, including the accepted one
        attempts: u32,
        /// `false` when acceptance was inferred from the absence of an error
        confirmed: bool,
    },
    /// Rejected with attempts left; the controller loops on this
    RejectedRetryable {
        /// Attempt that was rejected
        attempt: u32,
        /// Visible error text
        message: String,
    },
    /// Rejected on the final attempt
    RejectedExhausted {
        /// Submissions made
        attempts: u32,
        /// Error text after the last submission
        last_error: String,
    },
    /// The submission channel failed; no further attempts are made
    TransportFailure {
        /// Attempt during which the fault happened
        attempt: u32,
        /// What failed
        reason: String,
    },
    /// Cancelled while waiting on the user or the page
    Cancelled,
}

impl RetryOutcome {
    /// `true` for either kind of acceptance.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Drives the CAPTCHA exchange against one page.
pub struct CaptchaRetryController {
    policy: CaptchaPolicy,
    cancel: Option<CancellationToken>,
}

impl CaptchaRetryController {
    /// Controller with no cancellation token.
    #[must_use]
    pub fn new(policy: CaptchaPolicy) -> Self {
        Self {
            policy,
            cancel: None,
        }
    }

    /// Abort waits on the user or the page when `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Run the exchange until acceptance, exhaustion, a transport fault, or cancellation.
    ///
    /// Never returns [`RetryOutcome::RejectedRetryable`]; that state only drives the loop.
    pub async fn attempt(&self, source: &dyn PageSource, prompt: &dyn UserPrompt) -> RetryOutcome {
        let cancel = self.cancel.as_ref();
        let max = self.policy.max_attempts;
        let mut last_error = String::new();

        for attempt in 1..=max {
            let solution = tokio::select! {
                biased;
                () = wait::cancelled(cancel) => return RetryOutcome::Cancelled,
                solution = prompt.request_challenge_solution() => solution,
            };
            let solution = match solution {
                Ok(solution) => solution,
                Err(e) => {
                    return RetryOutcome::TransportFailure {
                        attempt,
                        reason: format!("could not read CAPTCHA solution: {e}"),
                    }
                }
            };

            if let Err(e) = source.submit_challenge_response(&solution).await {
                return RetryOutcome::TransportFailure {
                    attempt,
                    reason: e.to_string(),
                };
            }
            tracing::info!("attempt {}: submitted CAPTCHA", attempt);

            if wait::pause(self.policy.settle_delay, cancel).await {
                return RetryOutcome::Cancelled;
            }

            let errors = match source.find_visible_error_text().await {
                Ok(errors) => errors,
                Err(e) => {
                    return RetryOutcome::TransportFailure {
                        attempt,
                        reason: format!("could not read error regions: {e}"),
                    }
                }
            };

            let markup = if self.policy.success_signal.is_some() {
                match source.current_markup().await {
                    Ok(markup) => Some(markup),
                    Err(e) => {
                        return RetryOutcome::TransportFailure {
                            attempt,
                            reason: format!("could not read page: {e}"),
                        }
                    }
                }
            } else {
                None
            };

            let verdict = self.classify(&errors, markup.as_deref());
            match Self::outcome_for(verdict, attempt, max) {
                RetryOutcome::RejectedRetryable { message, .. } => {
                    tracing::warn!(attempt, error = %message, "invalid CAPTCHA, retrying");
                    last_error = message;

                    if let Err(e) = source.refresh_challenge().await {
                        return RetryOutcome::TransportFailure {
                            attempt,
                            reason: format!("could not refresh CAPTCHA: {e}"),
                        };
                    }
                    if wait::pause(self.policy.refresh_delay, cancel).await {
                        return RetryOutcome::Cancelled;
                    }
                }
                outcome @ RetryOutcome::Accepted {
                    confirmed: false, ..
                } => {
                    tracing::warn!(
                        attempt,
                        "no CAPTCHA error visible; assuming it was accepted"
                    );
                    return outcome;
                }
                outcome => {
                    if outcome.is_accepted() {
                        tracing::info!(attempt, "CAPTCHA accepted");
                    }
                    return outcome;
                }
            }
        }

        RetryOutcome::RejectedExhausted {
            attempts: max,
            last_error,
        }
    }

    /// Classify the visible error texts and, when available, the page markup.
    #[must_use]
    pub fn classify(&self, errors: &[String], markup: Option<&str>) -> SubmissionVerdict {
        let rejection = errors.iter().find(|text| {
            let lower = text.to_lowercase();
            self.policy
                .rejection_keywords
                .iter()
                .any(|keyword| lower.contains(keyword.as_str()))
        });
        if let Some(text) = rejection {
            return SubmissionVerdict::Rejected(text.trim().to_string());
        }

        if !errors.is_empty() {
            tracing::debug!(?errors, "visible errors do not mention the CAPTCHA");
        }

        match (&self.policy.success_signal, markup) {
            (Some(container), Some(markup)) if has_text(markup, container) => {
                SubmissionVerdict::Accepted
            }
            _ => SubmissionVerdict::Ambiguous,
        }
    }

    /// Map a verdict on attempt `attempt` of `max` to an outcome.
    #[must_use]
    pub fn outcome_for(verdict: SubmissionVerdict, attempt: u32, max: u32) -> RetryOutcome {
        match verdict {
            SubmissionVerdict::Accepted => RetryOutcome::Accepted {
                attempts: attempt,
                confirmed: true,
            },
            SubmissionVerdict::Ambiguous => RetryOutcome::Accepted {
                attempts: attempt,
                confirmed: false,
            },
            SubmissionVerdict::Rejected(message) if attempt < max => {
                RetryOutcome::RejectedRetryable { attempt, message }
            }
            SubmissionVerdict::Rejected(last_error) => RetryOutcome::RejectedExhausted {
                attempts: attempt,
                last_error,
            },
        }
    }
}

fn has_text(markup: &str, container: &SelectorSpec) -> bool {
    let document = Html::parse_document(markup);
    let found = document
        .select(container.selector())
        .next()
        .is_some_and(|el| el.text().any(|t| !t.trim().is_empty()));
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_browser::{BrowserError, OptionMatch, SelectedOption};
    use std::sync::Mutex;

    /// Page that answers every submission with the same error regions.
    #[derive(Default)]
    struct ScriptedPage {
        errors: Vec<String>,
        markup: String,
        fail_submit: bool,
        fail_markup: bool,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedPage {
        fn showing(errors: &[&str]) -> Self {
            Self {
                errors: errors.iter().map(|e| (*e).to_string()).collect(),
                ..Self::default()
            }
        }

        fn count(&self, prefix: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.starts_with(prefix))
                .count()
        }
    }

    #[async_trait]
    impl PageSource for ScriptedPage {
        async fn current_markup(&self) -> docket_browser::Result<String> {
            if self.fail_markup {
                return Err(BrowserError::ScriptError("target closed".to_string()));
            }
            Ok(self.markup.clone())
        }

        async fn current_url(&self) -> docket_browser::Result<Option<String>> {
            Ok(None)
        }

        async fn navigate(&self, _target: &str) -> docket_browser::Result<()> {
            Ok(())
        }

        async fn fill_field(&self, _selector: &str, _value: &str) -> docket_browser::Result<()> {
            Ok(())
        }

        async fn select_option(
            &self,
            _selector: &str,
            wanted: &str,
            _mode: OptionMatch,
        ) -> docket_browser::Result<SelectedOption> {
            Ok(SelectedOption::Matched(wanted.to_string()))
        }

        async fn click(&self, _selector: &str) -> docket_browser::Result<()> {
            Ok(())
        }

        async fn submit_challenge_response(&self, text: &str) -> docket_browser::Result<()> {
            self.calls.lock().unwrap().push(format!("submit {text}"));
            if self.fail_submit {
                return Err(BrowserError::SelectorNotFound("#searchbtn".to_string()));
            }
            Ok(())
        }

        async fn find_visible_error_text(&self) -> docket_browser::Result<Vec<String>> {
            Ok(self.errors.clone())
        }

        async fn refresh_challenge(&self) -> docket_browser::Result<()> {
            self.calls.lock().unwrap().push("refresh".to_string());
            Ok(())
        }
    }

    struct FixedPrompt;

    #[async_trait]
    impl UserPrompt for FixedPrompt {
        async fn request_challenge_solution(&self) -> io::Result<String> {
            Ok("x7k2p".to_string())
        }

        async fn confirm(&self, _message: &str) -> io::Result<()> {
            Ok(())
        }
    }

    /// Never answers; stands in for a user who walked away.
    struct SilentPrompt;

    #[async_trait]
    impl UserPrompt for SilentPrompt {
        async fn request_challenge_solution(&self) -> io::Result<String> {
            std::future::pending::<io::Result<String>>().await
        }

        async fn confirm(&self, _message: &str) -> io::Result<()> {
            std::future::pending::<io::Result<()>>().await
        }
    }

    fn policy() -> CaptchaPolicy {
        CaptchaPolicy {
            max_attempts: 3,
            settle_delay: Duration::ZERO,
            refresh_delay: Duration::ZERO,
            rejection_keywords: vec!["captcha".to_string(), "invalid".to_string()],
            success_signal: None,
        }
    }

    #[tokio::test]
    async fn test_always_invalid_exhausts_after_max_attempts() {
        let page = ScriptedPage::showing(&["Invalid Captcha"]);
        let outcome = CaptchaRetryController::new(policy())
            .attempt(&page, &FixedPrompt)
            .await;

        assert_eq!(
            outcome,
            RetryOutcome::RejectedExhausted {
                attempts: 3,
                last_error: "Invalid Captcha".to_string(),
            }
        );
        assert_eq!(page.count("submit"), 3);
        assert_eq!(page.count("refresh"), 2);
    }

    #[tokio::test]
    async fn test_no_error_is_unconfirmed_acceptance() {
        let page = ScriptedPage::default();
        let outcome = CaptchaRetryController::new(policy())
            .attempt(&page, &FixedPrompt)
            .await;

        assert_eq!(
            outcome,
            RetryOutcome::Accepted {
                attempts: 1,
                confirmed: false,
            }
        );
        assert_eq!(page.count("submit"), 1);
    }

    #[tokio::test]
    async fn test_success_container_confirms_acceptance() {
        let page = ScriptedPage {
            markup: r#"<div id="history_cnr"><table><tr><td>Case Type</td></tr></table></div>"#
                .to_string(),
            ..ScriptedPage::default()
        };
        let policy =
            policy().with_success_signal(SelectorSpec::new("#history_cnr").expect("selector"));

        let outcome = CaptchaRetryController::new(policy)
            .attempt(&page, &FixedPrompt)
            .await;

        assert_eq!(
            outcome,
            RetryOutcome::Accepted {
                attempts: 1,
                confirmed: true,
            }
        );
    }

    #[tokio::test]
    async fn test_unrelated_error_is_ambiguous() {
        let page = ScriptedPage::showing(&["Record not found"]);
        let outcome = CaptchaRetryController::new(policy())
            .attempt(&page, &FixedPrompt)
            .await;
        assert!(matches!(
            outcome,
            RetryOutcome::Accepted {
                confirmed: false,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_submit_failure_is_transport_failure() {
        let page = ScriptedPage {
            fail_submit: true,
            ..ScriptedPage::default()
        };
        let outcome = CaptchaRetryController::new(policy())
            .attempt(&page, &FixedPrompt)
            .await;

        assert!(matches!(
            outcome,
            RetryOutcome::TransportFailure { attempt: 1, .. }
        ));
        assert_eq!(page.count("submit"), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_prompt() {
        let token = CancellationToken::new();
        token.cancel();
        let page = ScriptedPage::default();

        let outcome = CaptchaRetryController::new(policy())
            .with_cancellation(token)
            .attempt(&page, &FixedPrompt)
            .await;

        assert_eq!(outcome, RetryOutcome::Cancelled);
        assert_eq!(page.count("submit"), 0);
    }

    #[tokio::test]
    async fn test_cancelled_token_never_submits() {
        for _ in 0..50 {
            let token = CancellationToken::new();
            token.cancel();
            let page = ScriptedPage::default();

            let outcome = CaptchaRetryController::new(policy())
                .with_cancellation(token)
                .attempt(&page, &FixedPrompt)
                .await;

            assert_eq!(outcome, RetryOutcome::Cancelled);
            assert_eq!(page.count("submit"), 0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_while_waiting_for_solution() {
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(30)).await;
            canceller.cancel();
        });
        let page = ScriptedPage::default();

        let outcome = CaptchaRetryController::new(policy())
            .with_cancellation(token)
            .attempt(&page, &SilentPrompt)
            .await;

        assert_eq!(outcome, RetryOutcome::Cancelled);
        assert_eq!(page.count("submit"), 0);
    }

    #[tokio::test]
    async fn test_markup_read_failure_is_transport_failure() {
        let page = ScriptedPage {
            fail_markup: true,
            ..ScriptedPage::default()
        };
        let policy =
            policy().with_success_signal(SelectorSpec::new("#history_cnr").expect("selector"));

        let outcome = CaptchaRetryController::new(policy)
            .attempt(&page, &FixedPrompt)
            .await;

        match outcome {
            RetryOutcome::TransportFailure { attempt, reason } => {
                assert_eq!(attempt, 1);
                assert!(reason.starts_with("could not read page"));
            }
            other => panic!("expected transport failure, got {other:?}"),
        }
        assert_eq!(page.count("submit"), 1);
    }

    #[test]
    fn test_outcome_for_final_rejection() {
        let verdict = SubmissionVerdict::Rejected("Invalid Captcha".to_string());
        assert!(matches!(
            CaptchaRetryController::outcome_for(verdict.clone(), 2, 3),
            RetryOutcome::RejectedRetryable { attempt: 2, .. }
        ));
        assert!(matches!(
            CaptchaRetryController::outcome_for(verdict, 3, 3),
            RetryOutcome::RejectedExhausted { attempts: 3, .. }
        ));
    }

    #[test]
    fn test_classify_keywords_case_insensitive() {
        let controller = CaptchaRetryController::new(policy());
        assert_eq!(
            controller.classify(&["  Invalid CAPTCHA code  ".to_string()], None),
            SubmissionVerdict::Rejected("Invalid CAPTCHA code".to_string())
        );
        assert_eq!(controller.classify(&[], None), SubmissionVerdict::Ambiguous);
    }

    #[test]
    fn test_policy_from_config_lowercases_keywords() {
        let config = CaptchaConfig {
            rejection_keywords: vec!["Captcha".to_string()],
            ..CaptchaConfig::default()
        };
        let policy = CaptchaPolicy::from(&config);
        assert_eq!(policy.rejection_keywords, vec!["captcha".to_string()]);
        assert_eq!(policy.max_attempts, 3);
    }
}
