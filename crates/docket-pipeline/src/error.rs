//! Error types for the acquisition pipeline.

use docket_browser::BrowserError;
use thiserror::Error;

/// Terminal failures of one acquisition run.
///
/// Expected outcomes of the individual stages are classified values, not
/// errors; these variants are what the orchestrator makes of them.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// The portal kept rejecting the CAPTCHA
    #[error("CAPTCHA was rejected {attempts} times")]
    VerificationExhausted {
        /// Number of submissions made
        attempts: u32,
        /// Error text shown after the last submission
        last_error: String,
    },

    /// The submission channel itself failed
    #[error("CAPTCHA submission failed: {reason}")]
    VerificationTransportFailure {
        /// What went wrong
        reason: String,
    },

    /// No result container filled up in time
    #[error("results did not load after {polls} polls")]
    ContentNotReady {
        /// Number of poll cycles made
        polls: u32,
    },

    /// The result container is missing or carries no usable text
    #[error("no case details found in '{container}'")]
    ContentEmpty {
        /// Container selector that was looked up
        container: String,
    },

    /// The run was cancelled while waiting
    #[error("acquisition cancelled")]
    Cancelled,

    /// A configured CSS selector does not parse
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector {
        /// The offending selector
        selector: String,
        /// Parser message
        reason: String,
    },

    /// Reading input from the user failed
    #[error("could not read user input: {0}")]
    Prompt(#[from] std::io::Error),

    /// Navigation or form filling failed
    #[error("browser error: {0}")]
    Browser(#[from] BrowserError),
}

impl AcquisitionError {
    /// Name of the pipeline stage that failed, for user-facing messages.
    #[must_use]
    pub fn stage(&self) -> &'static str {
        match self {
            Self::VerificationExhausted { .. } | Self::VerificationTransportFailure { .. } => {
                "verification"
            }
            Self::ContentNotReady { .. } => "readiness",
            Self::ContentEmpty { .. } => "extraction",
            Self::Cancelled => "cancellation",
            Self::InvalidSelector { .. } => "configuration",
            Self::Prompt(_) => "user input",
            Self::Browser(_) => "navigation",
        }
    }
}

/// Result type alias for acquisition operations.
pub type Result<T> = std::result::Result<T, AcquisitionError>;
