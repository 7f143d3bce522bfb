//! Docket Pipeline - acquisition of a single case record from a CAPTCHA-protected portal.
//!
//! The pipeline is five independent stages wired together by [`CaseAcquisition`]:
//!
//! - [`CaptchaRetryController`]: bounded retries around a human-solved CAPTCHA,
//!   classifying each submission as accepted, rejected, or ambiguous
//! - [`ResultReadinessPoller`]: polls the page until a result container carries
//!   real content, trying container selectors in priority order
//! - [`RecordExtractor`]: label/value tables first, then ordered regex fallbacks
//!   over the flattened text
//! - [`ListingDateMatcher`]: best-effort textual check for a hearing on a date
//! - rendering lives in `docket-report`
//!
//! None of the stages raise for expected failure modes; they return classified
//! outcomes and [`CaseAcquisition`] turns those into [`AcquisitionError`]s.
//!
//! # Example
//!
//! ```rust,ignore
//! use docket_pipeline::{CaseAcquisition, ConsolePrompt, ListingDateMatcher};
//!
//! let acquisition = CaseAcquisition::new(&session, &ConsolePrompt, &config)?;
//! let record = acquisition.fetch_case(&query).await?;
//! let listed = ListingDateMatcher::is_listed_on(&record, today);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod acquisition;
pub mod captcha;
pub mod error;
pub mod extractor;
pub mod markup;
pub mod matcher;
pub mod readiness;
mod wait;

// Re-export commonly used types
pub use acquisition::CaseAcquisition;
pub use captcha::{
    CaptchaPolicy, CaptchaRetryController, ConsolePrompt, RetryOutcome, SubmissionVerdict,
    UserPrompt,
};
pub use error::{AcquisitionError, Result};
pub use extractor::{FacetRule, ListingFacet, RecordExtractor, ResultBlock};
pub use matcher::{ListingDateMatcher, MatchTier};
pub use readiness::{
    ContentProbe, PageProbe, ReadinessPolicy, ReadinessResult, ResultReadinessPoller, SelectorSpec,
};
