//! Browser automation for CAPTCHA-protected court portals.
//!
//! Provides the [`PageSource`] collaborator consumed by the acquisition
//! pipeline, a headless-capable Chromium engine, and the [`PortalSession`]
//! adapter that maps portal operations onto generic browser actions.

pub mod actions;
pub mod engine;
pub mod error;
pub mod portal;
pub mod source;

pub use actions::BrowserActions;
pub use engine::BrowserEngine;
pub use error::{BrowserError, Result};
pub use portal::PortalSession;
pub use source::{OptionMatch, PageSource, SelectedOption};
