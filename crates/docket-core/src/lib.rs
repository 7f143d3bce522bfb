//! Docket Core - Foundation crate for the Docket case acquisition tool.
//!
//! This crate provides the shared record types, error handling, configuration
//! management, and persistence helpers that every other Docket crate depends on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared newtypes (`CaseIdentifier`, `CaseQuery`, `Timestamp`)
//! - [`record`] - The canonical `CaseRecord` and its `ListingInfo`
//! - [`snapshot`] - Raw cause-list page snapshots
//! - [`persist`] - JSON persistence of records and run outcomes
//!
//! # Example
//!
//! ```rust
//! use docket_core::{AppConfig, CaseQuery};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! config.validate()?;
//!
//! let query = CaseQuery::from_tokens("MHAU030151912016", None, None)?;
//! println!("Looking up {query} on {}", config.portal.base_url);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod persist;
pub mod record;
pub mod snapshot;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, BrowserConfig, CaptchaConfig, OutputConfig, PortalConfig, ReadinessConfig,
};
pub use error::{ConfigError, ConfigResult, CoreError, Result};
pub use record::{CaseFields, CaseRecord, ListingInfo};
pub use snapshot::RawSnapshot;
pub use types::{CaseIdentifier, CaseQuery, CauseListSelection, Timestamp};
