//! Docket Report - paginated documents for case records and cause-list snapshots.
//!
//! Rendering happens in two steps: [`ReportRenderer`] builds a [`Document`]
//! (title, headings, key/value lines, two-column tables, notes) and
//! [`layout::paginate`] places it on A4 pages, wrapping table cells at fixed
//! character widths so long values grow rows instead of overflowing columns.
//! [`ReportRenderer::publish`] writes the result as a PDF and reports failure
//! as `None` so callers can still persist the raw record.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod document;
pub mod error;
pub mod layout;
mod pdf;
pub mod renderer;
pub mod wrap;

pub use document::{Block, Column, Document, Table, TextStyle};
pub use error::{ReportError, Result};
pub use layout::{paginate, Font, Mark, Page, PageGeometry};
pub use renderer::{cause_list_file_name, case_file_name, humanize_key, ReportRenderer};
pub use wrap::wrap_text;
