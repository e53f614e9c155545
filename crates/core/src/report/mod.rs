//! Printable plan report.
//!
//! Builds a document view of a plan (letterhead, borrower block, schedule
//! table, summary row) and renders it as CSV for spreadsheet export.

pub mod error;
pub mod service;
pub mod types;


pub use error::ReportError;
pub use service::ReportService;
pub use types::*;
