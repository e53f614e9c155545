//! Report error types.

use thiserror::Error;

/// Errors that can occur while rendering a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The CSV writer rejected a record.
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    /// The rendered buffer could not be flushed.
    #[error("CSV output could not be flushed: {0}")]
    Flush(String),
}
