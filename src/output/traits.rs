//! Report writer traits and error types
//!
//! A report writer consumes a finished [`RecordSet`] and serializes it to
//! some sink. Writers see records in rank order and never modify them.

use crate::record::RecordSet;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for report writers
pub trait ReportWriter {
    /// Writes every record of the set, in order
    ///
    /// # Arguments
    ///
    /// * `records` - The completed record set
    fn write_report(&mut self, records: &RecordSet) -> OutputResult<()>;
}
