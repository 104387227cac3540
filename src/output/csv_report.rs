//! Tabular CSV report
//!
//! One header row of field names, then one row per record with every value
//! rendered as text. Absent values are empty cells.

use crate::output::traits::{OutputError, OutputResult, ReportWriter};
use crate::record::{Field, RecordSet};
use std::io::Write;

/// Writes records as CSV rows
pub struct CsvReport<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvReport<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Flushes and returns the underlying sink
    pub fn into_inner(self) -> OutputResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| {
                OutputError::Io(std::io::Error::new(
                    e.error().kind(),
                    e.error().to_string(),
                ))
            })
    }
}

impl<W: Write> ReportWriter for CsvReport<W> {
    fn write_report(&mut self, records: &RecordSet) -> OutputResult<()> {
        self.writer
            .write_record(Field::ALL.iter().map(|field| field.name()))?;

        for record in records {
            self.writer.write_record(record.values())?;
        }

        self.writer.flush()?;
        Ok(())
    }
}
