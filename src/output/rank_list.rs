//! Minimal `title,rank` line report

use crate::output::traits::{OutputResult, ReportWriter};
use crate::record::RecordSet;
use std::io::Write;

/// Writes one `title,rank` line per record
pub struct RankList<W: Write> {
    sink: W,
}

impl<W: Write> RankList<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl<W: Write> ReportWriter for RankList<W> {
    fn write_report(&mut self, records: &RecordSet) -> OutputResult<()> {
        for record in records {
            writeln!(self.sink, "{},{}", record.title, record.rank)?;
        }
        self.sink.flush()?;
        Ok(())
    }
}
