//! Output module for reports and crawl summaries
//!
//! This module handles:
//! - Serializing the final record set (CSV table or `title,rank` lines)
//! - Recording and printing crawl statistics

mod csv_report;
mod rank_list;
pub mod stats;
mod traits;

pub use csv_report::CsvReport;
pub use rank_list::RankList;
pub use stats::{format_statistics, print_statistics, CrawlStats};
pub use traits::{OutputError, OutputResult, ReportWriter};

use crate::record::RecordSet;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Available report layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Full table, one column per record field
    Csv,
    /// `title,rank` per line
    Ranks,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => f.write_str("csv"),
            Self::Ranks => f.write_str("ranks"),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "ranks" => Ok(Self::Ranks),
            other => Err(format!(
                "unknown report format '{}', expected 'csv' or 'ranks'",
                other
            )),
        }
    }
}

/// Writes `records` to `sink` in the chosen format
pub fn write_report<W: Write>(
    format: ReportFormat,
    records: &RecordSet,
    sink: W,
) -> OutputResult<()> {
    match format {
        ReportFormat::Csv => CsvReport::new(sink).write_report(records),
        ReportFormat::Ranks => RankList::new(sink).write_report(records),
    }
}
