//! Report output.
//!
//! This module handles formatting and writing the audit result:
//! - [`csv`] - CSV report of all findings
//! - [`terminal`] - Terminal listing and summary with colors

mod csv;
mod terminal;

use crate::models::Finding;
use crate::processing::Statistics;
use std::error::Error;

pub use csv::{csv_row, escape_csv_field, CsvReport, CSV_HEADER};
pub use terminal::{format_field, TerminalReport};

/// Consumer of the final findings and statistics.
pub trait ReportEmitter {
    fn emit(&mut self, findings: &[Finding], stats: &Statistics) -> Result<(), Box<dyn Error>>;
}
