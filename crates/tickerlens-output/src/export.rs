//! Export of annual return comparisons.
//!
//! CSV output has one row per year with empty cells for missing or undefined
//! returns and a status column per side; JSON output mirrors the
//! [`ComparisonSeries`] structure.

use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tickerlens_returns::{ComparisonSeries, ReturnCell};

/// Failure writing an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Writing a CSV record failed
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),

    /// Serializing JSON failed
    #[error("json export failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The output file could not be written
    #[error("cannot write export: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV writer produced bytes that are not UTF-8
    #[error("csv output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// No format matches the requested output
    #[error("unsupported export format: {0}")]
    InvalidFormat(String),
}

/// Serialization used by an [`Exporter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// One record per line with a header row
    Csv,
    /// Single-line JSON
    Json,
    /// Indented JSON
    PrettyJson,
}

impl ExportFormat {
    /// File extension written for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }

    /// Format implied by `path`'s extension; `.json` maps to indented JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InvalidFormat`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::PrettyJson),
            _ => Err(ExportError::InvalidFormat(format!(
                "cannot infer export format from {}",
                path.display()
            ))),
        }
    }
}

/// Something that can be written out as CSV or JSON.
pub trait Exporter {
    /// Serialize into a string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Serialize and write to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        File::create(path)?.write_all(content.as_bytes())?;
        Ok(())
    }
}

/// Flattened comparison row for CSV export.
#[derive(Debug, Serialize)]
struct ComparisonRecord<'a> {
    year: i32,
    subject_symbol: &'a str,
    subject_return: Option<f64>,
    subject_status: &'static str,
    benchmark_symbol: &'a str,
    benchmark_return: Option<f64>,
    benchmark_status: &'static str,
    excess_return: Option<f64>,
}

const fn status(cell: &ReturnCell) -> &'static str {
    match cell {
        ReturnCell::Value(_) => "ok",
        ReturnCell::Missing => "missing",
        ReturnCell::Undefined(_) => "undefined",
    }
}

impl Exporter for ComparisonSeries {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                for row in &self.rows {
                    wtr.serialize(ComparisonRecord {
                        year: row.year,
                        subject_symbol: &self.subject_symbol,
                        subject_return: row.subject.value(),
                        subject_status: status(&row.subject),
                        benchmark_symbol: &self.benchmark_symbol,
                        benchmark_return: row.benchmark.value(),
                        benchmark_status: status(&row.benchmark),
                        excess_return: row.excess(),
                    })?;
                }
                let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
                Ok(String::from_utf8(bytes)?)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}
