//! Tabular exports and certificate documents.

pub mod certificate;
pub mod excel;
pub mod pdf;
pub mod registry;
pub mod rtf;
pub mod text;

use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Unknown report format: {0}")]
    UnknownFormat(String),

    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

/// Format-neutral table handed to every renderer
#[derive(Debug, Clone, Default)]
pub struct ReportTable {
    pub title: String,
    pub subtitle: Option<String>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Xlsx,
    Pdf,
    Rtf,
}

impl ReportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ReportFormat::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ReportFormat::Pdf => "application/pdf",
            ReportFormat::Rtf => "application/rtf",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Xlsx => "xlsx",
            ReportFormat::Pdf => "pdf",
            ReportFormat::Rtf => "rtf",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xlsx" | "excel" => Ok(ReportFormat::Xlsx),
            "pdf" => Ok(ReportFormat::Pdf),
            "rtf" | "word" => Ok(ReportFormat::Rtf),
            other => Err(ReportError::UnknownFormat(other.to_string())),
        }
    }
}

pub fn render(table: &ReportTable, format: ReportFormat) -> Result<Vec<u8>, ReportError> {
    match format {
        ReportFormat::Xlsx => excel::render(table),
        ReportFormat::Pdf => Ok(pdf::render_table(table)),
        ReportFormat::Rtf => Ok(rtf::render(table)),
    }
}
