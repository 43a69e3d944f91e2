//! Dataset writers.
//!
//! - [`arff`] - ARFF documents, relational attributes as nested blocks
//! - [`json`] - JSON dataset documents readable by [`crate::parser::json`]

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use crate::error::ExportResult;
use crate::models::Table;

pub mod arff;
pub mod json;

pub use arff::{to_arff_string, write_arff};
pub use json::{to_document, to_json_string, write_json};

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Arff,
    Json,
}

impl ExportFormat {
    /// Infer the format from an output file name; anything but `.json` is ARFF.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Arff,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arff => f.write_str("arff"),
            Self::Json => f.write_str("json"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "arff" => Ok(Self::Arff),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format '{other}' (expected arff or json)")),
        }
    }
}

/// Write `table` in `format`.
pub fn write_dataset<W: Write>(table: &Table, format: ExportFormat, writer: &mut W) -> ExportResult<()> {
    match format {
        ExportFormat::Arff => write_arff(table, writer),
        ExportFormat::Json => write_json(table, writer),
    }
}

/// Render `table` in `format` to a string.
pub fn render(table: &Table, format: ExportFormat) -> ExportResult<String> {
    match format {
        ExportFormat::Arff => to_arff_string(table),
        ExportFormat::Json => to_json_string(table),
    }
}
