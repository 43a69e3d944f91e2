//! # mibag - propositional to multi-instance dataset conversion
//!
//! mibag groups the rows of a flat dataset into bags keyed by a nominal
//! identifier column. Each output row holds the identifier, a relational
//! value with the bag's member rows, and the class of the bag.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ ARFF / CSV  │────▶│   Parser    │────▶│   Convert   │────▶│ ARFF / JSON │
//! │   / JSON    │     │  (auto-enc) │     │   (bags)    │     │  (bagged)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mibag::{convert_file, to_arff_string, PipelineOptions};
//! use std::path::Path;
//!
//! let result = convert_file(Path::new("musk.arff"), &PipelineOptions::default())?;
//! println!("{} bags", result.summary.bags);
//! print!("{}", to_arff_string(&result.output)?);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Attributes, values, rows and tables
//! - [`parser`] - ARFF, CSV and JSON readers with auto-detection
//! - [`convert`] - Bag layout, grouping, ordering and pipeline
//! - [`export`] - ARFF and JSON writers
//! - [`validation`] - Dataset document schema validation
//! - [`config`] - Conversion options
//! - [`logs`] - Progress log fan-out

// Core modules
pub mod error;
pub mod models;

// Reading and writing
pub mod export;
pub mod parser;

// Conversion
pub mod config;
pub mod convert;

// Validation
pub mod validation;

// Progress logs
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError, ConvertError, ExportError, ParseError, PipelineError, ValidationError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    Attribute, AttributeKind, DatasetDocument, RelationHandle, Row, StringHandle, Table, Value,
    ValuePool,
};

// =============================================================================
// Re-exports - Conversion
// =============================================================================

pub use config::{ClassColumn, ConvertOptions};
pub use convert::{bag_records, convert, BagRecord, ConvertSettings, Converter, OutputOrder, Weighting};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use convert::pipeline::{convert_file, convert_table, ConversionSummary, PipelineOptions, PipelineOutput};

// =============================================================================
// Re-exports - Parsing and export
// =============================================================================

pub use export::{render, to_arff_string, to_json_string, write_dataset, ExportFormat};
pub use parser::{
    detect_delimiter, detect_encoding, parse_arff, parse_csv, parse_json, read_bytes, read_dataset, CsvOptions,
    DatasetFormat, ReadOptions,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{is_valid_dataset_document, validate_dataset_document};
