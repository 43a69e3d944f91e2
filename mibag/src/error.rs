//! Error types for the mibag conversion pipeline.
//!
//! Errors are grouped by layer:
//!
//! - [`ConvertError`] - Bag conversion errors (schema and grouping)
//! - [`ParseError`] - Dataset reading errors (ARFF, CSV, JSON)
//! - [`ExportError`] - Dataset writing errors
//! - [`ConfigError`] - Option loading and resolution errors
//! - [`ValidationError`] - JSON dataset document validation errors
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Conversion Errors
// =============================================================================

/// Errors raised while deriving the bag layout or grouping rows.
///
/// Every variant aborts the whole conversion; no partial output is produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    /// The identifier column is not a nominal attribute.
    #[error("Bag identifier attribute '{name}' must be nominal, found {kind}")]
    InvalidIdentifierType { name: String, kind: &'static str },

    /// The identifier column is also the class column.
    #[error("Bag identifier column {index} cannot be the class column")]
    IdentifierClassCollision { index: usize },

    /// Conversion requested before the input format was set.
    #[error("No input format defined: call set_input_format before convert")]
    UninitializedSchema,

    /// Identifier index past the last column.
    #[error("Bag identifier column {index} out of range ({count} columns)")]
    IdentifierOutOfRange { index: usize, count: usize },

    /// Class index past the last column.
    #[error("Class column {index} out of range ({count} columns)")]
    ClassOutOfRange { index: usize, count: usize },

    /// The table handed to a prepared converter has a different schema.
    #[error("Input schema does not match the prepared format: {0}")]
    SchemaMismatch(String),

    /// A row references a pool entry that does not exist.
    #[error("Row {row}, column {column}: dangling {what} reference {handle}")]
    DanglingReference {
        row: usize,
        column: usize,
        what: &'static str,
        handle: u32,
    },
}

// =============================================================================
// Parse Errors
// =============================================================================

/// Errors while reading a dataset.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Syntax error with line context.
    #[error("Line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// A cell value does not fit its attribute.
    #[error("Line {line}, attribute '{attribute}' (value '{value}'): {message}")]
    InvalidValue {
        line: usize,
        attribute: String,
        value: String,
        message: String,
    },

    /// CSV reader error.
    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    /// JSON decoding error.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON document failed schema validation.
    #[error("Invalid dataset document: {0}")]
    Validation(#[from] ValidationError),

    /// Reader option (column list) could not be resolved.
    #[error("Invalid reader option: {0}")]
    ReaderOption(#[from] ConfigError),

    /// No format could be inferred from the file name.
    #[error("Cannot infer dataset format of '{0}' (use --format)")]
    UnknownFormat(String),

    /// Empty input.
    #[error("Dataset is empty")]
    Empty,
}

impl ParseError {
    /// Syntax error at `line`.
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while writing a dataset.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Failed to write output.
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A cell cannot be rendered.
    #[error("Row {row}, column {column}: {message}")]
    Unrenderable {
        row: usize,
        column: usize,
        message: String,
    },
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while loading or resolving options.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for the options.
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),

    /// Identifier column given as 0 (indices are 1-based).
    #[error("Identifier column is 1-based, got {0}")]
    InvalidIdentifierColumn(usize),

    /// Class column selector could not be parsed.
    #[error("Invalid class column '{0}' (expected none, first, last or a 1-based index)")]
    InvalidClassColumn(String),

    /// Column list could not be parsed.
    #[error("Invalid column list '{0}'")]
    InvalidColumnList(String),
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors during dataset document validation.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    /// Schema validation failed.
    #[error("Validation failed: {errors:?}")]
    SchemaError { errors: Vec<String> },

    /// The embedded schema itself could not be compiled.
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::convert::pipeline::convert_file`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Reading error.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Conversion error.
    #[error("Conversion error: {0}")]
    Convert(#[from] ConvertError),

    /// Writing error.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // ConvertError -> PipelineError
        let err: PipelineError = ConvertError::IdentifierClassCollision { index: 2 }.into();
        assert!(err.to_string().contains("class column"));

        // ParseError -> PipelineError
        let err: PipelineError = ParseError::syntax(7, "unterminated quote").into();
        let msg = err.to_string();
        assert!(msg.contains("Line 7"));
        assert!(msg.contains("unterminated quote"));
    }

    #[test]
    fn test_invalid_identifier_format() {
        let err = ConvertError::InvalidIdentifierType {
            name: "age".into(),
            kind: "numeric",
        };
        let msg = err.to_string();
        assert!(msg.contains("'age'"));
        assert!(msg.contains("nominal"));
        assert!(msg.contains("numeric"));
    }

    #[test]
    fn test_invalid_value_format() {
        let err = ParseError::InvalidValue {
            line: 12,
            attribute: "color".into(),
            value: "purple".into(),
            message: "not a declared category".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Line 12"));
        assert!(msg.contains("'color'"));
        assert!(msg.contains("'purple'"));
    }
}
