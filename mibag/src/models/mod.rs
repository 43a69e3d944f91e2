//! Tabular data model shared by the parsers, the converter and the exporters.
//!
//! - [`Attribute`] / [`AttributeKind`] - Column descriptors
//! - [`Value`] - One tagged cell value
//! - [`StringHandle`] / [`RelationHandle`] - Indices into a table's [`ValuePool`]
//! - [`Row`] / [`Table`] / [`ValuePool`] - Rows, tables and indirect value storage
//! - [`DatasetDocument`] - Serde shape of JSON dataset documents

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod date;
mod document;
mod table;

pub use document::{DatasetDocument, RowDocument};
pub use table::{Row, Table, ValuePool};

/// Default date format, in ARFF pattern letters.
pub const DEFAULT_DATE_FORMAT: &str = "yyyy-MM-dd'T'HH:mm:ss";

// =============================================================================
// Attributes
// =============================================================================

/// A column descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Column name.
    pub name: String,
    /// Kind and auxiliary structure.
    #[serde(flatten)]
    pub kind: AttributeKind,
}

/// Kind of a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AttributeKind {
    /// Floating point values.
    Numeric,
    /// A finite, ordered category list; cells hold category codes.
    Nominal { values: Vec<String> },
    /// Timestamps stored as epoch milliseconds.
    Date {
        #[serde(default = "default_date_format")]
        format: String,
    },
    /// Free text; cells hold handles into the string pool.
    String,
    /// Nested tables; cells hold handles into the relation pool.
    Relational { attributes: Vec<Attribute> },
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

impl Attribute {
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Numeric,
        }
    }

    pub fn nominal<S: Into<String>>(name: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Nominal {
                values: values.into_iter().map(Into::into).collect(),
            },
        }
    }

    pub fn date(name: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Date {
                format: format.into(),
            },
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::String,
        }
    }

    pub fn relational(name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Relational { attributes },
        }
    }

    pub fn is_nominal(&self) -> bool {
        matches!(self.kind, AttributeKind::Nominal { .. })
    }

    /// Category labels for nominal attributes.
    pub fn categories(&self) -> Option<&[String]> {
        match &self.kind {
            AttributeKind::Nominal { values } => Some(values),
            _ => None,
        }
    }

    /// Code of `label` among the nominal categories.
    pub fn category_code(&self, label: &str) -> Option<u32> {
        self.categories()?
            .iter()
            .position(|v| v == label)
            .map(|i| i as u32)
    }

    /// Nested schema for relational attributes.
    pub fn nested_attributes(&self) -> Option<&[Attribute]> {
        match &self.kind {
            AttributeKind::Relational { attributes } => Some(attributes),
            _ => None,
        }
    }
}

impl AttributeKind {
    /// Lowercase kind name, as written in ARFF headers.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Nominal { .. } => "nominal",
            Self::Date { .. } => "date",
            Self::String => "string",
            Self::Relational { .. } => "relational",
        }
    }
}

// =============================================================================
// Values
// =============================================================================

/// Index of a string in a [`ValuePool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringHandle(pub u32);

/// Index of a nested table in a [`ValuePool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationHandle(pub u32);

/// One cell.
///
/// Handles are only meaningful together with the pool of the table the row
/// currently belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Missing,
    /// Numeric values and dates (epoch milliseconds).
    Numeric(f64),
    /// Nominal category code.
    Nominal(u32),
    String(StringHandle),
    Relational(RelationHandle),
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Numeric(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_nominal(&self) -> Option<u32> {
        match self {
            Value::Nominal(code) => Some(*code),
            _ => None,
        }
    }

    /// Whether this value can be stored in a column of `kind`.
    pub fn fits(&self, kind: &AttributeKind) -> bool {
        matches!(
            (self, kind),
            (Value::Missing, _)
                | (Value::Numeric(_), AttributeKind::Numeric | AttributeKind::Date { .. })
                | (Value::Nominal(_), AttributeKind::Nominal { .. })
                | (Value::String(_), AttributeKind::String)
                | (Value::Relational(_), AttributeKind::Relational { .. })
        )
    }
}

impl fmt::Display for StringHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

impl fmt::Display for RelationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}
