//! JSON dataset documents.
//!
//! ```json
//! {
//!   "relation": "musk",
//!   "attributes": [
//!     { "name": "molecule", "type": "nominal", "values": ["m1", "m2"] },
//!     { "name": "f1", "type": "numeric" }
//!   ],
//!   "classIndex": null,
//!   "rows": [ { "values": ["m1", 42.0], "weight": 1.0 } ]
//! }
//! ```
//!
//! Cells are `null` for missing values, numbers for numeric attributes,
//! labels for nominal ones, formatted strings for dates, text for strings
//! and arrays of row documents for relational attributes.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::Attribute;

/// A whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetDocument {
    pub relation: String,
    pub attributes: Vec<Attribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_index: Option<usize>,
    pub rows: Vec<RowDocument>,
}

/// One row of a dataset or of a relational cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowDocument {
    pub values: Vec<JsonValue>,
    #[serde(default = "unit_weight")]
    pub weight: f64,
}

fn unit_weight() -> f64 {
    1.0
}
