//! JSON Schema validation for dataset documents.
//!
//! The dataset schema is embedded at compile time from
//! `schemas/dataset.json` and checked with JSON Schema Draft 7. It covers the
//! document shape (attributes, rows, nested relational rows); whether a cell
//! fits its attribute is checked while decoding.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use mibag::validation::validate_dataset_document;
//!
//! let doc = json!({
//!     "relation": "demo",
//!     "attributes": [{ "name": "x", "type": "numeric" }],
//!     "rows": [{ "values": [1.5] }]
//! });
//! assert!(validate_dataset_document(&doc).is_ok());
//! ```

use serde_json::Value;

use crate::error::ValidationError;

const DATASET_SCHEMA: &str = include_str!("../../schemas/dataset.json");

/// Validate `data` against a JSON schema.
///
/// Returns every violation, not only the first.
pub fn validate(schema: &Value, data: &Value) -> Result<(), ValidationError> {
    let validator =
        jsonschema::draft7::new(schema).map_err(|e| ValidationError::InvalidSchema(e.to_string()))?;

    let errors: Vec<String> = validator.iter_errors(data).map(|e| e.to_string()).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::SchemaError { errors })
    }
}

/// Quick check, without error details.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// The embedded dataset document schema.
pub fn dataset_schema() -> Result<Value, ValidationError> {
    serde_json::from_str(DATASET_SCHEMA).map_err(|e| ValidationError::InvalidSchema(e.to_string()))
}

/// Validate a dataset document.
pub fn validate_dataset_document(data: &Value) -> Result<(), ValidationError> {
    validate(&dataset_schema()?, data)
}

/// Quick check against the dataset schema.
pub fn is_valid_dataset_document(data: &Value) -> bool {
    dataset_schema().is_ok_and(|schema| is_valid(&schema, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_document() {
        let doc = json!({
            "relation": "mi",
            "attributes": [
                { "name": "id", "type": "nominal", "values": ["b1", "b2"] },
                { "name": "bag", "type": "relational", "attributes": [{ "name": "a", "type": "numeric" }] }
            ],
            "classIndex": null,
            "rows": [
                { "values": ["b1", [{ "values": [10] }, { "values": [null], "weight": 0.5 }]], "weight": 1.5 }
            ]
        });
        assert!(validate_dataset_document(&doc).is_ok());
        assert!(is_valid_dataset_document(&doc));
    }

    #[test]
    fn test_nominal_without_values() {
        let doc = json!({
            "relation": "r",
            "attributes": [{ "name": "id", "type": "nominal" }],
            "rows": []
        });
        assert!(!is_valid_dataset_document(&doc));
    }

    #[test]
    fn test_errors_are_collected() {
        let doc = json!({
            "relation": 3,
            "attributes": [{ "name": "x", "type": "complex" }],
            "rows": [{ "values": [true], "weight": -1 }]
        });
        match validate_dataset_document(&doc) {
            Err(ValidationError::SchemaError { errors }) => assert!(errors.len() >= 3, "{errors:?}"),
            other => panic!("expected schema errors, got {other:?}"),
        }
    }

    #[test]
    fn test_generic_validate() {
        let schema = json!({ "type": "object", "required": ["name"] });
        assert!(validate(&schema, &json!({ "name": "x" })).is_ok());
        assert!(validate(&schema, &json!({})).is_err());
        assert!(matches!(
            validate(&json!({ "type": 12 }), &json!({})),
            Err(ValidationError::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_embedded_schema_compiles() {
        let schema = dataset_schema().unwrap();
        assert!(jsonschema::draft7::new(&schema).is_ok());
    }
}
