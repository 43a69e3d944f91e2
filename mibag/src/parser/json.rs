//! JSON dataset document reader.
//!
//! Documents are validated against the embedded schema before decoding, so
//! decoding only has to check that each cell fits its attribute. Row numbers
//! in errors are 1-based positions in `rows`.

use serde_json::Value as JsonValue;

use crate::error::{ParseError, ParseResult};
use crate::models::date::parse_date;
use crate::models::{AttributeKind, DatasetDocument, Row, RowDocument, Table, Value};
use crate::validation::validate_dataset_document;

/// Parse and validate a JSON dataset document.
pub fn parse_json(content: &str) -> ParseResult<Table> {
    let value: JsonValue = serde_json::from_str(content)?;
    validate_dataset_document(&value)?;
    let document: DatasetDocument = serde_json::from_value(value)?;
    from_document(document)
}

/// Decode an already deserialized document.
pub fn from_document(document: DatasetDocument) -> ParseResult<Table> {
    let column_count = document.attributes.len();
    if let Some(class) = document.class_index.filter(|&c| c >= column_count) {
        return Err(ParseError::syntax(
            0,
            format!("classIndex {class} out of range ({column_count} attributes)"),
        ));
    }

    let mut table = Table::new(document.relation, document.attributes).with_class_index(document.class_index);
    for (i, row) in document.rows.into_iter().enumerate() {
        let row = decode_row(&mut table, row, i + 1)?;
        table.push_row(row);
    }
    Ok(table)
}

fn decode_row(table: &mut Table, row: RowDocument, line: usize) -> ParseResult<Row> {
    if row.values.len() != table.column_count() {
        return Err(ParseError::syntax(
            line,
            format!("expected {} values, found {}", table.column_count(), row.values.len()),
        ));
    }
    let mut values = Vec::with_capacity(row.values.len());
    for (column, cell) in row.values.into_iter().enumerate() {
        values.push(decode_cell(table, column, cell, line)?);
    }
    Ok(Row {
        values,
        weight: row.weight,
    })
}

fn decode_cell(table: &mut Table, column: usize, cell: JsonValue, line: usize) -> ParseResult<Value> {
    if cell.is_null() {
        return Ok(Value::Missing);
    }
    let Some(attr) = table.attribute(column).cloned() else {
        return Err(ParseError::syntax(line, format!("no attribute for column {column}")));
    };
    let invalid = |message: String| ParseError::InvalidValue {
        line,
        attribute: attr.name.clone(),
        value: cell.to_string(),
        message,
    };

    let value = match (&attr.kind, &cell) {
        (AttributeKind::Numeric, JsonValue::Number(n)) => n.as_f64().map(Value::Numeric),
        (AttributeKind::Date { .. }, JsonValue::Number(n)) => n.as_f64().map(Value::Numeric),
        (AttributeKind::Date { format }, JsonValue::String(s)) => parse_date(s, format).map(Value::Numeric),
        (AttributeKind::Nominal { .. }, JsonValue::String(s)) => attr.category_code(s).map(Value::Nominal),
        (AttributeKind::String, JsonValue::String(s)) => Some(table.add_string(s)),
        (AttributeKind::Relational { attributes }, JsonValue::Array(rows)) => {
            let mut nested = Table::new(attr.name.clone(), attributes.clone());
            for nested_row in rows {
                let doc: RowDocument =
                    serde_json::from_value(nested_row.clone()).map_err(|e| invalid(e.to_string()))?;
                let row = decode_row(&mut nested, doc, line)?;
                nested.push_row(row);
            }
            Some(table.add_relation(nested))
        }
        _ => None,
    };

    value.ok_or_else(|| invalid(format!("does not fit a {} attribute", attr.kind.name())))
}
