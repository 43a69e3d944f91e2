//! JSON dataset document writer.

use serde_json::Value as JsonValue;
use std::io::Write;

use crate::error::{ExportError, ExportResult};
use crate::models::date::format_date;
use crate::models::{AttributeKind, DatasetDocument, Row, RowDocument, Table, Value};

/// Write `table` as a pretty-printed JSON dataset document.
pub fn write_json<W: Write>(table: &Table, writer: &mut W) -> ExportResult<()> {
    serde_json::to_writer_pretty(&mut *writer, &to_document(table)?)?;
    writer.write_all(b"\n")?;
    Ok(())
}

pub fn to_json_string(table: &Table) -> ExportResult<String> {
    Ok(serde_json::to_string_pretty(&to_document(table)?)?)
}

/// Build the document for `table`, resolving every pooled value.
pub fn to_document(table: &Table) -> ExportResult<DatasetDocument> {
    Ok(DatasetDocument {
        relation: table.name().to_string(),
        attributes: table.attributes().to_vec(),
        class_index: table.class_index(),
        rows: encode_rows(table)?,
    })
}

fn encode_rows(table: &Table) -> ExportResult<Vec<RowDocument>> {
    table
        .rows()
        .iter()
        .enumerate()
        .map(|(index, row)| encode_row(table, row, index))
        .collect()
}

fn encode_row(table: &Table, row: &Row, index: usize) -> ExportResult<RowDocument> {
    let values = (0..table.column_count())
        .map(|column| encode_cell(table, index, column, row.value(column)))
        .collect::<ExportResult<Vec<_>>>()?;
    Ok(RowDocument {
        values,
        weight: row.weight,
    })
}

fn encode_cell(table: &Table, row: usize, column: usize, value: Value) -> ExportResult<JsonValue> {
    let unrenderable = |message: String| ExportError::Unrenderable { row, column, message };

    match value {
        Value::Missing => Ok(JsonValue::Null),
        Value::Numeric(v) => match table.kind(column) {
            Some(AttributeKind::Date { format }) => format_date(v, format)
                .map(JsonValue::String)
                .ok_or_else(|| unrenderable(format!("date {v} out of range"))),
            // Non-finite numbers have no JSON form.
            _ => Ok(serde_json::Number::from_f64(v).map_or(JsonValue::Null, JsonValue::Number)),
        },
        Value::Nominal(code) => table
            .nominal_label(column, value)
            .map(|label| JsonValue::String(label.to_string()))
            .ok_or_else(|| unrenderable(format!("no category with code {code}"))),
        Value::String(handle) => table
            .string(handle)
            .map(|s| JsonValue::String(s.to_string()))
            .ok_or_else(|| unrenderable(format!("dangling string {handle}"))),
        Value::Relational(handle) => {
            let nested = table
                .relation(handle)
                .ok_or_else(|| unrenderable(format!("dangling relation {handle}")))?;
            let rows = encode_rows(nested)?
                .into_iter()
                .map(serde_json::to_value)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(JsonValue::Array(rows))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Attribute;
    use crate::parser::parse_json;
    use serde_json::json;

    fn bags() -> Table {
        let nested = vec![Attribute::numeric("a"), Attribute::string("s")];
        let mut bag = Table::new("mi", nested.clone());
        let s = bag.add_string("hello");
        bag.push_row(Row::new(vec![Value::Numeric(10.0), s]));

        let mut table = Table::new(
            "mi",
            vec![
                Attribute::nominal("id", ["b1"]),
                Attribute::relational("bag", nested),
                Attribute::nominal("class", ["x"]),
            ],
        )
        .with_class_index(Some(2));
        let handle = table.add_relation(bag);
        table.push_row(Row::new(vec![Value::Nominal(0), handle, Value::Nominal(0)]).with_weight(2.0));
        table
    }

    #[test]
    fn test_document_shape() {
        let json = serde_json::to_value(to_document(&bags()).unwrap()).unwrap();
        assert_eq!(json["classIndex"], 2);
        assert_eq!(json["attributes"][1]["type"], "relational");
        assert_eq!(
            json["rows"][0],
            json!({ "values": ["b1", [{ "values": [10.0, "hello"], "weight": 1.0 }], "x"], "weight": 2.0 })
        );
    }

    #[test]
    fn test_json_reparse() {
        let table = bags();
        let back = parse_json(&to_json_string(&table).unwrap()).unwrap();
        assert_eq!(back.attributes(), table.attributes());
        assert_eq!(back.class_index(), Some(2));
        assert_eq!(back.rows(), table.rows());
        let Value::Relational(h) = back.row(0).unwrap().value(1) else { panic!("expected relation") };
        assert_eq!(back.relation(h).unwrap().row_count(), 1);
    }

    #[test]
    fn test_write_json_appends_newline() {
        let mut out = Vec::new();
        write_json(&bags(), &mut out).unwrap();
        assert!(out.ends_with(b"}\n"));
    }
}
