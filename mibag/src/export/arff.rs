//! ARFF writer.
//!
//! Produces documents [`crate::parser::arff`] reads back: relational
//! attributes as `@attribute .. relational` / `@end` blocks, relational cells
//! as quoted nested rows joined by `\n`, and a `{weight}` suffix on rows whose
//! weight is not 1.

use std::io::Write;

use crate::error::{ExportError, ExportResult};
use crate::models::date::format_date;
use crate::models::{Attribute, AttributeKind, Row, Table, Value};

/// Write `table` as ARFF.
pub fn write_arff<W: Write>(table: &Table, writer: &mut W) -> ExportResult<()> {
    writer.write_all(to_arff_string(table)?.as_bytes())?;
    Ok(())
}

/// Render `table` as an ARFF document.
pub fn to_arff_string(table: &Table) -> ExportResult<String> {
    let mut out = format!("@relation {}\n\n", quote(table.name()));
    write_attributes(&mut out, table.attributes());
    out.push_str("\n@data\n");

    for (index, row) in table.rows().iter().enumerate() {
        out.push_str(&render_row(table, row, index)?);
        out.push('\n');
    }
    Ok(out)
}

fn write_attributes(out: &mut String, attributes: &[Attribute]) {
    for attr in attributes {
        let name = quote(&attr.name);
        match &attr.kind {
            AttributeKind::Numeric => out.push_str(&format!("@attribute {name} numeric\n")),
            AttributeKind::String => out.push_str(&format!("@attribute {name} string\n")),
            AttributeKind::Date { format } => {
                out.push_str(&format!("@attribute {name} date {}\n", quote(format)));
            }
            AttributeKind::Nominal { values } => {
                let labels: Vec<String> = values.iter().map(|v| quote(v)).collect();
                out.push_str(&format!("@attribute {name} {{{}}}\n", labels.join(",")));
            }
            AttributeKind::Relational { attributes } => {
                out.push_str(&format!("@attribute {name} relational\n"));
                write_attributes(out, attributes);
                out.push_str(&format!("@end {name}\n"));
            }
        }
    }
}

fn render_row(table: &Table, row: &Row, index: usize) -> ExportResult<String> {
    let mut cells = Vec::with_capacity(table.column_count());
    for column in 0..table.column_count() {
        cells.push(render_value(table, index, column, row.value(column))?);
    }
    let mut line = cells.join(",");
    if row.weight != 1.0 {
        line.push_str(&format!(",{{{}}}", format_number(row.weight)));
    }
    Ok(line)
}

fn render_value(table: &Table, row: usize, column: usize, value: Value) -> ExportResult<String> {
    let unrenderable = |message: String| ExportError::Unrenderable { row, column, message };

    match value {
        Value::Missing => Ok("?".to_string()),
        Value::Numeric(v) => match table.kind(column) {
            Some(AttributeKind::Date { format }) => format_date(v, format)
                .map(|s| quote(&s))
                .ok_or_else(|| unrenderable(format!("date {v} out of range"))),
            _ => Ok(format_number(v)),
        },
        Value::Nominal(code) => table
            .nominal_label(column, value)
            .map(quote)
            .ok_or_else(|| unrenderable(format!("no category with code {code}"))),
        Value::String(handle) => table
            .string(handle)
            .map(quote)
            .ok_or_else(|| unrenderable(format!("dangling string {handle}"))),
        Value::Relational(handle) => {
            let nested = table
                .relation(handle)
                .ok_or_else(|| unrenderable(format!("dangling relation {handle}")))?;
            let lines = nested
                .rows()
                .iter()
                .enumerate()
                .map(|(i, r)| render_row(nested, r, i))
                .collect::<ExportResult<Vec<_>>>()?;
            Ok(quote_always(&lines.join("\n")))
        }
    }
}

/// Integral values without a fraction, everything else in shortest form.
fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// Quote `text` when a reader could misread it.
pub(crate) fn quote(text: &str) -> String {
    let needs_quotes = text.is_empty()
        || text == "?"
        || text
            .chars()
            .any(|c| matches!(c, ' ' | ',' | '\t' | '\n' | '\r' | '\'' | '"' | '%' | '{' | '}' | '\\'));
    if needs_quotes {
        quote_always(text)
    } else {
        text.to_string()
    }
}

fn quote_always(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}
