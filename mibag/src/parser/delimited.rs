//! CSV/TSV reader with column type inference.
//!
//! The first record holds the column names. A column is numeric when every
//! non-missing cell parses as a number, otherwise nominal with categories in
//! order of first appearance. `?` and empty cells are missing. Columns can be
//! forced to nominal or string with 1-based column lists (`1,3-5,last`).

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::config::parse_column_list;
use crate::error::ParseResult;
use crate::models::{Attribute, AttributeKind, Row, Table, Value};

/// CSV reader options.
#[derive(Debug, Clone, Default)]
pub struct CsvOptions {
    /// Field delimiter; detected from the first line when unset.
    pub delimiter: Option<char>,
    /// Columns read as nominal regardless of their content.
    pub nominal: Option<String>,
    /// Columns read as free text.
    pub string: Option<String>,
}

impl CsvOptions {
    /// Add `column` (1-based) to the forced nominal columns.
    pub fn force_nominal(&mut self, column: usize) {
        self.nominal = Some(match self.nominal.take() {
            Some(list) if !list.trim().is_empty() => format!("{list},{column}"),
            _ => column.to_string(),
        });
    }
}

/// Parse delimited text into a table called `name`.
pub fn parse_csv(content: &str, name: &str, delimiter: char, options: &CsvOptions) -> ParseResult<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter as u8)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
    let records = reader.records().collect::<Result<Vec<StringRecord>, _>>()?;

    let column_count = headers.len();
    let resolve = |columns: &Option<String>| -> ParseResult<Vec<usize>> {
        match columns {
            Some(list) => Ok(parse_column_list(list, column_count)?),
            None => Ok(Vec::new()),
        }
    };
    let forced_string = resolve(&options.string)?;
    let forced_nominal = resolve(&options.nominal)?;

    let attributes: Vec<Attribute> = headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            let cells = records.iter().map(|r| r.get(col).unwrap_or(""));
            let kind = if forced_string.contains(&col) {
                AttributeKind::String
            } else if forced_nominal.contains(&col) {
                nominal_kind(cells)
            } else {
                infer_kind(cells)
            };
            Attribute {
                name: header.clone(),
                kind,
            }
        })
        .collect();

    let mut table = Table::new(name, attributes.clone());
    for record in &records {
        let mut values = Vec::with_capacity(column_count);
        for col in 0..column_count {
            let cell = record.get(col).unwrap_or("");
            let value = if is_missing(cell) {
                Value::Missing
            } else {
                match &attributes[col].kind {
                    AttributeKind::Numeric => cell.parse::<f64>().map_or(Value::Missing, Value::Numeric),
                    AttributeKind::Nominal { .. } => attributes[col]
                        .category_code(cell)
                        .map_or(Value::Missing, Value::Nominal),
                    _ => table.add_string(cell),
                }
            };
            values.push(value);
        }
        table.push_row(Row::new(values));
    }

    tracing::debug!(
        columns = column_count,
        rows = table.row_count(),
        "parsed delimited input"
    );
    Ok(table)
}

fn is_missing(cell: &str) -> bool {
    cell.is_empty() || cell == "?"
}

fn infer_kind<'a>(cells: impl Iterator<Item = &'a str> + Clone) -> AttributeKind {
    let numeric = cells
        .clone()
        .filter(|c| !is_missing(c))
        .all(|c| c.parse::<f64>().is_ok());
    if numeric {
        AttributeKind::Numeric
    } else {
        nominal_kind(cells)
    }
}

fn nominal_kind<'a>(cells: impl Iterator<Item = &'a str>) -> AttributeKind {
    let mut values: Vec<String> = Vec::new();
    for cell in cells.filter(|c| !is_missing(c)) {
        if !values.iter().any(|v| v == cell) {
            values.push(cell.to_string());
        }
    }
    AttributeKind::Nominal { values }
}
