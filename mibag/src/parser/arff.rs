//! ARFF reader.
//!
//! Supports the dense format: `@relation`, `@attribute` (numeric, real,
//! integer, nominal `{..}`, string, date [format], relational .. `@end`),
//! `@data`, `?` for missing values, quoted values with backslash escapes and
//! an optional trailing `{weight}` per row. Relational cells are quoted
//! strings whose nested rows are separated by newlines.
//!
//! ```text
//! @relation musk
//! @attribute molecule {m1,m2}
//! @attribute f1 numeric
//! @attribute class {0,1}
//! @data
//! m1,42,1
//! m1,17,1,{0.5}
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ParseError, ParseResult};
use crate::models::date::parse_date;
use crate::models::{Attribute, AttributeKind, Row, Table, Value, DEFAULT_DATE_FORMAT};

static RELATION_RE: Lazy<Regex> = Lazy::new(|| header_regex(r"(?i)^@relation\s+(.+)$"));
static ATTRIBUTE_RE: Lazy<Regex> =
    Lazy::new(|| header_regex(r#"(?i)^@attribute\s+('(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*"|\S+)\s+(.+)$"#));
static END_RE: Lazy<Regex> = Lazy::new(|| header_regex(r"(?i)^@end\s+(.+)$"));
static DATA_RE: Lazy<Regex> = Lazy::new(|| header_regex(r"(?i)^@data\s*$"));
static DATE_RE: Lazy<Regex> = Lazy::new(|| header_regex(r"(?is)^date(?:\s+(.+))?$"));
static NUMERIC_RE: Lazy<Regex> = Lazy::new(|| header_regex(r"(?i)^(numeric|real|integer)$"));

fn header_regex(pattern: &str) -> Regex {
    // Only called with the literal patterns above.
    Regex::new(pattern).expect("header pattern compiles")
}

/// Parse an ARFF document into a [`Table`] without a class column.
pub fn parse_arff(content: &str) -> ParseResult<Table> {
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty() && !l.starts_with('%'));

    let (relation, attributes) = parse_header(&mut lines)?;
    let mut table = Table::new(relation, attributes);

    for (line_num, line) in lines {
        if line.starts_with('{') {
            return Err(ParseError::syntax(line_num, "sparse instances are not supported"));
        }
        let fields = split_fields(line).map_err(|m| ParseError::syntax(line_num, m))?;
        let row = parse_row(fields, &mut table, line_num)?;
        table.push_row(row);
    }

    Ok(table)
}

/// One header frame: a relational attribute whose nested schema is open.
struct Frame {
    name: String,
    attributes: Vec<Attribute>,
}

fn parse_header<'a>(
    lines: &mut impl Iterator<Item = (usize, &'a str)>,
) -> ParseResult<(String, Vec<Attribute>)> {
    let mut relation: Option<String> = None;
    let mut attributes: Vec<Attribute> = Vec::new();
    let mut open: Vec<Frame> = Vec::new();

    for (line_num, line) in lines.by_ref() {
        if let Some(caps) = RELATION_RE.captures(line) {
            relation = Some(unquote(caps[1].trim()).map_err(|m| ParseError::syntax(line_num, m))?);
        } else if let Some(caps) = ATTRIBUTE_RE.captures(line) {
            let name = unquote(&caps[1]).map_err(|m| ParseError::syntax(line_num, m))?;
            let declared = caps[2].trim();
            if declared.eq_ignore_ascii_case("relational") {
                open.push(Frame {
                    name,
                    attributes: Vec::new(),
                });
                continue;
            }
            let kind = parse_kind(declared).map_err(|m| ParseError::syntax(line_num, m))?;
            let target = open.last_mut().map_or(&mut attributes, |f| &mut f.attributes);
            target.push(Attribute { name, kind });
        } else if let Some(caps) = END_RE.captures(line) {
            let name = unquote(caps[1].trim()).map_err(|m| ParseError::syntax(line_num, m))?;
            let frame = open
                .pop()
                .ok_or_else(|| ParseError::syntax(line_num, format!("@end {name} without relational attribute")))?;
            if frame.name != name {
                return Err(ParseError::syntax(
                    line_num,
                    format!("@end {name} closes relational attribute '{}'", frame.name),
                ));
            }
            let target = open.last_mut().map_or(&mut attributes, |f| &mut f.attributes);
            target.push(Attribute::relational(frame.name, frame.attributes));
        } else if DATA_RE.is_match(line) {
            if let Some(frame) = open.last() {
                return Err(ParseError::syntax(
                    line_num,
                    format!("@data inside unclosed relational attribute '{}'", frame.name),
                ));
            }
            let relation = relation.ok_or_else(|| ParseError::syntax(line_num, "missing @relation"))?;
            if attributes.is_empty() {
                return Err(ParseError::syntax(line_num, "no attributes declared"));
            }
            return Ok((relation, attributes));
        } else {
            return Err(ParseError::syntax(line_num, format!("unexpected header line '{line}'")));
        }
    }

    Err(ParseError::Empty)
}

fn parse_kind(declared: &str) -> Result<AttributeKind, String> {
    if NUMERIC_RE.is_match(declared) {
        return Ok(AttributeKind::Numeric);
    }
    if declared.eq_ignore_ascii_case("string") {
        return Ok(AttributeKind::String);
    }
    if let Some(caps) = DATE_RE.captures(declared) {
        let format = match caps.get(1) {
            Some(m) => unquote(m.as_str().trim())?,
            None => DEFAULT_DATE_FORMAT.to_string(),
        };
        return Ok(AttributeKind::Date { format });
    }
    if let Some(inner) = declared.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
        let values = split_fields(inner)?.into_iter().map(|f| f.text).collect();
        return Ok(AttributeKind::Nominal { values });
    }
    Err(format!("unknown attribute type '{declared}'"))
}

/// Build a row for `table` from split fields, storing indirect values in
/// the table's pool.
fn parse_row(mut fields: Vec<Field>, table: &mut Table, line: usize) -> ParseResult<Row> {
    let mut weight = 1.0;
    if fields.len() == table.column_count() + 1 {
        let last = fields.pop().unwrap_or_default();
        weight = parse_weight(&last).ok_or_else(|| ParseError::syntax(line, format!("invalid weight '{}'", last.text)))?;
    }
    if fields.len() != table.column_count() {
        return Err(ParseError::syntax(
            line,
            format!("expected {} values, found {}", table.column_count(), fields.len()),
        ));
    }

    let mut values = Vec::with_capacity(fields.len());
    for (column, field) in fields.into_iter().enumerate() {
        values.push(parse_value(field, table, column, line)?);
    }
    Ok(Row { values, weight })
}

fn parse_weight(field: &Field) -> Option<f64> {
    if field.quoted {
        return None;
    }
    let inner = field.text.strip_prefix('{')?.strip_suffix('}')?;
    inner.trim().parse().ok()
}

fn parse_value(field: Field, table: &mut Table, column: usize, line: usize) -> ParseResult<Value> {
    if !field.quoted && field.text == "?" {
        return Ok(Value::Missing);
    }
    let Some(attr) = table.attribute(column).cloned() else {
        return Err(ParseError::syntax(line, format!("no attribute for column {column}")));
    };
    let invalid = |message: &str| ParseError::InvalidValue {
        line,
        attribute: attr.name.clone(),
        value: field.text.clone(),
        message: message.to_string(),
    };

    match &attr.kind {
        AttributeKind::Numeric => field
            .text
            .parse::<f64>()
            .map(Value::Numeric)
            .map_err(|_| invalid("not a number")),
        AttributeKind::Nominal { .. } => attr
            .category_code(&field.text)
            .map(Value::Nominal)
            .ok_or_else(|| invalid("not a declared category")),
        AttributeKind::Date { format } => parse_date(&field.text, format)
            .map(Value::Numeric)
            .ok_or_else(|| invalid("does not match the date format")),
        AttributeKind::String => Ok(table.add_string(&field.text)),
        AttributeKind::Relational { attributes } => {
            let mut nested = Table::new(attr.name.clone(), attributes.clone());
            for nested_line in field.text.split('\n').map(str::trim).filter(|l| !l.is_empty()) {
                let nested_fields = split_fields(nested_line).map_err(|m| invalid(&m))?;
                let row = parse_row(nested_fields, &mut nested, line)?;
                nested.push_row(row);
            }
            Ok(table.add_relation(nested))
        }
    }
}

// =============================================================================
// Tokenizer
// =============================================================================

/// A comma-separated field.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Field {
    pub text: String,
    /// Whether the field was quoted (a quoted `?` is not missing).
    pub quoted: bool,
}

/// Split one data line into fields, honoring quotes and `{..}` groups.
pub(crate) fn split_fields(line: &str) -> Result<Vec<Field>, String> {
    let mut fields = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        let Some(&first) = chars.peek() else {
            break;
        };

        let field = match first {
            '\'' | '"' => {
                chars.next();
                let mut text = String::new();
                let mut closed = false;
                while let Some(c) = chars.next() {
                    if c == first {
                        closed = true;
                        break;
                    }
                    if c == '\\' {
                        let escaped = chars.next().ok_or("dangling escape")?;
                        text.push(match escaped {
                            'n' => '\n',
                            'r' => '\r',
                            't' => '\t',
                            other => other,
                        });
                    } else {
                        text.push(c);
                    }
                }
                if !closed {
                    return Err(format!("unterminated quote in '{line}'"));
                }
                Field { text, quoted: true }
            }
            '{' => {
                let mut text = String::new();
                for c in chars.by_ref() {
                    text.push(c);
                    if c == '}' {
                        break;
                    }
                }
                Field { text, quoted: false }
            }
            _ => {
                let mut text = String::new();
                while let Some(&c) = chars.peek() {
                    if c == ',' {
                        break;
                    }
                    text.push(c);
                    chars.next();
                }
                Field {
                    text: text.trim_end().to_string(),
                    quoted: false,
                }
            }
        };
        fields.push(field);

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        match chars.next() {
            None => break,
            Some(',') => continue,
            Some(c) => return Err(format!("expected ',' but found '{c}'")),
        }
    }

    Ok(fields)
}

fn unquote(text: &str) -> Result<String, String> {
    let mut fields = split_fields(text)?;
    match (fields.len(), fields.pop()) {
        (1, Some(field)) => Ok(field.text),
        _ => Ok(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RelationHandle;

    const SAMPLE: &str = r#"% bags of molecules
@relation 'musk small'

@attribute molecule {m1,m2,'m 3'}
@attribute f1 numeric
@attribute note string
@attribute seen date "yyyy-MM-dd"
@attribute class {0,1}

@data
m1, 42, 'hello, world', 2020-01-01, 1
'm 3',?,"a \"quoted\" word",?,0,{0.5}
m2,1.5e2,?,1970-01-02,0
"#;

    #[test]
    fn test_parse_header_and_rows() {
        let table = parse_arff(SAMPLE).unwrap();
        assert_eq!(table.name(), "musk small");
        assert_eq!(table.column_count(), 5);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.class_index(), None);
        assert_eq!(
            table.attribute(0).unwrap().categories().unwrap(),
            &["m1".to_string(), "m2".to_string(), "m 3".to_string()]
        );
        assert_eq!(
            table.attribute(3).unwrap().kind,
            AttributeKind::Date { format: "yyyy-MM-dd".into() }
        );
    }

    #[test]
    fn test_parse_values() {
        let table = parse_arff(SAMPLE).unwrap();
        let first = table.row(0).unwrap();
        assert_eq!(first.value(0), Value::Nominal(0));
        assert_eq!(first.value(1), Value::Numeric(42.0));
        let Value::String(h) = first.value(2) else { panic!("expected string") };
        assert_eq!(table.string(h), Some("hello, world"));
        assert_eq!(first.value(4), Value::Nominal(1));

        let second = table.row(1).unwrap();
        assert_eq!(second.value(0), Value::Nominal(2));
        assert!(second.value(1).is_missing());
        let Value::String(h) = second.value(2) else { panic!("expected string") };
        assert_eq!(table.string(h), Some("a \"quoted\" word"));
        assert_eq!(second.weight, 0.5);

        let third = table.row(2).unwrap();
        assert_eq!(third.value(1), Value::Numeric(150.0));
        assert_eq!(third.value(3), Value::Numeric(86_400_000.0));
    }

    #[test]
    fn test_parse_relational() {
        let content = "@relation mi\n\
            @attribute id {a,b}\n\
            @attribute bag relational\n\
            @attribute x numeric\n\
            @attribute s string\n\
            @end bag\n\
            @data\n\
            a,'1,\\'one\\'\\n2,\\'two\\''\n\
            b,''\n";
        let table = parse_arff(content).unwrap();

        let nested_names: Vec<&str> = table.attribute(1).unwrap().nested_attributes().unwrap()
            .iter().map(|a| a.name.as_str()).collect();
        assert_eq!(nested_names, vec!["x", "s"]);

        let bag = table.relation(RelationHandle(0)).unwrap();
        assert_eq!(bag.row_count(), 2);
        assert_eq!(bag.row(1).unwrap().value(0), Value::Numeric(2.0));
        let Value::String(h) = bag.row(1).unwrap().value(1) else { panic!("expected string") };
        assert_eq!(bag.string(h), Some("two"));

        let empty = table.relation(RelationHandle(1)).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_unknown_category() {
        let err = parse_arff("@relation r\n@attribute c {a,b}\n@data\nz\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidValue { line: 4, .. }));
    }

    #[test]
    fn test_wrong_value_count() {
        let err = parse_arff("@relation r\n@attribute x numeric\n@attribute y numeric\n@data\n1,2,3,4\n").unwrap_err();
        assert!(err.to_string().contains("expected 2 values"));
    }

    #[test]
    fn test_unclosed_relational() {
        let err = parse_arff("@relation r\n@attribute b relational\n@attribute x numeric\n@data\n").unwrap_err();
        assert!(err.to_string().contains("unclosed"));
    }

    #[test]
    fn test_sparse_rejected() {
        let err = parse_arff("@relation r\n@attribute x numeric\n@data\n{0 1}\n").unwrap_err();
        assert!(err.to_string().contains("sparse"));
    }

    #[test]
    fn test_split_fields() {
        let fields = split_fields(" a , 'b c',\"d\\te\" , {2}").unwrap();
        let texts: Vec<&str> = fields.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b c", "d\te", "{2}"]);
        assert!(fields[1].quoted);
        assert!(split_fields("'open").is_err());
        assert!(split_fields("'a' b").is_err());
    }
}
