//! Owned table representation: rows, schema and indirect value storage.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::{Attribute, AttributeKind, RelationHandle, StringHandle, Value};

/// One row: a value per attribute plus a weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub values: Vec<Value>,
    pub weight: f64,
}

impl Row {
    /// Row with the default weight of 1.0.
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            values,
            weight: 1.0,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn value(&self, column: usize) -> Value {
        self.values.get(column).copied().unwrap_or(Value::Missing)
    }
}

/// Storage for string and nested-table cell contents.
///
/// Strings are de-duplicated by content; relations are appended as given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValuePool {
    strings: Vec<String>,
    lookup: HashMap<String, StringHandle>,
    relations: Vec<Table>,
}

impl ValuePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a string, reusing the existing handle for equal content.
    pub fn insert_string(&mut self, value: &str) -> StringHandle {
        if let Some(&handle) = self.lookup.get(value) {
            return handle;
        }
        let handle = StringHandle(self.strings.len() as u32);
        self.strings.push(value.to_string());
        self.lookup.insert(value.to_string(), handle);
        handle
    }

    pub fn insert_relation(&mut self, table: Table) -> RelationHandle {
        let handle = RelationHandle(self.relations.len() as u32);
        self.relations.push(table);
        handle
    }

    pub fn string(&self, handle: StringHandle) -> Option<&str> {
        self.strings.get(handle.0 as usize).map(String::as_str)
    }

    pub fn relation(&self, handle: RelationHandle) -> Option<&Table> {
        self.relations.get(handle.0 as usize)
    }

    pub fn string_count(&self) -> usize {
        self.strings.len()
    }

    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }
}

/// An ordered set of rows sharing one schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    attributes: Vec<Attribute>,
    class_index: Option<usize>,
    rows: Vec<Row>,
    pool: ValuePool,
}

impl Table {
    /// Create an empty table without a class column.
    pub fn new(name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        Self {
            name: name.into(),
            attributes,
            class_index: None,
            rows: Vec::new(),
            pool: ValuePool::new(),
        }
    }

    pub fn with_class_index(mut self, class_index: Option<usize>) -> Self {
        self.class_index = class_index;
        self
    }

    /// Empty table with the same name, schema and class column.
    pub fn empty_copy(&self) -> Self {
        Self::new(self.name.clone(), self.attributes.clone()).with_class_index(self.class_index)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, index: usize) -> Option<&Attribute> {
        self.attributes.get(index)
    }

    pub fn column_count(&self) -> usize {
        self.attributes.len()
    }

    pub fn class_index(&self) -> Option<usize> {
        self.class_index
    }

    pub fn set_class_index(&mut self, class_index: Option<usize>) {
        self.class_index = class_index;
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, row: Row) {
        debug_assert_eq!(row.values.len(), self.attributes.len());
        self.rows.push(row);
    }

    pub fn pool(&self) -> &ValuePool {
        &self.pool
    }

    /// Store a string in this table's pool and return the cell value.
    pub fn add_string(&mut self, value: &str) -> Value {
        Value::String(self.pool.insert_string(value))
    }

    /// Store a nested table in this table's pool and return the cell value.
    pub fn add_relation(&mut self, table: Table) -> Value {
        Value::Relational(self.pool.insert_relation(table))
    }

    pub fn string(&self, handle: StringHandle) -> Option<&str> {
        self.pool.string(handle)
    }

    pub fn relation(&self, handle: RelationHandle) -> Option<&Table> {
        self.pool.relation(handle)
    }

    /// Label of a nominal cell.
    pub fn nominal_label(&self, column: usize, value: Value) -> Option<&str> {
        let code = value.as_nominal()? as usize;
        self.attribute(column)?
            .categories()?
            .get(code)
            .map(String::as_str)
    }

    /// Number of distinct non-missing values in `column`.
    pub fn distinct_count(&self, column: usize) -> usize {
        let mut seen: Vec<Value> = Vec::new();
        for row in &self.rows {
            let value = row.value(column);
            if !value.is_missing() && !seen.contains(&value) {
                seen.push(value);
            }
        }
        seen.len()
    }

    /// Sort rows by the values of `column`, keeping the input order of ties.
    ///
    /// Missing values sort last. Nominal values sort by category code,
    /// strings by content.
    pub fn sort_stable_by_column(&mut self, column: usize) {
        let pool = &self.pool;
        self.rows
            .sort_by(|a, b| compare_values(pool, a.value(column), b.value(column)));
    }

    /// Take the table apart into schema, class index, rows and pool.
    pub fn into_parts(self) -> (String, Vec<Attribute>, Option<usize>, Vec<Row>, ValuePool) {
        (self.name, self.attributes, self.class_index, self.rows, self.pool)
    }

    /// Reassemble a table from parts.
    pub fn from_parts(
        name: String,
        attributes: Vec<Attribute>,
        class_index: Option<usize>,
        rows: Vec<Row>,
        pool: ValuePool,
    ) -> Self {
        Self {
            name,
            attributes,
            class_index,
            rows,
            pool,
        }
    }

    /// Whether every string and relational cell resolves in the pool.
    pub fn references_resolve(&self) -> bool {
        self.rows.iter().all(|row| {
            row.values.iter().all(|value| match value {
                Value::String(h) => self.pool.string(*h).is_some(),
                Value::Relational(h) => self
                    .pool
                    .relation(*h)
                    .is_some_and(Table::references_resolve),
                _ => true,
            })
        })
    }

    /// Kind of `column`, if it exists.
    pub fn kind(&self, column: usize) -> Option<&AttributeKind> {
        self.attribute(column).map(|a| &a.kind)
    }
}

fn compare_values(pool: &ValuePool, a: Value, b: Value) -> Ordering {
    match (a, b) {
        (Value::Missing, Value::Missing) => Ordering::Equal,
        (Value::Missing, _) => Ordering::Greater,
        (_, Value::Missing) => Ordering::Less,
        (Value::Numeric(x), Value::Numeric(y)) => x.total_cmp(&y),
        (Value::Nominal(x), Value::Nominal(y)) => x.cmp(&y),
        (Value::String(x), Value::String(y)) => pool.string(x).cmp(&pool.string(y)),
        (Value::Relational(x), Value::Relational(y)) => x.cmp(&y),
        // Mixed kinds cannot occur within one column.
        _ => Ordering::Equal,
    }
}
