//! Move indirect cell contents from the input pool into a bag's own pool.
//!
//! Rows copied out of the input table still carry handles into the input
//! table's [`ValuePool`]. Before such a row joins a bag, every string and
//! relational cell is copied into the bag's pool and its handle rewritten,
//! so no bag table ever aliases the input's pool indices.

use std::collections::HashMap;

use crate::error::{ConvertError, ConvertResult};
use crate::models::{Attribute, AttributeKind, RelationHandle, Row, StringHandle, Value, ValuePool};

/// Positions of the indirect columns in the bag schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueRelocator {
    string_columns: Vec<usize>,
    relation_columns: Vec<usize>,
}

impl ValueRelocator {
    /// Locate the string and relational columns of `attributes`.
    pub fn for_schema(attributes: &[Attribute]) -> Self {
        let mut relocator = Self::default();
        for (i, attr) in attributes.iter().enumerate() {
            match attr.kind {
                AttributeKind::String => relocator.string_columns.push(i),
                AttributeKind::Relational { .. } => relocator.relation_columns.push(i),
                _ => {}
            }
        }
        relocator
    }

    pub fn string_columns(&self) -> &[usize] {
        &self.string_columns
    }

    pub fn relation_columns(&self) -> &[usize] {
        &self.relation_columns
    }

    /// True when the schema has no indirect columns.
    pub fn is_empty(&self) -> bool {
        self.string_columns.is_empty() && self.relation_columns.is_empty()
    }

    /// Rewrite the indirect cells of `row` to point into the context's
    /// destination pool. `row_index` is only used for error reporting.
    pub fn relocate(
        &self,
        ctx: &mut RelocationContext<'_>,
        row: &mut Row,
        row_index: usize,
    ) -> ConvertResult<()> {
        for &column in &self.string_columns {
            if let Some(Value::String(handle)) = row.values.get(column).copied() {
                let moved = ctx.relocate_string(handle).ok_or(ConvertError::DanglingReference {
                    row: row_index,
                    column,
                    what: "string",
                    handle: handle.0,
                })?;
                row.values[column] = Value::String(moved);
            }
        }
        for &column in &self.relation_columns {
            if let Some(Value::Relational(handle)) = row.values.get(column).copied() {
                let moved = ctx.relocate_relation(handle).ok_or(ConvertError::DanglingReference {
                    row: row_index,
                    column,
                    what: "relation",
                    handle: handle.0,
                })?;
                row.values[column] = Value::Relational(moved);
            }
        }
        Ok(())
    }
}

/// Source pool, destination pool and the per-bag remapping tables.
///
/// One context serves a whole conversion; [`RelocationContext::finish_bag`]
/// hands out the finished destination pool and starts fresh tables for the
/// next bag.
#[derive(Debug)]
pub struct RelocationContext<'a> {
    source: &'a ValuePool,
    destination: ValuePool,
    strings: HashMap<StringHandle, StringHandle>,
    relations: HashMap<RelationHandle, RelationHandle>,
}

impl<'a> RelocationContext<'a> {
    pub fn new(source: &'a ValuePool) -> Self {
        Self {
            source,
            destination: ValuePool::new(),
            strings: HashMap::new(),
            relations: HashMap::new(),
        }
    }

    /// Pool of the bag currently being built.
    pub fn destination(&self) -> &ValuePool {
        &self.destination
    }

    /// Take the current bag's pool and reset the remapping tables.
    pub fn finish_bag(&mut self) -> ValuePool {
        self.strings.clear();
        self.relations.clear();
        std::mem::take(&mut self.destination)
    }

    fn relocate_string(&mut self, handle: StringHandle) -> Option<StringHandle> {
        if let Some(&moved) = self.strings.get(&handle) {
            return Some(moved);
        }
        let text = self.source.string(handle)?;
        let moved = self.destination.insert_string(text);
        self.strings.insert(handle, moved);
        Some(moved)
    }

    fn relocate_relation(&mut self, handle: RelationHandle) -> Option<RelationHandle> {
        if let Some(&moved) = self.relations.get(&handle) {
            return Some(moved);
        }
        let table = self.source.relation(handle)?.clone();
        let moved = self.destination.insert_relation(table);
        self.relations.insert(handle, moved);
        Some(moved)
    }
}
