//! Group flat rows into bags, one output row per identifier value.
//!
//! ```text
//! Flat input (sorted by id)        Bagged output
//! ┌──────────────────────┐        ┌──────────────────────────────────┐
//! │ id=1  a=10  class=x  │        │ id=1  bag=[(10),(20)]  x  w=2.0  │
//! │ id=1  a=20  class=x  │   →    ├──────────────────────────────────┤
//! │ id=2  a=30  class=y  │        │ id=2  bag=[(30)]       y  w=1.0  │
//! └──────────────────────┘        └──────────────────────────────────┘
//! ```
//!
//! The class value of a bag is taken from its first member row.

use crate::error::ConvertResult;
use crate::models::{Row, Table, Value};

use super::relocate::RelocationContext;
use super::schema::{
    BagLayout, OUTPUT_BAG_COLUMN, OUTPUT_CLASS_COLUMN, OUTPUT_IDENTIFIER_COLUMN, OUTPUT_RELATION,
};

/// How bag weights are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Weighting {
    /// Bag weight is the sum of its member weights.
    #[default]
    Sum,
    /// Every bag weighs 1.0.
    Unit,
}

impl Weighting {
    pub fn from_options(do_not_weight_bags: bool) -> Self {
        if do_not_weight_bags {
            Self::Unit
        } else {
            Self::Sum
        }
    }
}

/// Group the rows of `input` into bags following `layout`.
///
/// Rows are stably sorted by identifier first (missing identifiers last), so
/// bags come out in ascending identifier order and members keep their input
/// order. An empty input yields an empty output table.
pub fn group_bags(mut input: Table, layout: &BagLayout, weighting: Weighting) -> ConvertResult<Table> {
    let mut output = Table::new(OUTPUT_RELATION, layout.output_attributes.clone())
        .with_class_index(layout.output_class_index());

    input.sort_stable_by_column(layout.identifier);
    let (name, _, _, rows, pool) = input.into_parts();

    let Some(first) = rows.first() else {
        return Ok(output);
    };

    let mut ctx = RelocationContext::new(&pool);
    let mut pending = PendingBag::start(first, layout);

    for (index, row) in rows.iter().enumerate() {
        let mut member = Row {
            values: layout.member_columns.iter().map(|&c| row.value(c)).collect(),
            weight: row.weight,
        };

        if row.value(layout.identifier) != pending.identifier {
            let finished = std::mem::replace(&mut pending, PendingBag::start(row, layout));
            finished.finalize(&mut output, &mut ctx, &name, layout, weighting);
        }

        if !layout.relocator.is_empty() {
            layout.relocator.relocate(&mut ctx, &mut member, index)?;
        }
        if weighting == Weighting::Sum {
            pending.weight += member.weight;
        }
        pending.rows.push(member);
    }
    pending.finalize(&mut output, &mut ctx, &name, layout, weighting);

    tracing::debug!(
        input_rows = rows.len(),
        bags = output.row_count(),
        "grouped rows into bags"
    );

    Ok(output)
}

/// The bag currently being accumulated.
struct PendingBag {
    identifier: Value,
    class: Value,
    weight: f64,
    rows: Vec<Row>,
}

impl PendingBag {
    fn start(row: &Row, layout: &BagLayout) -> Self {
        Self {
            identifier: row.value(layout.identifier),
            class: layout
                .class_index
                .map_or(Value::Missing, |c| row.value(c)),
            weight: 0.0,
            rows: Vec::new(),
        }
    }

    fn finalize(
        self,
        output: &mut Table,
        ctx: &mut RelocationContext<'_>,
        relation_name: &str,
        layout: &BagLayout,
        weighting: Weighting,
    ) {
        let bag = Table::from_parts(
            relation_name.to_string(),
            layout.bag_attributes().to_vec(),
            None,
            self.rows,
            ctx.finish_bag(),
        );
        let handle = output.add_relation(bag);

        let mut values = vec![self.identifier, handle];
        if layout.class_index.is_some() {
            values.push(self.class);
        }
        let weight = match weighting {
            Weighting::Sum => self.weight,
            Weighting::Unit => 1.0,
        };
        output.push_row(Row { values, weight });
    }
}

/// Read-only view of one output row.
#[derive(Debug, Clone, Copy)]
pub struct BagRecord<'a> {
    /// Identifier label, `None` for the bag of missing identifiers.
    pub identifier: Option<&'a str>,
    /// Member rows of the bag.
    pub bag: &'a Table,
    /// Class label (nominal class) or `None`.
    pub class_label: Option<&'a str>,
    /// Raw class value, `Missing` without a class column.
    pub class: Value,
    pub weight: f64,
}

/// View the rows of a converted table as bag records.
///
/// Rows whose bag cell does not resolve are skipped.
pub fn bag_records(output: &Table) -> Vec<BagRecord<'_>> {
    output
        .rows()
        .iter()
        .filter_map(|row| {
            let Value::Relational(handle) = row.value(OUTPUT_BAG_COLUMN) else {
                return None;
            };
            let bag = output.relation(handle)?;
            let class = if output.class_index().is_some() {
                row.value(OUTPUT_CLASS_COLUMN)
            } else {
                Value::Missing
            };
            Some(BagRecord {
                identifier: output.nominal_label(OUTPUT_IDENTIFIER_COLUMN, row.value(OUTPUT_IDENTIFIER_COLUMN)),
                bag,
                class_label: output.nominal_label(OUTPUT_CLASS_COLUMN, class),
                class,
                weight: row.weight,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Attribute, AttributeKind, StringHandle};

    /// `[(id=1,a=10,class=x), (id=1,a=20,class=x), (id=2,a=30,class=y)]`
    fn scenario() -> Table {
        let mut table = Table::new(
            "scenario",
            vec![
                Attribute::nominal("id", ["1", "2"]),
                Attribute::numeric("a"),
                Attribute::nominal("class", ["x", "y"]),
            ],
        )
        .with_class_index(Some(2));
        for (id, a, class) in [(0, 10.0, 0), (0, 20.0, 0), (1, 30.0, 1)] {
            table.push_row(Row::new(vec![
                Value::Nominal(id),
                Value::Numeric(a),
                Value::Nominal(class),
            ]));
        }
        table
    }

    fn layout_for(table: &Table) -> BagLayout {
        BagLayout::derive(table.attributes(), 0, table.class_index()).unwrap()
    }

    fn column(bag: &Table, c: usize) -> Vec<f64> {
        bag.rows().iter().filter_map(|r| r.value(c).as_f64()).collect()
    }

    #[test]
    fn test_reference_scenario() {
        let input = scenario();
        let layout = layout_for(&input);
        let output = group_bags(input, &layout, Weighting::Sum).unwrap();

        let records = bag_records(&output);
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].identifier, Some("1"));
        assert_eq!(records[0].weight, 2.0);
        assert_eq!(column(records[0].bag, 0), vec![10.0, 20.0]);
        assert_eq!(records[0].class_label, Some("x"));

        assert_eq!(records[1].identifier, Some("2"));
        assert_eq!(records[1].weight, 1.0);
        assert_eq!(column(records[1].bag, 0), vec![30.0]);
        assert_eq!(records[1].class_label, Some("y"));

        assert_eq!(output.class_index(), Some(2));
        assert_eq!(records[0].bag.attributes(), &[Attribute::numeric("a")]);
    }

    #[test]
    fn test_empty_input() {
        let input = scenario().empty_copy();
        let layout = layout_for(&input);
        let output = group_bags(input, &layout, Weighting::Sum).unwrap();
        assert!(output.is_empty());
        assert_eq!(output.column_count(), 3);
    }

    #[test]
    fn test_weights_summed_or_unit() {
        let mut input = Table::new(
            "w",
            vec![Attribute::nominal("id", ["a", "b"]), Attribute::numeric("x")],
        );
        for (id, w) in [(1, 0.5), (0, 2.0), (1, 0.25), (0, 3.0), (1, 0.125)] {
            input.push_row(Row::new(vec![Value::Nominal(id), Value::Numeric(w)]).with_weight(w));
        }
        let layout = layout_for(&input);

        let summed = group_bags(input.clone(), &layout, Weighting::Sum).unwrap();
        let weights: Vec<f64> = summed.rows().iter().map(|r| r.weight).collect();
        assert_eq!(weights, vec![5.0, 0.875]);

        let unit = group_bags(input, &layout, Weighting::Unit).unwrap();
        assert!(unit.rows().iter().all(|r| r.weight == 1.0));
    }

    #[test]
    fn test_unsorted_input_groups_by_identifier() {
        let mut input = Table::new(
            "u",
            vec![Attribute::numeric("x"), Attribute::nominal("id", ["p", "q", "r"])],
        );
        for (x, id) in [(1.0, 2), (2.0, 0), (3.0, 2), (4.0, 1), (5.0, 0), (6.0, 2)] {
            input.push_row(Row::new(vec![Value::Numeric(x), Value::Nominal(id)]));
        }
        let layout = BagLayout::derive(input.attributes(), 1, None).unwrap();
        let output = group_bags(input, &layout, Weighting::Sum).unwrap();

        let records = bag_records(&output);
        let ids: Vec<_> = records.iter().map(|r| r.identifier.unwrap()).collect();
        assert_eq!(ids, vec!["p", "q", "r"]);
        assert_eq!(column(records[0].bag, 0), vec![2.0, 5.0]);
        assert_eq!(column(records[1].bag, 0), vec![4.0]);
        assert_eq!(column(records[2].bag, 0), vec![1.0, 3.0, 6.0]);
        assert_eq!(records[2].class, Value::Missing);
    }

    #[test]
    fn test_missing_identifiers_form_last_bag() {
        let mut input = Table::new(
            "m",
            vec![Attribute::nominal("id", ["a"]), Attribute::numeric("x")],
        );
        input.push_row(Row::new(vec![Value::Missing, Value::Numeric(1.0)]));
        input.push_row(Row::new(vec![Value::Nominal(0), Value::Numeric(2.0)]));
        input.push_row(Row::new(vec![Value::Missing, Value::Numeric(3.0)]));
        let layout = layout_for(&input);
        let output = group_bags(input, &layout, Weighting::Sum).unwrap();

        let records = bag_records(&output);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].identifier, None);
        assert_eq!(column(records[1].bag, 0), vec![1.0, 3.0]);
    }

    #[test]
    fn test_strings_relocated_per_bag() {
        let mut input = Table::new(
            "s",
            vec![Attribute::nominal("id", ["a", "b"]), Attribute::string("note")],
        );
        let notes = ["shared", "only-a", "shared", "only-b"];
        for (id, note) in [0, 0, 1, 1].into_iter().zip(notes) {
            let v = input.add_string(note);
            input.push_row(Row::new(vec![Value::Nominal(id), v]));
        }
        let layout = layout_for(&input);
        let output = group_bags(input, &layout, Weighting::Sum).unwrap();

        for (record, expected) in bag_records(&output).iter().zip([["shared", "only-a"], ["shared", "only-b"]]) {
            let texts: Vec<&str> = record
                .bag
                .rows()
                .iter()
                .map(|r| match r.value(0) {
                    Value::String(h) => record.bag.string(h).unwrap(),
                    other => panic!("unexpected {other:?}"),
                })
                .collect();
            assert_eq!(texts, expected);
            assert_eq!(record.bag.row(0).unwrap().value(0), Value::String(StringHandle(0)));
            assert!(record.bag.references_resolve());
        }
    }

    #[test]
    fn test_nested_relations_relocated() {
        let inner_schema = vec![Attribute::numeric("z")];
        let mut input = Table::new(
            "n",
            vec![
                Attribute::nominal("id", ["a", "b"]),
                Attribute::relational("inner", inner_schema.clone()),
            ],
        );
        for (id, z) in [(1, 5.0), (0, 7.0)] {
            let mut inner = Table::new("inner", inner_schema.clone());
            inner.push_row(Row::new(vec![Value::Numeric(z)]));
            let v = input.add_relation(inner);
            input.push_row(Row::new(vec![Value::Nominal(id), v]));
        }
        let layout = layout_for(&input);
        let output = group_bags(input, &layout, Weighting::Sum).unwrap();

        let records = bag_records(&output);
        let zs: Vec<f64> = records
            .iter()
            .map(|r| {
                let Value::Relational(h) = r.bag.row(0).unwrap().value(0) else {
                    panic!("expected relation");
                };
                r.bag.relation(h).unwrap().row(0).unwrap().value(0).as_f64().unwrap()
            })
            .collect();
        assert_eq!(zs, vec![7.0, 5.0]);
        assert!(matches!(
            output.attribute(1).unwrap().kind,
            AttributeKind::Relational { ref attributes } if attributes[0].name == "inner"
        ));
    }
}
