//! Derive the bagged output layout from a flat input schema.
//!
//! ```text
//! Input schema                     Output schema
//! ┌──────────────────────────┐     ┌────────────────────────────────┐
//! │ id {b1,b2}               │     │ id {b1,b2}                     │
//! │ a  numeric               │  →  │ bag relational { a, s }        │
//! │ s  string                │     │ class {x,y}      (class index) │
//! │ class {x,y} (class index)│     └────────────────────────────────┘
//! └──────────────────────────┘
//! ```

use crate::error::{ConvertError, ConvertResult};
use crate::models::Attribute;

use super::relocate::ValueRelocator;

/// Name of the relational column holding each bag.
pub const BAG_ATTRIBUTE: &str = "bag";

/// Name given to the output relation.
pub const OUTPUT_RELATION: &str = "Relation-Valued-Dataset";

/// Column positions of the output table.
pub const OUTPUT_IDENTIFIER_COLUMN: usize = 0;
pub const OUTPUT_BAG_COLUMN: usize = 1;
pub const OUTPUT_CLASS_COLUMN: usize = 2;

/// Result of the schema transformation, reused for the whole conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct BagLayout {
    /// 0-based identifier column of the input.
    pub identifier: usize,
    /// Class column of the input, if any.
    pub class_index: Option<usize>,
    /// Input schema the layout was derived from.
    pub input_attributes: Vec<Attribute>,
    /// Output schema: identifier, bag, and class (if any).
    pub output_attributes: Vec<Attribute>,
    /// Input columns copied into bag rows, in order.
    pub member_columns: Vec<usize>,
    /// Locators for indirect columns of the bag schema.
    pub relocator: ValueRelocator,
}

impl BagLayout {
    /// Derive the layout.
    ///
    /// Fails when the identifier is out of range or not nominal, when the
    /// class index is out of range, or when both indices are the same.
    pub fn derive(
        attributes: &[Attribute],
        identifier: usize,
        class_index: Option<usize>,
    ) -> ConvertResult<Self> {
        let count = attributes.len();
        let id_attr = attributes
            .get(identifier)
            .ok_or(ConvertError::IdentifierOutOfRange {
                index: identifier,
                count,
            })?;
        if !id_attr.is_nominal() {
            return Err(ConvertError::InvalidIdentifierType {
                name: id_attr.name.clone(),
                kind: id_attr.kind.name(),
            });
        }
        if class_index == Some(identifier) {
            return Err(ConvertError::IdentifierClassCollision { index: identifier });
        }
        if let Some(class) = class_index {
            if class >= count {
                return Err(ConvertError::ClassOutOfRange { index: class, count });
            }
        }

        let member_columns: Vec<usize> = (0..count)
            .filter(|&i| i != identifier && Some(i) != class_index)
            .collect();
        let bag_attributes: Vec<Attribute> = member_columns
            .iter()
            .map(|&i| attributes[i].clone())
            .collect();

        let mut output_attributes = vec![
            id_attr.clone(),
            Attribute::relational(BAG_ATTRIBUTE, bag_attributes.clone()),
        ];
        if let Some(class) = class_index {
            output_attributes.push(attributes[class].clone());
        }

        Ok(Self {
            identifier,
            class_index,
            input_attributes: attributes.to_vec(),
            output_attributes,
            member_columns,
            relocator: ValueRelocator::for_schema(&bag_attributes),
        })
    }

    /// Schema shared by every bag table.
    pub fn bag_attributes(&self) -> &[Attribute] {
        self.output_attributes[OUTPUT_BAG_COLUMN]
            .nested_attributes()
            .unwrap_or_default()
    }

    /// Class column of the output table.
    pub fn output_class_index(&self) -> Option<usize> {
        self.class_index.map(|_| OUTPUT_CLASS_COLUMN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AttributeKind;

    fn schema() -> Vec<Attribute> {
        vec![
            Attribute::numeric("a"),
            Attribute::nominal("id", ["b1", "b2"]),
            Attribute::string("note"),
            Attribute::nominal("class", ["x", "y"]),
        ]
    }

    #[test]
    fn test_layout_with_class() {
        let layout = BagLayout::derive(&schema(), 1, Some(3)).unwrap();

        let names: Vec<&str> = layout.output_attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["id", "bag", "class"]);
        assert_eq!(layout.output_class_index(), Some(2));
        assert_eq!(layout.member_columns, vec![0, 2]);

        let bag: Vec<&str> = layout.bag_attributes().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(bag, vec!["a", "note"]);
    }

    #[test]
    fn test_layout_without_class() {
        let layout = BagLayout::derive(&schema(), 1, None).unwrap();
        assert_eq!(layout.output_attributes.len(), 2);
        assert_eq!(layout.output_class_index(), None);
        assert_eq!(layout.member_columns, vec![0, 2, 3]);
        assert!(matches!(
            layout.output_attributes[1].kind,
            AttributeKind::Relational { ref attributes } if attributes.len() == 3
        ));
    }

    #[test]
    fn test_non_nominal_identifier() {
        let err = BagLayout::derive(&schema(), 0, Some(3)).unwrap_err();
        assert_eq!(
            err,
            ConvertError::InvalidIdentifierType { name: "a".into(), kind: "numeric" }
        );
    }

    #[test]
    fn test_identifier_class_collision() {
        let err = BagLayout::derive(&schema(), 1, Some(1)).unwrap_err();
        assert_eq!(err, ConvertError::IdentifierClassCollision { index: 1 });
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(
            BagLayout::derive(&schema(), 9, None),
            Err(ConvertError::IdentifierOutOfRange { index: 9, count: 4 })
        ));
        assert!(matches!(
            BagLayout::derive(&schema(), 1, Some(4)),
            Err(ConvertError::ClassOutOfRange { index: 4, count: 4 })
        ));
    }
}
