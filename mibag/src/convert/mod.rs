//! Propositional to multi-instance conversion.
//!
//! - [`schema`]: derive the bagged output layout
//! - [`relocate`]: move string/relational cells into each bag's pool
//! - [`grouper`]: sort, partition and build bags
//! - [`sequencer`]: optional seeded reordering of the bags
//! - [`pipeline`]: file-level entry points with logging and a summary
//!
//! ## Usage Flow
//!
//! ```text
//! Table → BagLayout::derive → group_bags → sequence → bagged Table
//! ```

pub mod grouper;
pub mod pipeline;
pub mod relocate;
pub mod schema;
pub mod sequencer;

pub use grouper::{bag_records, group_bags, BagRecord, Weighting};
pub use relocate::{RelocationContext, ValueRelocator};
pub use schema::{BagLayout, BAG_ATTRIBUTE, OUTPUT_RELATION};
pub use sequencer::{sequence, shuffle, JavaRandom, OutputOrder};

use crate::error::{ConvertError, ConvertResult};
use crate::models::{Attribute, Table};

/// Resolved conversion settings (0-based indices).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertSettings {
    /// 0-based identifier column.
    pub identifier: usize,
    pub weighting: Weighting,
    pub order: OutputOrder,
}

impl Default for ConvertSettings {
    fn default() -> Self {
        Self {
            identifier: 0,
            weighting: Weighting::Sum,
            order: OutputOrder::Sorted,
        }
    }
}

/// Convert a flat table into a bagged table.
///
/// The class column is taken from `input.class_index()`.
///
/// # Example
///
/// ```rust,ignore
/// use mibag::{convert, ConvertSettings};
///
/// let bagged = convert(table, &ConvertSettings::default())?;
/// for record in mibag::bag_records(&bagged) {
///     println!("{:?}: {} rows", record.identifier, record.bag.row_count());
/// }
/// ```
pub fn convert(input: Table, settings: &ConvertSettings) -> ConvertResult<Table> {
    let mut converter = Converter::new(*settings);
    converter.set_input_format(input.attributes(), input.class_index())?;
    converter.convert(input)
}

/// Two-phase converter: prepare the format once, then convert tables.
#[derive(Debug, Clone)]
pub struct Converter {
    settings: ConvertSettings,
    layout: Option<BagLayout>,
}

impl Converter {
    pub fn new(settings: ConvertSettings) -> Self {
        Self {
            settings,
            layout: None,
        }
    }

    pub fn settings(&self) -> &ConvertSettings {
        &self.settings
    }

    /// Validate the input schema and derive the output schema.
    pub fn set_input_format(
        &mut self,
        attributes: &[Attribute],
        class_index: Option<usize>,
    ) -> ConvertResult<&[Attribute]> {
        self.layout = None;
        let layout = BagLayout::derive(attributes, self.settings.identifier, class_index)?;
        Ok(self.layout.insert(layout).output_attributes.as_slice())
    }

    /// Output schema, once the input format is set.
    pub fn output_format(&self) -> Option<&[Attribute]> {
        self.layout.as_ref().map(|l| l.output_attributes.as_slice())
    }

    pub fn layout(&self) -> Option<&BagLayout> {
        self.layout.as_ref()
    }

    /// Convert `input`, which must match the prepared format.
    pub fn convert(&self, input: Table) -> ConvertResult<Table> {
        let layout = self.layout.as_ref().ok_or(ConvertError::UninitializedSchema)?;
        if input.attributes() != layout.input_attributes.as_slice() {
            return Err(ConvertError::SchemaMismatch(format!(
                "expected {} columns, table '{}' has {}",
                layout.input_attributes.len(),
                input.name(),
                input.column_count()
            )));
        }
        if input.class_index() != layout.class_index {
            return Err(ConvertError::SchemaMismatch(format!(
                "class column {:?} differs from prepared {:?}",
                input.class_index(),
                layout.class_index
            )));
        }

        let mut output = group_bags(input, layout, self.settings.weighting)?;
        sequence(output.rows_mut(), self.settings.order);
        Ok(output)
    }
}
