//! High-level pipeline API: read a dataset, convert it, summarize.
//!
//! ```rust,ignore
//! use mibag::convert::pipeline::{convert_file, PipelineOptions};
//! use std::path::Path;
//!
//! let result = convert_file(Path::new("musk.arff"), &PipelineOptions::default())?;
//! println!("{} bags, mean size {:.1}", result.summary.bags, result.summary.mean_bag_size);
//! ```
//!
//! Progress is reported through [`crate::logs`].

use serde::Serialize;
use std::path::Path;

use super::{bag_records, convert, OutputOrder};
use crate::config::ConvertOptions;
use crate::error::PipelineResult;
use crate::logs::{log_error, log_info, log_info_indent, log_success, log_warning};
use crate::models::Table;
use crate::parser::{read_dataset, DatasetFormat, ParsedDataset, ReadOptions};

/// Options for [`convert_file`].
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub convert: ConvertOptions,
    pub read: ReadOptions,
}

/// Figures about one conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionSummary {
    pub input_rows: usize,
    pub bags: usize,
    pub smallest_bag: usize,
    pub largest_bag: usize,
    pub mean_bag_size: f64,
    pub total_weight: f64,
}

impl ConversionSummary {
    /// Summarize a converted table built from `input_rows` rows.
    pub fn of(input_rows: usize, output: &Table) -> Self {
        let records = bag_records(output);
        let sizes: Vec<usize> = records.iter().map(|r| r.bag.row_count()).collect();
        let bags = sizes.len();
        Self {
            input_rows,
            bags,
            smallest_bag: sizes.iter().copied().min().unwrap_or(0),
            largest_bag: sizes.iter().copied().max().unwrap_or(0),
            mean_bag_size: if bags == 0 {
                0.0
            } else {
                sizes.iter().sum::<usize>() as f64 / bags as f64
            },
            total_weight: records.iter().map(|r| r.weight).sum(),
        }
    }
}

/// Result of a complete pipeline run.
#[derive(Debug)]
pub struct PipelineOutput {
    /// The bagged table.
    pub output: Table,
    pub summary: ConversionSummary,
}

/// Read `path` and convert it.
///
/// For CSV input the identifier column is always read as nominal, since bag
/// labels often look numeric.
pub fn convert_file(path: &Path, options: &PipelineOptions) -> PipelineResult<PipelineOutput> {
    let settings = options.convert.settings()?;

    log_info(format!("Reading {}...", path.display()));
    let mut read = options.read.clone();
    let format = read.format.or_else(|| DatasetFormat::from_path(path).ok());
    if format == Some(DatasetFormat::Csv) {
        read.csv.force_nominal(settings.identifier + 1);
    }

    let parsed = read_dataset(path, &read).inspect_err(|e| log_error(e.to_string()))?;
    report_parsed(&parsed);

    convert_table(parsed.table, &options.convert)
}

fn report_parsed(parsed: &ParsedDataset) {
    log_success(format!("Detected format: {}", parsed.format));
    log_success(format!("Detected encoding: {}", parsed.encoding));
    if let Some(delimiter) = parsed.delimiter {
        log_success(format!("Detected separator: '{}'", format_delimiter(delimiter)));
    }
    log_success(format!(
        "Read {} rows with {} attributes",
        parsed.table.row_count(),
        parsed.table.column_count()
    ));
}

/// Convert an in-memory table.
///
/// The class column comes from `options.class_column`, falling back to the
/// class index the table already carries.
pub fn convert_table(mut table: Table, options: &ConvertOptions) -> PipelineResult<PipelineOutput> {
    let settings = options.settings()?;
    table.set_class_index(options.class_column.resolve(table.column_count(), table.class_index()));

    log_info("Grouping rows into bags...");
    if let Some(attr) = table.attribute(settings.identifier) {
        log_info_indent(format!("Bag identifier: {}", attr.name), 1);
    }
    if let Some(attr) = table.class_index().and_then(|c| table.attribute(c)) {
        log_info_indent(format!("Class: {}", attr.name), 1);
    }

    let input_rows = table.row_count();
    let unidentified = table
        .rows()
        .iter()
        .filter(|r| r.value(settings.identifier).is_missing())
        .count();
    if unidentified > 0 {
        log_warning(format!("{unidentified} rows have no bag identifier; they form one extra bag"));
    }

    let output = convert(table, &settings).inspect_err(|e| log_error(e.to_string()))?;
    let summary = ConversionSummary::of(input_rows, &output);

    if let OutputOrder::Randomized { seed } = settings.order {
        log_info(format!("Shuffled bag order with seed {seed}"));
    }
    log_success(format!(
        "Built {} bags from {} rows (sizes {}..{}, mean {:.2}, total weight {})",
        summary.bags,
        summary.input_rows,
        summary.smallest_bag,
        summary.largest_bag,
        summary.mean_bag_size,
        summary.total_weight
    ));

    Ok(PipelineOutput { output, summary })
}

fn format_delimiter(delimiter: char) -> String {
    match delimiter {
        '\t' => "\\t".to_string(),
        other => other.to_string(),
    }
}
