//! mibag CLI - group flat datasets into multi-instance bags
//!
//! # Commands
//!
//! ```bash
//! mibag convert input.arff -o bags.arff      # Group rows into bags
//! mibag convert input.csv -c last -R -S 42   # CSV input, last column as class, shuffled
//! mibag info input.arff                      # Show the schema of a dataset
//! mibag validate dataset.json                # Check a JSON dataset document
//! ```
//!
//! Conversion options can also come from a JSON file (`--config`) and from
//! `MIBAG_*` environment variables, optionally loaded from `.env`. Flags and
//! environment variables override the config file.

use clap::{Parser, Subcommand};
use mibag::config::ClassColumn;
use mibag::models::{Attribute, AttributeKind};
use mibag::parser::{json::from_document, ParsedDataset};
use mibag::{
    convert_file, read_dataset, render, validate_dataset_document, ConvertOptions, CsvOptions, DatasetDocument,
    DatasetFormat, ExportFormat, PipelineOptions, ReadOptions, Table, ValidationError,
};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mibag")]
#[command(about = "Convert flat datasets into multi-instance (bagged) datasets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Group the rows of a dataset into bags by an identifier column
    Convert {
        /// Input dataset (.arff, .csv, .tsv or .json)
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (default: from the output extension, else arff)
        #[arg(long = "to")]
        to: Option<ExportFormat>,

        /// Input format (default: from the input extension)
        #[arg(long)]
        format: Option<DatasetFormat>,

        /// JSON file with conversion options
        #[arg(long)]
        config: Option<PathBuf>,

        /// 1-based bag identifier column
        #[arg(short = 'B', long = "identifier", env = "MIBAG_IDENTIFIER")]
        identifier: Option<usize>,

        /// Class column: none, first, last or a 1-based index
        #[arg(short = 'c', long = "class", env = "MIBAG_CLASS")]
        class: Option<ClassColumn>,

        /// Seed for the bag order permutation
        #[arg(short = 'S', long, env = "MIBAG_SEED", allow_hyphen_values = true)]
        seed: Option<i32>,

        /// Shuffle the bags
        #[arg(short = 'R', long, env = "MIBAG_RANDOMIZE")]
        randomize: bool,

        /// Give every bag weight 1 instead of the sum of its rows
        #[arg(long, env = "MIBAG_NO_WEIGHTS")]
        no_weights: bool,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// CSV columns to read as nominal (e.g. 1,3-5,last)
        #[arg(long)]
        nominal: Option<String>,

        /// CSV columns to read as strings
        #[arg(long)]
        string: Option<String>,
    },

    /// Show the schema and size of a dataset
    Info {
        /// Input dataset
        input: PathBuf,

        /// Input format (default: from the input extension)
        #[arg(long)]
        format: Option<DatasetFormat>,
    },

    /// Validate a JSON dataset document
    Validate {
        /// Input JSON file
        input: PathBuf,
    },
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let filter = EnvFilter::from_default_env()
        .add_directive("mibag=info".parse().unwrap_or_else(|_| LevelFilter::INFO.into()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            input,
            output,
            to,
            format,
            config,
            identifier,
            class,
            seed,
            randomize,
            no_weights,
            delimiter,
            nominal,
            string,
        } => {
            let overrides = Overrides {
                identifier,
                class,
                seed,
                randomize,
                no_weights,
            };
            let read = ReadOptions {
                format,
                csv: CsvOptions {
                    delimiter,
                    nominal,
                    string,
                },
            };
            cmd_convert(&input, output.as_deref(), to, config.as_deref(), overrides, read)
        }

        Commands::Info { input, format } => cmd_info(&input, format),

        Commands::Validate { input } => cmd_validate(&input),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

/// Options given as flags or environment variables.
struct Overrides {
    identifier: Option<usize>,
    class: Option<ClassColumn>,
    seed: Option<i32>,
    randomize: bool,
    no_weights: bool,
}

impl Overrides {
    fn apply(self, mut options: ConvertOptions) -> ConvertOptions {
        if let Some(identifier) = self.identifier {
            options.identifier_column = identifier;
        }
        if let Some(class) = self.class {
            options.class_column = class;
        }
        if let Some(seed) = self.seed {
            options.seed = seed;
        }
        options.randomize |= self.randomize;
        options.do_not_weight_bags |= self.no_weights;
        options
    }
}

fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    to: Option<ExportFormat>,
    config: Option<&Path>,
    overrides: Overrides,
    read: ReadOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let base = match config {
        Some(path) => {
            eprintln!("⚙️  Options from: {}", path.display());
            ConvertOptions::from_json_file(path)?
        }
        None => ConvertOptions::default(),
    };
    let options = PipelineOptions {
        convert: overrides.apply(base),
        read,
    };

    let result = convert_file(input, &options)?;

    let format = to.unwrap_or_else(|| output.map(ExportFormat::from_path).unwrap_or_default());
    let rendered = render(&result.output, format)?;
    write_output(&rendered, output)?;

    eprintln!("✨ Done! {} bags from {} rows", result.summary.bags, result.summary.input_rows);
    Ok(())
}

fn cmd_info(input: &Path, format: Option<DatasetFormat>) -> Result<(), Box<dyn std::error::Error>> {
    let parsed: ParsedDataset = read_dataset(
        input,
        &ReadOptions {
            format,
            ..Default::default()
        },
    )?;
    let table: &Table = &parsed.table;

    println!("Relation: {}", table.name());
    println!("Format: {} ({})", parsed.format, parsed.encoding);
    if let Some(d) = parsed.delimiter {
        println!("Delimiter: '{}'", format_delimiter(d));
    }
    println!("Rows: {}", table.row_count());
    match table.class_index().and_then(|c| table.attribute(c)) {
        Some(attr) => println!("Class: {}", attr.name),
        None => println!("Class: none"),
    }
    println!("\nAttributes:");
    for (i, attr) in table.attributes().iter().enumerate() {
        let distinct = table.distinct_count(i);
        print_attribute(attr, i + 1, 1, Some(distinct));
    }
    Ok(())
}

fn print_attribute(attr: &Attribute, position: usize, depth: usize, distinct: Option<usize>) {
    let indent = "  ".repeat(depth);
    let detail = match &attr.kind {
        AttributeKind::Nominal { values } => format!("nominal ({} categories)", values.len()),
        AttributeKind::Date { format } => format!("date '{format}'"),
        AttributeKind::Relational { attributes } => format!("relational ({} attributes)", attributes.len()),
        other => other.name().to_string(),
    };
    match distinct {
        Some(n) => println!("{indent}{position:>3}. {} : {detail}, {n} distinct", attr.name),
        None => println!("{indent}{position:>3}. {} : {detail}", attr.name),
    }
    if let Some(nested) = attr.nested_attributes() {
        for (i, child) in nested.iter().enumerate() {
            print_attribute(child, i + 1, depth + 1, None);
        }
    }
}

fn cmd_validate(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Validating: {}", input.display());

    let content = fs::read_to_string(input)?;
    let document: Value = serde_json::from_str(&content)?;

    match validate_dataset_document(&document) {
        Ok(()) => {}
        Err(ValidationError::SchemaError { errors }) => {
            eprintln!("\n❌ Document invalid ({} errors):", errors.len());
            for err in errors.iter().take(10) {
                eprintln!("   - {}", err);
            }
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    }

    // The schema checks the shape; decoding checks every cell against its attribute.
    let decoded: DatasetDocument = serde_json::from_value(document)?;
    let table = from_document(decoded)?;
    eprintln!(
        "\n📊 Valid: {} rows, {} attributes",
        table.row_count(),
        table.column_count()
    );
    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
