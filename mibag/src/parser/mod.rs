//! Dataset readers with format, encoding and delimiter auto-detection.
//!
//! - [`arff`] - ARFF documents, including relational attributes
//! - [`delimited`] - CSV/TSV files with column type inference
//! - [`json`] - JSON dataset documents, schema-validated
//!
//! [`read_dataset`] picks the reader from the file extension unless a
//! [`DatasetFormat`] is forced, decodes the bytes with the detected encoding
//! and returns the table along with what was detected.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{ParseError, ParseResult};
use crate::models::Table;

pub mod arff;
pub mod delimited;
pub mod json;

pub use arff::parse_arff;
pub use delimited::{parse_csv, CsvOptions};
pub use json::parse_json;

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Arff,
    Csv,
    Json,
}

impl DatasetFormat {
    /// Infer the format from a file extension (`.arff`, `.csv`, `.tsv`, `.json`).
    pub fn from_path(path: &Path) -> ParseResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "arff" => Ok(Self::Arff),
            "csv" | "tsv" | "txt" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(ParseError::UnknownFormat(path.display().to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Arff => "arff",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for DatasetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DatasetFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "arff" => Ok(Self::Arff),
            "csv" | "tsv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(ParseError::UnknownFormat(other.to_string())),
        }
    }
}

/// Reader options.
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Force a format instead of inferring it from the extension.
    pub format: Option<DatasetFormat>,
    /// CSV-specific options.
    pub csv: CsvOptions,
}

/// A parsed dataset with detection metadata.
#[derive(Debug)]
pub struct ParsedDataset {
    pub table: Table,
    pub format: DatasetFormat,
    /// Detected or used encoding.
    pub encoding: String,
    /// Delimiter, for CSV input.
    pub delimiter: Option<char>,
}

/// Read a dataset file.
///
/// ```ignore
/// let parsed = read_dataset(Path::new("musk.arff"), &ReadOptions::default())?;
/// println!("{} rows, encoding {}", parsed.table.row_count(), parsed.encoding);
/// ```
pub fn read_dataset(path: &Path, options: &ReadOptions) -> ParseResult<ParsedDataset> {
    let format = match options.format {
        Some(format) => format,
        None => DatasetFormat::from_path(path)?,
    };
    let bytes = std::fs::read(path)?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset");

    let mut csv = options.csv.clone();
    if csv.delimiter.is_none() && path.extension().is_some_and(|e| e.eq_ignore_ascii_case("tsv")) {
        csv.delimiter = Some('\t');
    }
    read_bytes(&bytes, format, name, &csv)
}

/// Read a dataset from raw bytes in a known format.
///
/// `name` is the relation name given to CSV tables.
pub fn read_bytes(
    bytes: &[u8],
    format: DatasetFormat,
    name: &str,
    csv: &CsvOptions,
) -> ParseResult<ParsedDataset> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ParseError::Empty);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);

    let (table, delimiter) = match format {
        DatasetFormat::Arff => (parse_arff(&content)?, None),
        DatasetFormat::Json => (parse_json(&content)?, None),
        DatasetFormat::Csv => {
            let delimiter = csv.delimiter.unwrap_or_else(|| detect_delimiter(&content));
            (parse_csv(&content, name, delimiter, csv)?, Some(delimiter))
        }
    };

    Ok(ParsedDataset {
        table,
        format,
        encoding,
        delimiter,
    })
}

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let (charset, _confidence, _language) = chardet::detect(bytes);

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" | "utf-8-sig" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes with the given encoding label.
///
/// Unknown labels fall back to lossy UTF-8. A byte order mark is stripped.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding_rs::Encoding::for_label(encoding.as_bytes()) {
        Some(enc) => enc.decode(bytes).0.into_owned(),
        None => String::from_utf8_lossy(bytes)
            .trim_start_matches('\u{feff}')
            .to_string(),
    }
}

/// Detect the delimiter by counting candidates on the first non-empty line.
///
/// Defaults to `,` when no candidate occurs.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().find(|l| !l.trim().is_empty()).unwrap_or("");

    let mut best = ',';
    let mut best_count = 0;
    for sep in [',', ';', '\t', '|'] {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best = sep;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(DatasetFormat::from_path(Path::new("a/b.ARFF")).unwrap(), DatasetFormat::Arff);
        assert_eq!(DatasetFormat::from_path(Path::new("x.tsv")).unwrap(), DatasetFormat::Csv);
        assert_eq!(DatasetFormat::from_path(Path::new("x.json")).unwrap(), DatasetFormat::Json);
        assert!(matches!(
            DatasetFormat::from_path(Path::new("x.parquet")),
            Err(ParseError::UnknownFormat(_))
        ));
        assert_eq!("JSON".parse::<DatasetFormat>().unwrap(), DatasetFormat::Json);
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("\na\tb\n"), '\t');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_decode_latin1() {
        let bytes = b"caf\xe9";
        assert_eq!(decode_content(bytes, "iso-8859-1"), "café");
        assert_eq!(decode_content("naïve".as_bytes(), "utf-8"), "naïve");
    }

    #[test]
    fn test_read_bytes_csv() {
        let parsed = read_bytes(b"id;x\nb1;1\nb2;2\n", DatasetFormat::Csv, "demo", &CsvOptions::default()).unwrap();
        assert_eq!(parsed.delimiter, Some(';'));
        assert_eq!(parsed.encoding, "utf-8");
        assert_eq!(parsed.table.name(), "demo");
        assert_eq!(parsed.table.row_count(), 2);
    }

    #[test]
    fn test_read_bytes_empty() {
        assert!(matches!(
            read_bytes(b"  \n", DatasetFormat::Arff, "x", &CsvOptions::default()),
            Err(ParseError::Empty)
        ));
    }
}
