//! Conversion options.
//!
//! Options are plain serde data so they can be loaded from a JSON file:
//!
//! ```json
//! { "seed": 1, "randomize": false, "identifierColumn": 1,
//!   "doNotWeightBags": false, "classColumn": "last" }
//! ```
//!
//! Column indices are 1-based here and resolved to 0-based
//! [`ConvertSettings`] by [`ConvertOptions::settings`]. The identifier column
//! defaults to 1, the first column.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::convert::{ConvertSettings, OutputOrder, Weighting};
use crate::error::{ConfigError, ConfigResult};

/// Options for one conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConvertOptions {
    /// Seed for the bag order permutation.
    pub seed: i32,

    /// Shuffle the bags after grouping.
    pub randomize: bool,

    /// 1-based identifier column.
    pub identifier_column: usize,

    /// Give every bag weight 1.0 instead of the sum of its members.
    pub do_not_weight_bags: bool,

    /// Which column holds the class, if any.
    pub class_column: ClassColumn,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            seed: 1,
            randomize: false,
            identifier_column: 1,
            do_not_weight_bags: false,
            class_column: ClassColumn::None,
        }
    }
}

impl ConvertOptions {
    /// Load options from a JSON file; missing keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Resolve to 0-based settings.
    pub fn settings(&self) -> ConfigResult<ConvertSettings> {
        if self.identifier_column == 0 {
            return Err(ConfigError::InvalidIdentifierColumn(0));
        }
        Ok(ConvertSettings {
            identifier: self.identifier_column - 1,
            weighting: Weighting::from_options(self.do_not_weight_bags),
            order: OutputOrder::from_options(self.randomize, self.seed),
        })
    }
}

/// Class column selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ClassColumn {
    /// No class column (or keep the one the input declares, see
    /// [`ClassColumn::resolve`]).
    #[default]
    None,
    First,
    Last,
    /// 1-based column index.
    Index(usize),
}

impl ClassColumn {
    /// 0-based class index for a table with `column_count` columns.
    ///
    /// `None` keeps `declared`, the class index the input format carries.
    pub fn resolve(&self, column_count: usize, declared: Option<usize>) -> Option<usize> {
        match self {
            Self::None => declared,
            Self::First => (column_count > 0).then_some(0),
            Self::Last => column_count.checked_sub(1),
            Self::Index(i) => Some(i.saturating_sub(1)),
        }
    }
}

impl FromStr for ClassColumn {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            other => match other.parse::<usize>() {
                Ok(i) if i > 0 => Ok(Self::Index(i)),
                _ => Err(ConfigError::InvalidClassColumn(s.to_string())),
            },
        }
    }
}

impl TryFrom<String> for ClassColumn {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClassColumn> for String {
    fn from(value: ClassColumn) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ClassColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::First => f.write_str("first"),
            Self::Last => f.write_str("last"),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

/// Parse a 1-based column list such as `1,3-5,last` into sorted 0-based
/// indices.
pub fn parse_column_list(spec: &str, column_count: usize) -> ConfigResult<Vec<usize>> {
    let invalid = || ConfigError::InvalidColumnList(spec.to_string());
    let position = |token: &str| -> ConfigResult<usize> {
        match token.trim() {
            "first" => Ok(1),
            "last" => Ok(column_count),
            t => t.parse::<usize>().map_err(|_| invalid()),
        }
    };

    let mut columns = Vec::new();
    for part in spec.split(',').filter(|p| !p.trim().is_empty()) {
        let (start, end) = match part.split_once('-') {
            Some((a, b)) => (position(a)?, position(b)?),
            None => {
                let p = position(part)?;
                (p, p)
            }
        };
        if start == 0 || start > end {
            return Err(invalid());
        }
        columns.extend((start - 1)..end);
    }
    columns.sort_unstable();
    columns.dedup();
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = ConvertOptions::default();
        assert_eq!(opts.seed, 1);
        assert!(!opts.randomize);
        assert_eq!(opts.identifier_column, 1);
        assert!(!opts.do_not_weight_bags);

        let settings = opts.settings().unwrap();
        assert_eq!(settings.identifier, 0);
        assert_eq!(settings.weighting, Weighting::Sum);
        assert_eq!(settings.order, OutputOrder::Sorted);
    }

    #[test]
    fn test_from_json_partial() {
        let opts = ConvertOptions::from_json(
            r#"{ "randomize": true, "seed": 42, "identifierColumn": 3, "classColumn": "last" }"#,
        )
        .unwrap();
        assert_eq!(opts.class_column, ClassColumn::Last);
        assert!(!opts.do_not_weight_bags);

        let settings = opts.settings().unwrap();
        assert_eq!(settings.identifier, 2);
        assert_eq!(settings.order, OutputOrder::Randomized { seed: 42 });
    }

    #[test]
    fn test_zero_identifier_rejected() {
        let opts = ConvertOptions {
            identifier_column: 0,
            ..Default::default()
        };
        assert!(matches!(opts.settings(), Err(ConfigError::InvalidIdentifierColumn(0))));
    }

    #[test]
    fn test_class_column_parse_and_resolve() {
        assert_eq!("LAST".parse::<ClassColumn>().unwrap(), ClassColumn::Last);
        assert_eq!("4".parse::<ClassColumn>().unwrap(), ClassColumn::Index(4));
        assert!("0".parse::<ClassColumn>().is_err());
        assert!("middle".parse::<ClassColumn>().is_err());

        assert_eq!(ClassColumn::Last.resolve(5, None), Some(4));
        assert_eq!(ClassColumn::First.resolve(5, Some(3)), Some(0));
        assert_eq!(ClassColumn::Index(2).resolve(5, None), Some(1));
        assert_eq!(ClassColumn::None.resolve(5, Some(3)), Some(3));
        assert_eq!(ClassColumn::Last.resolve(0, None), None);
    }

    #[test]
    fn test_options_roundtrip_names() {
        let json = serde_json::to_value(ConvertOptions::default()).unwrap();
        assert_eq!(json["identifierColumn"], 1);
        assert_eq!(json["doNotWeightBags"], false);
        assert_eq!(json["classColumn"], "none");
    }

    #[test]
    fn test_parse_column_list() {
        assert_eq!(parse_column_list("1,3-5", 6).unwrap(), vec![0, 2, 3, 4]);
        assert_eq!(parse_column_list("last,first", 4).unwrap(), vec![0, 3]);
        assert_eq!(parse_column_list("2,2", 4).unwrap(), vec![1]);
        assert!(parse_column_list("0", 4).is_err());
        assert!(parse_column_list("5-3", 9).is_err());
        assert!(parse_column_list("x", 4).is_err());
    }
}
