//! Date attributes: pattern translation, parsing and formatting.
//!
//! Date formats are written with the pattern letters used by ARFF headers
//! (`yyyy-MM-dd'T'HH:mm:ss`) and translated to chrono format strings. Values
//! are stored as UTC epoch milliseconds.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Translate an ARFF date pattern into a chrono format string.
pub fn to_chrono_format(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            // '' is a literal quote, otherwise a quoted literal run.
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            while i < chars.len() {
                if chars[i] == '\'' {
                    if chars.get(i + 1) == Some(&'\'') {
                        out.push('\'');
                        i += 2;
                        continue;
                    }
                    break;
                }
                push_literal(&mut out, chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }

        if !c.is_ascii_alphabetic() {
            push_literal(&mut out, c);
            i += 1;
            continue;
        }

        let mut run = 1;
        while chars.get(i + run) == Some(&c) {
            run += 1;
        }
        let token = match (c, run) {
            ('y', 2) => "%y",
            ('y', _) => "%Y",
            ('M', 1) => "%-m",
            ('M', 2) => "%m",
            ('M', 3) => "%b",
            ('M', _) => "%B",
            ('d', 1) => "%-d",
            ('d', _) => "%d",
            ('H', 1) => "%-H",
            ('H', _) => "%H",
            ('h', 1) => "%-I",
            ('h', _) => "%I",
            ('m', 1) => "%-M",
            ('m', _) => "%M",
            ('s', 1) => "%-S",
            ('s', _) => "%S",
            ('S', _) => "%3f",
            ('a', _) => "%p",
            ('E', 1..=3) => "%a",
            ('E', _) => "%A",
            ('Z', _) => "%z",
            ('z', _) => "%Z",
            _ => "",
        };
        if token.is_empty() {
            for _ in 0..run {
                push_literal(&mut out, c);
            }
        } else {
            out.push_str(token);
        }
        i += run;
    }

    out
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

/// Parse `text` with an ARFF date pattern into epoch milliseconds.
///
/// Patterns without a time of day parse as midnight UTC.
pub fn parse_date(text: &str, pattern: &str) -> Option<f64> {
    let format = to_chrono_format(pattern);
    let text = text.trim();
    let naive = NaiveDateTime::parse_from_str(text, &format)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, &format)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    Some(naive.and_utc().timestamp_millis() as f64)
}

/// Format epoch milliseconds with an ARFF date pattern.
pub fn format_date(millis: f64, pattern: &str) -> Option<String> {
    let datetime = DateTime::from_timestamp_millis(millis as i64)?;
    Some(datetime.naive_utc().format(&to_chrono_format(pattern)).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_DATE_FORMAT;

    #[test]
    fn test_pattern_translation() {
        assert_eq!(to_chrono_format(DEFAULT_DATE_FORMAT), "%Y-%m-%dT%H:%M:%S");
        assert_eq!(to_chrono_format("dd/MM/yy HH:mm:ss.SSS"), "%d/%m/%y %H:%M:%S.%3f");
        assert_eq!(to_chrono_format("yyyy 'o''clock' 100%"), "%Y o'clock 100%%");
    }

    #[test]
    fn test_parse_default_format() {
        let millis = parse_date("2020-01-02T03:04:05", DEFAULT_DATE_FORMAT).unwrap();
        assert_eq!(millis, 1_577_934_245_000.0);
        assert_eq!(
            format_date(millis, DEFAULT_DATE_FORMAT).as_deref(),
            Some("2020-01-02T03:04:05")
        );
    }

    #[test]
    fn test_date_only_pattern() {
        let millis = parse_date("1970-01-02", "yyyy-MM-dd").unwrap();
        assert_eq!(millis, 86_400_000.0);
        assert_eq!(format_date(millis, "yyyy-MM-dd").as_deref(), Some("1970-01-02"));
    }

    #[test]
    fn test_unparseable_date() {
        assert!(parse_date("yesterday", DEFAULT_DATE_FORMAT).is_none());
    }
}
