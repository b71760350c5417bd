use std::fmt;

use anyhow::{anyhow, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A single table cell. Uploaded files carry arbitrary schemas, so every cell
/// is independently typed at load time and `Null` stands in for blanks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Value {
    Null,
    Str(String),
    Int(i64),
    Float(f64),
}

impl Value {
    /// Types a raw text cell: integer first, then float, else string.
    /// Empty or whitespace-only input becomes `Null`.
    pub fn from_raw(raw: &str) -> Value {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return Value::Float(f);
        }
        Value::Str(raw.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Lenient numeric coercion: strings are parsed, `Null` yields `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Null => None,
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Str(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// Coerces to an integer year. Floats truncate; strings may parse in
    /// either integer or float form ("2022.0").
    pub fn as_year(&self) -> Option<i64> {
        match self {
            Value::Null => None,
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.is_finite() => Some(*f as i64),
            Value::Float(_) => None,
            Value::Str(s) => {
                let trimmed = s.trim();
                trimmed
                    .parse::<i64>()
                    .ok()
                    .or_else(|| trimmed.parse::<f64>().ok().map(|f| f as i64))
            }
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Str(s) => s.clone(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => {
                if f.fract() == 0.0 {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

pub fn parse_naive_date(value: &str) -> Result<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as date"))
}

pub fn parse_naive_datetime(value: &str) -> Result<NaiveDateTime> {
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as datetime"))
}

/// Extracts the calendar year from a date or datetime cell, if it is one.
pub fn year_of(value: &Value) -> Option<i64> {
    let Value::Str(s) = value else { return None };
    let trimmed = s.trim();
    if let Ok(date) = parse_naive_date(trimmed) {
        return Some(i64::from(date.year()));
    }
    if let Ok(datetime) = parse_naive_datetime(trimmed) {
        return Some(i64::from(datetime.year()));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_types_cells_in_order() {
        assert_eq!(Value::from_raw("42"), Value::Int(42));
        assert_eq!(Value::from_raw("42.5"), Value::Float(42.5));
        assert_eq!(Value::from_raw("Wakad"), Value::Str("Wakad".to_string()));
        assert_eq!(Value::from_raw(""), Value::Null);
        assert_eq!(Value::from_raw("   "), Value::Null);
    }

    #[test]
    fn as_f64_parses_numeric_strings() {
        assert_eq!(Value::Str(" 8500 ".to_string()).as_f64(), Some(8500.0));
        assert_eq!(Value::Int(7).as_f64(), Some(7.0));
        assert_eq!(Value::Null.as_f64(), None);
        assert_eq!(Value::Str("n/a".to_string()).as_f64(), None);
    }

    #[test]
    fn as_year_truncates_float_forms() {
        assert_eq!(Value::Float(2022.0).as_year(), Some(2022));
        assert_eq!(Value::Str("2022.0".to_string()).as_year(), Some(2022));
        assert_eq!(Value::Str("2022".to_string()).as_year(), Some(2022));
        assert_eq!(Value::Str("soon".to_string()).as_year(), None);
    }

    #[test]
    fn parse_naive_date_supports_multiple_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        assert_eq!(parse_naive_date("2024-05-06").unwrap(), expected);
        assert_eq!(parse_naive_date("06/05/2024").unwrap(), expected);
        assert_eq!(parse_naive_date("2024/05/06").unwrap(), expected);
    }

    #[test]
    fn year_of_reads_dates_and_datetimes() {
        assert_eq!(year_of(&Value::Str("2021-03-01".to_string())), Some(2021));
        assert_eq!(
            year_of(&Value::Str("2021-03-01T10:30:00".to_string())),
            Some(2021)
        );
        assert_eq!(year_of(&Value::Int(2021)), None);
    }

    #[test]
    fn null_serializes_as_json_null() {
        assert_eq!(serde_json::to_string(&Value::Null).unwrap(), "null");
        assert_eq!(serde_json::to_string(&Value::Int(3)).unwrap(), "3");
    }
}
