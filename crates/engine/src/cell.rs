use std::fmt;

use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};

/// A scalar cell value.
///
/// Serialized untagged, so a grid row reads as plain JSON:
/// `{"name": "Alice", "age": 30}`. JSON has no NaN or infinity, so a
/// non-finite `Number` refuses to serialize rather than degrade to `null`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Text(String::new())
    }
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    /// A numeric cell, or `None` for NaN and infinities.
    pub fn number(n: f64) -> Option<Self> {
        n.is_finite().then_some(CellValue::Number(n))
    }

    /// False only for a NaN or infinite `Number`.
    pub fn is_storable(&self) -> bool {
        match self {
            CellValue::Number(n) => n.is_finite(),
            CellValue::Text(_) => true,
        }
    }

    /// Text form used for display and search.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            CellValue::Number(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.is_empty())
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Number(n) if n.is_finite() => serializer.serialize_f64(*n),
            CellValue::Number(n) => Err(S::Error::custom(format!("non-finite number {n}"))),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => f.write_str(&format_number(*n)),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_text_form() {
        assert_eq!(CellValue::from(30i64).to_text(), "30");
        assert_eq!(CellValue::from(1.5).to_text(), "1.5");
        assert_eq!(CellValue::from(-0.0).to_text(), "0");
        assert_eq!(CellValue::from(1e20).to_text(), "100000000000000000000");
    }

    #[test]
    fn test_untagged_json() {
        let values: Vec<CellValue> = serde_json::from_str(r#"["Alice", 30, 2.5]"#).unwrap();
        assert_eq!(
            values,
            vec![CellValue::text("Alice"), CellValue::Number(30.0), CellValue::Number(2.5)]
        );
        assert_eq!(serde_json::to_string(&CellValue::text("31")).unwrap(), r#""31""#);
    }

    #[test]
    fn test_non_finite_numbers() {
        assert_eq!(CellValue::number(2.5), Some(CellValue::Number(2.5)));
        assert_eq!(CellValue::number(f64::NAN), None);
        assert_eq!(CellValue::number(f64::NEG_INFINITY), None);
        assert!(!CellValue::Number(f64::INFINITY).is_storable());
        assert!(CellValue::text("NaN").is_storable());

        let err = serde_json::to_string(&CellValue::Number(f64::NAN)).unwrap_err();
        assert!(err.to_string().contains("non-finite"));
    }

    #[test]
    fn test_default_is_empty_text() {
        assert!(CellValue::default().is_empty());
        assert!(!CellValue::from(0i64).is_empty());
    }
}
