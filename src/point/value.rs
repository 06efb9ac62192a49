//! Values carried by remote points

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single remote point value
///
/// Enum-typed records are carried as strings (`"Yes"`, `"Enable"`), matching
/// how the server reports them when read as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointValue {
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<f64>),
}

impl PointValue {
    /// Loose equality used for readback convergence.
    ///
    /// Integers and floats compare numerically; strings and arrays compare exactly.
    pub fn matches(&self, other: &PointValue) -> bool {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => self == other,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PointValue::Int(v) => Some(*v as f64),
            PointValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer view; floats only qualify when they hold a whole number
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PointValue::Int(v) => Some(*v),
            PointValue::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PointValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// JSON form used in configuration readings; non-finite floats become null
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            PointValue::Int(v) => serde_json::Value::from(*v),
            PointValue::Float(v) => serde_json::Value::from(*v),
            PointValue::Str(s) => serde_json::Value::from(s.as_str()),
            PointValue::Array(values) => serde_json::Value::from(values.clone()),
        }
    }

    /// Shape of the value as reported in descriptions
    pub fn shape(&self) -> Vec<usize> {
        match self {
            PointValue::Array(values) => vec![values.len()],
            _ => Vec::new(),
        }
    }

    /// Short dtype label used in configuration descriptions
    pub fn dtype(&self) -> &'static str {
        match self {
            PointValue::Int(_) => "integer",
            PointValue::Float(_) => "number",
            PointValue::Str(_) => "string",
            PointValue::Array(_) => "array",
        }
    }
}

impl fmt::Display for PointValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointValue::Int(v) => write!(f, "{v}"),
            PointValue::Float(v) => write!(f, "{v}"),
            PointValue::Str(s) => write!(f, "{s}"),
            PointValue::Array(values) => write!(f, "{values:?}"),
        }
    }
}

impl From<i64> for PointValue {
    fn from(value: i64) -> Self {
        PointValue::Int(value)
    }
}

impl From<i32> for PointValue {
    fn from(value: i32) -> Self {
        PointValue::Int(value as i64)
    }
}

impl From<f64> for PointValue {
    fn from(value: f64) -> Self {
        PointValue::Float(value)
    }
}

impl From<&str> for PointValue {
    fn from(value: &str) -> Self {
        PointValue::Str(value.to_string())
    }
}

impl From<String> for PointValue {
    fn from(value: String) -> Self {
        PointValue::Str(value)
    }
}

impl From<Vec<f64>> for PointValue {
    fn from(values: Vec<f64>) -> Self {
        PointValue::Array(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_matching_crosses_int_and_float() {
        assert!(PointValue::Int(1).matches(&PointValue::Float(1.0)));
        assert!(!PointValue::Int(1).matches(&PointValue::Float(1.5)));
        assert!(PointValue::from("Yes").matches(&PointValue::from("Yes")));
        assert!(!PointValue::from("1").matches(&PointValue::Int(1)));
    }

    #[test]
    fn test_as_i64_rejects_fractional_floats() {
        assert_eq!(PointValue::Float(3.0).as_i64(), Some(3));
        assert_eq!(PointValue::Float(3.5).as_i64(), None);
        assert_eq!(PointValue::from("3").as_i64(), None);
    }

    #[test]
    fn test_untagged_deserialization_from_toml() {
        #[derive(Deserialize)]
        struct Seeds {
            a: PointValue,
            b: PointValue,
            c: PointValue,
            d: PointValue,
        }

        let seeds: Seeds = toml::from_str(
            r#"
            a = 4
            b = 0.5
            c = "NDPluginStats 1.9.1"
            d = [1.0, 2.0]
            "#,
        )
        .unwrap();

        assert_eq!(seeds.a, PointValue::Int(4));
        assert_eq!(seeds.b, PointValue::Float(0.5));
        assert_eq!(seeds.c, PointValue::from("NDPluginStats 1.9.1"));
        assert_eq!(seeds.d, PointValue::Array(vec![1.0, 2.0]));
    }

    #[test]
    fn test_json_form_and_shape() {
        assert_eq!(PointValue::Int(3).to_json(), serde_json::json!(3));
        assert_eq!(PointValue::Float(f64::NAN).to_json(), serde_json::Value::Null);
        assert_eq!(PointValue::from("Yes").to_json(), serde_json::json!("Yes"));
        assert_eq!(PointValue::Array(vec![1.0, 2.0]).shape(), vec![2]);
        assert!(PointValue::Int(3).shape().is_empty());
    }
}
