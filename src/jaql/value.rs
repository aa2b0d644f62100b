//! Scalar values carried by JAQL filters.

use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;

/// A scalar filter operand.
///
/// Numbers keep their JSON representation so that an integer written as
/// `10` is emitted back as `10`, not `10.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JaqlValue {
    Bool(bool),
    Number(Number),
    Text(String),
}

impl JaqlValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            JaqlValue::Number(n) => n.as_f64(),
            JaqlValue::Text(s) => s.trim().parse().ok(),
            JaqlValue::Bool(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            JaqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// True for the empty string, which JAQL uses to mean "no value".
    pub fn is_empty_text(&self) -> bool {
        matches!(self, JaqlValue::Text(s) if s.is_empty())
    }
}

impl fmt::Display for JaqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JaqlValue::Bool(b) => write!(f, "{}", b),
            JaqlValue::Number(n) => write!(f, "{}", n),
            JaqlValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i32> for JaqlValue {
    fn from(v: i32) -> Self {
        JaqlValue::Number(Number::from(v))
    }
}

impl From<i64> for JaqlValue {
    fn from(v: i64) -> Self {
        JaqlValue::Number(Number::from(v))
    }
}

impl From<u64> for JaqlValue {
    fn from(v: u64) -> Self {
        JaqlValue::Number(Number::from(v))
    }
}

impl From<f64> for JaqlValue {
    fn from(v: f64) -> Self {
        // NaN and infinities have no JSON form
        match Number::from_f64(v) {
            Some(n) => JaqlValue::Number(n),
            None => JaqlValue::Text(v.to_string()),
        }
    }
}

impl From<&str> for JaqlValue {
    fn from(v: &str) -> Self {
        JaqlValue::Text(v.to_string())
    }
}

impl From<String> for JaqlValue {
    fn from(v: String) -> Self {
        JaqlValue::Text(v)
    }
}

impl From<bool> for JaqlValue {
    fn from(v: bool) -> Self {
        JaqlValue::Bool(v)
    }
}
