//! Cell values and records

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// A single field value: questionnaire answer or dataset cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    Missing,
}

/// One subject's answers, keyed by field name.
pub type Record = BTreeMap<String, Value>;

impl Value {
    /// Parse raw text. Finite numbers become `Number`, blank text is `Missing`.
    /// Surrounding single quotes (`'5-6 hours'`) are stripped.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let unquoted = trimmed
            .strip_prefix('\'')
            .and_then(|s| s.strip_suffix('\''))
            .unwrap_or(trimmed)
            .trim();

        if unquoted.is_empty() {
            return Value::Missing;
        }

        match unquoted.parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            _ => Value::Text(unquoted.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Canonical lookup key. `4`, `4.0` and `"4"` all map to `"4"`.
    pub fn key(&self) -> String {
        match self {
            Value::Number(n) => number_key(*n),
            Value::Text(s) => s.clone(),
            Value::Missing => String::new(),
        }
    }
}

fn number_key(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => write!(f, "<missing>"),
            other => write!(f, "{}", other.key()),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::parse(s)
    }
}
