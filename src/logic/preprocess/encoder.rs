//! Categorical encoder

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::logic::dataset::Value;

/// Category → code mapping for one field.
///
/// Codes follow the sorted order of the category keys. Lookups fall back to an
/// ASCII case-insensitive match. Unseen categories map to the code of the
/// first learned category; missing values map to the most frequent category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoricalEncoder {
    classes: Vec<String>,
    mode_code: usize,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl CategoricalEncoder {
    /// Fit on cleaned (non-missing) values
    pub fn fit(values: &[Value]) -> Self {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for v in values {
            *counts.entry(v.key()).or_insert(0) += 1;
        }

        let classes: Vec<String> = counts.keys().cloned().collect();
        let index: HashMap<String, usize> = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();

        // Ties resolve to the smallest key: max_by_key keeps the last max, so scan reversed.
        let mode_code = counts
            .iter()
            .rev()
            .max_by_key(|(_, n)| **n)
            .and_then(|(k, _)| index.get(k).copied())
            .unwrap_or(0);

        Self { classes, mode_code, index }
    }

    pub fn encode(&self, value: &Value) -> Option<usize> {
        let key = value.key();
        self.index
            .get(&key)
            .copied()
            .or_else(|| self.classes.iter().position(|c| c.eq_ignore_ascii_case(&key)))
    }

    /// Learned spelling of `value`
    pub fn class_of(&self, value: &Value) -> Option<&str> {
        self.encode(value).and_then(|code| self.decode(code))
    }

    pub fn fallback_code(&self) -> usize {
        0
    }

    pub fn mode_code(&self) -> usize {
        self.mode_code
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(raw: &[&str]) -> Vec<Value> {
        raw.iter().map(|s| Value::parse(s)).collect()
    }

    #[test]
    fn test_codes_follow_sorted_keys() {
        let enc = CategoricalEncoder::fit(&values(&["No", "Yes", "No", "Yes", "Yes"]));

        assert_eq!(enc.classes(), &["No".to_string(), "Yes".to_string()]);
        assert_eq!(enc.encode(&Value::parse("No")), Some(0));
        assert_eq!(enc.encode(&Value::parse("Yes")), Some(1));
        assert_eq!(enc.mode_code(), 1);
        assert_eq!(enc.decode(1), Some("Yes"));
    }

    #[test]
    fn test_numeric_categories_share_keys() {
        let enc = CategoricalEncoder::fit(&values(&["1", "2", "5"]));
        assert_eq!(enc.encode(&Value::Number(5.0)), Some(2));
        assert_eq!(enc.encode(&Value::parse("5.0")), Some(2));
    }

    #[test]
    fn test_case_insensitive_match() {
        let enc = CategoricalEncoder::fit(&values(&["Student", "Architect", "Student"]));

        assert_eq!(enc.encode(&Value::parse("student")), enc.encode(&Value::parse("Student")));
        assert_eq!(enc.class_of(&Value::parse("ARCHITECT")), Some("Architect"));
        assert_eq!(enc.encode(&Value::parse("Teacher")), None);
    }

    #[test]
    fn test_exact_spelling_wins_over_case_match() {
        let enc = CategoricalEncoder::fit(&values(&["delhi", "Delhi"]));
        assert_eq!(enc.classes(), &["Delhi".to_string(), "delhi".to_string()]);
        assert_eq!(enc.encode(&Value::parse("delhi")), Some(1));
        assert_eq!(enc.encode(&Value::parse("DELHI")), Some(0));
    }

    #[test]
    fn test_unseen_and_mode_tie() {
        let enc = CategoricalEncoder::fit(&values(&["b", "a", "c"]));
        assert_eq!(enc.encode(&Value::parse("zzz")), None);
        assert_eq!(enc.fallback_code(), 0);
        // All counts equal: smallest key wins
        assert_eq!(enc.mode_code(), 0);
    }
}
