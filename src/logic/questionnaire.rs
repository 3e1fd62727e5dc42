//! Questionnaire schema
//!
//! Declares every field the service accepts: display name, aliases, value
//! kind, presentation synonyms and the answers known to indicate risk.
//! `sanitize` validates a JSON body against it; `Answers::remap` resolves the
//! result onto the fitted training columns.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use super::dataset::{Record, Value};
use super::preprocess::{canonical_key, FeatureSchema};

// ============================================================================
// SCHEMA
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Number { min: f64, max: f64 },
    Choice,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub kind: FieldKind,
    /// Presentation value → training value, matched case-insensitively
    #[serde(skip)]
    pub synonyms: &'static [(&'static str, &'static str)],
    pub high_risk: &'static [&'static str],
}

impl FieldSpec {
    fn matches(&self, key: &str) -> bool {
        canonical_key(self.name) == key || self.aliases.iter().any(|a| canonical_key(a) == key)
    }

    fn synonym(&self, raw: &str) -> Option<&'static str> {
        self.synonyms
            .iter()
            .find(|(from, _)| from.eq_ignore_ascii_case(raw))
            .map(|(_, to)| *to)
    }
}

const SCALE: FieldKind = FieldKind::Number { min: 0.0, max: 5.0 };

const LEVELS: &[(&str, &str)] = &[
    ("None", "1"),
    ("Low", "2"),
    ("Moderate", "3"),
    ("High", "4"),
    ("Extreme", "5"),
];

const SATISFACTION: &[(&str, &str)] = &[
    ("Very Unsatisfied", "1"),
    ("Unsatisfied", "2"),
    ("Neutral", "3"),
    ("Satisfied", "4"),
    ("Very Satisfied", "5"),
    ("Not Applicable", "0"),
];

const YES_NO: &[(&str, &str)] = &[
    ("yes", "Yes"),
    ("y", "Yes"),
    ("true", "Yes"),
    ("1", "Yes"),
    ("no", "No"),
    ("n", "No"),
    ("false", "No"),
    ("0", "No"),
];

pub static QUESTIONNAIRE: &[FieldSpec] = &[
    FieldSpec {
        name: "Gender",
        aliases: &["sex"],
        kind: FieldKind::Choice,
        synonyms: &[],
        high_risk: &[],
    },
    FieldSpec {
        name: "Age",
        aliases: &[],
        kind: FieldKind::Number { min: 0.0, max: 120.0 },
        synonyms: &[],
        high_risk: &[],
    },
    FieldSpec {
        name: "City",
        aliases: &[],
        kind: FieldKind::Choice,
        synonyms: &[],
        high_risk: &[],
    },
    FieldSpec {
        name: "Profession",
        aliases: &["occupation"],
        kind: FieldKind::Choice,
        synonyms: &[],
        high_risk: &[],
    },
    FieldSpec {
        name: "Academic Pressure",
        aliases: &[],
        kind: SCALE,
        synonyms: LEVELS,
        high_risk: &["4", "5"],
    },
    FieldSpec {
        name: "Work Pressure",
        aliases: &[],
        kind: SCALE,
        synonyms: LEVELS,
        high_risk: &["4", "5"],
    },
    FieldSpec {
        name: "CGPA",
        aliases: &["GPA"],
        kind: FieldKind::Number { min: 0.0, max: 10.0 },
        synonyms: &[],
        high_risk: &[],
    },
    FieldSpec {
        name: "Study Satisfaction",
        aliases: &[],
        kind: SCALE,
        synonyms: SATISFACTION,
        high_risk: &["1", "2"],
    },
    FieldSpec {
        name: "Job Satisfaction",
        aliases: &[],
        kind: SCALE,
        synonyms: SATISFACTION,
        high_risk: &["1", "2"],
    },
    FieldSpec {
        name: "Sleep Duration",
        aliases: &["sleep"],
        kind: FieldKind::Choice,
        synonyms: &[
            ("<5", "Less than 5 hours"),
            ("5-6", "5-6 hours"),
            ("6-7", "Others"),
            ("7-8", "7-8 hours"),
            (">8", "More than 8 hours"),
        ],
        high_risk: &["Less than 5 hours"],
    },
    FieldSpec {
        name: "Dietary Habits",
        aliases: &["diet"],
        kind: FieldKind::Choice,
        synonyms: &[("Average", "Moderate")],
        high_risk: &["Unhealthy"],
    },
    FieldSpec {
        name: "Degree",
        aliases: &[],
        kind: FieldKind::Choice,
        synonyms: &[("High School", "Class 12")],
        high_risk: &[],
    },
    FieldSpec {
        name: "Have you ever had suicidal thoughts ?",
        aliases: &["suicidal thoughts"],
        kind: FieldKind::Choice,
        synonyms: YES_NO,
        high_risk: &["Yes"],
    },
    FieldSpec {
        name: "Work/Study Hours",
        aliases: &["study hours", "work hours"],
        kind: FieldKind::Number { min: 0.0, max: 24.0 },
        synonyms: &[],
        high_risk: &["10", "11", "12"],
    },
    FieldSpec {
        name: "Financial Stress",
        aliases: &[],
        kind: SCALE,
        synonyms: LEVELS,
        high_risk: &["4", "5"],
    },
    FieldSpec {
        name: "Family History of Mental Illness",
        aliases: &["family history"],
        kind: FieldKind::Choice,
        synonyms: YES_NO,
        high_risk: &["Yes"],
    },
];

/// Look up a field by any spelling of its name or aliases
pub fn field(name: &str) -> Option<&'static FieldSpec> {
    let key = canonical_key(name);
    if key.is_empty() {
        return None;
    }
    QUESTIONNAIRE.iter().find(|f| f.matches(&key))
}

// ============================================================================
// SANITIZING
// ============================================================================

#[derive(Debug, Error, PartialEq)]
pub enum AnswerError {
    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("field '{field}' must be a string, number or boolean")]
    UnsupportedValue { field: String },

    #[error("field '{field}' value {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Validated answers keyed by questionnaire display name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Answers {
    values: BTreeMap<&'static str, Value>,
    #[serde(skip)]
    dropped: Vec<String>,
}

impl Answers {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Request fields that matched nothing in the questionnaire
    pub fn dropped(&self) -> &[String] {
        &self.dropped
    }

    /// Rekey onto the training column names of `schema`.
    ///
    /// Answers with no matching column are left out.
    pub fn remap(&self, schema: &FeatureSchema) -> Record {
        let mut record = Record::new();
        for (&name, value) in &self.values {
            let resolved = field(name).and_then(|spec| {
                std::iter::once(spec.name)
                    .chain(spec.aliases.iter().copied())
                    .find_map(|n| schema.resolve(n))
            });
            match resolved {
                Some(column) => {
                    record.insert(column.to_string(), value.clone());
                }
                None => tracing::debug!("'{}' has no training column", name),
            }
        }
        record
    }
}

/// Validate a request body against the questionnaire
pub fn sanitize(body: &serde_json::Value) -> Result<Answers, AnswerError> {
    let object = body.as_object().ok_or(AnswerError::NotAnObject)?;
    let mut answers = Answers::default();

    for (key, raw) in object {
        let Some(spec) = field(key) else {
            tracing::debug!("Dropping unrecognized field '{}'", key);
            answers.dropped.push(key.clone());
            continue;
        };

        let value = match (raw, spec.kind) {
            (serde_json::Value::Null, _) => continue,
            (serde_json::Value::Array(_) | serde_json::Value::Object(_), _) => {
                return Err(AnswerError::UnsupportedValue { field: key.clone() })
            }
            (serde_json::Value::Bool(b), FieldKind::Choice) => {
                Value::parse(if *b { "Yes" } else { "No" })
            }
            (serde_json::Value::Bool(_), FieldKind::Number { .. }) => {
                return Err(AnswerError::UnsupportedValue { field: key.clone() })
            }
            (serde_json::Value::Number(n), _) => match n.as_f64() {
                Some(x) => Value::Number(x),
                None => return Err(AnswerError::UnsupportedValue { field: key.clone() }),
            },
            (serde_json::Value::String(s), FieldKind::Choice) => Value::parse(&s.replace('_', " ")),
            (serde_json::Value::String(s), FieldKind::Number { .. }) => Value::parse(s),
        };

        let value = normalize(spec, value);
        if value.is_missing() {
            continue;
        }

        if let (FieldKind::Number { min, max }, Some(x)) = (spec.kind, value.as_number()) {
            if !(min..=max).contains(&x) {
                return Err(AnswerError::OutOfRange {
                    field: spec.name.to_string(),
                    value: x,
                    min,
                    max,
                });
            }
        }

        answers.values.insert(spec.name, value);
    }

    Ok(answers)
}

fn normalize(spec: &FieldSpec, value: Value) -> Value {
    match spec.synonym(&value.key()) {
        Some(mapped) => Value::parse(mapped),
        None => value,
    }
}
