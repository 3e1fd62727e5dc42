//! Static point tables
//!
//! Each rule awards points when a field holds one of its listed values.
//! Fields are matched by canonical key, so `Academic Pressure` and
//! `Academic_Pressure` hit the same rule.

use std::str::FromStr;

use serde::Serialize;

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PointRule {
    pub field: &'static str,
    pub values: &'static [&'static str],
    pub points: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScoringTable {
    pub name: &'static str,
    /// Sum of the best rule per field
    pub max_points: f64,
    pub rules: &'static [PointRule],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StaticPreset {
    Standard,
    Compact,
}

impl StaticPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaticPreset::Standard => "standard",
            StaticPreset::Compact => "compact",
        }
    }

    pub fn table(&self) -> &'static ScoringTable {
        match self {
            StaticPreset::Standard => &STANDARD,
            StaticPreset::Compact => &COMPACT,
        }
    }
}

impl FromStr for StaticPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(StaticPreset::Standard),
            "compact" => Ok(StaticPreset::Compact),
            other => Err(format!("unknown static preset '{}'", other)),
        }
    }
}

// ============================================================================
// TABLES
// ============================================================================

const SUICIDAL: &str = "Have you ever had suicidal thoughts ?";

pub static STANDARD: ScoringTable = ScoringTable {
    name: "standard",
    max_points: 100.0,
    rules: &[
        PointRule { field: SUICIDAL, values: &["Yes"], points: 25.0 },
        PointRule { field: "Academic Pressure", values: &["5"], points: 15.0 },
        PointRule { field: "Academic Pressure", values: &["4"], points: 10.0 },
        PointRule { field: "Financial Stress", values: &["5"], points: 12.0 },
        PointRule { field: "Financial Stress", values: &["4"], points: 8.0 },
        PointRule { field: "Sleep Duration", values: &["Less than 5 hours"], points: 12.0 },
        PointRule { field: "Sleep Duration", values: &["5-6 hours"], points: 5.0 },
        PointRule { field: "Family History of Mental Illness", values: &["Yes"], points: 8.0 },
        PointRule { field: "Study Satisfaction", values: &["1"], points: 8.0 },
        PointRule { field: "Study Satisfaction", values: &["2"], points: 5.0 },
        PointRule { field: "Dietary Habits", values: &["Unhealthy"], points: 6.0 },
        PointRule { field: "Work/Study Hours", values: &["10", "11", "12"], points: 6.0 },
        PointRule { field: "Work Pressure", values: &["4", "5"], points: 4.0 },
        PointRule { field: "Job Satisfaction", values: &["1", "2"], points: 4.0 },
    ],
};

pub static COMPACT: ScoringTable = ScoringTable {
    name: "compact",
    max_points: 30.0,
    rules: &[
        PointRule { field: SUICIDAL, values: &["Yes"], points: 8.0 },
        PointRule { field: "Academic Pressure", values: &["4", "5"], points: 5.0 },
        PointRule { field: "Financial Stress", values: &["4", "5"], points: 4.0 },
        PointRule { field: "Sleep Duration", values: &["Less than 5 hours"], points: 4.0 },
        PointRule { field: "Family History of Mental Illness", values: &["Yes"], points: 3.0 },
        PointRule { field: "Study Satisfaction", values: &["1", "2"], points: 2.0 },
        PointRule { field: "Dietary Habits", values: &["Unhealthy"], points: 2.0 },
        PointRule { field: "Work/Study Hours", values: &["10", "11", "12"], points: 2.0 },
    ],
};

impl ScoringTable {
    /// Best points available per field, in first-seen order
    pub fn field_maxima(&self) -> Vec<(&'static str, f64)> {
        let mut out: Vec<(&'static str, f64)> = Vec::new();
        for rule in self.rules {
            match out.iter_mut().find(|(f, _)| *f == rule.field) {
                Some((_, best)) => *best = best.max(rule.points),
                None => out.push((rule.field, rule.points)),
            }
        }
        out
    }
}
