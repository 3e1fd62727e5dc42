//! Feature Layout - the frozen feature schema
//!
//! Built once by `fit` from the training columns, in dataset order.
//! Every feature vector carries the layout hash of the schema it was built
//! for, so a vector can never be fed to a classifier trained on another
//! layout.

use std::collections::BTreeMap;

use crc32fast::Hasher;
use serde::Serialize;

/// Bump when the vector construction rules change
pub const SCHEMA_VERSION: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Categorical,
    Numeric,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureSpec {
    pub name: String,
    pub kind: FeatureKind,
}

/// Ordered feature names used at training time
#[derive(Debug, Clone, Serialize)]
pub struct FeatureSchema {
    version: u8,
    layout_hash: u32,
    features: Vec<FeatureSpec>,
    #[serde(skip)]
    by_key: BTreeMap<String, usize>,
}

impl FeatureSchema {
    pub fn new(features: Vec<FeatureSpec>) -> Self {
        let by_key = features
            .iter()
            .enumerate()
            .map(|(i, f)| (canonical_key(&f.name), i))
            .collect();

        Self {
            version: SCHEMA_VERSION,
            layout_hash: compute_layout_hash(&features),
            features,
            by_key,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn layout_hash(&self) -> u32 {
        self.layout_hash
    }

    pub fn features(&self) -> &[FeatureSpec] {
        &self.features
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.name.as_str())
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.features.iter().position(|f| f.name == name)
    }

    /// Resolve any spelling of a field name to the training column name.
    ///
    /// `Academic Pressure`, `Academic_Pressure` and `academic-pressure` all
    /// resolve to whichever spelling the dataset used.
    pub fn resolve(&self, field: &str) -> Option<&str> {
        self.by_key
            .get(&canonical_key(field))
            .map(|&i| self.features[i].name.as_str())
    }
}

/// Lowercase ASCII alphanumerics only
pub fn canonical_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn compute_layout_hash(features: &[FeatureSpec]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[SCHEMA_VERSION]);

    for f in features {
        hasher.update(f.name.as_bytes());
        hasher.update(&[match f.kind {
            FeatureKind::Categorical => 1,
            FeatureKind::Numeric => 2,
        }]);
        hasher.update(&[0]);
    }

    hasher.finalize()
}
