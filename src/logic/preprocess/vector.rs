//! Feature Vector - model input for a single record

use serde::Serialize;

use super::layout::FeatureSchema;

/// Values in schema order, tagged with the schema's layout hash
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    pub layout_hash: u32,
    pub values: Vec<f64>,
}

impl FeatureVector {
    pub fn new(schema: &FeatureSchema, values: Vec<f64>) -> Self {
        Self {
            layout_hash: schema.layout_hash(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn get_by_name(&self, schema: &FeatureSchema, name: &str) -> Option<f64> {
        schema.index_of(name).and_then(|i| self.get(i))
    }

    pub fn is_compatible(&self, schema: &FeatureSchema) -> bool {
        self.layout_hash == schema.layout_hash() && self.values.len() == schema.len()
    }
}
