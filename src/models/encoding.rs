//! Record encoding for the production regressor
//!
//! Turns a [`ProductionInput`] into the numeric row the forest was trained on.
//! Categorical columns map to their ordinal index in the vocabulary shipped
//! with the artifact; values never seen during training are an error.

use crate::production::{ProductionInput, RecordValue};
use anyhow::{bail, Context, Result};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

/// Column layout and category vocabularies of a regressor artifact.
#[derive(Debug, Clone)]
pub struct RecordEncoder {
    feature_names: Vec<String>,
    vocabularies: FxHashMap<String, FxHashMap<String, usize>>,
}

impl RecordEncoder {
    /// Build from the artifact's `feature_names` and `categories` sections.
    ///
    /// Every feature column must be one of [`ProductionInput::COLUMNS`].
    pub fn new(
        feature_names: Vec<String>,
        categories: BTreeMap<String, Vec<String>>,
    ) -> Result<Self> {
        if feature_names.is_empty() {
            bail!("Regressor artifact declares no feature columns");
        }
        for name in &feature_names {
            if !ProductionInput::COLUMNS.contains(&name.as_str()) {
                bail!(
                    "Feature column '{}' is not a production record column (expected one of {:?})",
                    name,
                    ProductionInput::COLUMNS
                );
            }
        }

        let mut vocabularies = FxHashMap::default();
        for (column, values) in categories {
            if !feature_names.contains(&column) {
                bail!("Category vocabulary for unknown column '{}'", column);
            }
            let mut index = FxHashMap::default();
            for (i, value) in values.into_iter().enumerate() {
                if index.insert(value.clone(), i).is_some() {
                    bail!("Duplicate category '{}' in column '{}'", value, column);
                }
            }
            vocabularies.insert(column, index);
        }

        Ok(Self {
            feature_names,
            vocabularies,
        })
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Number of known categories for a column (None for numeric columns).
    pub fn n_categories(&self, column: &str) -> Option<usize> {
        self.vocabularies.get(column).map(|v| v.len())
    }

    /// Encode one record into the artifact's column order.
    pub fn encode(&self, record: &ProductionInput) -> Result<Vec<f64>> {
        self.feature_names
            .iter()
            .map(|name| {
                let value = record
                    .column(name)
                    .with_context(|| format!("Record has no column '{}'", name))?;
                self.encode_value(name, value)
                    .with_context(|| format!("Failed to encode column '{}'", name))
            })
            .collect()
    }

    fn encode_value(&self, column: &str, value: RecordValue<'_>) -> Result<f64> {
        match (value, self.vocabularies.get(column)) {
            (RecordValue::Text(text), Some(vocab)) => {
                let text = text.trim();
                match vocab.get(text) {
                    Some(&idx) => Ok(idx as f64),
                    None => bail!("unseen category '{}'", text),
                }
            }
            (RecordValue::Text(text), None) => {
                bail!("no category vocabulary for text value '{}'", text)
            }
            (RecordValue::Number(x), None) => Ok(x),
            (RecordValue::Number(x), Some(vocab)) => {
                // Integer columns (e.g. Crop_Year) may be stored categorically
                let key = format!("{}", x);
                match vocab.get(&key) {
                    Some(&idx) => Ok(idx as f64),
                    None => bail!("unseen category '{}'", key),
                }
            }
        }
    }
}
