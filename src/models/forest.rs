//! Random-forest model artifacts
//!
//! Pre-trained forests are exported as JSON. Each tree is a nested structure of
//! `split` and `leaf` nodes; samples go left when `x[feature] <= threshold`.
//!
//! ```json
//! {
//!   "kind": "random_forest_classifier",
//!   "classes": ["maize", "rice"],
//!   "trees": [
//!     { "type": "split", "feature": 6, "threshold": 150.0,
//!       "left":  { "type": "leaf", "value": [9.0, 1.0] },
//!       "right": { "type": "leaf", "value": [0.0, 12.0] } }
//!   ]
//! }
//! ```
//!
//! Classifier leaves hold per-class sample counts (or fractions); regressor
//! leaves hold the mean target. Forest outputs are the average across trees,
//! evaluated in parallel with Rayon.

use crate::models::encoding::RecordEncoder;
use crate::models::{Classifier, FeatureVector, ModelSlot, Regressor, FEATURE_NAMES, N_FEATURES};
use crate::production::ProductionInput;
use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

// ============================================================================
// Tree Structure
// ============================================================================

/// A node in a decision tree, generic over the leaf payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode<L> {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode<L>>,
        right: Box<TreeNode<L>>,
    },
    Leaf {
        value: L,
    },
}

impl<L> TreeNode<L> {
    /// Walk from the root to the leaf this row falls into.
    pub fn evaluate(&self, row: &[f64]) -> &L {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { value } => return value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        left.as_ref()
                    } else {
                        right.as_ref()
                    };
                }
            }
        }
    }

    /// Leaves have depth 0.
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }

    fn validate<F>(&self, n_features: usize, check_leaf: &F) -> Result<()>
    where
        F: Fn(&L) -> Result<()>,
    {
        match self {
            TreeNode::Leaf { value } => check_leaf(value),
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if *feature >= n_features {
                    bail!(
                        "Split on feature {} but the model has {} features",
                        feature,
                        n_features
                    );
                }
                if !threshold.is_finite() {
                    bail!("Non-finite threshold on feature {}", feature);
                }
                left.validate(n_features, check_leaf)?;
                right.validate(n_features, check_leaf)
            }
        }
    }
}

// ============================================================================
// Artifact Format
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierArtifact {
    pub classes: Vec<String>,
    #[serde(default = "default_feature_names")]
    pub feature_names: Vec<String>,
    pub trees: Vec<TreeNode<Vec<f64>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressorArtifact {
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub categories: BTreeMap<String, Vec<String>>,
    pub trees: Vec<TreeNode<f64>>,
}

fn default_feature_names() -> Vec<String> {
    FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
}

/// Any forest artifact, discriminated by its `kind` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ForestArtifact {
    RandomForestClassifier(ClassifierArtifact),
    RandomForestRegressor(RegressorArtifact),
}

impl ForestArtifact {
    /// Read and parse an artifact file.
    ///
    /// Read and parse failures carry distinct context so callers can tell a
    /// missing file from a corrupt one.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read model file: {:?}", path))?;
        Self::from_json(&contents)
            .with_context(|| format!("Failed to parse model artifact: {:?}", path))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ForestArtifact::RandomForestClassifier(_) => "random_forest_classifier",
            ForestArtifact::RandomForestRegressor(_) => "random_forest_regressor",
        }
    }

    pub fn n_trees(&self) -> usize {
        match self {
            ForestArtifact::RandomForestClassifier(a) => a.trees.len(),
            ForestArtifact::RandomForestRegressor(a) => a.trees.len(),
        }
    }

    pub fn max_depth(&self) -> usize {
        match self {
            ForestArtifact::RandomForestClassifier(a) => {
                a.trees.iter().map(|t| t.depth()).max().unwrap_or(0)
            }
            ForestArtifact::RandomForestRegressor(a) => {
                a.trees.iter().map(|t| t.depth()).max().unwrap_or(0)
            }
        }
    }

    pub fn n_leaves(&self) -> usize {
        match self {
            ForestArtifact::RandomForestClassifier(a) => a.trees.iter().map(|t| t.n_leaves()).sum(),
            ForestArtifact::RandomForestRegressor(a) => a.trees.iter().map(|t| t.n_leaves()).sum(),
        }
    }
}

// ============================================================================
// Classifier
// ============================================================================

/// Random-forest classifier over the 7-feature soil/weather vector.
#[derive(Debug, Clone)]
pub struct ForestClassifier {
    classes: Vec<String>,
    trees: Vec<TreeNode<Vec<f64>>>,
}

impl ForestClassifier {
    pub fn from_path(path: &Path) -> Result<Self> {
        match ForestArtifact::from_path(path)? {
            ForestArtifact::RandomForestClassifier(artifact) => Self::from_artifact(artifact)
                .with_context(|| format!("Invalid classifier artifact: {:?}", path)),
            other => bail!(
                "Expected random_forest_classifier in {:?}, found {}",
                path,
                other.kind()
            ),
        }
    }

    pub fn from_artifact(artifact: ClassifierArtifact) -> Result<Self> {
        let ClassifierArtifact {
            classes,
            feature_names,
            trees,
        } = artifact;

        if classes.is_empty() {
            bail!("Classifier declares no classes");
        }
        let unique: HashSet<&String> = classes.iter().collect();
        if unique.len() != classes.len() {
            bail!("Classifier declares duplicate classes");
        }
        if feature_names != default_feature_names() {
            bail!(
                "Classifier expects features {:?}, artifact has {:?}",
                FEATURE_NAMES,
                feature_names
            );
        }
        if trees.is_empty() {
            bail!("Classifier has no trees");
        }

        let n_classes = classes.len();
        let check_leaf = |dist: &Vec<f64>| -> Result<()> {
            if dist.len() != n_classes {
                bail!(
                    "Leaf has {} class weights, expected {}",
                    dist.len(),
                    n_classes
                );
            }
            if dist.iter().any(|w| !w.is_finite() || *w < 0.0) {
                bail!("Leaf has negative or non-finite class weights");
            }
            if dist.iter().sum::<f64>() <= 0.0 {
                bail!("Leaf has zero total weight");
            }
            Ok(())
        };
        for (i, tree) in trees.iter().enumerate() {
            tree.validate(N_FEATURES, &check_leaf)
                .with_context(|| format!("Tree {} is malformed", i))?;
        }

        Ok(Self { classes, trees })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for ForestClassifier {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict(&self, features: &FeatureVector) -> Result<String> {
        let proba = self.predict_proba(features)?;

        // First maximum wins, matching argmax semantics
        let mut best = 0;
        for (i, p) in proba.iter().enumerate().skip(1) {
            if *p > proba[best] {
                best = i;
            }
        }

        Ok(self.classes[best].clone())
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        let n_classes = self.classes.len();

        let summed = self
            .trees
            .par_iter()
            .map(|tree| {
                let leaf = tree.evaluate(features);
                let total: f64 = leaf.iter().sum();
                leaf.iter().map(|w| w / total).collect::<Vec<f64>>()
            })
            .reduce(
                || vec![0.0; n_classes],
                |mut acc, dist| {
                    for (a, d) in acc.iter_mut().zip(dist) {
                        *a += d;
                    }
                    acc
                },
            );

        let n_trees = self.trees.len() as f64;
        Ok(summed.into_iter().map(|s| s / n_trees).collect())
    }
}

// ============================================================================
// Regressor
// ============================================================================

/// Random-forest regressor over the encoded production record.
#[derive(Debug, Clone)]
pub struct ForestRegressor {
    encoder: RecordEncoder,
    trees: Vec<TreeNode<f64>>,
}

impl ForestRegressor {
    pub fn from_path(path: &Path) -> Result<Self> {
        match ForestArtifact::from_path(path)? {
            ForestArtifact::RandomForestRegressor(artifact) => Self::from_artifact(artifact)
                .with_context(|| format!("Invalid regressor artifact: {:?}", path)),
            other => bail!(
                "Expected random_forest_regressor in {:?}, found {}",
                path,
                other.kind()
            ),
        }
    }

    pub fn from_artifact(artifact: RegressorArtifact) -> Result<Self> {
        let RegressorArtifact {
            feature_names,
            categories,
            trees,
        } = artifact;

        let encoder = RecordEncoder::new(feature_names, categories)?;
        if trees.is_empty() {
            bail!("Regressor has no trees");
        }

        let check_leaf = |value: &f64| -> Result<()> {
            if !value.is_finite() {
                bail!("Leaf has non-finite value");
            }
            Ok(())
        };
        for (i, tree) in trees.iter().enumerate() {
            tree.validate(encoder.n_features(), &check_leaf)
                .with_context(|| format!("Tree {} is malformed", i))?;
        }

        Ok(Self { encoder, trees })
    }

    pub fn encoder(&self) -> &RecordEncoder {
        &self.encoder
    }
}

impl Regressor for ForestRegressor {
    fn predict(&self, record: &ProductionInput) -> Result<f64> {
        let row = self.encoder.encode(record)?;

        let total: f64 = self
            .trees
            .par_iter()
            .map(|tree| *tree.evaluate(&row))
            .sum();

        Ok(total / self.trees.len() as f64)
    }
}

// ============================================================================
// Slot Loaders
// ============================================================================

/// Load the recommendation classifier, degrading to `Unavailable` on failure.
pub fn load_classifier_slot(path: &Path) -> ModelSlot<dyn Classifier> {
    ModelSlot::load("recommendation", path, |p| {
        let model: Arc<dyn Classifier> = Arc::new(ForestClassifier::from_path(p)?);
        Ok(model)
    })
}

/// Load the production regressor, degrading to `Unavailable` on failure.
pub fn load_regressor_slot(path: &Path) -> ModelSlot<dyn Regressor> {
    ModelSlot::load("production", path, |p| {
        let model: Arc<dyn Regressor> = Arc::new(ForestRegressor::from_path(p)?);
        Ok(model)
    })
}
