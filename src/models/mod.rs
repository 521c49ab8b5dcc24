//! Model collaborators
//!
//! The workflows never reach for a global model. Each call receives a
//! [`ModelSlot`] holding either a loaded model behind one of the traits below
//! or the reason it could not be loaded.
//!
//! - `forest`: JSON random-forest artifacts implementing both traits
//! - `encoding`: categorical vocabularies used by the production regressor

pub mod encoding;
pub mod forest;

use crate::error::WorkflowError;
use crate::production::ProductionInput;
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

/// Number of soil/weather features fed to the classifier.
pub const N_FEATURES: usize = 7;

/// Ordered feature vector: N, P, K, temperature, humidity, ph, rainfall.
pub type FeatureVector = [f64; N_FEATURES];

/// Column names of [`FeatureVector`], in order.
pub const FEATURE_NAMES: [&str; N_FEATURES] =
    ["N", "P", "K", "temperature", "humidity", "ph", "rainfall"];

/// Multi-class classifier over the soil/weather feature vector.
pub trait Classifier: Send + Sync {
    /// Label set, in the order `predict_proba` reports probabilities.
    fn classes(&self) -> &[String];

    /// Single best label.
    fn predict(&self, features: &FeatureVector) -> Result<String>;

    /// Full distribution aligned with [`Classifier::classes`].
    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>>;
}

/// Regressor over the structured production record.
pub trait Regressor: Send + Sync {
    /// Production estimate in tonnes.
    fn predict(&self, record: &ProductionInput) -> Result<f64>;
}

/// A model that is either loaded or carries why it is not.
pub enum ModelSlot<M: ?Sized> {
    Ready(Arc<M>),
    Unavailable { reason: String },
}

impl<M: ?Sized> Clone for ModelSlot<M> {
    fn clone(&self) -> Self {
        match self {
            ModelSlot::Ready(model) => ModelSlot::Ready(Arc::clone(model)),
            ModelSlot::Unavailable { reason } => ModelSlot::Unavailable {
                reason: reason.clone(),
            },
        }
    }
}

impl<M: ?Sized> std::fmt::Debug for ModelSlot<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelSlot::Ready(_) => f.write_str("ModelSlot::Ready"),
            ModelSlot::Unavailable { reason } => {
                write!(f, "ModelSlot::Unavailable({})", reason)
            }
        }
    }
}

impl<M: ?Sized> ModelSlot<M> {
    pub fn ready(model: Arc<M>) -> Self {
        ModelSlot::Ready(model)
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        ModelSlot::Unavailable {
            reason: reason.into(),
        }
    }

    /// Load a model, degrading to `Unavailable` on any failure.
    ///
    /// The full error chain is logged so "file not found" and "corrupt
    /// artifact" stay distinguishable in the logs.
    pub fn load<F>(name: &str, path: &Path, loader: F) -> Self
    where
        F: FnOnce(&Path) -> Result<Arc<M>>,
    {
        match loader(path) {
            Ok(model) => {
                tracing::info!("Loaded {} model from {:?}", name, path);
                ModelSlot::Ready(model)
            }
            Err(e) => {
                tracing::warn!("{} model unavailable ({:?}): {:#}", name, path, e);
                ModelSlot::Unavailable {
                    reason: format!("{:#}", e),
                }
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ModelSlot::Ready(_))
    }

    /// The loaded model, or `ModelUnavailable`.
    pub fn get(&self) -> std::result::Result<&M, WorkflowError> {
        match self {
            ModelSlot::Ready(model) => Ok(model.as_ref()),
            ModelSlot::Unavailable { reason } => Err(WorkflowError::ModelUnavailable {
                reason: reason.clone(),
            }),
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            ModelSlot::Ready(_) => None,
            ModelSlot::Unavailable { reason } => Some(reason.as_str()),
        }
    }
}
