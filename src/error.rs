//! Workflow error taxonomy
//!
//! Both workflows recover model failures at their boundary and surface them as
//! one of these variants. None of them is fatal to the server.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WorkflowError {
    /// The model artifact failed to load at startup. `reason` carries the
    /// underlying cause for logs and status endpoints.
    #[error("model unavailable: {reason}")]
    ModelUnavailable { reason: String },

    /// The model raised at request time (unseen category, malformed record,
    /// invalid output).
    #[error("prediction failed: {cause}")]
    PredictionFailed { cause: String },

    /// Input rejected before the model was invoked.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl WorkflowError {
    /// Wrap a model-side failure, keeping the full context chain.
    pub fn prediction_failed(err: anyhow::Error) -> Self {
        WorkflowError::PredictionFailed {
            cause: format!("{:#}", err),
        }
    }

    /// Stable identifier used in API payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkflowError::ModelUnavailable { .. } => "model_unavailable",
            WorkflowError::PredictionFailed { .. } => "prediction_failed",
            WorkflowError::InvalidInput(_) => "invalid_input",
        }
    }

    /// Message shown to the user. Load failures stay generic here; the cause
    /// goes to the logs.
    pub fn user_message(&self) -> String {
        match self {
            WorkflowError::ModelUnavailable { .. } => {
                "Cannot make prediction without model. Please check model path.".to_string()
            }
            WorkflowError::PredictionFailed { cause } => format!("Prediction failed: {}", cause),
            WorkflowError::InvalidInput(msg) => format!("Invalid input: {}", msg),
        }
    }
}
