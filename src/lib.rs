//! Crop Advisor
//!
//! Two prediction tools backed by pre-trained models loaded from disk:
//!
//! - `recommendation`: 7 soil/weather measurements -> best crop plus the top-3
//!   ranked class probabilities and a growing-condition note
//! - `production`: state/district/season/crop/area -> production estimate and
//!   yield per hectare
//! - `crop_info`: static growing-condition notes per crop
//! - `models`: classifier/regressor traits, model slots and forest artifacts
//!
//! With the `api` feature, `api_server` exposes both tools over HTTP.

pub mod config;
pub mod crop_info;
pub mod display;
pub mod error;
pub mod models;
pub mod production;
pub mod recommendation;

#[cfg(feature = "api")]
pub mod api_server;
#[cfg(feature = "api")]
pub mod web;

// Re-export commonly used types
pub use config::ServerConfig;
pub use error::WorkflowError;
pub use models::{Classifier, ModelSlot, Regressor};
pub use production::{predict_production, ProductionInput, ProductionResult, Season};
pub use recommendation::{recommend, RankedCandidate, RecommendationInput, RecommendationResult};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
