//! Server configuration from environment variables
//!
//! - `RECOMMENDATION_MODEL_PATH`: crop classifier artifact
//! - `PRODUCTION_MODEL_PATH`: production regressor artifact
//! - `PORT`: listen port (default 3000)

use std::path::PathBuf;

pub const DEFAULT_RECOMMENDATION_MODEL: &str = "models/crop_recommendation_rf_model.json";
pub const DEFAULT_PRODUCTION_MODEL: &str = "models/crop_production_rf_model.json";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub recommendation_model_path: PathBuf,
    pub production_model_path: PathBuf,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            recommendation_model_path: PathBuf::from(DEFAULT_RECOMMENDATION_MODEL),
            production_model_path: PathBuf::from(DEFAULT_PRODUCTION_MODEL),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unset or unparsable values
    /// fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let recommendation_model_path = lookup("RECOMMENDATION_MODEL_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.recommendation_model_path);

        let production_model_path = lookup("PRODUCTION_MODEL_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.production_model_path);

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!("Ignoring invalid PORT '{}', using {}", raw, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        Self {
            recommendation_model_path,
            production_model_path,
            port,
        }
    }
}
