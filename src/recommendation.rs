//! Crop Recommendation Workflow
//!
//! Runs the crop classifier on seven soil/weather measurements, ranks the
//! class probabilities and attaches the growing-condition note for the best
//! crop.

use crate::crop_info;
use crate::error::WorkflowError;
use crate::models::{Classifier, FeatureVector, ModelSlot};
use serde::{Deserialize, Serialize};

/// Number of ranked candidates surfaced to the user.
pub const TOP_K: usize = 3;

/// Tolerance on the sum of the model's probability distribution.
const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

/// Soft range and default of one input field, used by the form widgets.
#[derive(Debug, Clone, Copy)]
pub struct FieldBounds {
    pub name: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub help: &'static str,
}

/// Widget bounds, in feature-vector order.
pub static FIELD_BOUNDS: [FieldBounds; 7] = [
    FieldBounds {
        name: "nitrogen",
        label: "Nitrogen (N)",
        min: 0.0,
        max: 140.0,
        default: 50.0,
        help: "Amount of nitrogen in the soil (mg/kg)",
    },
    FieldBounds {
        name: "phosphorus",
        label: "Phosphorus (P)",
        min: 0.0,
        max: 145.0,
        default: 50.0,
        help: "Amount of phosphorus in the soil (mg/kg)",
    },
    FieldBounds {
        name: "potassium",
        label: "Potassium (K)",
        min: 0.0,
        max: 205.0,
        default: 50.0,
        help: "Amount of potassium in the soil (mg/kg)",
    },
    FieldBounds {
        name: "temperature",
        label: "Temperature (°C)",
        min: 10.0,
        max: 50.0,
        default: 25.0,
        help: "Average temperature in Celsius",
    },
    FieldBounds {
        name: "humidity",
        label: "Humidity (%)",
        min: 10.0,
        max: 100.0,
        default: 60.0,
        help: "Relative humidity percentage",
    },
    FieldBounds {
        name: "ph",
        label: "pH Level",
        min: 3.0,
        max: 10.0,
        default: 6.5,
        help: "pH level of the soil",
    },
    FieldBounds {
        name: "rainfall",
        label: "Rainfall (mm)",
        min: 0.0,
        max: 300.0,
        default: 100.0,
        help: "Annual rainfall in millimeters",
    },
];

/// Soil nutrient and climate measurements for one field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecommendationInput {
    #[serde(alias = "N")]
    pub nitrogen: f64,
    #[serde(alias = "P")]
    pub phosphorus: f64,
    #[serde(alias = "K")]
    pub potassium: f64,
    pub ph: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub rainfall: f64,
}

impl Default for RecommendationInput {
    fn default() -> Self {
        Self {
            nitrogen: 50.0,
            phosphorus: 50.0,
            potassium: 50.0,
            ph: 6.5,
            temperature: 25.0,
            humidity: 60.0,
            rainfall: 100.0,
        }
    }
}

impl RecommendationInput {
    /// Feature vector in model order: N, P, K, temperature, humidity, ph, rainfall.
    pub fn feature_vector(&self) -> FeatureVector {
        [
            self.nitrogen,
            self.phosphorus,
            self.potassium,
            self.temperature,
            self.humidity,
            self.ph,
            self.rainfall,
        ]
    }

    /// Names of fields outside their widget range. Informational only.
    pub fn out_of_range_fields(&self) -> Vec<&'static str> {
        FIELD_BOUNDS
            .iter()
            .zip(self.feature_vector())
            .filter(|(bounds, value)| *value < bounds.min || *value > bounds.max)
            .map(|(bounds, _)| bounds.name)
            .collect()
    }

    fn validate(&self) -> Result<(), WorkflowError> {
        for (bounds, value) in FIELD_BOUNDS.iter().zip(self.feature_vector()) {
            if !value.is_finite() {
                return Err(WorkflowError::InvalidInput(format!(
                    "{} must be a finite number",
                    bounds.name
                )));
            }
        }
        Ok(())
    }
}

/// One (label, probability) pair in the ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    pub label: String,
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResult {
    pub predicted_label: String,
    /// At most [`TOP_K`] entries, non-increasing by probability
    pub ranked_candidates: Vec<RankedCandidate>,
    /// Growing-condition note for `predicted_label`
    pub info: &'static str,
}

/// Sort labels by probability (descending) and keep the first `k`.
///
/// The sort is stable, so equal probabilities keep the model's label order.
pub fn rank_candidates(
    classes: &[String],
    probabilities: &[f64],
    k: usize,
) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = classes
        .iter()
        .zip(probabilities)
        .map(|(label, &probability)| RankedCandidate {
            label: label.clone(),
            probability,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.probability
            .partial_cmp(&a.probability)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(k);
    ranked
}

fn check_distribution(classes: &[String], probabilities: &[f64]) -> anyhow::Result<()> {
    if probabilities.len() != classes.len() {
        anyhow::bail!(
            "model returned {} probabilities for {} classes",
            probabilities.len(),
            classes.len()
        );
    }
    if let Some(p) = probabilities
        .iter()
        .find(|p| !p.is_finite() || **p < 0.0 || **p > 1.0)
    {
        anyhow::bail!("model returned probability {} outside [0, 1]", p);
    }
    let total: f64 = probabilities.iter().sum();
    if (total - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
        anyhow::bail!("model probabilities sum to {} instead of 1", total);
    }
    Ok(())
}

/// Recommend a crop for one set of measurements.
///
/// The classifier is never invoked when the slot is unavailable.
pub fn recommend(
    input: &RecommendationInput,
    model: &ModelSlot<dyn Classifier>,
) -> Result<RecommendationResult, WorkflowError> {
    let classifier = model.get()?;
    input.validate()?;

    let out_of_range = input.out_of_range_fields();
    if !out_of_range.is_empty() {
        tracing::debug!("Recommendation input outside widget ranges: {:?}", out_of_range);
    }

    let features = input.feature_vector();
    let predicted_label = classifier
        .predict(&features)
        .map_err(WorkflowError::prediction_failed)?;
    let probabilities = classifier
        .predict_proba(&features)
        .map_err(WorkflowError::prediction_failed)?;

    let classes = classifier.classes();
    check_distribution(classes, &probabilities).map_err(WorkflowError::prediction_failed)?;

    let ranked_candidates = rank_candidates(classes, &probabilities, TOP_K);

    tracing::debug!(
        "Recommended {} (top candidates: {:?})",
        predicted_label,
        ranked_candidates
            .iter()
            .map(|c| (c.label.as_str(), c.probability))
            .collect::<Vec<_>>()
    );

    let info = crop_info::lookup(&predicted_label);

    Ok(RecommendationResult {
        predicted_label,
        ranked_candidates,
        info,
    })
}
