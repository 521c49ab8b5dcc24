//! Presentation helpers shared by the HTML pages and the JSON API.

use crate::production::ProductionResult;
use crate::recommendation::RecommendationResult;
use serde::Serialize;

/// Production (in tonnes) that fills the production progress bar.
pub const PRODUCTION_SCALE_TONNES: f64 = 100.0;

/// "0.7" -> "70.00%"
pub fn format_percent(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

pub fn format_tonnes(tonnes: f64) -> String {
    format!("{:.2}", tonnes)
}

/// Clamp a ratio into the [0, 1] range a progress bar accepts.
pub fn progress_ratio(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// `min(estimate / 100, 1)`, floored at zero. Display scaling only.
pub fn production_scale(predicted_tonnage: f64) -> f64 {
    progress_ratio(predicted_tonnage / PRODUCTION_SCALE_TONNES)
}

pub fn production_analysis(yield_per_hectare: f64, crop: &str) -> String {
    format!(
        "Your predicted yield of {} tonnes/hectare for {} can be compared with typical yields for this crop in your region.",
        format_tonnes(yield_per_hectare),
        crop
    )
}

/// Progress bar width as a whole percentage, for CSS.
fn bar_width(ratio: f64) -> u32 {
    (progress_ratio(ratio) * 100.0).round() as u32
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateView {
    pub label: String,
    pub percent: String,
    pub bar_width: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationView {
    pub headline: String,
    pub candidates: Vec<CandidateView>,
    pub info: String,
}

impl From<&RecommendationResult> for RecommendationView {
    fn from(result: &RecommendationResult) -> Self {
        Self {
            headline: result.predicted_label.to_uppercase(),
            candidates: result
                .ranked_candidates
                .iter()
                .map(|c| CandidateView {
                    label: c.label.to_uppercase(),
                    percent: format_percent(c.probability),
                    bar_width: bar_width(c.probability),
                })
                .collect(),
            info: result.info.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductionView {
    pub tonnage: String,
    pub yield_per_hectare: String,
    pub scale: f64,
    pub bar_width: u32,
    pub analysis: String,
}

impl ProductionView {
    pub fn new(result: &ProductionResult, crop: &str) -> Self {
        let scale = production_scale(result.predicted_tonnage);
        Self {
            tonnage: format_tonnes(result.predicted_tonnage),
            yield_per_hectare: format_tonnes(result.yield_per_hectare),
            scale,
            bar_width: bar_width(scale),
            analysis: production_analysis(result.yield_per_hectare, crop),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommendation::RankedCandidate;
    use approx::assert_relative_eq;

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.7), "70.00%");
        assert_eq!(format_percent(0.1234), "12.34%");
        assert_eq!(format_percent(0.0), "0.00%");
    }

    #[test]
    fn test_production_scale_is_bounded() {
        assert_relative_eq!(production_scale(10.0), 0.1);
        assert_relative_eq!(production_scale(100.0), 1.0);
        assert_relative_eq!(production_scale(2500.0), 1.0);
        assert_relative_eq!(production_scale(-5.0), 0.0);
        assert_relative_eq!(production_scale(f64::NAN), 0.0);
    }

    #[test]
    fn test_recommendation_view() {
        let result = RecommendationResult {
            predicted_label: "kidney beans".to_string(),
            ranked_candidates: vec![
                RankedCandidate {
                    label: "kidney beans".to_string(),
                    probability: 0.66,
                },
                RankedCandidate {
                    label: "mungbean".to_string(),
                    probability: 0.34,
                },
            ],
            info: "x",
        };
        let view = RecommendationView::from(&result);
        assert_eq!(view.headline, "KIDNEY BEANS");
        assert_eq!(view.candidates[0].percent, "66.00%");
        assert_eq!(view.candidates[0].bar_width, 66);
        assert_eq!(view.candidates[1].label, "MUNGBEAN");
    }

    #[test]
    fn test_production_view() {
        let result = ProductionResult {
            predicted_tonnage: 10.0,
            yield_per_hectare: 5.0,
        };
        let view = ProductionView::new(&result, "Wheat");
        assert_eq!(view.tonnage, "10.00");
        assert_eq!(view.yield_per_hectare, "5.00");
        assert_eq!(view.bar_width, 10);
        assert_eq!(
            view.analysis,
            "Your predicted yield of 5.00 tonnes/hectare for Wheat can be compared with typical yields for this crop in your region."
        );
    }
}
