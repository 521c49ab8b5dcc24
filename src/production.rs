//! Crop Production Workflow
//!
//! Runs the production regressor on a state/district/season/crop record and
//! derives yield per hectare from the tonnage estimate.

use crate::error::WorkflowError;
use crate::models::{ModelSlot, Regressor};
use serde::{Deserialize, Serialize};

/// Inclusive range of accepted crop years.
pub const YEAR_RANGE: (i32, i32) = (2000, 2050);

/// Growing season, as labelled in the production dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Season {
    #[default]
    Kharif,
    Rabi,
    #[serde(rename = "Whole Year")]
    WholeYear,
    Summer,
    Winter,
}

impl Season {
    pub const ALL: [Season; 5] = [
        Season::Kharif,
        Season::Rabi,
        Season::WholeYear,
        Season::Summer,
        Season::Winter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Kharif => "Kharif",
            Season::Rabi => "Rabi",
            Season::WholeYear => "Whole Year",
            Season::Summer => "Summer",
            Season::Winter => "Winter",
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One production query. Field aliases accept the dataset's column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionInput {
    #[serde(alias = "State_Name")]
    pub state: String,
    #[serde(alias = "District_Name")]
    pub district: String,
    #[serde(alias = "Crop_Year")]
    pub year: i32,
    #[serde(alias = "Season")]
    pub season: Season,
    #[serde(alias = "Crop")]
    pub crop: String,
    /// Cultivated area in hectares
    #[serde(alias = "Area")]
    pub area: f64,
}

impl Default for ProductionInput {
    fn default() -> Self {
        Self {
            state: String::new(),
            district: String::new(),
            year: 2023,
            season: Season::Kharif,
            crop: String::new(),
            area: 1.0,
        }
    }
}

/// A single column value of the record, as the regressor sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordValue<'a> {
    Text(&'a str),
    Number(f64),
}

impl ProductionInput {
    /// Column names in the order the dataset lists them.
    pub const COLUMNS: [&'static str; 6] = [
        "State_Name",
        "District_Name",
        "Crop_Year",
        "Season",
        "Crop",
        "Area",
    ];

    /// Look up a field by its dataset column name.
    pub fn column(&self, name: &str) -> Option<RecordValue<'_>> {
        match name {
            "State_Name" => Some(RecordValue::Text(&self.state)),
            "District_Name" => Some(RecordValue::Text(&self.district)),
            "Crop_Year" => Some(RecordValue::Number(self.year as f64)),
            "Season" => Some(RecordValue::Text(self.season.as_str())),
            "Crop" => Some(RecordValue::Text(&self.crop)),
            "Area" => Some(RecordValue::Number(self.area)),
            _ => None,
        }
    }

    /// Checks that must pass before the regressor is invoked.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if !self.area.is_finite() || self.area <= 0.0 {
            return Err(WorkflowError::InvalidInput(format!(
                "area must be a positive number of hectares, got {}",
                self.area
            )));
        }
        if self.year < YEAR_RANGE.0 || self.year > YEAR_RANGE.1 {
            return Err(WorkflowError::InvalidInput(format!(
                "crop year must be between {} and {}, got {}",
                YEAR_RANGE.0, YEAR_RANGE.1, self.year
            )));
        }
        Ok(())
    }
}

/// Regressor output plus the derived efficiency metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionResult {
    /// Estimated production in tonnes
    pub predicted_tonnage: f64,
    /// `predicted_tonnage / area`
    pub yield_per_hectare: f64,
}

/// Predict production for one record.
///
/// The regressor is never invoked when the slot is unavailable or the input
/// fails validation; area is checked before it is used as a divisor.
pub fn predict_production(
    input: &ProductionInput,
    model: &ModelSlot<dyn Regressor>,
) -> Result<ProductionResult, WorkflowError> {
    let regressor = model.get()?;
    input.validate()?;

    let estimate = regressor
        .predict(input)
        .map_err(WorkflowError::prediction_failed)?;

    if !estimate.is_finite() {
        return Err(WorkflowError::PredictionFailed {
            cause: format!("model returned a non-finite estimate ({})", estimate),
        });
    }

    tracing::debug!(
        "Production estimate for {} in {}/{} ({}, {}): {:.3} t over {} ha",
        input.crop,
        input.state,
        input.district,
        input.season,
        input.year,
        estimate,
        input.area
    );

    let yield_per_hectare = estimate / input.area;
    if !yield_per_hectare.is_finite() {
        return Err(WorkflowError::InvalidInput(format!(
            "area of {} hectares is too small to compute a yield",
            input.area
        )));
    }

    Ok(ProductionResult {
        predicted_tonnage: estimate,
        yield_per_hectare,
    })
}
