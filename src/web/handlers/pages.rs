// Page handlers for HTML rendering with Askama

use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::response::{Html, IntoResponse};
use askama::Template;

use crate::api_server::{AppError, AppState};
use crate::display::{ProductionView, RecommendationView};
use crate::models::ModelSlot;
use crate::production::{ProductionInput, Season, YEAR_RANGE};
use crate::recommendation::{RecommendationInput, FIELD_BOUNDS};

const MODEL_MISSING_WARNING: &str =
    "Model file not found. Please ensure the path is correct or upload your model file.";

fn model_warning<M: ?Sized>(slot: &ModelSlot<M>) -> Option<String> {
    if slot.is_ready() {
        None
    } else {
        Some(MODEL_MISSING_WARNING.to_string())
    }
}

fn render<T: Template>(template: T) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        format!("Template error: {}", e)
    }))
}

/// Workflow failures are shown inline on the page; anything else is a server error.
fn inline_error(err: AppError) -> Result<String, AppError> {
    match err {
        AppError::Workflow(e) => Ok(e.user_message()),
        other => Err(other),
    }
}

/// A form that failed to parse is re-rendered with defaults and the reason.
fn form_error(rejection: FormRejection) -> String {
    tracing::debug!("Rejected form submission: {}", rejection.body_text());
    format!("Invalid input: {}", rejection.body_text())
}

// ============================================================================
// Home Page
// ============================================================================

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub title: String,
    pub recommendation_ready: bool,
    pub production_ready: bool,
}

pub async fn home_page(State(state): State<AppState>) -> impl IntoResponse {
    render(HomeTemplate {
        title: "Agricultural Assistant".to_string(),
        recommendation_ready: state.recommendation_model.is_ready(),
        production_ready: state.production_model.is_ready(),
    })
}

// ============================================================================
// Crop Recommendation
// ============================================================================

pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub value: f64,
    pub help: &'static str,
}

fn field_views(input: &RecommendationInput) -> Vec<FieldView> {
    FIELD_BOUNDS
        .iter()
        .zip(input.feature_vector())
        .map(|(bounds, value)| FieldView {
            name: bounds.name,
            label: bounds.label,
            min: bounds.min,
            max: bounds.max,
            value,
            help: bounds.help,
        })
        .collect()
}

#[derive(Template)]
#[template(path = "pages/recommend.html")]
pub struct RecommendTemplate {
    pub title: String,
    pub fields: Vec<FieldView>,
    pub model_warning: Option<String>,
    pub result: Option<RecommendationView>,
    pub error: Option<String>,
}

pub async fn recommend_form(State(state): State<AppState>) -> impl IntoResponse {
    render(RecommendTemplate {
        title: "Intelligent Crop Recommendation System".to_string(),
        fields: field_views(&RecommendationInput::default()),
        model_warning: model_warning(&state.recommendation_model),
        result: None,
        error: None,
    })
}

pub async fn recommend_submit(
    State(state): State<AppState>,
    form: Result<Form<RecommendationInput>, FormRejection>,
) -> Result<Html<String>, AppError> {
    let input = match form {
        Ok(Form(input)) => input,
        Err(rejection) => {
            return Ok(render(RecommendTemplate {
                title: "Intelligent Crop Recommendation System".to_string(),
                fields: field_views(&RecommendationInput::default()),
                model_warning: model_warning(&state.recommendation_model),
                result: None,
                error: Some(form_error(rejection)),
            }));
        }
    };

    let (result, error) = match state.run_recommendation(input).await {
        Ok(result) => (Some(RecommendationView::from(&result)), None),
        Err(e) => (None, Some(inline_error(e)?)),
    };

    Ok(render(RecommendTemplate {
        title: "Intelligent Crop Recommendation System".to_string(),
        fields: field_views(&input),
        model_warning: model_warning(&state.recommendation_model),
        result,
        error,
    }))
}

// ============================================================================
// Crop Production
// ============================================================================

pub struct SeasonOption {
    pub value: &'static str,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "pages/production.html")]
pub struct ProductionTemplate {
    pub title: String,
    pub input: ProductionInput,
    pub seasons: Vec<SeasonOption>,
    pub min_year: i32,
    pub max_year: i32,
    pub model_warning: Option<String>,
    pub result: Option<ProductionView>,
    pub error: Option<String>,
}

impl ProductionTemplate {
    fn new(input: ProductionInput, state: &AppState) -> Self {
        let seasons = Season::ALL
            .iter()
            .map(|s| SeasonOption {
                value: s.as_str(),
                selected: *s == input.season,
            })
            .collect();

        Self {
            title: "Crop Production Prediction".to_string(),
            input,
            seasons,
            min_year: YEAR_RANGE.0,
            max_year: YEAR_RANGE.1,
            model_warning: model_warning(&state.production_model),
            result: None,
            error: None,
        }
    }
}

pub async fn production_form(State(state): State<AppState>) -> impl IntoResponse {
    render(ProductionTemplate::new(ProductionInput::default(), &state))
}

pub async fn production_submit(
    State(state): State<AppState>,
    form: Result<Form<ProductionInput>, FormRejection>,
) -> Result<Html<String>, AppError> {
    let input = match form {
        Ok(Form(input)) => input,
        Err(rejection) => {
            let mut page = ProductionTemplate::new(ProductionInput::default(), &state);
            page.error = Some(form_error(rejection));
            return Ok(render(page));
        }
    };

    let mut page = ProductionTemplate::new(input.clone(), &state);
    match state.run_production(input).await {
        Ok(result) => page.result = Some(ProductionView::new(&result, &page.input.crop)),
        Err(e) => page.error = Some(inline_error(e)?),
    }

    Ok(render(page))
}
