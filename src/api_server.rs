// Axum API Server Module
//
// Purpose: JSON API and HTML form pages for the two prediction tools.
// Models are loaded once at startup and shared read-only across requests.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::crop_info;
use crate::display::{production_scale, ProductionView, RecommendationView};
use crate::error::WorkflowError;
use crate::models::forest::{load_classifier_slot, load_regressor_slot};
use crate::models::{Classifier, ModelSlot, Regressor};
use crate::production::{predict_production, ProductionInput, ProductionResult};
use crate::recommendation::{recommend, RecommendationInput, RecommendationResult};
use crate::web::handlers::pages;

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub recommendation_model: ModelSlot<dyn Classifier>,
    pub production_model: ModelSlot<dyn Regressor>,
}

impl AppState {
    /// Load both model artifacts. A missing or corrupt artifact disables its
    /// tool but never prevents the server from starting.
    pub fn load(config: &ServerConfig) -> Self {
        tracing::info!("Loading crop recommendation model...");
        let recommendation_model = load_classifier_slot(&config.recommendation_model_path);

        tracing::info!("Loading crop production model...");
        let production_model = load_regressor_slot(&config.production_model_path);

        Self {
            recommendation_model,
            production_model,
        }
    }

    pub fn with_models(
        recommendation_model: ModelSlot<dyn Classifier>,
        production_model: ModelSlot<dyn Regressor>,
    ) -> Self {
        Self {
            recommendation_model,
            production_model,
        }
    }

    /// Run the recommendation workflow on the blocking pool.
    pub async fn run_recommendation(
        &self,
        input: RecommendationInput,
    ) -> Result<RecommendationResult, AppError> {
        let model = self.recommendation_model.clone();
        let result = tokio::task::spawn_blocking(move || recommend(&input, &model))
            .await
            .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))??;
        Ok(result)
    }

    /// Run the production workflow on the blocking pool.
    pub async fn run_production(
        &self,
        input: ProductionInput,
    ) -> Result<ProductionResult, AppError> {
        let model = self.production_model.clone();
        let result = tokio::task::spawn_blocking(move || predict_production(&input, &model))
            .await
            .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))??;
        Ok(result)
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // HTML pages
        .route("/", get(pages::home_page))
        .route("/recommend", get(pages::recommend_form).post(pages::recommend_submit))
        .route("/production", get(pages::production_form).post(pages::production_submit))

        // JSON API
        .route("/api/models", get(model_status))
        .route("/api/recommend", post(recommend_crop))
        .route("/api/production", post(predict_crop_production))
        .route("/api/crops", get(list_crops))
        .route("/api/crops/:name", get(get_crop_info))

        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "models": {
            "recommendation": state.recommendation_model.is_ready(),
            "production": state.production_model.is_ready(),
        }
    }))
}

fn slot_status<M: ?Sized>(slot: &ModelSlot<M>) -> serde_json::Value {
    serde_json::json!({
        "available": slot.is_ready(),
        "reason": slot.reason(),
    })
}

async fn model_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "recommendation": slot_status(&state.recommendation_model),
        "production": slot_status(&state.production_model),
    }))
}

async fn recommend_crop(
    State(state): State<AppState>,
    Json(input): Json<RecommendationInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    tracing::info!("Recommendation request");
    let result = state.run_recommendation(input).await?;
    let view = RecommendationView::from(&result);

    Ok(Json(serde_json::json!({
        "predicted_label": result.predicted_label,
        "ranked_candidates": result.ranked_candidates,
        "info": result.info,
        "display": view,
    })))
}

async fn predict_crop_production(
    State(state): State<AppState>,
    Json(input): Json<ProductionInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    tracing::info!("Production request for {} ({} ha)", input.crop, input.area);
    let crop = input.crop.clone();
    let result = state.run_production(input).await?;
    let view = ProductionView::new(&result, &crop);

    Ok(Json(serde_json::json!({
        "predicted_tonnage": result.predicted_tonnage,
        "yield_per_hectare": result.yield_per_hectare,
        "scale": production_scale(result.predicted_tonnage),
        "display": view,
    })))
}

async fn list_crops() -> impl IntoResponse {
    let crops: Vec<&str> = crop_info::known_crops().collect();
    Json(serde_json::json!({
        "rows": crops.len(),
        "data": crops,
    }))
}

async fn get_crop_info(Path(name): Path<String>) -> impl IntoResponse {
    let info = crop_info::lookup(&name);
    Json(serde_json::json!({
        "crop": name,
        "info": info,
        "known": info != crop_info::FALLBACK_INFO,
    }))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    Workflow(WorkflowError),
    Internal(String),
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        AppError::Workflow(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, kind, message) = match self {
            AppError::Workflow(err) => {
                let status = match err {
                    WorkflowError::ModelUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
                    WorkflowError::PredictionFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    WorkflowError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                };
                tracing::warn!("Request failed: {}", err);
                (status, err.kind(), err.user_message())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg)
            }
        };

        let body = Json(serde_json::json!({
            "error": message,
            "kind": kind,
        }));

        (status, body).into_response()
    }
}
