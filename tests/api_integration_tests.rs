// API Integration Tests
//
// Purpose: Exercise every endpoint against stub models
// Run with: cargo test --features api --test api_integration_tests

#[cfg(feature = "api")]
mod api_tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use crop_advisor::models::{Classifier, FeatureVector, ModelSlot, Regressor};
    use crop_advisor::{create_router, AppState, ProductionInput};
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt; // for oneshot

    struct StubClassifier {
        classes: Vec<String>,
    }

    impl Classifier for StubClassifier {
        fn classes(&self) -> &[String] {
            &self.classes
        }

        fn predict(&self, _features: &FeatureVector) -> anyhow::Result<String> {
            Ok("rice".to_string())
        }

        fn predict_proba(&self, _features: &FeatureVector) -> anyhow::Result<Vec<f64>> {
            Ok(vec![0.2, 0.7, 0.1])
        }
    }

    struct StubRegressor;

    impl Regressor for StubRegressor {
        fn predict(&self, record: &ProductionInput) -> anyhow::Result<f64> {
            if record.state == "Atlantis" {
                anyhow::bail!("unseen category 'Atlantis'");
            }
            Ok(10.0)
        }
    }

    // Helper: Create app with both stub models loaded
    fn create_test_app() -> axum::Router {
        let classifier: Arc<dyn Classifier> = Arc::new(StubClassifier {
            classes: vec!["maize".to_string(), "rice".to_string(), "wheat".to_string()],
        });
        let regressor: Arc<dyn Regressor> = Arc::new(StubRegressor);
        create_router(AppState::with_models(
            ModelSlot::ready(classifier),
            ModelSlot::ready(regressor),
        ))
    }

    // Helper: Create app where neither artifact loaded
    fn create_app_without_models() -> axum::Router {
        create_router(AppState::with_models(
            ModelSlot::unavailable("Failed to read model file"),
            ModelSlot::unavailable("Failed to read model file"),
        ))
    }

    // Helper: Parse JSON response
    async fn json_response(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        serde_json::from_slice(&body).expect("Failed to parse JSON")
    }

    async fn text_response(response: axum::response::Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        String::from_utf8(body.to_vec()).expect("Body is not UTF-8")
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn production_body(state: &str, area: f64) -> Value {
        serde_json::json!({
            "state": state,
            "district": "LUDHIANA",
            "year": 2023,
            "season": "Rabi",
            "crop": "Wheat",
            "area": area,
        })
    }

    // =========================================================================
    // Section 1: Health and Model Status
    // =========================================================================

    #[tokio::test]
    async fn test_health_check() {
        let response = create_test_app().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["status"], "healthy");
        assert!(body["timestamp"].is_string());
        assert_eq!(body["models"]["recommendation"], true);
        assert_eq!(body["models"]["production"], true);
    }

    #[tokio::test]
    async fn test_model_status_reports_reason() {
        let response = create_app_without_models()
            .oneshot(get("/api/models"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["recommendation"]["available"], false);
        assert_eq!(body["production"]["reason"], "Failed to read model file");
    }

    // =========================================================================
    // Section 2: Crop Recommendation
    // =========================================================================

    #[tokio::test]
    async fn test_recommend_ranks_candidates() {
        let request = post_json(
            "/api/recommend",
            serde_json::json!({
                "nitrogen": 50.0, "phosphorus": 50.0, "potassium": 50.0,
                "temperature": 25.0, "humidity": 60.0, "ph": 6.5, "rainfall": 100.0
            }),
        );
        let response = create_test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["predicted_label"], "rice");

        let ranked = body["ranked_candidates"].as_array().unwrap();
        let labels: Vec<&str> = ranked.iter().map(|c| c["label"].as_str().unwrap()).collect();
        assert_eq!(labels, vec!["rice", "maize", "wheat"]);
        assert_eq!(ranked[0]["probability"].as_f64().unwrap(), 0.7);

        assert!(body["info"].as_str().unwrap().starts_with("Rice requires"));
        assert_eq!(body["display"]["headline"], "RICE");
        assert_eq!(body["display"]["candidates"][0]["percent"], "70.00%");
    }

    #[tokio::test]
    async fn test_recommend_without_model_is_503() {
        let request = post_json(
            "/api/recommend",
            serde_json::json!({
                "N": 50.0, "P": 50.0, "K": 50.0,
                "temperature": 25.0, "humidity": 60.0, "ph": 6.5, "rainfall": 100.0
            }),
        );
        let response = create_app_without_models().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = json_response(response).await;
        assert_eq!(body["kind"], "model_unavailable");
    }

    #[tokio::test]
    async fn test_recommend_missing_field_is_rejected() {
        let request = post_json("/api/recommend", serde_json::json!({ "nitrogen": 50.0 }));
        let response = create_test_app().oneshot(request).await.unwrap();
        assert!(response.status().is_client_error());
    }

    // =========================================================================
    // Section 3: Crop Production
    // =========================================================================

    #[tokio::test]
    async fn test_production_yield_per_hectare() {
        let response = create_test_app()
            .oneshot(post_json("/api/production", production_body("Punjab", 2.0)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["predicted_tonnage"].as_f64().unwrap(), 10.0);
        assert_eq!(body["yield_per_hectare"].as_f64().unwrap(), 5.0);
        assert_eq!(body["scale"].as_f64().unwrap(), 0.1);
        assert_eq!(body["display"]["tonnage"], "10.00");
    }

    #[tokio::test]
    async fn test_production_zero_area_is_400() {
        let response = create_test_app()
            .oneshot(post_json("/api/production", production_body("Punjab", 0.0)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_response(response).await;
        assert_eq!(body["kind"], "invalid_input");
    }

    #[tokio::test]
    async fn test_production_model_failure_is_422() {
        let response = create_test_app()
            .oneshot(post_json("/api/production", production_body("Atlantis", 2.0)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = json_response(response).await;
        assert_eq!(body["kind"], "prediction_failed");
        assert!(body["error"].as_str().unwrap().contains("Atlantis"));
    }

    #[tokio::test]
    async fn test_production_without_model_is_503() {
        let response = create_app_without_models()
            .oneshot(post_json("/api/production", production_body("Punjab", 2.0)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    // =========================================================================
    // Section 4: Crop Info
    // =========================================================================

    #[tokio::test]
    async fn test_crop_info_lookup() {
        let response = create_test_app().oneshot(get("/api/crops/MANGO")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["known"], true);
        assert!(body["info"].as_str().unwrap().starts_with("Mangoes"));
    }

    #[tokio::test]
    async fn test_crop_info_unknown_uses_fallback() {
        let response = create_test_app().oneshot(get("/api/crops/durian")).await.unwrap();
        let body = json_response(response).await;
        assert_eq!(body["known"], false);
        assert_eq!(body["info"], "Information not available for this crop.");
    }

    #[tokio::test]
    async fn test_list_crops() {
        let response = create_test_app().oneshot(get("/api/crops")).await.unwrap();
        let body = json_response(response).await;
        assert_eq!(body["rows"], 23);
        assert_eq!(body["data"][0], "rice");
    }

    // =========================================================================
    // Section 5: HTML Pages
    // =========================================================================

    #[tokio::test]
    async fn test_home_page_renders() {
        let response = create_test_app().oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = text_response(response).await;
        assert!(html.contains("Agricultural Assistant"));
    }

    #[tokio::test]
    async fn test_recommend_form_shows_missing_model_warning() {
        let response = create_app_without_models().oneshot(get("/recommend")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = text_response(response).await;
        assert!(html.contains("Model file not found"));
    }

    #[tokio::test]
    async fn test_recommend_form_submit_renders_result() {
        let form = "nitrogen=50&phosphorus=50&potassium=50\
                    &temperature=25&humidity=60&ph=6.5&rainfall=100";
        let response = create_test_app()
            .oneshot(post_form("/recommend", form))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = text_response(response).await;
        assert!(html.contains("RICE"));
        assert!(html.contains("70.00%"));
        assert!(html.contains("Rice requires plenty of water"));
    }

    #[tokio::test]
    async fn test_production_form_submit_renders_result() {
        let form = "state=Punjab&district=LUDHIANA&year=2023&season=Whole+Year&crop=Wheat&area=2";
        let response = create_test_app()
            .oneshot(post_form("/production", form))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = text_response(response).await;
        assert!(html.contains("10.00 tonnes"));
        assert!(html.contains("5.00 tonnes per hectare"));
    }

    #[tokio::test]
    async fn test_production_form_without_model_renders_error_inline() {
        let form = "state=Punjab&district=LUDHIANA&year=2023&season=Rabi&crop=Wheat&area=2";
        let response = create_app_without_models()
            .oneshot(post_form("/production", form))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = text_response(response).await;
        assert!(html.contains("Cannot make prediction without model"));
    }

    #[tokio::test]
    async fn test_recommend_form_without_model_renders_error_inline() {
        let form = "nitrogen=50&phosphorus=50&potassium=50\
                    &temperature=25&humidity=60&ph=6.5&rainfall=100";
        let response = create_app_without_models()
            .oneshot(post_form("/recommend", form))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = text_response(response).await;
        assert!(html.contains("Cannot make prediction without model"));
    }

    #[tokio::test]
    async fn test_recommend_form_with_non_numeric_field_renders_error_inline() {
        let form = "nitrogen=lots&phosphorus=50&potassium=50\
                    &temperature=25&humidity=60&ph=6.5&rainfall=100";
        let response = create_test_app()
            .oneshot(post_form("/recommend", form))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = text_response(response).await;
        assert!(html.contains("Invalid input"));
        assert!(html.contains("Nitrogen (N)"));
        assert!(!html.contains("70.00%"));
    }

    #[tokio::test]
    async fn test_production_form_with_unknown_season_renders_error_inline() {
        let form = "state=Punjab&district=LUDHIANA&year=2023&season=Monsoon&crop=Wheat&area=2";
        let response = create_test_app()
            .oneshot(post_form("/production", form))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = text_response(response).await;
        assert!(html.contains("Invalid input"));
        assert!(!html.contains("tonnes per hectare"));
    }

    #[tokio::test]
    async fn test_production_form_with_missing_area_renders_error_inline() {
        let form = "state=Punjab&district=LUDHIANA&year=2023&season=Rabi&crop=Wheat";
        let response = create_test_app()
            .oneshot(post_form("/production", form))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(text_response(response).await.contains("Invalid input"));
    }

    #[tokio::test]
    async fn test_production_subnormal_area_is_bad_request() {
        let body = production_body("Punjab", 1e-310);
        let response = create_test_app()
            .oneshot(post_json("/api/production", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = json_response(response).await;
        assert_eq!(json["kind"], "invalid_input");
    }
}
