//! Integration test: end-to-end serving flow
//! Tests: train → bundle → recommend over HTTP, validation and parity

use axum::body::Body;
use axum::http::{Request, StatusCode};
use incentive_recommender::inference::Recommender;
use incentive_recommender::model::{Classifier, ModelType};
use incentive_recommender::pipeline::build_training_dataset;
use incentive_recommender::server::{create_router, AppState};
use incentive_recommender::training::{Trainer, TrainerConfig};
use polars::prelude::*;
use std::sync::Arc;
use tower::ServiceExt;

fn trained_bundle(model_type: ModelType) -> incentive_recommender::artifact::ModelBundle {
    let incentive = df!(
        "incentive_program" => &["cashback", "points"],
        "incentive_amount" => &[100.0, 250.0],
    )
    .unwrap();

    let n = 20usize;
    let owner_ids: Vec<i64> = (0..n as i64).collect();
    let property_ids: Vec<i64> = (0..n as i64).map(|i| i + 100).collect();
    let sqft: Vec<f64> = (0..n).map(|i| 800.0 + i as f64 * 50.0).collect();
    let property = df!(
        "property_id" => property_ids.clone(),
        "owner_id" => owner_ids.clone(),
        "sqft" => sqft,
    )
    .unwrap();

    let engagement: Vec<f64> = (0..n).map(|i| i as f64 * 0.7).collect();
    let labels: Vec<&str> = (0..n)
        .map(|i| if i < n / 2 { "cashback" } else { "points" })
        .collect();
    let behavior = df!(
        "owner_id" => owner_ids,
        "property_id" => property_ids,
        "engagement_score" => engagement,
        "ideal_incentive_program" => labels,
    )
    .unwrap();

    let dataset = build_training_dataset(&incentive, &property, &behavior).unwrap();
    let trainer = Trainer::new(TrainerConfig {
        n_estimators: 20,
        model_type,
        ..TrainerConfig::default()
    });
    let (bundle, _) = trainer.train(&dataset).unwrap();
    bundle
}

fn serve_test_app(model_type: ModelType) -> axum::Router {
    let bundle = trained_bundle(model_type);
    let state = Arc::new(AppState::new(Recommender::new(bundle)));
    create_router(state)
}

fn full_features(
    bundle: &incentive_recommender::artifact::ModelBundle,
) -> serde_json::Map<String, serde_json::Value> {
    let mut features = serde_json::Map::new();
    for name in &bundle.feature_columns {
        let value = match name.as_str() {
            "engagement_score" => serde_json::json!(1.4),
            "sqft" => serde_json::json!(900.0),
            "owner_property_interaction" => serde_json::json!("2_102"),
            _ => serde_json::json!(1.0),
        };
        features.insert(name.clone(), value);
    }
    features
}

async fn post_recommend(app: axum::Router, body: String) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/recommend")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 64)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_reports_ok() {
    let app = serve_test_app(ModelType::RandomForest);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 64)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "ok");
}

// ============================================================================
// Recommendation
// ============================================================================

#[tokio::test]
async fn test_recommend_returns_trained_class() {
    let bundle = trained_bundle(ModelType::RandomForest);
    let classes = bundle.classes.clone();
    let request = serde_json::json!({"features": full_features(&bundle)});

    let app = serve_test_app(ModelType::RandomForest);
    let (status, json) = post_recommend(app, request.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    let label = json["recommended_incentive_program"].as_str().unwrap();
    assert!(classes.iter().any(|c| c == label));

    let proba = json["class_probabilities"].as_object().unwrap();
    let sum: f64 = proba.values().map(|v| v.as_f64().unwrap()).sum();
    assert!((sum - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn test_recommend_matches_direct_inference() {
    let bundle = trained_bundle(ModelType::RandomForest);
    let features = full_features(&bundle);
    let recommender = Recommender::new(bundle.clone());
    let direct = recommender.recommend(&features).unwrap();

    let app = serve_test_app(ModelType::RandomForest);
    let request = serde_json::json!({"features": features});
    let (status, json) = post_recommend(app, request.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["recommended_incentive_program"].as_str().unwrap(),
        direct.recommended_incentive_program
    );
}

#[tokio::test]
async fn test_missing_features_rejected_with_names() {
    let app = serve_test_app(ModelType::RandomForest);
    let request = serde_json::json!({"features": {"sqft": 900.0}});
    let (status, json) = post_recommend(app, request.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], true);
    let message = json["message"].as_str().unwrap();
    assert!(message.contains("Missing required features"));
    assert!(message.contains("engagement_score"));
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let app = serve_test_app(ModelType::RandomForest);
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/recommend")
                .header("content-type", "application/json")
                .body(Body::from("[1, 2, 3]"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_decision_tree_omits_probabilities() {
    let bundle = trained_bundle(ModelType::DecisionTree);
    assert!(!bundle.model.supports_proba());
    let request = serde_json::json!({"features": full_features(&bundle)});

    let app = serve_test_app(ModelType::DecisionTree);
    let (status, json) = post_recommend(app, request.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json.get("class_probabilities").is_none());
}
