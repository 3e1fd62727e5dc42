use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::config::Config;
use crate::logic::dataset::{synthetic, DataSource};
use crate::logic::ModelBundle;
use crate::{create_router, AppState};

fn app() -> Router {
    let config = Config::from_env();
    let data = synthetic::dataset().unwrap();
    let source = DataSource::Synthetic {
        reason: "test".to_string(),
        rows: data.len(),
    };
    let bundle = ModelBundle::fit(&data, source, &config.bundle_options()).unwrap();

    create_router(AppState {
        bundle: Arc::new(bundle),
        config: Arc::new(config),
    })
}

async fn send(app: Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    let request = builder
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn questionnaire() -> String {
    json!({
        "Gender": "Male",
        "Age": 21,
        "City": "Delhi",
        "Profession": "Student",
        "Academic Pressure": "Extreme",
        "Work Pressure": 0,
        "CGPA": 6.2,
        "Study Satisfaction": "Unsatisfied",
        "Job Satisfaction": "Not Applicable",
        "Sleep Duration": "<5",
        "Dietary Habits": "Unhealthy",
        "Degree": "High School",
        "Have you ever had suicidal thoughts ?": "Yes",
        "Work/Study Hours": 11,
        "Financial Stress": "High",
        "Family History of Mental Illness": "Yes"
    })
    .to_string()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["data_source"], "synthetic");
}

#[test]
fn test_root_banner_lists_endpoints() {
    let axum::Json(body) = tokio_test::block_on(super::health::root());
    assert!(body["endpoints"]["POST /api/predict"].is_string());
    assert!(body["endpoints"]["GET /model-info"].is_string());
}

#[tokio::test]
async fn test_predict_success() {
    let q = questionnaire();
    let (status, body) = send(app(), Method::POST, "/api/predict", Some(&q)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    for key in [
        "assessment_id",
        "prediction",
        "prediction_label",
        "probability",
        "risk_score",
        "risk_level",
        "scoring_mode",
        "breakdown",
        "warnings",
    ] {
        assert!(!body[key].is_null(), "missing {}", key);
    }

    let score = body["risk_score"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&score));
    assert_eq!(body["recommendation"].is_string(), score > 50.0);
}

#[tokio::test]
async fn test_predict_alias_route() {
    let q = questionnaire();
    let (status, body) = send(app(), Method::POST, "/predict", Some(&q)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
}

#[tokio::test]
async fn test_predict_rejects_non_object() {
    let (status, body) = send(app(), Method::POST, "/api/predict", Some("[1, 2, 3]")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn test_predict_rejects_malformed_json() {
    let (status, body) = send(app(), Method::POST, "/api/predict", Some("{\"Age\": ")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_predict_rejects_out_of_range() {
    let (status, body) = send(app(), Method::POST, "/api/predict", Some("{\"CGPA\": 42}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("CGPA"));
}

#[tokio::test]
async fn test_predict_partial_body_warns() {
    let (status, body) = send(app(), Method::POST, "/api/predict", Some("{\"Age\": 20}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["warnings"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_model_info() {
    let (status, body) = send(app(), Method::GET, "/model-info", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data_source"]["kind"], "synthetic");
    assert_eq!(body["schema"]["features"].as_array().unwrap().len(), 16);
    assert!(body["risk_weights"].as_object().unwrap().len() > 0);
    assert!(body["training"]["metrics"]["accuracy"].is_number());
}
