//! HTTP facade for the conversion insights backend.
//!
//! Thin request/response mapping: the prediction route validates shape,
//! model name, and numeric convertibility before calling the scorer; all
//! other routes serve the startup-loaded fixture tables.

use crate::config::AppConfig;
use crate::dataset::{self, PreviewOutcome};
use crate::fixtures::{ChartFixtures, DatasetInfo, ModelMetrics, DATASET_INFO, MODEL_METRICS};
use crate::models::registry::ModelRegistry;
use crate::models::scorer::ConversionScorer;
use crate::types::prediction::{ModelId, PredictionResult};
use crate::types::record::FeatureRecord;
use anyhow::{anyhow, Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Fields a prediction request must carry, in validation order.
pub const REQUIRED_FIELDS: [&str; 11] = [
    "age",
    "gender",
    "location",
    "device_type",
    "impressions",
    "clicks",
    "engagement_duration",
    "sentiment_score",
    "previous_interaction_score",
    "ad_category",
    "model",
];

/// The numeric subset of [`REQUIRED_FIELDS`], in feature order.
pub const NUMERIC_FIELDS: [&str; 10] = [
    "age",
    "gender",
    "location",
    "device_type",
    "impressions",
    "clicks",
    "engagement_duration",
    "sentiment_score",
    "previous_interaction_score",
    "ad_category",
];

/// Shared request-handling state. All members are immutable after
/// startup, so handlers need no synchronization.
#[derive(Clone)]
pub struct AppState {
    scorer: Arc<ConversionScorer>,
    registry: Arc<ModelRegistry>,
    fixtures: Arc<ChartFixtures>,
    dataset_paths: Arc<Vec<PathBuf>>,
}

impl AppState {
    pub fn new(config: &AppConfig, registry: Arc<ModelRegistry>, fixtures: ChartFixtures) -> Self {
        Self {
            scorer: Arc::new(ConversionScorer::new(registry.clone())),
            registry,
            fixtures: Arc::new(fixtures),
            dataset_paths: Arc::new(config.dataset.search_path_bufs()),
        }
    }
}

/// Bind and serve until the process is stopped.
pub async fn start(state: AppState, addr: &str) -> Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind listener on {addr} (port already in use?)"))?;
    info!("listening on {addr}");
    axum::serve(listener, app)
        .await
        .context("HTTP server terminated unexpectedly")
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handle_health))
        .route("/api/models", get(handle_models))
        .route("/api/dataset", get(handle_dataset_info))
        .route("/api/dataset/preview", get(handle_dataset_preview))
        .route("/api/predict", post(handle_predict))
        .route("/api/visualizations/roc", get(handle_roc))
        .route(
            "/api/visualizations/confusion_matrix",
            get(handle_confusion_matrices),
        )
        .route(
            "/api/visualizations/feature_importance",
            get(handle_feature_importance),
        )
        .route("/api/visualizations/missing_data", get(handle_missing_data))
        .route("/api/visualizations/pca", get(handle_pca))
        .route("/api/visualizations/clusters", get(handle_clusters))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    models_loaded: Vec<ModelId>,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        models_loaded: state.registry.loaded_ids(),
    })
}

async fn handle_models() -> Json<[ModelMetrics; 5]> {
    Json(MODEL_METRICS)
}

async fn handle_dataset_info() -> Json<DatasetInfo> {
    Json(DATASET_INFO)
}

async fn handle_dataset_preview(State(state): State<AppState>) -> Response {
    let paths = state.dataset_paths.clone();
    let outcome = match tokio::task::spawn_blocking(move || dataset::load_preview(&paths)).await {
        Ok(outcome) => outcome,
        Err(e) => return internal_error(anyhow!(e).context("dataset preview task failed")),
    };

    match outcome {
        PreviewOutcome::Loaded(preview) => Json(preview).into_response(),
        PreviewOutcome::ReadError { path, error } => {
            error!(path = %path.display(), error = %error, "failed to read dataset preview");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!("Error reading CSV file: {error:#}"),
                    "columns": dataset::FALLBACK_COLUMNS,
                    "data": [],
                    "total_rows": dataset::DATASET_TOTAL_ROWS,
                    "preview_rows": 0,
                })),
            )
                .into_response()
        }
    }
}

async fn handle_predict(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let (record, model) = match parse_predict_request(&headers, &body) {
        Ok(parsed) => parsed,
        Err(rejection) => return rejection.into_response(),
    };

    let result: PredictionResult = state.scorer.score(&record, model);
    info!(
        model = %model,
        probability = result.probability,
        model_loaded = result.model_loaded,
        "prediction served"
    );
    Json(result).into_response()
}

async fn handle_roc(State(state): State<AppState>) -> Json<Value> {
    Json(state.fixtures.roc_curves.clone())
}

async fn handle_confusion_matrices(State(state): State<AppState>) -> Json<Value> {
    Json(state.fixtures.confusion_matrices.clone())
}

async fn handle_feature_importance(State(state): State<AppState>) -> Json<Value> {
    Json(state.fixtures.feature_importance.clone())
}

async fn handle_missing_data(State(state): State<AppState>) -> Json<Value> {
    Json(state.fixtures.missing_data.clone())
}

async fn handle_pca(State(state): State<AppState>) -> Response {
    Json(&state.fixtures.pca_projection).into_response()
}

async fn handle_clusters(State(state): State<AppState>) -> Json<Value> {
    Json(state.fixtures.cluster_summary.clone())
}

/// Why a prediction request was rejected before reaching the scorer.
#[derive(Debug, PartialEq)]
enum PredictRejection {
    NotJson,
    NoData,
    MissingFields(Vec<&'static str>),
    UnknownModel(String),
    NotNumeric(&'static str),
}

impl PredictRejection {
    fn body(&self) -> Value {
        match self {
            PredictRejection::NotJson => json!({ "error": "Request must be JSON" }),
            PredictRejection::NoData => json!({ "error": "No data provided" }),
            PredictRejection::MissingFields(missing) => json!({
                "error": format!("Missing fields: {}", missing.join(", ")),
                "required_fields": REQUIRED_FIELDS,
            }),
            PredictRejection::UnknownModel(name) => json!({
                "error": format!("Invalid model name: {name}"),
                "valid_models": ModelId::ALL,
            }),
            PredictRejection::NotNumeric(field) => json!({
                "error": format!("Invalid value for {field}: must be a number"),
            }),
        }
    }
}

impl IntoResponse for PredictRejection {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(self.body())).into_response()
    }
}

fn parse_predict_request(
    headers: &HeaderMap,
    body: &Bytes,
) -> std::result::Result<(FeatureRecord, ModelId), PredictRejection> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false);
    if !is_json {
        return Err(PredictRejection::NotJson);
    }

    let value: Value = serde_json::from_slice(body).map_err(|_| PredictRejection::NoData)?;
    let Value::Object(data) = value else {
        return Err(PredictRejection::NoData);
    };

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .into_iter()
        .filter(|field| !data.contains_key(*field))
        .collect();
    if !missing.is_empty() {
        return Err(PredictRejection::MissingFields(missing));
    }

    let model_value = &data["model"];
    let model = model_value
        .as_str()
        .and_then(ModelId::parse)
        .ok_or_else(|| PredictRejection::UnknownModel(render_model_value(model_value)))?;

    let mut numbers = [0.0_f64; 10];
    for (slot, field) in numbers.iter_mut().zip(NUMERIC_FIELDS) {
        *slot = coerce_number(&data[field]).ok_or(PredictRejection::NotNumeric(field))?;
    }

    let record = FeatureRecord {
        age: numbers[0],
        gender: numbers[1],
        location: numbers[2],
        device_type: numbers[3],
        impressions: numbers[4],
        clicks: numbers[5],
        engagement_duration: numbers[6],
        sentiment_score: numbers[7],
        previous_interaction_score: numbers[8],
        ad_category: numbers[9],
    };

    Ok((record, model))
}

/// Numeric convertibility: JSON numbers, numeric strings, and booleans
/// all coerce; anything else is rejected.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn render_model_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn internal_error(err: anyhow::Error) -> Response {
    error!(error = ?err, "internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": err.to_string(),
            "traceback": format!("{err:?}"),
        })),
    )
        .into_response()
}
