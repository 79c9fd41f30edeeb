//! Backend Smoke Client
//!
//! Exercises the health and prediction endpoints of a running backend.

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let base_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://127.0.0.1:5000".to_string());
    let client = reqwest::Client::new();

    let health: Value = client
        .get(format!("{base_url}/api/health"))
        .send()
        .await
        .context("health request failed - is the backend running?")?
        .json()
        .await
        .context("health response was not JSON")?;
    info!(status = %health["status"], models_loaded = %health["models_loaded"], "health check ok");

    let payload = json!({
        "age": 35,
        "gender": 0,
        "location": 1,
        "device_type": 2,
        "impressions": 1000,
        "clicks": 50,
        "engagement_duration": 60,
        "sentiment_score": 0.5,
        "previous_interaction_score": 0.5,
        "ad_category": 1,
        "model": "svm"
    });

    let response = client
        .post(format!("{base_url}/api/predict"))
        .json(&payload)
        .send()
        .await
        .context("predict request failed")?;
    let status = response.status();
    let body: Value = response
        .json()
        .await
        .context("predict response was not JSON")?;

    info!(
        status = %status,
        probability = %body["probability"],
        prediction = %body["prediction"],
        confidence = %body["confidence"],
        model_loaded = %body["model_loaded"],
        "prediction received"
    );

    Ok(())
}
