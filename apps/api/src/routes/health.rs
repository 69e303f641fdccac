use axum::Json;
use serde_json::{json, Value};

/// GET /
/// Root endpoint listing the available endpoints, to test if the backend
/// is running.
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "status": "success",
        "message": "Career Path Recommendation System API is running",
        "endpoints": {
            "prediction": "/predict (POST)",
            "sentiment": "/sentiment (POST)",
            "chat": "/chat (POST)",
            "voice": "/voice (POST), /voice/cmd (GET)"
        }
    }))
}

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "careerpath-api"
    }))
}
