use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SentimentRequest {
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SentimentResponse {
    pub prediction: &'static str,
}

/// POST /sentiment
pub async fn handle_sentiment(
    State(state): State<AppState>,
    Json(req): Json<SentimentRequest>,
) -> Result<Json<SentimentResponse>, AppError> {
    let text = req
        .text
        .ok_or_else(|| AppError::Validation("No text provided".into()))?;

    let sentiment = state.sentiment.classify(&text).await?;

    Ok(Json(SentimentResponse {
        prediction: sentiment.label(),
    }))
}
