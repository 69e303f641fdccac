pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::assistant::handlers as assistant;
use crate::prediction::handlers as prediction;
use crate::sentiment::handlers as sentiment;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/predict", post(prediction::handle_predict))
        .route("/sentiment", post(sentiment::handle_sentiment))
        .route("/chat", post(assistant::handle_chat))
        .route("/voice", post(assistant::handle_voice))
        .route("/voice/cmd", get(assistant::handle_voice_cmd))
        .with_state(state)
}
