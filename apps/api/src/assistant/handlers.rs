use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::assistant::tts;
use crate::errors::AppError;
use crate::llm_client::prompts::{
    build_chat_prompt, build_voice_prompt, CHAT_MAX_TOKENS, VOICE_MAX_TOKENS,
};
use crate::llm_client::GenAiClient;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Deserialize)]
pub struct VoiceRequest {
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VoiceResponse {
    pub query: String,
    pub response: String,
}

fn require_llm(state: &AppState) -> Result<&GenAiClient, AppError> {
    state.llm.as_ref().ok_or_else(|| {
        AppError::Upstream("GOOGLE_API_KEY not configured. Please set it in the .env file.".into())
    })
}

/// POST /chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let message = req
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Message not provided".into()))?;

    let llm = require_llm(&state)?;
    let context = state.docs.get();
    let prompt = build_chat_prompt(&context, &message);

    let response = llm.generate(&prompt, CHAT_MAX_TOKENS).await?;
    Ok(Json(ChatResponse { response }))
}

/// POST /voice
pub async fn handle_voice(
    State(state): State<AppState>,
    Json(req): Json<VoiceRequest>,
) -> Result<Json<VoiceResponse>, AppError> {
    let query = req
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Query not provided".into()))?;

    let llm = require_llm(&state)?;
    let context = state.docs.get();
    let prompt = build_voice_prompt(&context, &query);

    let response = llm.generate(&prompt, VOICE_MAX_TOKENS).await?;
    Ok(Json(VoiceResponse { query, response }))
}

#[derive(Debug, Serialize)]
pub struct VoiceCmdResponse {
    pub message: &'static str,
}

/// GET /voice/cmd
///
/// Announces activation through the system TTS engine. Speech failure is
/// logged inside `tts::speak` and never fails this request.
pub async fn handle_voice_cmd(State(state): State<AppState>) -> Json<VoiceCmdResponse> {
    tts::speak(&state.config.tts_command, "Voice Assistant is Activated").await;
    Json(VoiceCmdResponse {
        message: "Voice activated",
    })
}
