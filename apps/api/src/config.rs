use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
///
/// The Gemini API key is optional at startup: the chat and voice endpoints
/// return a per-request error when it is absent, so the prediction and
/// sentiment endpoints keep working without it.
#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: Option<String>,
    pub model_path: String,
    pub docs_path: String,
    /// Ordered fallback list of generative model identifiers.
    pub gemini_models: Vec<String>,
    pub tts_command: String,
    pub port: u16,
    pub rust_log: String,
}

/// Default model fallback order. Tried in sequence until one answers.
pub const DEFAULT_GEMINI_MODELS: &[&str] = &[
    "models/gemini-2.5-flash",
    "models/gemini-2.0-flash",
    "models/gemini-flash-latest",
    "models/gemini-pro-latest",
];

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let gemini_models = match std::env::var("GEMINI_MODELS") {
            Ok(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => DEFAULT_GEMINI_MODELS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };

        Ok(Config {
            google_api_key: std::env::var("GOOGLE_API_KEY").ok(),
            model_path: std::env::var("MODEL_PATH")
                .unwrap_or_else(|_| "ml_models/dtmodel.json".to_string()),
            docs_path: std::env::var("DOCS_PATH")
                .unwrap_or_else(|_| "datasets/docs/Job_Roles.pdf".to_string()),
            tts_command: std::env::var("TTS_COMMAND").unwrap_or_else(|_| "espeak-ng".to_string()),
            gemini_models,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}
