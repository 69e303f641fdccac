use std::sync::Arc;

use crate::assistant::docs::DocumentStore;
use crate::config::Config;
use crate::llm_client::GenAiClient;
use crate::prediction::artifact::ModelStore;
use crate::sentiment::SentimentModel;

/// Shared application state injected into all route handlers via Axum
/// extractors. Everything here is read-only after startup except the two
/// stores, which cache behind their own interior locks.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// None when GOOGLE_API_KEY is unset; generative endpoints then fail
    /// per request with a configuration error.
    pub llm: Option<GenAiClient>,
    pub model: Arc<ModelStore>,
    pub docs: Arc<DocumentStore>,
    /// Pluggable sentiment backend. Default: LexiconSentiment.
    pub sentiment: Arc<dyn SentimentModel>,
}
