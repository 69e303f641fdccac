mod assistant;
mod config;
mod errors;
mod llm_client;
mod prediction;
mod routes;
mod sentiment;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assistant::docs::DocumentStore;
use crate::config::Config;
use crate::llm_client::GenAiClient;
use crate::prediction::artifact::ModelStore;
use crate::routes::build_router;
use crate::sentiment::lexicon::LexiconSentiment;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Career Path API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the generative client; the chat and voice endpoints fail
    // per request while the key is absent.
    let llm = match &config.google_api_key {
        Some(key) => {
            info!(
                "GenAI client initialized ({} models in fallback list)",
                config.gemini_models.len()
            );
            Some(GenAiClient::new(key.clone(), config.gemini_models.clone()))
        }
        None => {
            warn!("GOOGLE_API_KEY not found in environment variables");
            None
        }
    };

    // Classifier artifact and source document, loaded lazily on first use
    let model = Arc::new(ModelStore::new(&config.model_path));
    let docs = Arc::new(DocumentStore::new(&config.docs_path));
    info!(
        "model path: {}, docs path: {}",
        config.model_path, config.docs_path
    );

    // Sentiment backend (LexiconSentiment by default — swap via AppState)
    let sentiment = Arc::new(LexiconSentiment);

    // Build app state
    let state = AppState {
        config: config.clone(),
        llm,
        model,
        docs,
        sentiment,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
