//! Sentiment classification — pluggable, trait-based model behind the
//! `/sentiment` endpoint.
//!
//! Default: `LexiconSentiment` (pure-Rust, fast, deterministic, fully
//! testable). The trained sentiment artifact is an external collaborator;
//! swapping it in means implementing `SentimentModel` and replacing the
//! instance carried in `AppState` as `Arc<dyn SentimentModel>`.

pub mod handlers;
pub mod lexicon;

use async_trait::async_trait;

use crate::errors::AppError;

/// The sentiment model trait. Implement this to swap backends without
/// touching the endpoint or handler code.
#[async_trait]
pub trait SentimentModel: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Sentiment, AppError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn label(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        }
    }
}
