/// LLM Client — the single point of entry for all generative-text calls.
///
/// ARCHITECTURAL RULE: No other module may call the Google GenAI API
/// directly. All generative interactions MUST go through this module.
///
/// The client carries an ordered fallback list of model identifiers and
/// tries them in sequence: a "model not found" or "quota exceeded" class
/// error moves on to the next model, any other error is terminal, and
/// exhausting the list fails the request.
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const GENAI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const TEMPERATURE: f32 = 0.3;
/// Per-request HTTP timeout. The upstream call is the only unbounded wait
/// in the system, so it gets an explicit cap.
const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("All {tried} models failed. Last error: {last}")]
    Exhausted { tried: usize, last: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(&self) -> Option<&str> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
            .find_map(|p| p.text.as_deref())
    }
}

/// Decides whether a failed model attempt should fall through to the next
/// model in the list. Only the "model not found" and "quota exceeded"
/// classes are retryable; everything else is terminal for the request.
pub fn retryable(status: u16, body: &str) -> bool {
    status == 404
        || status == 429
        || body.contains("NOT_FOUND")
        || body.contains("RESOURCE_EXHAUSTED")
        || body.to_lowercase().contains("quota")
}

/// The single generative client shared by the chat and voice endpoints.
#[derive(Clone)]
pub struct GenAiClient {
    client: Client,
    api_key: String,
    models: Vec<String>,
}

impl GenAiClient {
    pub fn new(api_key: String, models: Vec<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            models,
        }
    }

    /// Generates text for `prompt`, walking the model fallback list.
    pub async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, LlmError> {
        let request_body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: max_tokens,
            },
        };

        let mut last_error: Option<LlmError> = None;

        for model in &self.models {
            let url = format!("{GENAI_API_BASE}/{model}:generateContent");

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await?;

            let status = response.status();

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                if retryable(status.as_u16(), &body) {
                    warn!("model {model} unavailable ({status}), trying next in list");
                    last_error = Some(LlmError::Api {
                        status: status.as_u16(),
                        message: body,
                    });
                    continue;
                }
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let parsed: GenerateResponse = response.json().await?;
            let text = parsed.text().ok_or(LlmError::EmptyContent)?;

            debug!("generated {} chars with model {model}", text.len());
            return Ok(text.to_string());
        }

        Err(LlmError::Exhausted {
            tried: self.models.len(),
            last: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no models configured".to_string()),
        })
    }
}
