//! Text-generation backends.
//!
//! `TextBackend` is the only thing the generation client needs: send a prompt,
//! get text back. `OllamaBackend` talks to an Ollama-compatible `/api/generate`
//! endpoint; tests plug in scripted backends.
//!
//! NOTE: prompts and responses are never logged in full, only their sizes.

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::BackendError;

/// One non-streaming generation call.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct BackendRequest {
  pub model: String,
  pub prompt: String,
  pub stream: bool,
  pub options: GenerateOptions,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct GenerateOptions {
  pub temperature: f32,
  pub max_tokens: u32,
}

#[async_trait]
pub trait TextBackend: Send + Sync {
  /// Submit one request and return the generated text.
  async fn generate(&self, request: &BackendRequest) -> Result<String, BackendError>;

  /// Short name used in logs.
  fn name(&self) -> &str;
}

#[derive(Deserialize)]
struct GenerateResponse {
  response: String,
}

#[derive(Clone)]
pub struct OllamaBackend {
  client: reqwest::Client,
  base_url: String,
}

impl OllamaBackend {
  pub fn new(base_url: impl Into<String>) -> Result<Self, BackendError> {
    // Per-call deadlines are enforced by the generation client.
    let client = reqwest::Client::builder()
      .build()
      .map_err(|e| BackendError::Transport(e.to_string()))?;
    Ok(Self { client, base_url: base_url.into() })
  }
}

#[async_trait]
impl TextBackend for OllamaBackend {
  #[instrument(level = "debug", skip(self, request), fields(model = %request.model, prompt_len = request.prompt.len()))]
  async fn generate(&self, request: &BackendRequest) -> Result<String, BackendError> {
    let url = format!("{}/api/generate", self.base_url);

    let res = self.client.post(&url)
      .header(USER_AGENT, concat!("duocoursa-backend/", env!("CARGO_PKG_VERSION")))
      .header(CONTENT_TYPE, "application/json")
      .json(request).send().await
      .map_err(|e| BackendError::Transport(e.to_string()))?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let message = extract_backend_error(&body).unwrap_or(body);
      return Err(BackendError::Status { status: status.as_u16(), message });
    }

    let body: GenerateResponse = res.json().await.map_err(|e| BackendError::Decode(e.to_string()))?;
    debug!(response_len = body.response.len(), "Backend response received");
    Ok(body.response)
  }

  fn name(&self) -> &str { "ollama" }
}

/// Ollama reports failures as `{"error": "..."}`.
fn extract_backend_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error)
}
