//! Generation client: request shaping, per-call timeout, bounded retries.
//!
//! An attempt fails when the backend errors, times out, returns nothing, or (for
//! structured requests) returns text that still does not parse after
//! `repair::normalize`. Retryable failures consume an attempt; terminal ones end
//! the call immediately. The loop returns on every path, either with output or
//! with a classified `GenerationError`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::backend::{BackendRequest, GenerateOptions, TextBackend};
use crate::config::{BackendSettings, Prompts};
use crate::error::{AttemptError, GenerationError};
use crate::repair::normalize;
use crate::util::{fill_template, trunc_for_log};

/// Output of a successful generation.
#[derive(Clone, Debug, PartialEq)]
pub enum RawOutput {
    Text(String),
    Structured(Value),
}

impl RawOutput {
    pub fn into_structured(self) -> Option<Value> {
        match self {
            RawOutput::Structured(v) => Some(v),
            RawOutput::Text(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct GenerationClient {
    backend: Arc<dyn TextBackend>,
    model: String,
    options: GenerateOptions,
    timeout: Duration,
    structured_contract: String,
}

impl GenerationClient {
    pub fn new(backend: Arc<dyn TextBackend>, settings: &BackendSettings, prompts: &Prompts) -> Self {
        Self {
            backend,
            model: settings.model.clone(),
            options: GenerateOptions {
                temperature: settings.temperature,
                max_tokens: settings.max_tokens,
            },
            timeout: settings.request_timeout,
            structured_contract: prompts.structured_contract.clone(),
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Run up to `max_retries` attempts (at least one).
    #[instrument(
        level = "info",
        skip(self, prompt),
        fields(backend = %self.backend.name(), model = %self.model, prompt_len = prompt.len())
    )]
    pub async fn generate(
        &self,
        prompt: &str,
        expect_structured: bool,
        max_retries: u32,
    ) -> Result<RawOutput, GenerationError> {
        let attempts = max_retries.max(1);
        let request = BackendRequest {
            model: self.model.clone(),
            prompt: self.shape_prompt(prompt, expect_structured),
            stream: false,
            options: self.options.clone(),
        };

        let mut attempt = 1;
        loop {
            let start = Instant::now();
            match self.attempt(&request, expect_structured).await {
                Ok(out) => {
                    info!(target: "generation", attempt, elapsed = ?start.elapsed(), "Generation succeeded");
                    return Ok(out);
                }
                Err(e) if !e.is_retryable() => {
                    warn!(target: "generation", attempt, error = %e, "Non-retryable generation failure");
                    return Err(GenerationError::Terminal(e));
                }
                Err(e) if attempt >= attempts => {
                    warn!(target: "generation", attempt, attempts, error = %e, "Generation attempts exhausted");
                    return Err(GenerationError::Exhausted { attempts, last: e });
                }
                Err(e) => {
                    warn!(target: "generation", attempt, attempts, error = %e, "Generation attempt failed; retrying");
                    attempt += 1;
                }
            }
        }
    }

    fn shape_prompt(&self, prompt: &str, expect_structured: bool) -> String {
        if expect_structured {
            fill_template(&self.structured_contract, &[("prompt", prompt)])
        } else {
            prompt.to_string()
        }
    }

    async fn attempt(&self, request: &BackendRequest, expect_structured: bool) -> Result<RawOutput, AttemptError> {
        let text = tokio::time::timeout(self.timeout, self.backend.generate(request))
            .await
            .map_err(|_| AttemptError::Timeout(self.timeout))??;

        if text.trim().is_empty() {
            return Err(AttemptError::EmptyResponse);
        }
        if !expect_structured {
            return Ok(RawOutput::Text(text));
        }

        let cleaned = normalize(&text);
        serde_json::from_str::<Value>(&cleaned)
            .map(RawOutput::Structured)
            .map_err(|e| {
                warn!(target: "generation", error = %e, preview = %trunc_for_log(&cleaned, 120), "Unparsable structured output");
                AttemptError::Parse(e.to_string())
            })
    }
}
