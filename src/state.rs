//! Application state and the top-level course generation policy.
//!
//! This module owns:
//!   - the settings and prompt templates (built once at startup)
//!   - the optional generation client (absent when AI_AVAILABLE is off)
//!
//! Policy: validate the request, try the generative path, and fall back to the
//! built-in templates on any assembly failure. Callers cannot tell which path
//! served the course; the origin is only logged.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::assembler::CourseAssembler;
use crate::backend::{OllamaBackend, TextBackend};
use crate::client::GenerationClient;
use crate::config::{Prompts, Settings};
use crate::domain::{Course, Level};
use crate::error::CourseError;
use crate::fallback::compose_fallback;
use crate::protocol::CourseRequest;
use crate::validate::validate_request;

/// Which path produced a course.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CourseOrigin {
    Generated,
    Fallback,
}

impl CourseOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            CourseOrigin::Generated => "generated",
            CourseOrigin::Fallback => "fallback",
        }
    }
}

pub struct AppState {
    pub settings: Settings,
    pub prompts: Prompts,
    pub client: Option<GenerationClient>,
}

impl AppState {
    /// Build state from settings: the Ollama backend is created only when the AI path is enabled.
    #[instrument(level = "info", skip_all)]
    pub fn new(settings: Settings, prompts: Prompts) -> Self {
        let backend: Option<Arc<dyn TextBackend>> = if settings.backend.ai_available {
            match OllamaBackend::new(settings.backend.host.clone()) {
                Ok(b) => Some(Arc::new(b)),
                Err(e) => {
                    error!(target: "duocoursa_backend", error = %e, "Failed to build backend client; using rule-based generation only");
                    None
                }
            }
        } else {
            None
        };

        match &backend {
            Some(_) => info!(
                target: "duocoursa_backend",
                host = %settings.backend.host,
                model = %settings.backend.model,
                max_retries = settings.backend.max_retries,
                timeout = ?settings.backend.request_timeout,
                "AI generation enabled."
            ),
            None => info!(target: "duocoursa_backend", "AI generation disabled. Using rule-based generation."),
        }

        Self::with_backend(settings, prompts, backend)
    }

    /// Build state around an explicit backend (or none).
    pub fn with_backend(settings: Settings, prompts: Prompts, backend: Option<Arc<dyn TextBackend>>) -> Self {
        let client = backend.map(|b| GenerationClient::new(b, &settings.backend, &prompts));
        Self { settings, prompts, client }
    }

    /// Validate the request, then generate or fall back.
    #[instrument(level = "info", skip(self, req), fields(topic = %req.topic, level = %req.level, days = req.days))]
    pub async fn generate_course(&self, req: &CourseRequest) -> Result<Course, CourseError> {
        let valid = validate_request(&req.topic, &req.level, req.days).map_err(CourseError::InvalidRequest)?;
        let (course, origin) = self.generate_validated(&valid.topic, valid.level, valid.days).await?;
        info!(target: "course", origin = origin.as_str(), modules = course.modules.len(), "Course ready");
        Ok(course)
    }

    async fn generate_validated(
        &self,
        topic: &str,
        level: Level,
        days: u32,
    ) -> Result<(Course, CourseOrigin), CourseError> {
        let bounds = &self.settings.bounds;

        if let Some(client) = &self.client {
            info!(target: "course", backend = client.backend_name(), "Attempting AI-based course generation");
            let assembler = CourseAssembler::new(client, &self.prompts, bounds, self.settings.backend.max_retries);
            match assembler.assemble_course(topic, level, days).await {
                Ok(course) => return Ok((course, CourseOrigin::Generated)),
                Err(e) => {
                    warn!(target: "course", error = %e, "AI generation failed; falling back to rule-based generation");
                }
            }
        }

        match compose_fallback(topic, level, days, bounds) {
            Ok(course) => Ok((course, CourseOrigin::Fallback)),
            Err(e) => {
                error!(target: "course", error = %e, "Fallback course failed validation; templates do not fit configured bounds");
                Err(CourseError::Fallback(e))
            }
        }
    }
}
