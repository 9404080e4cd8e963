//! Public HTTP request/response DTOs (serde ready).
//! The response body of a successful request is `domain::Course` itself.

use serde::{Deserialize, Serialize};

/// Body of `POST /generate-course`. Fields are validated by the orchestrator so
/// that bad values produce our own messages instead of a decoder rejection.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CourseRequest {
    pub topic: String,
    pub level: String,
    pub days: i64,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

/// Error body, `{"detail": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorOut {
    pub detail: String,
}
