//! Shared backends and builders for integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use duocoursa_backend::backend::{BackendRequest, TextBackend};
use duocoursa_backend::config::{Prompts, Settings};
use duocoursa_backend::error::BackendError;
use duocoursa_backend::state::AppState;

/// Always fails with a retryable transport error.
#[derive(Default)]
pub struct Unreachable {
    pub calls: AtomicU32,
}

#[async_trait]
impl TextBackend for Unreachable {
    async fn generate(&self, _request: &BackendRequest) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(BackendError::Transport("connection refused".into()))
    }

    fn name(&self) -> &str {
        "unreachable"
    }
}

/// Produces a well-formed fragment for whichever section the prompt asks for.
pub struct Cooperative;

#[async_trait]
impl TextBackend for Cooperative {
    async fn generate(&self, request: &BackendRequest) -> Result<String, BackendError> {
        let p = &request.prompt;
        let reply = if p.contains("\"modules\"") {
            let lesson = |n: u32| {
                json!({
                    "title": format!("Ownership part {n}"),
                    "explanation": "Values have one owner.\nMoves transfer ownership.\nBorrows lend access.\nLifetimes bound borrows.\nDrop runs at scope end.",
                    "content": "Ownership, moves and borrowing in practice.",
                    "key_takeaway": "The borrow checker enforces aliasing rules."
                })
            };
            json!({"modules": [{"name": "Ownership", "lessons": [lesson(1), lesson(2), lesson(3)]}]})
        } else if p.contains("\"tasks\"") {
            // One task for every day a request may ask for.
            let tasks: Vec<String> = (1..=30).map(|n| format!("Day {n}: practice borrowing")).collect();
            json!({ "tasks": tasks })
        } else if p.contains("\"quizzes\"") {
            let quiz = |n: u32| {
                json!({
                    "question": format!("Which statement about moves is true ({n})?"),
                    "options": ["Moves copy", "Moves transfer ownership", "Moves are unsafe", "Moves need Clone"],
                    "correct_answer": "Moves transfer ownership"
                })
            };
            json!({"quizzes": [quiz(1), quiz(2), quiz(3)]})
        } else {
            json!({"practice_plan": ["Daily: read a chapter", "Weekly: write a crate", "Monthly: ship a tool"]})
        };
        Ok(format!("Sure! Here it is:\n```json\n{reply}\n```"))
    }

    fn name(&self) -> &str {
        "cooperative"
    }
}

pub fn fast_settings() -> Settings {
    let mut settings = Settings::default();
    settings.backend.max_retries = 2;
    settings.backend.request_timeout = Duration::from_millis(500);
    settings
}

pub fn state_with(backend: Option<Arc<dyn TextBackend>>) -> AppState {
    AppState::with_backend(fast_settings(), Prompts::default(), backend)
}
