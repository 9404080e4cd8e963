//! Duocoursa course generation backend.
//!
//! A course request is validated, then handed to the generative path (four
//! section prompts against an Ollama-compatible backend, each output repaired,
//! parsed, and validated). Any failure there yields a deterministic course built
//! from local templates instead.

pub mod assembler;
pub mod backend;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod fallback;
pub mod protocol;
pub mod repair;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod util;
pub mod validate;
