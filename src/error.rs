//! Error taxonomy for the generation pipeline.
//!
//! Layering (inner to outer):
//!   BackendError -> AttemptError -> GenerationError -> AssemblyError -> CourseError
//! ValidationError is shared by fragment checks, full-course checks and request checks.

use std::time::Duration;

use thiserror::Error;

use crate::domain::Section;

/// Failure reported by a text-generation backend for a single call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BackendError {
  #[error("backend transport error: {0}")]
  Transport(String),

  #[error("backend HTTP {status}: {message}")]
  Status { status: u16, message: String },

  #[error("backend response could not be decoded: {0}")]
  Decode(String),
}

impl BackendError {
  /// Rate limiting and server-side failures are worth another attempt;
  /// other client errors (unknown model, bad request) will fail the same way again.
  pub fn is_retryable(&self) -> bool {
    match self {
      BackendError::Transport(_) | BackendError::Decode(_) => true,
      BackendError::Status { status, .. } => *status == 429 || *status >= 500,
    }
  }
}

/// Why one attempt of the generation client did not produce usable output.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AttemptError {
  #[error(transparent)]
  Backend(#[from] BackendError),

  #[error("backend call timed out after {0:?}")]
  Timeout(Duration),

  #[error("backend returned an empty response")]
  EmptyResponse,

  #[error("JSON parse error: {0}")]
  Parse(String),
}

impl AttemptError {
  pub fn is_retryable(&self) -> bool {
    match self {
      AttemptError::Backend(e) => e.is_retryable(),
      AttemptError::Timeout(_) | AttemptError::EmptyResponse | AttemptError::Parse(_) => true,
    }
  }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GenerationError {
  #[error("generation failed after {attempts} attempt(s): {last}")]
  Exhausted { attempts: u32, last: AttemptError },

  #[error("generation failed with a non-retryable error: {0}")]
  Terminal(AttemptError),
}

/// Structural, cardinality or content violation. `field` is a path such as
/// `modules[0].lessons[2].explanation`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
  #[error("Missing required field: {field}")]
  MissingField { field: String },

  #[error("Field `{field}` must not be empty")]
  EmptyField { field: String },

  #[error("Field `{field}` has the wrong type: expected {expected}")]
  WrongType { field: String, expected: &'static str },

  #[error("Field `{field}` must be at least {min} characters long (got {actual})")]
  TooShort { field: String, min: usize, actual: usize },

  #[error("Field `{field}` must contain between {min} and {max} entries (got {actual})")]
  Cardinality { field: String, min: usize, max: usize, actual: usize },

  #[error("Field `{field}` must contain at least {min} entries (got {actual})")]
  TooFew { field: String, min: usize, actual: usize },

  #[error("Field `{field}` must be between {min} and {max} lines (got {actual})")]
  ExplanationLines { field: String, min: usize, max: usize, actual: usize },

  #[error("Quiz `{field}` must have exactly {expected} options (got {actual})")]
  QuizOptionCount { field: String, expected: usize, actual: usize },

  #[error("Quiz `{field}` options must be non-empty and unique")]
  QuizOptionsInvalid { field: String },

  #[error("Quiz `{field}` correct_answer must be one of its options")]
  CorrectAnswerNotInOptions { field: String },

  #[error("Practice plan entry `{field}` must start with Daily:, Weekly: or Monthly:")]
  UnknownCadence { field: String },

  #[error("Practice plan must include a {cadence} activity")]
  MissingCadence { cadence: &'static str },

  #[error("Must have at least one task per day ({days} days, {tasks} tasks)")]
  NotEnoughTasks { days: u32, tasks: usize },

  #[error("Invalid topic: Topic must be at least 2 characters long")]
  InvalidTopic,

  #[error("Invalid level: Must be one of 'beginner', 'intermediate', or 'advanced' (got '{0}')")]
  InvalidLevel(String),

  #[error("Invalid days: Must be between 1 and 30 (got {0})")]
  InvalidDays(i64),

  #[error("Course structure is malformed: {0}")]
  Malformed(String),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AssemblyError {
  #[error("failed to generate {section}: {source}")]
  Generation { section: Section, #[source] source: GenerationError },

  #[error("no {0} were generated")]
  EmptySection(Section),

  #[error("generated {section} rejected: {source}")]
  InvalidFragment { section: Section, #[source] source: ValidationError },

  #[error("assembled course rejected: {0}")]
  InvalidCourse(#[source] ValidationError),
}

/// Outcome surfaced to the transport layer.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CourseError {
  #[error(transparent)]
  InvalidRequest(ValidationError),

  /// The built-in templates failed validation under the active bounds.
  #[error("fallback course failed validation: {0}")]
  Fallback(#[source] ValidationError),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
  #[error("invalid value for {key}: '{value}'")]
  Invalid { key: &'static str, value: String },

  #[error("inconsistent configuration: {0}")]
  Inconsistent(String),
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_classification() {
    let unavailable = BackendError::Status { status: 503, message: "busy".into() };
    let throttled = BackendError::Status { status: 429, message: "slow down".into() };
    let missing_model = BackendError::Status { status: 404, message: "model 'x' not found".into() };
    assert!(unavailable.is_retryable());
    assert!(throttled.is_retryable());
    assert!(!missing_model.is_retryable());
    assert!(!AttemptError::from(missing_model).is_retryable());
    assert!(AttemptError::Parse("eof".into()).is_retryable());
  }

  #[test]
  fn validation_messages_name_the_field() {
    let err = ValidationError::MissingField { field: "practice_plan".into() };
    assert!(err.to_string().contains("practice_plan"));
    let err = ValidationError::ExplanationLines {
      field: "modules[0].lessons[1].explanation".into(), min: 5, max: 10, actual: 2,
    };
    assert!(err.to_string().contains("modules[0].lessons[1].explanation"));
  }
}
