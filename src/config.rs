//! Runtime configuration: backend/generation settings from the environment, and
//! prompt templates (defaults, optionally overridden from TOML).
//!
//! `Settings` is built once at startup and handed to each component; nothing here
//! is global. See `Settings::from_lookup` for the recognized variables.

use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info};

use crate::error::ConfigError;
use crate::fallback::check_templates;

/// Options for the generative backend and the retry loop around it.
#[derive(Clone, Debug, PartialEq)]
pub struct BackendSettings {
  pub ai_available: bool,
  pub host: String,
  pub model: String,
  pub temperature: f32,
  pub max_tokens: u32,
  pub max_retries: u32,
  pub request_timeout: Duration,
}

impl Default for BackendSettings {
  fn default() -> Self {
    Self {
      ai_available: true,
      host: "http://localhost:11434".into(),
      model: "mistral".into(),
      temperature: 0.7,
      max_tokens: 2000,
      max_retries: 3,
      request_timeout: Duration::from_secs(120),
    }
  }
}

/// Cardinality and size bounds enforced by the validator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bounds {
  pub min_lessons_per_module: usize,
  pub max_lessons_per_module: usize,
  pub min_quizzes: usize,
  pub max_quizzes: usize,
  pub min_explanation_lines: usize,
  pub max_explanation_lines: usize,
  pub quiz_options_count: usize,
}

impl Default for Bounds {
  fn default() -> Self {
    Self {
      min_lessons_per_module: 3,
      max_lessons_per_module: 5,
      min_quizzes: 3,
      max_quizzes: 5,
      min_explanation_lines: 5,
      max_explanation_lines: 10,
      quiz_options_count: 4,
    }
  }
}

impl Bounds {
  pub fn check(&self) -> Result<(), ConfigError> {
    let ranges = [
      ("lessons per module", self.min_lessons_per_module, self.max_lessons_per_module),
      ("quizzes", self.min_quizzes, self.max_quizzes),
      ("explanation lines", self.min_explanation_lines, self.max_explanation_lines),
    ];
    for (what, min, max) in ranges {
      if min == 0 || min > max {
        return Err(ConfigError::Inconsistent(format!(
          "{what}: minimum {min} must be at least 1 and not exceed maximum {max}"
        )));
      }
    }
    if self.quiz_options_count < 2 {
      return Err(ConfigError::Inconsistent(format!(
        "quiz options count must be at least 2 (got {})", self.quiz_options_count
      )));
    }
    // The fallback course must always be servable.
    check_templates(self).map_err(|(template, e)| {
      ConfigError::Inconsistent(format!("fallback template '{template}' does not fit the configured bounds: {e}"))
    })
  }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Settings {
  pub backend: BackendSettings,
  pub bounds: Bounds,
}

impl Settings {
  pub fn from_env() -> Result<Self, ConfigError> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Build settings from an arbitrary key lookup. Unset keys take their default;
  /// set-but-unparsable keys are an error rather than silently ignored.
  ///
  ///   AI_AVAILABLE, OLLAMA_HOST, AI_MODEL, TEMPERATURE, MAX_TOKENS, MAX_RETRIES,
  ///   REQUEST_TIMEOUT_SECS, MIN/MAX_LESSONS_PER_MODULE, MIN/MAX_QUIZZES,
  ///   MIN/MAX_EXPLANATION_LINES, QUIZ_OPTIONS_COUNT
  pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let d = BackendSettings::default();
    let b = Bounds::default();

    let ai_available = match lookup("AI_AVAILABLE") {
      Some(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
      None => d.ai_available,
    };

    let backend = BackendSettings {
      ai_available,
      host: lookup("OLLAMA_HOST").map(|h| h.trim_end_matches('/').to_string()).unwrap_or(d.host),
      model: lookup("AI_MODEL").unwrap_or(d.model),
      temperature: parse_or(&lookup, "TEMPERATURE", d.temperature)?,
      max_tokens: parse_or(&lookup, "MAX_TOKENS", d.max_tokens)?,
      max_retries: parse_or(&lookup, "MAX_RETRIES", d.max_retries)?,
      request_timeout: parse_timeout(&lookup, d.request_timeout)?,
    };

    let bounds = Bounds {
      min_lessons_per_module: parse_or(&lookup, "MIN_LESSONS_PER_MODULE", b.min_lessons_per_module)?,
      max_lessons_per_module: parse_or(&lookup, "MAX_LESSONS_PER_MODULE", b.max_lessons_per_module)?,
      min_quizzes: parse_or(&lookup, "MIN_QUIZZES", b.min_quizzes)?,
      max_quizzes: parse_or(&lookup, "MAX_QUIZZES", b.max_quizzes)?,
      min_explanation_lines: parse_or(&lookup, "MIN_EXPLANATION_LINES", b.min_explanation_lines)?,
      max_explanation_lines: parse_or(&lookup, "MAX_EXPLANATION_LINES", b.max_explanation_lines)?,
      quiz_options_count: parse_or(&lookup, "QUIZ_OPTIONS_COUNT", b.quiz_options_count)?,
    };
    bounds.check()?;

    Ok(Self { backend, bounds })
  }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
  F: Fn(&str) -> Option<String>,
  T: FromStr,
{
  match lookup(key) {
    None => Ok(default),
    Some(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid { key, value: raw }),
  }
}

/// A zero deadline would fail every backend attempt, so it is rejected.
fn parse_timeout<F>(lookup: &F, default: Duration) -> Result<Duration, ConfigError>
where
  F: Fn(&str) -> Option<String>,
{
  match parse_or(lookup, "REQUEST_TIMEOUT_SECS", default.as_secs())? {
    0 => Err(ConfigError::Invalid { key: "REQUEST_TIMEOUT_SECS", value: "0".into() }),
    secs => Ok(Duration::from_secs(secs)),
  }
}

/// Optional TOML file with prompt overrides.
#[derive(Clone, Debug, Deserialize, Default)]
pub struct CourseConfig {
  #[serde(default)]
  pub prompts: Prompts,
}

/// Prompt templates sent to the backend. Placeholders in `{braces}` are filled by
/// `util::fill_template`; literal JSON braces in the examples are left untouched.
/// Any subset may be overridden in TOML.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  /// Wraps every structured request. Must contain `{prompt}`.
  pub structured_contract: String,
  pub modules_template: String,
  pub tasks_template: String,
  pub quizzes_template: String,
  pub practice_plan_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      structured_contract: r#"You are a JSON generator. Your task is to generate valid JSON based on the following requirements.
Rules:
1. Return ONLY valid JSON, no other text
2. Include all necessary commas between elements
3. Format the JSON properly with correct indentation
4. Do not include any explanations or markdown
5. Do not use code blocks or ```json markers
6. Ensure all JSON is properly escaped, including newlines inside strings
7. Add commas after every object in arrays
8. Add commas after every key-value pair except the last one in an object

Requirements:
{prompt}"#.into(),
      modules_template: r#"Create a JSON object representing a {level} level course on {topic} with {days} days of content.
Each module must have between {min_lessons} and {max_lessons} lessons.
Each explanation must be between {min_lines} and {max_lines} lines long, separated by \n.
The JSON must follow this exact structure:
{
  "modules": [
    {
      "name": "Module Name",
      "lessons": [
        {
          "title": "Lesson Title",
          "explanation": "Line 1\nLine 2\nLine 3\nLine 4\nLine 5",
          "content": "Detailed lesson content",
          "coding_task": "Specific coding task with instructions",
          "key_takeaway": "Key points to remember"
        }
      ]
    }
  ]
}"#.into(),
      tasks_template: r#"Create a JSON array of {days} daily tasks for learning {topic} at {level} level.
Format must be exactly:
{
  "tasks": [
    "Day 1: Detailed task description",
    "Day 2: Detailed task description"
  ]
}"#.into(),
      quizzes_template: r#"Create a JSON object with {quizzes} quiz questions for {topic} at {level} level.
Every question must have exactly {options} distinct options, and correct_answer must repeat one of them verbatim.
Format must be exactly:
{
  "quizzes": [
    {
      "question": "Question text",
      "options": ["Option A", "Option B", "Option C", "Option D"],
      "correct_answer": "Option A"
    }
  ]
}"#.into(),
      practice_plan_template: r#"Create a JSON object with a practice plan for {topic} at {level} level.
Format must be exactly:
{
  "practice_plan": [
    "Daily: Practice activity description",
    "Weekly: Practice activity description",
    "Monthly: Practice activity description"
  ]
}"#.into(),
    }
  }
}

/// Load `CourseConfig` from COURSE_CONFIG_PATH. On any IO/parse error, returns None.
pub fn load_course_config_from_env() -> Option<CourseConfig> {
  let path = std::env::var("COURSE_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<CourseConfig>(&s) {
      Ok(cfg) => {
        info!(target: "duocoursa_backend", %path, "Loaded course config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "duocoursa_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "duocoursa_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
