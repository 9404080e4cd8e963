//! Domain models: course, modules, lessons, quizzes, and the small enums around them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Difficulty level requested for a course.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
  Beginner,
  Intermediate,
  Advanced,
}

impl Level {
  pub const ALL: [Level; 3] = [Level::Beginner, Level::Intermediate, Level::Advanced];

  pub fn as_str(self) -> &'static str {
    match self {
      Level::Beginner => "beginner",
      Level::Intermediate => "intermediate",
      Level::Advanced => "advanced",
    }
  }
}

impl fmt::Display for Level {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Level {
  type Err = String;

  /// Case-insensitive; surrounding whitespace is ignored.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "beginner" => Ok(Level::Beginner),
      "intermediate" => Ok(Level::Intermediate),
      "advanced" => Ok(Level::Advanced),
      _ => Err(s.to_string()),
    }
  }
}

/// Practice-plan frequency. A valid plan covers all three.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cadence {
  Daily,
  Weekly,
  Monthly,
}

impl Cadence {
  pub const ALL: [Cadence; 3] = [Cadence::Daily, Cadence::Weekly, Cadence::Monthly];

  /// Literal prefix a plan entry must start with.
  pub fn prefix(self) -> &'static str {
    match self {
      Cadence::Daily => "Daily:",
      Cadence::Weekly => "Weekly:",
      Cadence::Monthly => "Monthly:",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Cadence::Daily => "daily",
      Cadence::Weekly => "weekly",
      Cadence::Monthly => "monthly",
    }
  }

  /// Cadence of a plan entry, if it carries one of the recognized prefixes.
  pub fn of_entry(entry: &str) -> Option<Cadence> {
    Cadence::ALL.into_iter().find(|c| entry.starts_with(c.prefix()))
  }
}

/// The four independently generated parts of a course.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Section {
  Modules,
  Tasks,
  Quizzes,
  PracticePlan,
}

impl Section {
  /// Generation order used by the assembler.
  pub const ALL: [Section; 4] = [Section::Modules, Section::Tasks, Section::Quizzes, Section::PracticePlan];

  /// JSON key of the section inside a course document.
  pub fn key(self) -> &'static str {
    match self {
      Section::Modules => "modules",
      Section::Tasks => "tasks",
      Section::Quizzes => "quizzes",
      Section::PracticePlan => "practice_plan",
    }
  }
}

impl fmt::Display for Section {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.key()) }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
  pub title: String,
  pub explanation: String,
  pub content: String,
  #[serde(default)] pub coding_task: Option<String>,
  #[serde(default)] pub key_takeaway: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
  pub name: String,
  pub lessons: Vec<Lesson>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
  pub question: String,
  pub options: Vec<String>,
  pub correct_answer: String,
}

/// Complete course as returned to clients. Field names are part of the wire contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
  pub topic: String,
  pub level: Level,
  pub days: u32,
  pub modules: Vec<Module>,
  pub tasks: Vec<String>,
  pub quizzes: Vec<Quiz>,
  pub practice_plan: Vec<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn level_parses_case_insensitively() {
    assert_eq!("Beginner".parse::<Level>(), Ok(Level::Beginner));
    assert_eq!(" ADVANCED ".parse::<Level>(), Ok(Level::Advanced));
    assert!("expert".parse::<Level>().is_err());
  }

  #[test]
  fn level_serializes_lowercase() {
    let json = serde_json::to_string(&Level::Intermediate).unwrap();
    assert_eq!(json, "\"intermediate\"");
  }

  #[test]
  fn cadence_detected_from_prefix() {
    assert_eq!(Cadence::of_entry("Weekly: build a project"), Some(Cadence::Weekly));
    assert_eq!(Cadence::of_entry("weekly: lowercase is not recognized"), None);
    assert_eq!(Cadence::of_entry("Every day: nothing"), None);
  }

  #[test]
  fn missing_optional_lesson_fields_default_to_none() {
    let lesson: Lesson = serde_json::from_str(
      r#"{"title":"Intro","explanation":"some text here","content":"more content here"}"#,
    ).unwrap();
    assert!(lesson.coding_task.is_none());
    assert!(lesson.key_takeaway.is_none());
  }
}
