//! Course assembly from four independent sub-generations.
//!
//! Sections are generated strictly in order (modules, tasks, quizzes, practice
//! plan). Each fragment is gated by the section validator as soon as it arrives;
//! the merged candidate then goes through the full validator. Nothing is patched:
//! any failure aborts the whole assembly and the caller decides what to do next.

use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::client::GenerationClient;
use crate::config::{Bounds, Prompts};
use crate::domain::{Course, Level, Section};
use crate::error::AssemblyError;
use crate::util::fill_template;
use crate::validate::validate_section;

pub struct CourseAssembler<'a> {
    client: &'a GenerationClient,
    prompts: &'a Prompts,
    bounds: &'a Bounds,
    max_retries: u32,
}

impl<'a> CourseAssembler<'a> {
    pub fn new(client: &'a GenerationClient, prompts: &'a Prompts, bounds: &'a Bounds, max_retries: u32) -> Self {
        Self { client, prompts, bounds, max_retries }
    }

    #[instrument(level = "info", skip(self))]
    pub async fn assemble_course(&self, topic: &str, level: Level, days: u32) -> Result<Course, AssemblyError> {
        let mut candidate = Map::new();
        candidate.insert("topic".into(), Value::from(topic));
        candidate.insert("level".into(), Value::from(level.as_str()));
        candidate.insert("days".into(), Value::from(days));

        for section in Section::ALL {
            let fragment = self.generate_section(section, topic, level, days).await?;
            candidate.insert(section.key().into(), fragment);
        }

        let course = Course::from_candidate(Value::Object(candidate), self.bounds)
            .map_err(AssemblyError::InvalidCourse)?;
        info!(
            target: "course",
            modules = course.modules.len(),
            quizzes = course.quizzes.len(),
            tasks = course.tasks.len(),
            "Assembled generated course"
        );
        Ok(course)
    }

    async fn generate_section(
        &self,
        section: Section,
        topic: &str,
        level: Level,
        days: u32,
    ) -> Result<Value, AssemblyError> {
        let prompt = self.prompt_for(section, topic, level, days);
        let output = self
            .client
            .generate(&prompt, true, self.max_retries)
            .await
            .map_err(|source| AssemblyError::Generation { section, source })?;

        let fragment = output
            .into_structured()
            .and_then(|v| extract_section(v, section))
            .filter(|v| !is_empty(v))
            .ok_or(AssemblyError::EmptySection(section))?;

        validate_section(section, &fragment, self.bounds)
            .map_err(|source| AssemblyError::InvalidFragment { section, source })?;
        debug!(target: "course", %section, "Section accepted");
        Ok(fragment)
    }

    fn prompt_for(&self, section: Section, topic: &str, level: Level, days: u32) -> String {
        let b = self.bounds;
        let template = match section {
            Section::Modules => &self.prompts.modules_template,
            Section::Tasks => &self.prompts.tasks_template,
            Section::Quizzes => &self.prompts.quizzes_template,
            Section::PracticePlan => &self.prompts.practice_plan_template,
        };
        let days = days.to_string();
        let min_lessons = b.min_lessons_per_module.to_string();
        let max_lessons = b.max_lessons_per_module.to_string();
        let min_lines = b.min_explanation_lines.to_string();
        let max_lines = b.max_explanation_lines.to_string();
        let quizzes = b.max_quizzes.to_string();
        let options = b.quiz_options_count.to_string();
        fill_template(
            template,
            &[
                ("topic", topic),
                ("level", level.as_str()),
                ("days", &days),
                ("min_lessons", &min_lessons),
                ("max_lessons", &max_lessons),
                ("min_lines", &min_lines),
                ("max_lines", &max_lines),
                ("quizzes", &quizzes),
                ("options", &options),
            ],
        )
    }
}

/// The section value from a fragment document: `{"tasks": [...]}` or a bare array.
fn extract_section(value: Value, section: Section) -> Option<Value> {
    match value {
        Value::Object(mut obj) => obj.remove(section.key()).filter(|v| !v.is_null()),
        array @ Value::Array(_) => Some(array),
        _ => None,
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.is_empty(),
        Value::Object(obj) => obj.is_empty(),
        Value::String(s) => s.trim().is_empty(),
        Value::Null => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendRequest, TextBackend};
    use crate::config::BackendSettings;
    use crate::error::{BackendError, GenerationError, ValidationError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;

    /// Answers based on which section the prompt asks for.
    struct BySection {
        modules: String,
        tasks: String,
        quizzes: String,
        plan: String,
    }

    #[async_trait]
    impl TextBackend for BySection {
        async fn generate(&self, request: &BackendRequest) -> Result<String, BackendError> {
            let p = &request.prompt;
            let reply = if p.contains("\"modules\"") {
                &self.modules
            } else if p.contains("\"tasks\"") {
                &self.tasks
            } else if p.contains("\"quizzes\"") {
                &self.quizzes
            } else {
                &self.plan
            };
            Ok(reply.clone())
        }

        fn name(&self) -> &str {
            "by-section"
        }
    }

    fn lesson(n: usize) -> Value {
        json!({
            "title": format!("Lesson {n}"),
            "explanation": "First line of text\nSecond\nThird\nFourth\nFifth",
            "content": "Content that is long enough",
            "coding_task": "Write a small program"
        })
    }

    fn quiz(n: usize) -> Value {
        json!({
            "question": format!("Question number {n}?"),
            "options": ["a", "b", "c", "d"],
            "correct_answer": "c"
        })
    }

    fn good() -> BySection {
        BySection {
            modules: json!({"modules": [{"name": "Basics", "lessons": [lesson(1), lesson(2), lesson(3)]}]}).to_string(),
            // Fenced, with prose and a missing comma; the normalizer handles it.
            tasks: "Here you go:\n```json\n{\"tasks\": [\"Day 1: read\" \"Day 2: write\"]}\n```".into(),
            quizzes: json!([quiz(1), quiz(2), quiz(3)]).to_string(),
            plan: json!({"practice_plan": ["Daily: code", "Weekly: build", "Monthly: ship"]}).to_string(),
        }
    }

    async fn assemble(backend: BySection, days: u32) -> Result<Course, AssemblyError> {
        let prompts = Prompts::default();
        let bounds = Bounds::default();
        let client = GenerationClient::new(Arc::new(backend), &BackendSettings::default(), &prompts);
        CourseAssembler::new(&client, &prompts, &bounds, 2)
            .assemble_course("Rust", Level::Intermediate, days)
            .await
    }

    #[tokio::test]
    async fn merges_all_sections_into_a_valid_course() {
        let course = assemble(good(), 2).await.unwrap();
        assert_eq!(course.topic, "Rust");
        assert_eq!(course.level, Level::Intermediate);
        assert_eq!(course.tasks, vec!["Day 1: read", "Day 2: write"]);
        assert_eq!(course.quizzes.len(), 3);
        assert!(course.modules[0].lessons[0].key_takeaway.is_none());
    }

    #[tokio::test]
    async fn empty_section_fails_the_assembly() {
        let backend = BySection { quizzes: json!({"quizzes": []}).to_string(), ..good() };
        let err = assemble(backend, 2).await.unwrap_err();
        assert_eq!(err, AssemblyError::EmptySection(Section::Quizzes));
    }

    #[tokio::test]
    async fn missing_section_key_fails_the_assembly() {
        let backend = BySection { plan: json!({"plan": ["Daily: x"]}).to_string(), ..good() };
        let err = assemble(backend, 2).await.unwrap_err();
        assert_eq!(err, AssemblyError::EmptySection(Section::PracticePlan));
    }

    #[tokio::test]
    async fn invalid_fragment_is_rejected_before_merge() {
        let bad = json!({"quizzes": [{"question": "Question number 1?", "options": ["a", "b"], "correct_answer": "a"}]});
        let backend = BySection { quizzes: bad.to_string(), ..good() };
        let err = assemble(backend, 2).await.unwrap_err();
        assert!(matches!(
            err,
            AssemblyError::InvalidFragment { section: Section::Quizzes, source: ValidationError::QuizOptionCount { .. } }
        ));
    }

    #[tokio::test]
    async fn merged_course_gets_cross_field_checks() {
        // Two tasks cannot cover five days.
        let err = assemble(good(), 5).await.unwrap_err();
        assert_eq!(
            err,
            AssemblyError::InvalidCourse(ValidationError::NotEnoughTasks { days: 5, tasks: 2 })
        );
    }

    #[tokio::test]
    async fn generation_failure_names_the_section() {
        let backend = BySection { modules: "not json at all".into(), ..good() };
        let err = assemble(backend, 2).await.unwrap_err();
        assert!(matches!(
            err,
            AssemblyError::Generation { section: Section::Modules, source: GenerationError::Exhausted { attempts: 2, .. } }
        ));
    }

    #[test]
    fn section_extraction() {
        assert_eq!(extract_section(json!({"tasks": ["a"]}), Section::Tasks), Some(json!(["a"])));
        assert_eq!(extract_section(json!(["a"]), Section::Tasks), Some(json!(["a"])));
        assert_eq!(extract_section(json!({"tasks": null}), Section::Tasks), None);
        assert_eq!(extract_section(json!("tasks"), Section::Tasks), None);
    }
}
