//! Course validation.
//!
//! Two layers:
//! - structural checks over raw `serde_json::Value` (required fields, shapes,
//!   option counts), run in a fixed order and stopping at the first failure;
//! - cross-field checks over a typed `Course` (lengths, cardinality bounds,
//!   quiz consistency, cadence coverage, one task per day).
//!
//! Both the generated and the fallback path go through `validate_course`.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::config::Bounds;
use crate::domain::{Cadence, Course, Level, Section};
use crate::error::ValidationError;

pub const MIN_TOPIC_CHARS: usize = 2;
pub const MAX_DAYS: i64 = 30;
pub const MIN_PRACTICE_PLAN_ENTRIES: usize = 3;

const MIN_NAME_CHARS: usize = 3;
const MIN_TEXT_CHARS: usize = 10;

const REQUIRED_COURSE_FIELDS: [&str; 7] =
    ["topic", "level", "days", "modules", "tasks", "quizzes", "practice_plan"];
const REQUIRED_LESSON_FIELDS: [&str; 3] = ["title", "explanation", "content"];
const REQUIRED_QUIZ_FIELDS: [&str; 3] = ["question", "options", "correct_answer"];

/// A course request that passed input validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub topic: String,
    pub level: Level,
    pub days: u32,
}

pub fn validate_request(topic: &str, level: &str, days: i64) -> Result<ValidatedRequest, ValidationError> {
    let topic = topic.trim();
    if topic.chars().count() < MIN_TOPIC_CHARS {
        return Err(ValidationError::InvalidTopic);
    }
    let level = level
        .parse::<Level>()
        .map_err(ValidationError::InvalidLevel)?;
    if !(1..=MAX_DAYS).contains(&days) {
        return Err(ValidationError::InvalidDays(days));
    }
    Ok(ValidatedRequest { topic: topic.to_string(), level, days: days as u32 })
}

// ---------------------------------------------------------------------------
// Structural checks over untyped JSON
// ---------------------------------------------------------------------------

/// Check a whole candidate course document. Order: required top-level fields,
/// modules, quizzes, tasks, practice plan.
pub fn validate_candidate(candidate: &Value, bounds: &Bounds) -> Result<(), ValidationError> {
    let obj = as_object(candidate, "course")?;
    for field in REQUIRED_COURSE_FIELDS {
        require(obj, field, field)?;
    }
    check_modules(&obj["modules"], "modules")?;
    check_quizzes(&obj["quizzes"], "quizzes", bounds)?;
    check_non_empty_list(&obj["tasks"], "tasks")?;
    check_non_empty_list(&obj["practice_plan"], "practice_plan")?;
    Ok(())
}

/// Check one generated section (the array stored under the section key).
pub fn validate_section(section: Section, value: &Value, bounds: &Bounds) -> Result<(), ValidationError> {
    let key = section.key();
    match section {
        Section::Modules => check_modules(value, key),
        Section::Quizzes => check_quizzes(value, key, bounds),
        Section::Tasks | Section::PracticePlan => check_non_empty_list(value, key),
    }
}

fn check_modules(value: &Value, path: &str) -> Result<(), ValidationError> {
    let modules = non_empty_array(value, path)?;
    for (i, module) in modules.iter().enumerate() {
        let mpath = format!("{path}[{i}]");
        let obj = as_object(module, &mpath)?;
        require(obj, "name", &format!("{mpath}.name"))?;
        let lessons_path = format!("{mpath}.lessons");
        let lessons = non_empty_array(require(obj, "lessons", &lessons_path)?, &lessons_path)?;
        for (j, lesson) in lessons.iter().enumerate() {
            let lpath = format!("{lessons_path}[{j}]");
            let lobj = as_object(lesson, &lpath)?;
            for field in REQUIRED_LESSON_FIELDS {
                require_str(lobj, field, &format!("{lpath}.{field}"))?;
            }
        }
    }
    Ok(())
}

fn check_quizzes(value: &Value, path: &str, bounds: &Bounds) -> Result<(), ValidationError> {
    let quizzes = non_empty_array(value, path)?;
    for (i, quiz) in quizzes.iter().enumerate() {
        let qpath = format!("{path}[{i}]");
        let obj = as_object(quiz, &qpath)?;
        for field in REQUIRED_QUIZ_FIELDS {
            require(obj, field, &format!("{qpath}.{field}"))?;
        }
        let options = obj["options"].as_array().ok_or_else(|| ValidationError::WrongType {
            field: format!("{qpath}.options"),
            expected: "array",
        })?;
        if options.len() != bounds.quiz_options_count {
            return Err(ValidationError::QuizOptionCount {
                field: qpath,
                expected: bounds.quiz_options_count,
                actual: options.len(),
            });
        }
    }
    Ok(())
}

fn check_non_empty_list(value: &Value, path: &str) -> Result<(), ValidationError> {
    non_empty_array(value, path).map(|_| ())
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, ValidationError> {
    value.as_object().ok_or_else(|| ValidationError::WrongType {
        field: path.to_string(),
        expected: "object",
    })
}

fn non_empty_array<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>, ValidationError> {
    let items = value.as_array().ok_or_else(|| ValidationError::WrongType {
        field: path.to_string(),
        expected: "array",
    })?;
    if items.is_empty() {
        return Err(ValidationError::EmptyField { field: path.to_string() });
    }
    Ok(items)
}

/// Present and not null.
fn require<'a>(obj: &'a Map<String, Value>, key: &str, path: &str) -> Result<&'a Value, ValidationError> {
    match obj.get(key) {
        Some(v) if !v.is_null() => Ok(v),
        _ => Err(ValidationError::MissingField { field: path.to_string() }),
    }
}

fn require_str<'a>(obj: &'a Map<String, Value>, key: &str, path: &str) -> Result<&'a str, ValidationError> {
    require(obj, key, path)?.as_str().ok_or_else(|| ValidationError::WrongType {
        field: path.to_string(),
        expected: "string",
    })
}

// ---------------------------------------------------------------------------
// Cross-field checks over a typed course
// ---------------------------------------------------------------------------

pub fn validate_course(course: &Course, bounds: &Bounds) -> Result<(), ValidationError> {
    min_chars(&course.topic, MIN_TOPIC_CHARS, "topic")?;
    if !(1..=MAX_DAYS).contains(&i64::from(course.days)) {
        return Err(ValidationError::InvalidDays(i64::from(course.days)));
    }

    if course.modules.is_empty() {
        return Err(ValidationError::EmptyField { field: "modules".into() });
    }
    for (i, module) in course.modules.iter().enumerate() {
        let mpath = format!("modules[{i}]");
        min_chars(&module.name, MIN_NAME_CHARS, &format!("{mpath}.name"))?;
        within(
            module.lessons.len(),
            bounds.min_lessons_per_module,
            bounds.max_lessons_per_module,
            &format!("{mpath}.lessons"),
        )?;
        for (j, lesson) in module.lessons.iter().enumerate() {
            let lpath = format!("{mpath}.lessons[{j}]");
            min_chars(&lesson.title, MIN_NAME_CHARS, &format!("{lpath}.title"))?;
            min_chars(&lesson.explanation, MIN_TEXT_CHARS, &format!("{lpath}.explanation"))?;
            let lines = explanation_lines(&lesson.explanation);
            if lines < bounds.min_explanation_lines || lines > bounds.max_explanation_lines {
                return Err(ValidationError::ExplanationLines {
                    field: format!("{lpath}.explanation"),
                    min: bounds.min_explanation_lines,
                    max: bounds.max_explanation_lines,
                    actual: lines,
                });
            }
            min_chars(&lesson.content, MIN_TEXT_CHARS, &format!("{lpath}.content"))?;
            if let Some(task) = &lesson.coding_task {
                min_chars(task, MIN_TEXT_CHARS, &format!("{lpath}.coding_task"))?;
            }
            if let Some(takeaway) = &lesson.key_takeaway {
                min_chars(takeaway, MIN_TEXT_CHARS, &format!("{lpath}.key_takeaway"))?;
            }
        }
    }

    within(course.quizzes.len(), bounds.min_quizzes, bounds.max_quizzes, "quizzes")?;
    for (i, quiz) in course.quizzes.iter().enumerate() {
        let qpath = format!("quizzes[{i}]");
        min_chars(&quiz.question, MIN_TEXT_CHARS, &format!("{qpath}.question"))?;
        if quiz.options.len() != bounds.quiz_options_count {
            return Err(ValidationError::QuizOptionCount {
                field: qpath,
                expected: bounds.quiz_options_count,
                actual: quiz.options.len(),
            });
        }
        let mut seen = HashSet::new();
        if quiz.options.iter().any(|o| o.trim().is_empty() || !seen.insert(o.as_str())) {
            return Err(ValidationError::QuizOptionsInvalid { field: qpath });
        }
        if !quiz.options.contains(&quiz.correct_answer) {
            return Err(ValidationError::CorrectAnswerNotInOptions { field: qpath });
        }
    }

    if course.tasks.len() < course.days as usize {
        return Err(ValidationError::NotEnoughTasks { days: course.days, tasks: course.tasks.len() });
    }
    if let Some(i) = course.tasks.iter().position(|t| t.trim().is_empty()) {
        return Err(ValidationError::EmptyField { field: format!("tasks[{i}]") });
    }

    validate_practice_plan(&course.practice_plan)
}

/// Every entry carries a cadence prefix and every cadence is covered.
pub fn validate_practice_plan(plan: &[String]) -> Result<(), ValidationError> {
    if plan.len() < MIN_PRACTICE_PLAN_ENTRIES {
        return Err(ValidationError::TooFew {
            field: "practice_plan".into(),
            min: MIN_PRACTICE_PLAN_ENTRIES,
            actual: plan.len(),
        });
    }
    let mut covered = HashSet::new();
    for (i, entry) in plan.iter().enumerate() {
        let cadence = Cadence::of_entry(entry)
            .ok_or_else(|| ValidationError::UnknownCadence { field: format!("practice_plan[{i}]") })?;
        covered.insert(cadence);
    }
    match Cadence::ALL.into_iter().find(|c| !covered.contains(c)) {
        Some(missing) => Err(ValidationError::MissingCadence { cadence: missing.label() }),
        None => Ok(()),
    }
}

/// Line count as the model sees it; a trailing line break does not add a line.
pub fn explanation_lines(text: &str) -> usize {
    text.trim_end().split('\n').count()
}

fn min_chars(text: &str, min: usize, field: &str) -> Result<(), ValidationError> {
    let actual = text.trim().chars().count();
    if actual < min {
        return Err(ValidationError::TooShort { field: field.to_string(), min, actual });
    }
    Ok(())
}

fn within(actual: usize, min: usize, max: usize, field: &str) -> Result<(), ValidationError> {
    if actual < min || actual > max {
        return Err(ValidationError::Cardinality { field: field.to_string(), min, max, actual });
    }
    Ok(())
}

impl Course {
    /// Structural check, typed decode, then cross-field check.
    pub fn from_candidate(candidate: Value, bounds: &Bounds) -> Result<Course, ValidationError> {
        validate_candidate(&candidate, bounds)?;
        let course: Course =
            serde_json::from_value(candidate).map_err(|e| ValidationError::Malformed(e.to_string()))?;
        validate_course(&course, bounds)?;
        Ok(course)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn explanation() -> String {
        ["one line here", "two", "three", "four", "five"].join("\n")
    }

    fn lesson(n: usize) -> Value {
        json!({
            "title": format!("Lesson {n}"),
            "explanation": explanation(),
            "content": "Content that is long enough",
            "coding_task": "Write a small program",
            "key_takeaway": "Remember the basics well"
        })
    }

    fn quiz(n: usize) -> Value {
        json!({
            "question": format!("Question number {n}?"),
            "options": ["alpha", "beta", "gamma", "delta"],
            "correct_answer": "beta"
        })
    }

    fn candidate() -> Value {
        json!({
            "topic": "Rust",
            "level": "beginner",
            "days": 2,
            "modules": [{ "name": "Basics", "lessons": [lesson(1), lesson(2), lesson(3)] }],
            "tasks": ["Day 1: read", "Day 2: write"],
            "quizzes": [quiz(1), quiz(2), quiz(3)],
            "practice_plan": ["Daily: code", "Weekly: project", "Monthly: review"]
        })
    }

    fn bounds() -> Bounds {
        Bounds::default()
    }

    #[test]
    fn well_formed_candidate_is_accepted() {
        let course = Course::from_candidate(candidate(), &bounds()).unwrap();
        assert_eq!(course.level, Level::Beginner);
        assert_eq!(course.modules[0].lessons.len(), 3);
    }

    #[test]
    fn missing_top_level_field_is_named() {
        for field in REQUIRED_COURSE_FIELDS {
            let mut c = candidate();
            c.as_object_mut().unwrap().remove(field);
            let err = validate_candidate(&c, &bounds()).unwrap_err();
            assert_eq!(err, ValidationError::MissingField { field: field.to_string() });
            assert!(err.to_string().contains(field));
        }
    }

    #[test]
    fn first_failure_wins() {
        let mut c = candidate();
        c["modules"] = json!([]);
        c["quizzes"] = json!([]);
        let err = validate_candidate(&c, &bounds()).unwrap_err();
        assert_eq!(err, ValidationError::EmptyField { field: "modules".into() });
    }

    #[test]
    fn lesson_missing_content_is_named_by_path() {
        let mut c = candidate();
        c["modules"][0]["lessons"][1].as_object_mut().unwrap().remove("content");
        let err = validate_candidate(&c, &bounds()).unwrap_err();
        assert_eq!(err, ValidationError::MissingField { field: "modules[0].lessons[1].content".into() });
    }

    #[test]
    fn module_without_lessons_is_rejected() {
        let mut c = candidate();
        c["modules"][0]["lessons"] = json!([]);
        let err = validate_candidate(&c, &bounds()).unwrap_err();
        assert_eq!(err, ValidationError::EmptyField { field: "modules[0].lessons".into() });
    }

    #[test]
    fn quiz_option_count_is_structural() {
        let mut c = candidate();
        c["quizzes"][2]["options"] = json!(["a", "b", "c"]);
        let err = validate_candidate(&c, &bounds()).unwrap_err();
        assert_eq!(err, ValidationError::QuizOptionCount { field: "quizzes[2]".into(), expected: 4, actual: 3 });
    }

    #[test]
    fn correct_answer_must_be_an_option() {
        let mut c = candidate();
        c["quizzes"][0]["correct_answer"] = json!("epsilon");
        let err = Course::from_candidate(c, &bounds()).unwrap_err();
        assert_eq!(err, ValidationError::CorrectAnswerNotInOptions { field: "quizzes[0]".into() });
    }

    #[test]
    fn duplicate_or_blank_options_are_rejected() {
        let mut c = candidate();
        c["quizzes"][1]["options"] = json!(["alpha", "beta", "beta", "delta"]);
        assert_eq!(
            Course::from_candidate(c, &bounds()).unwrap_err(),
            ValidationError::QuizOptionsInvalid { field: "quizzes[1]".into() }
        );
        let mut c = candidate();
        c["quizzes"][1]["options"] = json!(["alpha", "beta", "  ", "delta"]);
        assert!(matches!(
            Course::from_candidate(c, &bounds()),
            Err(ValidationError::QuizOptionsInvalid { .. })
        ));
    }

    #[test]
    fn practice_plan_must_cover_every_cadence() {
        let mut c = candidate();
        c["practice_plan"] = json!(["Daily: code", "Weekly: project", "Weekly: review"]);
        let err = Course::from_candidate(c, &bounds()).unwrap_err();
        assert_eq!(err, ValidationError::MissingCadence { cadence: "monthly" });
    }

    #[test]
    fn practice_plan_entries_need_a_prefix() {
        let plan: Vec<String> = ["Daily: a", "Weekly: b", "Monthly: c", "Sometimes: d"]
            .iter().map(|s| s.to_string()).collect();
        assert_eq!(
            validate_practice_plan(&plan).unwrap_err(),
            ValidationError::UnknownCadence { field: "practice_plan[3]".into() }
        );
    }

    #[test]
    fn short_practice_plan_is_rejected() {
        let plan = vec!["Daily: a".to_string(), "Weekly: b".to_string()];
        assert!(matches!(validate_practice_plan(&plan), Err(ValidationError::TooFew { actual: 2, .. })));
    }

    #[test]
    fn fewer_tasks_than_days_is_rejected() {
        let mut c = candidate();
        c["days"] = json!(3);
        let err = Course::from_candidate(c, &bounds()).unwrap_err();
        assert_eq!(err, ValidationError::NotEnoughTasks { days: 3, tasks: 2 });
    }

    #[test]
    fn explanation_line_bounds() {
        let mut c = candidate();
        c["modules"][0]["lessons"][0]["explanation"] = json!("only\ntwo lines of text");
        let err = Course::from_candidate(c, &bounds()).unwrap_err();
        assert!(matches!(err, ValidationError::ExplanationLines { actual: 2, .. }));
        assert_eq!(explanation_lines("a\nb\nc\n"), 3);
    }

    #[test]
    fn lesson_count_bounds() {
        let mut c = candidate();
        c["modules"][0]["lessons"] = json!([lesson(1), lesson(2)]);
        let err = Course::from_candidate(c, &bounds()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Cardinality { field: "modules[0].lessons".into(), min: 3, max: 5, actual: 2 }
        );
    }

    #[test]
    fn quiz_count_bounds() {
        let mut c = candidate();
        c["quizzes"] = json!([quiz(1), quiz(2), quiz(3), quiz(4), quiz(5), quiz(6)]);
        assert!(matches!(
            Course::from_candidate(c, &bounds()),
            Err(ValidationError::Cardinality { actual: 6, .. })
        ));
    }

    #[test]
    fn short_optional_fields_are_rejected_when_present() {
        let mut c = candidate();
        c["modules"][0]["lessons"][2]["coding_task"] = json!("tiny");
        let err = Course::from_candidate(c, &bounds()).unwrap_err();
        assert!(err.to_string().contains("modules[0].lessons[2].coding_task"));

        let mut c = candidate();
        c["modules"][0]["lessons"][2]["coding_task"] = Value::Null;
        assert!(Course::from_candidate(c, &bounds()).is_ok());
    }

    #[test]
    fn wrong_types_are_malformed_or_structural() {
        let mut c = candidate();
        c["tasks"] = json!("Day 1: everything");
        assert_eq!(
            validate_candidate(&c, &bounds()).unwrap_err(),
            ValidationError::WrongType { field: "tasks".into(), expected: "array" }
        );
        let mut c = candidate();
        c["tasks"] = json!([1, 2]);
        assert!(matches!(Course::from_candidate(c, &bounds()), Err(ValidationError::Malformed(_))));
    }

    #[test]
    fn section_checks_only_look_at_their_section() {
        let modules = candidate()["modules"].clone();
        assert!(validate_section(Section::Modules, &modules, &bounds()).is_ok());
        assert_eq!(
            validate_section(Section::Tasks, &json!([]), &bounds()).unwrap_err(),
            ValidationError::EmptyField { field: "tasks".into() }
        );
        let bad_quiz = json!([{ "question": "Who?", "options": ["a", "b"] }]);
        assert_eq!(
            validate_section(Section::Quizzes, &bad_quiz, &bounds()).unwrap_err(),
            ValidationError::MissingField { field: "quizzes[0].correct_answer".into() }
        );
    }

    #[test]
    fn request_validation() {
        let ok = validate_request("  Rust ", "Intermediate", 7).unwrap();
        assert_eq!(ok, ValidatedRequest { topic: "Rust".into(), level: Level::Intermediate, days: 7 });
        assert_eq!(validate_request("R", "beginner", 1).unwrap_err(), ValidationError::InvalidTopic);
        assert_eq!(
            validate_request("Rust", "expert", 1).unwrap_err(),
            ValidationError::InvalidLevel("expert".into())
        );
        assert_eq!(validate_request("Rust", "beginner", 0).unwrap_err(), ValidationError::InvalidDays(0));
        assert_eq!(validate_request("Rust", "beginner", 31).unwrap_err(), ValidationError::InvalidDays(31));
    }
}
