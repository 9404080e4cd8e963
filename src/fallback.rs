//! Built-in course content used when the generative backend is unavailable or
//! its output is rejected. Everything here is static and deterministic.
//!
//! Template selection is a case-insensitive substring match over `DISPATCH`;
//! topics that match nothing get the web-development template.

use tracing::{debug, instrument};

use crate::config::Bounds;
use crate::domain::{Cadence, Course, Lesson, Level, Module, Quiz};
use crate::error::ValidationError;
use crate::validate::{validate_course, MAX_DAYS};

struct LessonTemplate {
  title: &'static str,
  explanation: &'static [&'static str],
  content: &'static str,
  coding_task: &'static str,
  key_takeaway: &'static str,
}

struct ModuleTemplate {
  name: &'static str,
  lessons: &'static [LessonTemplate],
}

struct QuizTemplate {
  question: &'static str,
  options: &'static [&'static str],
  correct_answer: &'static str,
}

pub struct CourseTemplate {
  pub name: &'static str,
  modules: &'static [ModuleTemplate],
  quizzes: &'static [QuizTemplate],
}

/// Substring (lowercase) -> template. First match wins.
static DISPATCH: &[(&str, &CourseTemplate)] = &[("c++", &CPP)];

static DEFAULT_TEMPLATE: &CourseTemplate = &WEB_DEV;

const PRACTICE_PLAN: [(Cadence, &str); 3] = [
  (Cadence::Daily, "Study theory and complete coding exercises"),
  (Cadence::Weekly, "Work on a small project applying learned concepts"),
  (Cadence::Monthly, "Build a comprehensive project combining all skills"),
];

pub fn select_template(topic: &str) -> &'static CourseTemplate {
  let needle = topic.to_lowercase();
  DISPATCH
    .iter()
    .find(|(key, _)| needle.contains(key))
    .map(|(_, tpl)| *tpl)
    .unwrap_or(DEFAULT_TEMPLATE)
}

/// `"Day {n}: ..."` for n in 1..=days.
pub fn daily_tasks(days: u32) -> Vec<String> {
  (1..=days)
    .map(|n| format!("Day {n}: Complete the daily module and practice exercises"))
    .collect()
}

pub fn practice_plan() -> Vec<String> {
  PRACTICE_PLAN
    .iter()
    .map(|(cadence, text)| format!("{} {}", cadence.prefix(), text))
    .collect()
}

/// Compose a course from the built-in templates and run it through the same
/// validator as generated courses. An error here means the templates do not fit
/// the configured bounds.
#[instrument(level = "info", skip_all, fields(%topic, %level, days = days))]
pub fn compose_fallback(topic: &str, level: Level, days: u32, bounds: &Bounds) -> Result<Course, ValidationError> {
  let template = select_template(topic);
  debug!(target: "course", template = template.name, "Composing fallback course");
  compose_from(template, topic, level, days, bounds)
}

/// Compose every template at both ends of the day range. Run once at startup so
/// that bounds the templates cannot satisfy are caught before serving requests.
pub fn check_templates(bounds: &Bounds) -> Result<(), (&'static str, ValidationError)> {
  let templates = DISPATCH.iter().map(|(_, tpl)| *tpl).chain(std::iter::once(DEFAULT_TEMPLATE));
  for template in templates {
    for days in [1, MAX_DAYS as u32] {
      compose_from(template, template.name, Level::Beginner, days, bounds)
        .map_err(|e| (template.name, e))?;
    }
  }
  Ok(())
}

fn compose_from(
  template: &CourseTemplate,
  topic: &str,
  level: Level,
  days: u32,
  bounds: &Bounds,
) -> Result<Course, ValidationError> {
  let modules = template
    .modules
    .iter()
    .map(|m| Module {
      name: m.name.to_string(),
      lessons: m
        .lessons
        .iter()
        .take(bounds.max_lessons_per_module)
        .map(|l| Lesson {
          title: l.title.to_string(),
          explanation: l.explanation.join("\n"),
          content: l.content.to_string(),
          coding_task: Some(l.coding_task.to_string()),
          key_takeaway: Some(l.key_takeaway.to_string()),
        })
        .collect(),
    })
    .collect();

  let quizzes = template
    .quizzes
    .iter()
    .take(bounds.max_quizzes)
    .map(|q| Quiz {
      question: q.question.to_string(),
      options: q.options.iter().map(|o| o.to_string()).collect(),
      correct_answer: q.correct_answer.to_string(),
    })
    .collect();

  let course = Course {
    topic: topic.trim().to_string(),
    level,
    days,
    modules,
    tasks: daily_tasks(days),
    quizzes,
    practice_plan: practice_plan(),
  };
  validate_course(&course, bounds)?;
  Ok(course)
}

// --- Templates ---

static CPP: CourseTemplate = CourseTemplate {
  name: "cpp",
  modules: &[
    ModuleTemplate {
      name: "Day 1: Introduction to C++",
      lessons: &[
        LessonTemplate {
          title: "Getting Started with C++",
          explanation: &[
            "C++ is a general-purpose programming language that extends C with object-oriented features.",
            "It was created by Bjarne Stroustrup and first released in 1985.",
            "Programs are compiled ahead of time into native machine code.",
            "This gives direct control over memory layout and very predictable performance.",
            "C++ is used for operating systems, game engines, embedded devices and trading systems.",
            "Every program starts executing in the main function.",
          ],
          content: "Basic syntax, the structure of a program, and compiling your first file.",
          coding_task: "Write a program that prints your name and the current year using std::cout.",
          key_takeaway: "C++ combines low-level control with high-level abstractions.",
        },
        LessonTemplate {
          title: "Variables and Data Types",
          explanation: &[
            "Every variable in C++ has a static type fixed at compile time.",
            "Fundamental types include int, double, char and bool.",
            "The auto keyword lets the compiler deduce a type from its initializer.",
            "Uninitialized local variables hold indeterminate values, so always initialize them.",
            "const marks a variable as read-only after initialization.",
            "Choosing the right type affects both correctness and memory use.",
          ],
          content: "Declaring, initializing and converting int, double, char and bool values.",
          coding_task: "Declare variables of four different types, perform arithmetic on them and print the results.",
          key_takeaway: "Always initialize variables and prefer const where the value never changes.",
        },
        LessonTemplate {
          title: "Control Flow",
          explanation: &[
            "Control flow decides which statements run and how often.",
            "if and else choose between branches based on a condition.",
            "switch selects among many cases for an integral value.",
            "for, while and do-while loops repeat a block of code.",
            "break leaves a loop early and continue skips to the next iteration.",
            "Range-based for loops iterate directly over containers.",
          ],
          content: "Conditional statements, loops and range-based iteration.",
          coding_task: "Print the numbers from 1 to 100, replacing multiples of 3 with Fizz and multiples of 5 with Buzz.",
          key_takeaway: "Clear control flow keeps programs easy to reason about.",
        },
      ],
    },
    ModuleTemplate {
      name: "Day 2: Functions and Memory",
      lessons: &[
        LessonTemplate {
          title: "Functions",
          explanation: &[
            "Functions group reusable logic behind a name and a signature.",
            "Parameters can be passed by value, by reference or by const reference.",
            "Passing large objects by const reference avoids unnecessary copies.",
            "Functions can be overloaded when their parameter lists differ.",
            "Declarations usually live in headers and definitions in source files.",
            "Small, focused functions are easier to test and reuse.",
          ],
          content: "Declaring, defining and calling functions with different parameter passing styles.",
          coding_task: "Write a function that returns the largest element of a std::vector<int> passed by const reference.",
          key_takeaway: "Pass by const reference for large inputs and by value for small ones.",
        },
        LessonTemplate {
          title: "Pointers and References",
          explanation: &[
            "A pointer stores the address of another object.",
            "A reference is an alias that must be bound when it is created.",
            "The address-of operator & takes an address and * dereferences a pointer.",
            "nullptr represents a pointer that points to nothing.",
            "Dangling pointers refer to objects that no longer exist and cause undefined behavior.",
            "Prefer references when a value must always be present.",
          ],
          content: "Working with addresses, dereferencing, and the difference between pointers and references.",
          coding_task: "Write a swap function twice: once taking pointers and once taking references.",
          key_takeaway: "References are safer aliases; pointers can be null and must be checked.",
        },
        LessonTemplate {
          title: "Dynamic Memory and RAII",
          explanation: &[
            "Objects created with new live until they are explicitly deleted.",
            "Forgetting to delete leaks memory and deleting twice corrupts the heap.",
            "RAII ties the lifetime of a resource to the lifetime of an object.",
            "std::unique_ptr owns a resource exclusively and frees it automatically.",
            "std::shared_ptr shares ownership through reference counting.",
            "Modern C++ rarely needs raw new and delete.",
          ],
          content: "Heap allocation, ownership, and smart pointers from the standard library.",
          coding_task: "Rewrite a program that uses new and delete so that it uses std::unique_ptr instead.",
          key_takeaway: "Let smart pointers and RAII manage resource lifetimes for you.",
        },
      ],
    },
  ],
  quizzes: &[
    QuizTemplate {
      question: "Which of the following is NOT a key feature of C++?",
      options: &[
        "Object-oriented programming",
        "Automatic garbage collection",
        "Low-level memory manipulation",
        "Compilation to native code",
      ],
      correct_answer: "Automatic garbage collection",
    },
    QuizTemplate {
      question: "Which keyword lets the compiler deduce a variable's type?",
      options: &["auto", "var", "let", "dynamic"],
      correct_answer: "auto",
    },
    QuizTemplate {
      question: "What does std::unique_ptr provide?",
      options: &[
        "Exclusive ownership with automatic cleanup",
        "Shared ownership through reference counting",
        "A pointer that can never be null",
        "Garbage-collected memory",
      ],
      correct_answer: "Exclusive ownership with automatic cleanup",
    },
    QuizTemplate {
      question: "Which statement skips to the next loop iteration?",
      options: &["continue", "break", "return", "goto"],
      correct_answer: "continue",
    },
  ],
};

static WEB_DEV: CourseTemplate = CourseTemplate {
  name: "web_dev",
  modules: &[
    ModuleTemplate {
      name: "Day 1: Introduction to Web Development",
      lessons: &[
        LessonTemplate {
          title: "Understanding Web Development Fundamentals",
          explanation: &[
            "Web development is the process of creating websites and web applications.",
            "A browser requests pages from a server over HTTP and renders the response.",
            "HTML structures the content of a page.",
            "CSS styles the presentation of that content.",
            "JavaScript adds interactivity and dynamic behavior.",
            "Together these three technologies form the core of every website.",
          ],
          content: "How browsers, servers and the three core web technologies fit together.",
          coding_task: "Create an HTML page with a header, a navigation menu, a main content area and a footer.",
          key_takeaway: "Web development combines HTML, CSS and JavaScript to build interactive websites.",
        },
        LessonTemplate {
          title: "HTML Structure and Semantics",
          explanation: &[
            "An HTML document is a tree of nested elements.",
            "The head holds metadata and the body holds visible content.",
            "Semantic elements such as header, nav, main and footer describe their purpose.",
            "Headings from h1 to h6 create a document outline.",
            "Links and images connect a page to other resources.",
            "Semantic markup improves accessibility and search ranking.",
          ],
          content: "Document structure, semantic elements, links, images and lists.",
          coding_task: "Build a personal profile page using only semantic HTML elements.",
          key_takeaway: "Choose elements for their meaning, not for how they look.",
        },
        LessonTemplate {
          title: "Styling with CSS",
          explanation: &[
            "CSS rules pair a selector with a block of declarations.",
            "Selectors target elements by tag, class, id or attribute.",
            "The cascade and specificity decide which rule wins.",
            "The box model describes content, padding, border and margin.",
            "Flexbox and grid handle most page layouts.",
            "Keeping styles in a separate stylesheet keeps pages maintainable.",
          ],
          content: "Selectors, the cascade, the box model and flexbox layouts.",
          coding_task: "Style your profile page with an external stylesheet and a flexbox navigation bar.",
          key_takeaway: "Understanding the cascade and the box model makes CSS predictable.",
        },
      ],
    },
    ModuleTemplate {
      name: "Day 2: Interactivity with JavaScript",
      lessons: &[
        LessonTemplate {
          title: "JavaScript Basics",
          explanation: &[
            "JavaScript is the programming language built into every browser.",
            "Variables are declared with let and const.",
            "Values include numbers, strings, booleans, objects and arrays.",
            "Functions are values that can be passed around and returned.",
            "The browser console is the quickest place to experiment.",
            "Scripts are usually loaded at the end of the body or with defer.",
          ],
          content: "Variables, types, functions and using the browser console.",
          coding_task: "Write a function that converts a temperature from Celsius to Fahrenheit and log the results.",
          key_takeaway: "Prefer const and let, and keep functions small and pure.",
        },
        LessonTemplate {
          title: "The DOM and Events",
          explanation: &[
            "The DOM is the live object model of the page.",
            "document.querySelector finds elements with CSS selectors.",
            "Changing element properties updates the page immediately.",
            "addEventListener runs code in response to clicks, input and other events.",
            "Event handlers receive an event object describing what happened.",
            "Reacting to events is what makes a page interactive.",
          ],
          content: "Selecting elements, updating content and handling user events.",
          coding_task: "Add a button that toggles a dark theme class on the page body when clicked.",
          key_takeaway: "JavaScript makes pages interactive by reacting to events and updating the DOM.",
        },
        LessonTemplate {
          title: "Fetching Data",
          explanation: &[
            "Web pages often load data from servers after the page has loaded.",
            "The fetch function sends HTTP requests and returns a promise.",
            "async and await make asynchronous code read like synchronous code.",
            "JSON is the most common format for exchanging data.",
            "Network requests can fail, so errors must be handled.",
            "Showing loading and error states keeps users informed.",
          ],
          content: "Making HTTP requests with fetch, async/await and JSON.",
          coding_task: "Fetch a list of items from a public JSON API and render them as an HTML list.",
          key_takeaway: "Always handle failures when loading data over the network.",
        },
      ],
    },
  ],
  quizzes: &[
    QuizTemplate {
      question: "Which language is responsible for styling web pages?",
      options: &["HTML", "CSS", "JavaScript", "Python"],
      correct_answer: "CSS",
    },
    QuizTemplate {
      question: "Which HTML element describes the main navigation of a page?",
      options: &["nav", "div", "span", "section"],
      correct_answer: "nav",
    },
    QuizTemplate {
      question: "Which method attaches a click handler to an element?",
      options: &["addEventListener", "querySelector", "appendChild", "setAttribute"],
      correct_answer: "addEventListener",
    },
    QuizTemplate {
      question: "What does the fetch function return?",
      options: &["A promise", "A string", "An HTML element", "A CSS rule"],
      correct_answer: "A promise",
    },
  ],
};
