//! Test plan schema and validation.
//!
//! Plans arrive as untyped JSON. `validate_plan` walks the value once, collects
//! every violated constraint, and only builds a typed `TestSuite` when there
//! are none, so callers never see a partially typed plan.
use crate::error::PlanError;
use crate::runtime::Runtime;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;

const SUITE_KEYS: &[&str] = &["suiteName", "source", "tags", "tests"];
const SOURCE_KEYS: &[&str] = &["repo", "path"];
const TEST_KEYS: &[&str] = &["name", "startUrl", "tags", "steps"];

/// A validated plan: one generated test file's worth of test cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSuite {
    pub suite_name: String,
    pub source: PlanSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    pub tests: Vec<TestCase>,
}

/// Where the human-authored acceptance criteria live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanSource {
    pub repo: String,
    pub path: String,
}

impl PlanSource {
    /// `repo/path`, the reference embedded in generated suites.
    pub fn reference(&self) -> String {
        format!("{}/{}", self.repo, self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub name: String,
    pub start_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    pub steps: Vec<Step>,
}

/// Serializes back to the plan wire shape, e.g. `{"action":"click","target":"save"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Step {
    Goto { value: String },
    Click { target: String },
    Fill { target: String, value: String },
    Select { target: String, value: String },
    ExpectVisible { target: String },
    ExpectNotVisible { target: String },
    ExpectText { target: String, value: String },
    /// `value` is matched against the current URL as a pattern.
    ExpectUrl { value: String },
}

impl Step {
    pub fn target(&self) -> Option<&str> {
        match self {
            Step::Click { target }
            | Step::Fill { target, .. }
            | Step::Select { target, .. }
            | Step::ExpectVisible { target }
            | Step::ExpectNotVisible { target }
            | Step::ExpectText { target, .. } => Some(target),
            Step::Goto { .. } | Step::ExpectUrl { .. } => None,
        }
    }
}

/// Closed set of step actions and the fields each one requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Goto,
    Click,
    Fill,
    Select,
    ExpectVisible,
    ExpectNotVisible,
    ExpectText,
    ExpectUrl,
}

impl Action {
    const ALL: [Action; 8] = [
        Action::Goto,
        Action::Click,
        Action::Fill,
        Action::Select,
        Action::ExpectVisible,
        Action::ExpectNotVisible,
        Action::ExpectText,
        Action::ExpectUrl,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Action::Goto => "goto",
            Action::Click => "click",
            Action::Fill => "fill",
            Action::Select => "select",
            Action::ExpectVisible => "expectVisible",
            Action::ExpectNotVisible => "expectNotVisible",
            Action::ExpectText => "expectText",
            Action::ExpectUrl => "expectUrl",
        }
    }

    fn parse(raw: &str) -> Option<Action> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == raw)
    }

    fn needs_target(self) -> bool {
        !matches!(self, Action::Goto | Action::ExpectUrl)
    }

    fn needs_value(self) -> bool {
        matches!(
            self,
            Action::Goto | Action::Fill | Action::Select | Action::ExpectText | Action::ExpectUrl
        )
    }

    fn build(self, target: String, value: String) -> Step {
        match self {
            Action::Goto => Step::Goto { value },
            Action::Click => Step::Click { target },
            Action::Fill => Step::Fill { target, value },
            Action::Select => Step::Select { target, value },
            Action::ExpectVisible => Step::ExpectVisible { target },
            Action::ExpectNotVisible => Step::ExpectNotVisible { target },
            Action::ExpectText => Step::ExpectText { target, value },
            Action::ExpectUrl => Step::ExpectUrl { value },
        }
    }
}

/// One violated constraint, addressed by a JSON field path such as
/// `tests[0].steps[2].target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Read, parse, and validate a plan file.
pub fn load_plan(runtime: &dyn Runtime, path: &Path) -> Result<TestSuite, PlanError> {
    let text = runtime
        .read_to_string(path)
        .map_err(|source| PlanError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let value: Value = serde_json::from_str(&text).map_err(|source| PlanError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    validate_plan(&value).map_err(|issues| PlanError::Invalid {
        path: path.to_path_buf(),
        issues,
    })
}

/// Validate an untyped JSON value as a `TestSuite`.
pub fn validate_plan(value: &Value) -> Result<TestSuite, Vec<ValidationIssue>> {
    let mut checker = Checker::default();
    let suite = checker.suite(value);
    match suite {
        Some(suite) if checker.issues.is_empty() => Ok(suite),
        _ => Err(checker.issues),
    }
}

#[derive(Default)]
struct Checker {
    issues: Vec<ValidationIssue>,
}

impl Checker {
    fn push(&mut self, path: &str, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            path: path.to_string(),
            message: message.into(),
        });
    }

    fn object<'v>(&mut self, value: &'v Value, path: &str) -> Option<&'v Map<String, Value>> {
        match value.as_object() {
            Some(map) => Some(map),
            None => {
                self.push(path, format!("expected an object, got {}", kind_of(value)));
                None
            }
        }
    }

    fn strict_keys(&mut self, map: &Map<String, Value>, allowed: &[&str], path: &str) {
        for key in map.keys() {
            if !allowed.contains(&key.as_str()) {
                self.push(&join(path, key), "unrecognized key");
            }
        }
    }

    fn required_string(&mut self, map: &Map<String, Value>, key: &str, path: &str) -> Option<String> {
        let field = join(path, key);
        match map.get(key) {
            None => {
                self.push(&field, "required");
                None
            }
            Some(value) => self.non_empty_string(value, &field),
        }
    }

    fn non_empty_string(&mut self, value: &Value, path: &str) -> Option<String> {
        match value.as_str() {
            Some("") => {
                self.push(path, "must be a non-empty string");
                None
            }
            Some(text) => Some(text.to_string()),
            None => {
                self.push(path, format!("expected a string, got {}", kind_of(value)));
                None
            }
        }
    }

    /// `Some(None)` when absent, `Some(Some(..))` when valid, `None` on failure.
    fn optional_tags(&mut self, map: &Map<String, Value>, path: &str) -> Option<Option<Vec<String>>> {
        let Some(value) = map.get("tags") else {
            return Some(None);
        };
        let field = join(path, "tags");
        let Some(items) = value.as_array() else {
            self.push(&field, format!("expected an array, got {}", kind_of(value)));
            return None;
        };
        if items.is_empty() {
            self.push(&field, "must contain at least one tag");
            return None;
        }
        let mut tags = Vec::with_capacity(items.len());
        let mut ok = true;
        for (idx, item) in items.iter().enumerate() {
            match self.non_empty_string(item, &format!("{field}[{idx}]")) {
                Some(tag) => tags.push(tag),
                None => ok = false,
            }
        }
        ok.then_some(Some(tags))
    }

    fn suite(&mut self, value: &Value) -> Option<TestSuite> {
        let map = self.object(value, "")?;
        self.strict_keys(map, SUITE_KEYS, "");
        let suite_name = self.required_string(map, "suiteName", "");
        let source = match map.get("source") {
            None => {
                self.push("source", "required");
                None
            }
            Some(value) => self.source(value),
        };
        let tags = self.optional_tags(map, "");
        let tests = match map.get("tests") {
            None => {
                self.push("tests", "required");
                None
            }
            Some(value) => self.tests(value),
        };
        Some(TestSuite {
            suite_name: suite_name?,
            source: source?,
            tags: tags?,
            tests: tests?,
        })
    }

    fn source(&mut self, value: &Value) -> Option<PlanSource> {
        let map = self.object(value, "source")?;
        self.strict_keys(map, SOURCE_KEYS, "source");
        let repo = self.required_string(map, "repo", "source");
        let path = self.required_string(map, "path", "source");
        Some(PlanSource {
            repo: repo?,
            path: path?,
        })
    }

    fn tests(&mut self, value: &Value) -> Option<Vec<TestCase>> {
        let Some(items) = value.as_array() else {
            self.push("tests", format!("expected an array, got {}", kind_of(value)));
            return None;
        };
        if items.is_empty() {
            self.push("tests", "must contain at least one test");
            return None;
        }
        let mut tests = Vec::with_capacity(items.len());
        let mut ok = true;
        for (idx, item) in items.iter().enumerate() {
            match self.test_case(item, &format!("tests[{idx}]")) {
                Some(test) => tests.push(test),
                None => ok = false,
            }
        }
        ok.then_some(tests)
    }

    fn test_case(&mut self, value: &Value, path: &str) -> Option<TestCase> {
        let map = self.object(value, path)?;
        self.strict_keys(map, TEST_KEYS, path);
        let name = self.required_string(map, "name", path);
        let start_url = self.required_string(map, "startUrl", path);
        let tags = self.optional_tags(map, path);
        let steps_path = join(path, "steps");
        let steps = match map.get("steps") {
            None => {
                self.push(&steps_path, "required");
                None
            }
            Some(value) => self.steps(value, &steps_path),
        };
        Some(TestCase {
            name: name?,
            start_url: start_url?,
            tags: tags?,
            steps: steps?,
        })
    }

    fn steps(&mut self, value: &Value, path: &str) -> Option<Vec<Step>> {
        let Some(items) = value.as_array() else {
            self.push(path, format!("expected an array, got {}", kind_of(value)));
            return None;
        };
        if items.is_empty() {
            self.push(path, "must contain at least one step");
            return None;
        }
        let mut steps = Vec::with_capacity(items.len());
        let mut ok = true;
        for (idx, item) in items.iter().enumerate() {
            match self.step(item, &format!("{path}[{idx}]")) {
                Some(step) => steps.push(step),
                None => ok = false,
            }
        }
        ok.then_some(steps)
    }

    fn step(&mut self, value: &Value, path: &str) -> Option<Step> {
        let map = self.object(value, path)?;
        let action_path = join(path, "action");
        let action = match map.get("action") {
            None => {
                self.push(&action_path, "required");
                return None;
            }
            Some(Value::String(raw)) => match Action::parse(raw) {
                Some(action) => action,
                None => {
                    self.push(
                        &action_path,
                        format!(
                            "unrecognized action {raw:?} (expected one of {})",
                            Action::ALL.map(Action::as_str).join(", ")
                        ),
                    );
                    return None;
                }
            },
            Some(other) => {
                self.push(
                    &action_path,
                    format!("expected a string, got {}", kind_of(other)),
                );
                return None;
            }
        };

        let mut allowed = vec!["action"];
        if action.needs_target() {
            allowed.push("target");
        }
        if action.needs_value() {
            allowed.push("value");
        }
        self.strict_keys(map, &allowed, path);

        let target = if action.needs_target() {
            self.required_string(map, "target", path)
        } else {
            Some(String::new())
        };
        let value = if action.needs_value() {
            self.required_string(map, "value", path)
        } else {
            Some(String::new())
        };
        Some(action.build(target?, value?))
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
