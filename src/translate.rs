//! Deterministic Playwright suite generation from validated plans.
//!
//! The generated `test.describe` block carries a `source` annotation with
//! `repo/path` of the acceptance criteria. CI maps failing tests back through
//! it, so generation re-reads the annotation from its own output and fails
//! when it is missing or differs.
use crate::error::TranslateError;
use crate::hooks::required_hooks;
use crate::plan::{Step, TestCase, TestSuite};
use regex::Regex;
use std::sync::OnceLock;

const SPEC_SUFFIX: &str = ".spec.ts";
const INDENT: &str = "  ";

/// Generated source text plus the per-test metadata recorded in summaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSuite {
    pub file_name: String,
    pub source_ref: String,
    pub text: String,
    pub tests: Vec<GeneratedTest>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedTest {
    pub name: String,
    pub required_hooks: Vec<String>,
}

pub fn translate_suite(suite: &TestSuite) -> Result<GeneratedSuite, TranslateError> {
    let source_ref = suite.source.reference();
    let text = render_suite(suite, &source_ref);

    match extract_source_annotation(&text) {
        None => {
            return Err(TranslateError::MissingSourceAnnotation {
                suite: suite.suite_name.clone(),
            })
        }
        Some(found) if found != source_ref => {
            return Err(TranslateError::SourceAnnotationMismatch {
                suite: suite.suite_name.clone(),
                expected: source_ref,
                found,
            })
        }
        Some(_) => {}
    }

    let tests = suite
        .tests
        .iter()
        .map(|test| GeneratedTest {
            name: test.name.clone(),
            required_hooks: required_hooks(&test.steps),
        })
        .collect();

    Ok(GeneratedSuite {
        file_name: spec_file_name(&suite.suite_name),
        source_ref,
        text,
        tests,
    })
}

/// `My Suite` -> `my-suite.spec.ts`.
pub fn spec_file_name(suite_name: &str) -> String {
    let mut slug = String::with_capacity(suite_name.len());
    let mut pending_dash = false;
    for ch in suite_name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("suite");
    }
    format!("{slug}{SPEC_SUFFIX}")
}

/// Read the `source` annotation back out of generated text.
pub fn extract_source_annotation(text: &str) -> Option<String> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern = PATTERN
        .get_or_init(|| {
            Regex::new(r#"annotation: \{ type: "source", description: ("(?:[^"\\]|\\.)*") \}"#).ok()
        })
        .as_ref()?;
    let literal = pattern.captures(text)?.get(1)?.as_str();
    serde_json::from_str::<String>(literal).ok()
}

fn render_suite(suite: &TestSuite, source_ref: &str) -> String {
    let mut out = String::new();
    out.push_str("// Generated by acpw from a test plan. Do not edit by hand.\n");
    out.push_str(&format!("// Source: {}\n", single_line(source_ref)));
    out.push_str("import { test, expect } from \"@playwright/test\";\n\n");

    out.push_str(&format!("test.describe({}, {{\n", js_string(&suite.suite_name)));
    out.push_str(&format!(
        "{INDENT}annotation: {{ type: \"source\", description: {} }},\n",
        js_string(source_ref)
    ));
    if let Some(tags) = &suite.tags {
        out.push_str(&format!("{INDENT}tag: {},\n", tag_list(tags)));
    }
    out.push_str("}, () => {\n");

    for (idx, test) in suite.tests.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        render_test(&mut out, test);
    }

    out.push_str("});\n");
    out
}

fn render_test(out: &mut String, test: &TestCase) {
    let title = js_string(&test.name);
    match &test.tags {
        Some(tags) => {
            out.push_str(&format!("{INDENT}test({title}, {{\n"));
            out.push_str(&format!("{INDENT}{INDENT}tag: {},\n", tag_list(tags)));
            out.push_str(&format!("{INDENT}}}, async ({{ page }}) => {{\n"));
        }
        None => {
            out.push_str(&format!("{INDENT}test({title}, async ({{ page }}) => {{\n"));
        }
    }
    out.push_str(&format!(
        "{INDENT}{INDENT}await page.goto({});\n",
        js_string(&test.start_url)
    ));
    for step in &test.steps {
        out.push_str(&format!("{INDENT}{INDENT}{}\n", step_statement(step)));
    }
    out.push_str(&format!("{INDENT}}});\n"));
}

fn step_statement(step: &Step) -> String {
    match step {
        Step::Goto { value } => format!("await page.goto({});", js_string(value)),
        Step::Click { target } => format!("await {}.click();", locator(target)),
        Step::Fill { target, value } => {
            format!("await {}.fill({});", locator(target), js_string(value))
        }
        Step::Select { target, value } => format!(
            "await {}.selectOption({});",
            locator(target),
            js_string(value)
        ),
        Step::ExpectVisible { target } => {
            format!("await expect({}).toBeVisible();", locator(target))
        }
        Step::ExpectNotVisible { target } => {
            format!("await expect({}).not.toBeVisible();", locator(target))
        }
        Step::ExpectText { target, value } => format!(
            "await expect({}).toHaveText({});",
            locator(target),
            js_string(value)
        ),
        Step::ExpectUrl { value } => {
            format!("await expect(page).toHaveURL(/{}/);", regex_literal_body(value))
        }
    }
}

fn locator(target: &str) -> String {
    format!("page.getByTestId({})", js_string(target))
}

/// Double-quoted string literal; JSON escaping is valid JavaScript.
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn tag_list(tags: &[String]) -> String {
    let items = tags
        .iter()
        .map(|tag| {
            if tag.starts_with('@') {
                js_string(tag)
            } else {
                js_string(&format!("@{tag}"))
            }
        })
        .collect::<Vec<_>>();
    format!("[{}]", items.join(", "))
}

/// Body of a `/.../` regex literal that matches `value` literally.
pub fn regex_literal_body(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' | '^' | '$' | '.' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|'
            | '/' => {
                out.push('\\');
                out.push(ch);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(ch),
        }
    }
    out
}

fn single_line(value: &str) -> String {
    value.replace(['\n', '\r', '\u{2028}', '\u{2029}'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::validate_plan;
    use serde_json::json;

    fn scenario_suite() -> TestSuite {
        validate_plan(&json!({
            "suiteName": "My Suite",
            "source": { "repo": "some-repo", "path": "path/to/file.md" },
            "tests": [{
                "name": "Suite name",
                "startUrl": "/",
                "steps": [{ "action": "goto", "value": "/" }]
            }]
        }))
        .expect("valid plan")
    }

    fn full_suite() -> TestSuite {
        validate_plan(&json!({
            "suiteName": "Login & Signup",
            "source": { "repo": "web", "path": "ac/login.md" },
            "tags": ["auth", "@smoke"],
            "tests": [
                {
                    "name": "logs in",
                    "startUrl": "/login",
                    "tags": ["critical"],
                    "steps": [
                        { "action": "fill", "target": "email", "value": "a@b.c" },
                        { "action": "fill", "target": "password", "value": "p\"w" },
                        { "action": "select", "target": "region", "value": "eu" },
                        { "action": "click", "target": "submit" },
                        { "action": "expectNotVisible", "target": "error" },
                        { "action": "expectVisible", "target": "avatar" },
                        { "action": "expectText", "target": "greeting", "value": "Hi" },
                        { "action": "expectUrl", "value": "/home?tab=1" }
                    ]
                },
                {
                    "name": "shows signup",
                    "startUrl": "/",
                    "steps": [
                        { "action": "click", "target": "signup" },
                        { "action": "goto", "value": "/signup" },
                        { "action": "click", "target": "signup" }
                    ]
                }
            ]
        }))
        .expect("valid plan")
    }

    #[test]
    fn scenario_plan_produces_named_file_with_annotation() {
        let generated = translate_suite(&scenario_suite()).expect("translate");
        assert_eq!(generated.file_name, "my-suite.spec.ts");
        assert_eq!(generated.source_ref, "some-repo/path/to/file.md");
        assert!(generated.text.contains("\"some-repo/path/to/file.md\""));
        assert!(generated.text.contains("test(\"Suite name\", async ({ page }) => {"));
        assert_eq!(
            generated.tests,
            vec![GeneratedTest {
                name: "Suite name".to_string(),
                required_hooks: Vec::new(),
            }]
        );
    }

    #[test]
    fn renders_exact_suite_layout() {
        let generated = translate_suite(&scenario_suite()).expect("translate");
        let expected = "\
// Generated by acpw from a test plan. Do not edit by hand.
// Source: some-repo/path/to/file.md
import { test, expect } from \"@playwright/test\";

test.describe(\"My Suite\", {
  annotation: { type: \"source\", description: \"some-repo/path/to/file.md\" },
}, () => {
  test(\"Suite name\", async ({ page }) => {
    await page.goto(\"/\");
    await page.goto(\"/\");
  });
});
";
        assert_eq!(generated.text, expected);
    }

    #[test]
    fn translates_every_step_kind_in_order() {
        let generated = translate_suite(&full_suite()).expect("translate");
        let text = &generated.text;
        let expected_lines = [
            "  tag: [\"@auth\", \"@smoke\"],",
            "  test(\"logs in\", {",
            "    tag: [\"@critical\"],",
            "  }, async ({ page }) => {",
            "    await page.goto(\"/login\");",
            "    await page.getByTestId(\"email\").fill(\"a@b.c\");",
            "    await page.getByTestId(\"password\").fill(\"p\\\"w\");",
            "    await page.getByTestId(\"region\").selectOption(\"eu\");",
            "    await page.getByTestId(\"submit\").click();",
            "    await expect(page.getByTestId(\"error\")).not.toBeVisible();",
            "    await expect(page.getByTestId(\"avatar\")).toBeVisible();",
            "    await expect(page.getByTestId(\"greeting\")).toHaveText(\"Hi\");",
            "    await expect(page).toHaveURL(/\\/home\\?tab=1/);",
            "  test(\"shows signup\", async ({ page }) => {",
        ];
        let mut cursor = 0;
        for line in expected_lines {
            let found = text[cursor..]
                .find(line)
                .unwrap_or_else(|| panic!("missing or out of order: {line}\n{text}"));
            cursor += found + line.len();
        }
        assert_eq!(generated.file_name, "login-signup.spec.ts");
        assert_eq!(generated.tests[0].required_hooks.len(), 7);
        assert_eq!(generated.tests[1].required_hooks, vec!["signup"]);
    }

    #[test]
    fn translation_is_deterministic() {
        let suite = full_suite();
        let first = translate_suite(&suite).expect("translate");
        let second = translate_suite(&suite).expect("translate");
        assert_eq!(first.text, second.text);
    }

    #[test]
    fn source_annotation_round_trips_through_escaping() {
        let mut suite = scenario_suite();
        suite.source.path = "docs/\"quoted\" \\ path.md".to_string();
        let generated = translate_suite(&suite).expect("translate");
        assert_eq!(
            extract_source_annotation(&generated.text).as_deref(),
            Some("some-repo/docs/\"quoted\" \\ path.md")
        );
    }

    #[test]
    fn extraction_fails_on_text_without_annotation() {
        assert_eq!(extract_source_annotation("test.describe(\"x\", () => {});"), None);
    }

    #[test]
    fn slugifies_suite_names() {
        assert_eq!(spec_file_name("My Suite"), "my-suite.spec.ts");
        assert_eq!(spec_file_name("  Cart -- v2!  "), "cart-v2.spec.ts");
        assert_eq!(spec_file_name("***"), "suite.spec.ts");
    }

    #[test]
    fn escapes_regex_metacharacters_and_slashes() {
        assert_eq!(regex_literal_body("/a.b/(c)"), "\\/a\\.b\\/\\(c\\)");
        assert_eq!(regex_literal_body("x|y+z"), "x\\|y\\+z");
        assert_eq!(regex_literal_body("plain"), "plain");
    }
}
